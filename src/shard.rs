// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Sharded sessions.
//!
//! A [`ShardedEngine`] splits the corpus at document boundaries across N
//! worker threads, each owning a private [`Engine`]. A dispatcher thread
//! consumes a FIFO request queue, so at most one batch is in flight and
//! later requests wait their turn; a search broadcast to all shards is
//! answered only after every shard has replied. Results surface through the
//! same listener events the single-threaded engine fires, with document ids
//! rebased into the global numbering.
//!
//! There are no timeouts anywhere in the pipeline. A worker that never
//! replies stalls the dispatcher and every queued request behind it.

use crate::engine::Engine;
use crate::segment::{segment, DocumentMap};
use crate::types::{ContextResult, OptionsUpdate, SearchOutput};
use parking_lot::Mutex;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

enum WorkerCommand {
    Load(String),
    SetOptions(OptionsUpdate),
    Search(String),
    Context { doc_id: usize, range: (usize, usize) },
}

enum WorkerReply {
    IndexReady,
    Ack,
    SearchFinished(SearchOutput),
    ContextFinished(ContextResult),
}

enum HostRequest {
    Load {
        slices: Vec<String>,
        starts: Vec<usize>,
    },
    SetOptions(OptionsUpdate),
    Search(String),
    Context {
        shard: usize,
        doc_id: usize,
        range: (usize, usize),
    },
}

#[derive(Default)]
struct SessionListeners {
    index_ready: crate::events::Listeners<()>,
    search_finished: crate::events::Listeners<SearchOutput>,
    context_finished: crate::events::Listeners<ContextResult>,
}

/// A search session fanned out over worker threads.
///
/// Mutating calls are asynchronous: they enqueue work and return, and the
/// outcome arrives through the registered listeners. The getters answer
/// immediately from the host's own copy of the document map.
pub struct ShardedEngine {
    request_tx: Option<Sender<HostRequest>>,
    shard_count: usize,
    doc_map: DocumentMap,
    shard_starts: Vec<usize>,
    listeners: Arc<Mutex<SessionListeners>>,
    percentile_cache: Mutex<Option<usize>>,
    dispatcher: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl ShardedEngine {
    /// Spawn `shards` workers plus the dispatcher. Zero is clamped to one.
    pub fn new(shards: usize) -> Self {
        let shard_count = shards.max(1);
        let listeners = Arc::new(Mutex::new(SessionListeners::default()));

        let (reply_tx, reply_rx) = channel();
        let mut command_txs = Vec::with_capacity(shard_count);
        let mut workers = Vec::with_capacity(shard_count);
        for shard in 0..shard_count {
            let (command_tx, command_rx) = channel();
            let reply_tx = reply_tx.clone();
            command_txs.push(command_tx);
            workers.push(
                std::thread::Builder::new()
                    .name(format!("search-shard-{shard}"))
                    .spawn(move || worker_loop(shard, command_rx, reply_tx))
                    .expect("failed to spawn shard worker"),
            );
        }

        let (request_tx, request_rx) = channel();
        let dispatcher_listeners = Arc::clone(&listeners);
        let dispatcher = std::thread::Builder::new()
            .name("search-dispatcher".to_string())
            .spawn(move || dispatcher_loop(request_rx, command_txs, reply_rx, dispatcher_listeners))
            .expect("failed to spawn dispatcher");

        ShardedEngine {
            request_tx: Some(request_tx),
            shard_count,
            doc_map: segment(""),
            shard_starts: vec![0; shard_count],
            listeners,
            percentile_cache: Mutex::new(None),
            dispatcher: Some(dispatcher),
            workers,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn on_index_ready(&self, callback: impl Fn(&()) + Send + 'static) {
        self.listeners.lock().index_ready.subscribe(callback);
    }

    pub fn on_search_finished(&self, callback: impl Fn(&SearchOutput) + Send + 'static) {
        self.listeners.lock().search_finished.subscribe(callback);
    }

    pub fn on_context_finished(&self, callback: impl Fn(&ContextResult) + Send + 'static) {
        self.listeners.lock().context_finished.subscribe(callback);
    }

    /// Segment the corpus, assign contiguous document runs to shards, and
    /// queue the per-shard loads. `index_ready` fires once every shard has
    /// built its index.
    pub fn load(&mut self, corpus: String) {
        self.doc_map = segment(&corpus);
        *self.percentile_cache.lock() = None;

        let starts = split_points(&self.doc_map, corpus.len(), self.shard_count);
        let boundaries = &self.doc_map.offsets;
        let slices: Vec<String> = (0..self.shard_count)
            .map(|shard| {
                let from = boundaries[starts[shard]];
                let to = if shard + 1 < self.shard_count {
                    boundaries[starts[shard + 1]]
                } else {
                    corpus.len()
                };
                corpus[from..to].to_string()
            })
            .collect();
        self.shard_starts = starts.clone();

        tracing::info!(
            shards = self.shard_count,
            docs = self.doc_map.doc_count(),
            "corpus sharded"
        );
        self.enqueue(HostRequest::Load { slices, starts });
    }

    pub fn set_options(&self, update: OptionsUpdate) {
        self.enqueue(HostRequest::SetOptions(update));
    }

    /// Queue a search across all shards. The merged result arrives via
    /// `search_finished`. The empty string is ignored, like
    /// [`Engine::search`].
    pub fn search(&self, query: &str) {
        if query.is_empty() {
            return;
        }
        self.enqueue(HostRequest::Search(query.to_string()));
    }

    /// Queue a context request, routed to the single shard that owns the
    /// document. An unknown document id answers immediately with the empty
    /// result.
    pub fn get_context(&self, doc_id: usize, range: (usize, usize)) {
        if doc_id >= self.doc_map.doc_count() {
            self.listeners
                .lock()
                .context_finished
                .emit(&ContextResult::empty(range));
            return;
        }
        // The last shard whose first document is not past this one owns it;
        // empty shards share their successor's start and lose the tie.
        let shard = self
            .shard_starts
            .partition_point(|&start| start <= doc_id)
            - 1;
        self.enqueue(HostRequest::Context {
            shard,
            doc_id: doc_id - self.shard_starts[shard],
            range,
        });
    }

    pub fn doc_count(&self) -> usize {
        self.doc_map.doc_count()
    }

    pub fn location_by_id(&self, doc_id: usize) -> Option<&str> {
        self.doc_map.location(doc_id)
    }

    pub fn document_length(&self, doc_id: usize) -> Option<usize> {
        self.doc_map.doc_length(doc_id)
    }

    pub fn document_length_95th_percentile(&self) -> usize {
        let mut cache = self.percentile_cache.lock();
        *cache.get_or_insert_with(|| self.doc_map.length_95th_percentile())
    }

    fn enqueue(&self, request: HostRequest) {
        if let Some(tx) = &self.request_tx {
            // Send only fails after the dispatcher is gone, i.e. during
            // teardown.
            let _ = tx.send(request);
        }
    }
}

impl Drop for ShardedEngine {
    fn drop(&mut self) {
        // Closing the request channel unwinds the whole pipeline: the
        // dispatcher drains what is queued and exits, which closes the
        // command channels and stops the workers.
        self.request_tx.take();
        if let Some(dispatcher) = self.dispatcher.take() {
            let _ = dispatcher.join();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// First document id of each shard, splitting near even byte counts but
/// always on a document boundary.
fn split_points(doc_map: &DocumentMap, corpus_len: usize, shards: usize) -> Vec<usize> {
    let mut starts = Vec::with_capacity(shards);
    starts.push(0);
    for shard in 1..shards {
        let target = corpus_len * shard / shards;
        let doc = doc_map
            .offsets
            .partition_point(|&boundary| boundary <= target)
            .saturating_sub(1)
            .min(doc_map.doc_count().saturating_sub(1));
        // Keep starts monotone even when targets collapse onto one document.
        starts.push(doc.max(starts[shard - 1]));
    }
    starts
}

fn worker_loop(
    shard: usize,
    commands: Receiver<WorkerCommand>,
    replies: Sender<(usize, WorkerReply)>,
) {
    let mut engine = Engine::new();
    while let Ok(command) = commands.recv() {
        let reply = match command {
            WorkerCommand::Load(text) => {
                engine.load(text);
                WorkerReply::IndexReady
            }
            WorkerCommand::SetOptions(update) => {
                engine.set_options(update);
                WorkerReply::Ack
            }
            WorkerCommand::Search(query) => {
                WorkerReply::SearchFinished(engine.search(&query).unwrap_or(SearchOutput {
                    search_result: Vec::new(),
                    search_terms: Vec::new(),
                    stop_words: Vec::new(),
                }))
            }
            WorkerCommand::Context { doc_id, range } => {
                WorkerReply::ContextFinished(engine.get_context(doc_id, range))
            }
        };
        if replies.send((shard, reply)).is_err() {
            break;
        }
    }
}

fn dispatcher_loop(
    requests: Receiver<HostRequest>,
    commands: Vec<Sender<WorkerCommand>>,
    replies: Receiver<(usize, WorkerReply)>,
    listeners: Arc<Mutex<SessionListeners>>,
) {
    let shard_count = commands.len();
    let mut starts = vec![0; shard_count];

    while let Ok(request) = requests.recv() {
        match request {
            HostRequest::Load {
                slices,
                starts: new_starts,
            } => {
                starts = new_starts;
                for (tx, slice) in commands.iter().zip(slices) {
                    if tx.send(WorkerCommand::Load(slice)).is_err() {
                        return;
                    }
                }
                if collect_barrier(&replies, shard_count).is_none() {
                    return;
                }
                listeners.lock().index_ready.emit(&());
            }
            HostRequest::SetOptions(update) => {
                for tx in &commands {
                    if tx.send(WorkerCommand::SetOptions(update)).is_err() {
                        return;
                    }
                }
                if collect_barrier(&replies, shard_count).is_none() {
                    return;
                }
            }
            HostRequest::Search(query) => {
                for tx in &commands {
                    if tx.send(WorkerCommand::Search(query.clone())).is_err() {
                        return;
                    }
                }
                let Some(collected) = collect_barrier(&replies, shard_count) else {
                    return;
                };
                let mut outputs: Vec<Option<SearchOutput>> =
                    (0..shard_count).map(|_| None).collect();
                for (shard, reply) in collected {
                    if let WorkerReply::SearchFinished(output) = reply {
                        outputs[shard] = Some(output);
                    }
                }
                let merged = merge_outputs(outputs, &starts);
                listeners.lock().search_finished.emit(&merged);
            }
            HostRequest::Context {
                shard,
                doc_id,
                range,
            } => {
                if commands[shard]
                    .send(WorkerCommand::Context { doc_id, range })
                    .is_err()
                {
                    return;
                }
                loop {
                    match replies.recv() {
                        Ok((_, WorkerReply::ContextFinished(result))) => {
                            listeners.lock().context_finished.emit(&result);
                            break;
                        }
                        Ok(_) => continue,
                        Err(_) => return,
                    }
                }
            }
        }
    }
}

/// Wait for one reply from every shard. `None` means a worker died.
fn collect_barrier(
    replies: &Receiver<(usize, WorkerReply)>,
    shard_count: usize,
) -> Option<Vec<(usize, WorkerReply)>> {
    let mut collected = Vec::with_capacity(shard_count);
    for _ in 0..shard_count {
        collected.push(replies.recv().ok()?);
    }
    Some(collected)
}

/// Concatenate per-shard outputs into one global result set.
///
/// Shard results are already sorted by local document id, and shards cover
/// ascending document ranges, so rebasing and concatenating in shard order
/// keeps the output sorted. Stopword flags OR together: a term that crowds
/// any shard is flagged for the whole session.
fn merge_outputs(outputs: Vec<Option<SearchOutput>>, starts: &[usize]) -> SearchOutput {
    let mut merged = SearchOutput {
        search_result: Vec::new(),
        search_terms: Vec::new(),
        stop_words: Vec::new(),
    };
    for (shard, output) in outputs.into_iter().enumerate() {
        let Some(output) = output else { continue };
        if merged.search_terms.is_empty() {
            merged.search_terms = output.search_terms;
        }
        if merged.stop_words.is_empty() {
            merged.stop_words = output.stop_words;
        } else {
            for (flag, other) in merged.stop_words.iter_mut().zip(output.stop_words) {
                *flag |= other;
            }
        }
        for mut doc in output.search_result {
            doc.doc_id += starts[shard];
            merged.search_result.push(doc);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocResult, ResultDetails};

    fn output(docs: Vec<usize>, stop_words: Vec<bool>) -> SearchOutput {
        SearchOutput {
            search_result: docs
                .into_iter()
                .map(|doc_id| DocResult {
                    doc_id,
                    weighted: vec![1],
                    details: ResultDetails {
                        term_offsets: vec![vec![0]],
                        doc_length: 10,
                    },
                })
                .collect(),
            search_terms: vec!["term".to_string()],
            stop_words,
        }
    }

    #[test]
    fn merge_rebases_doc_ids_in_shard_order() {
        let merged = merge_outputs(
            vec![
                Some(output(vec![0, 2], vec![false])),
                Some(output(vec![0, 1], vec![false])),
            ],
            &[0, 3],
        );
        let ids: Vec<usize> = merged.search_result.iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![0, 2, 3, 4]);
    }

    #[test]
    fn merge_ors_stopword_flags() {
        let merged = merge_outputs(
            vec![
                Some(output(vec![], vec![false])),
                Some(output(vec![], vec![true])),
            ],
            &[0, 0],
        );
        assert_eq!(merged.stop_words, vec![true]);
    }

    #[test]
    fn split_points_land_on_document_boundaries() {
        // Ten documents of 10 bytes each.
        let doc_map = DocumentMap {
            offsets: (0..=10).map(|i| i * 10).collect(),
            locations: (0..10).map(|i| i.to_string()).collect(),
        };
        let starts = split_points(&doc_map, 100, 3);
        assert_eq!(starts, vec![0, 3, 6]);
    }

    #[test]
    fn split_points_stay_monotone_on_tiny_corpora() {
        let doc_map = DocumentMap {
            offsets: vec![0, 50],
            locations: vec!["only".to_string()],
        };
        let starts = split_points(&doc_map, 50, 4);
        assert_eq!(starts, vec![0, 0, 0, 0]);
    }
}
