//! The search session.
//!
//! An [`Engine`] owns one loaded corpus: the raw text, its document map, and
//! the two indexes. `search` runs the full pipeline (parse, per-term search,
//! compound expansion, stopword flagging, aggregation) and remembers enough
//! state for `get_context` to answer follow-up snippet requests against the
//! same result set.

use crate::context;
use crate::events::Listeners;
use crate::index::{build_index, CorpusIndex};
use crate::query::parse_query;
use crate::score::{aggregate, DocBuckets};
use crate::search::{expand_compounds, term_search};
use crate::segment::{segment, DocumentMap};
use crate::stopword::suppress_cluttering;
use crate::types::{
    ContextResult, OptionsUpdate, SearchOptions, SearchOutput, SnippetRule, TermTag,
};
use parking_lot::Mutex;
use std::time::Instant;

/// State carried from one search to the context requests that follow it.
#[derive(Debug, Default)]
struct PreviousSearch {
    buckets: DocBuckets,
    rules: Vec<SnippetRule>,
}

/// A single-threaded search session over one corpus.
pub struct Engine {
    text: String,
    doc_map: DocumentMap,
    index: CorpusIndex,
    options: SearchOptions,
    previous: PreviousSearch,
    index_ready: Listeners<()>,
    search_finished: Listeners<SearchOutput>,
    context_finished: Listeners<ContextResult>,
    // Lazily computed once per load; interior mutability keeps the getter
    // `&self` like the other getters.
    percentile_cache: Mutex<Option<usize>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            text: String::new(),
            doc_map: segment(""),
            index: CorpusIndex::default(),
            options: SearchOptions::default(),
            previous: PreviousSearch::default(),
            index_ready: Listeners::default(),
            search_finished: Listeners::default(),
            context_finished: Listeners::default(),
            percentile_cache: Mutex::new(None),
        }
    }

    /// Load a corpus, replacing whatever was loaded before. Segments the
    /// text, builds both indexes, clears per-search state, and fires
    /// `index_ready`.
    pub fn load(&mut self, corpus: String) {
        let started = Instant::now();
        self.doc_map = segment(&corpus);
        self.index = build_index(&corpus);
        self.text = corpus;
        self.previous = PreviousSearch::default();
        *self.percentile_cache.lock() = None;
        tracing::info!(
            docs = self.doc_map.doc_count(),
            bytes = self.text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "corpus loaded"
        );
        self.index_ready.emit(&());
    }

    pub fn set_options(&mut self, update: OptionsUpdate) {
        self.options.apply(update);
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn on_index_ready(&mut self, callback: impl Fn(&()) + Send + 'static) {
        self.index_ready.subscribe(callback);
    }

    pub fn on_search_finished(&mut self, callback: impl Fn(&SearchOutput) + Send + 'static) {
        self.search_finished.subscribe(callback);
    }

    pub fn on_context_finished(&mut self, callback: impl Fn(&ContextResult) + Send + 'static) {
        self.context_finished.subscribe(callback);
    }

    /// Run a query. Returns `None` for the empty string without firing any
    /// event; a query that parses to zero terms still produces (and emits)
    /// an empty output.
    pub fn search(&mut self, query: &str) -> Option<SearchOutput> {
        if query.is_empty() {
            return None;
        }
        let started = Instant::now();

        let terms = parse_query(query, self.options);

        let mut per_term: Vec<Vec<usize>> = terms
            .iter()
            .map(|term| term_search(&self.text, &self.index, term, self.options))
            .collect();
        expand_compounds(&self.index, &terms, &mut per_term);

        let stop_words = suppress_cluttering(&terms, &per_term);
        let (search_result, buckets) = aggregate(&terms, &per_term, &self.doc_map);

        self.previous = PreviousSearch {
            buckets,
            rules: terms
                .iter()
                .map(|term| match term.tag {
                    TermTag::Exact => SnippetRule::Fixed(term.term.len()),
                    _ => SnippetRule::Word,
                })
                .collect(),
        };

        let output = SearchOutput {
            search_result,
            search_terms: terms.iter().map(|term| term.display()).collect(),
            stop_words,
        };
        tracing::debug!(
            terms = terms.len(),
            docs = output.search_result.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        self.search_finished.emit(&output);
        Some(output)
    }

    /// Extract a snippet of one document from the previous search's result
    /// set. `range` is relative to the document start. Fires
    /// `context_finished` with the same value it returns.
    pub fn get_context(&self, doc_id: usize, range: (usize, usize)) -> ContextResult {
        let result = match self.doc_map.doc_start(doc_id) {
            Some(doc_start) => {
                let occurrences = self
                    .previous
                    .buckets
                    .get(&doc_id)
                    .map_or(&[][..], Vec::as_slice);
                context::get_context(&self.text, doc_start, occurrences, &self.previous.rules, range)
            }
            None => ContextResult::empty(range),
        };
        self.context_finished.emit(&result);
        result
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

    /// Cached per load; the UI asks for this once per rendered result row.
    pub fn document_length_95th_percentile(&self) -> usize {
        let mut cache = self.percentile_cache.lock();
        *cache.get_or_insert_with(|| self.doc_map.length_95th_percentile())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("bytes", &self.text.len())
            .field("docs", &self.doc_map.doc_count())
            .field("terms", &self.index.inverted.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{DOC_MARKER_END, DOC_MARKER_START};

    fn corpus(parts: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for (label, body) in parts {
            out.push(DOC_MARKER_START);
            out.push_str(label);
            out.push(DOC_MARKER_END);
            out.push_str(body);
        }
        out
    }

    fn loaded() -> Engine {
        let mut engine = Engine::new();
        engine.load(corpus(&[
            ("doc1", "The quick brown fox"),
            ("doc2", "A lazy dog runs"),
        ]));
        engine
    }

    #[test]
    fn single_term_hits_one_document() {
        let mut engine = loaded();
        let output = engine.search("quick").unwrap();
        assert_eq!(output.search_result.len(), 1);
        assert_eq!(output.search_result[0].doc_id, 0);
        assert_eq!(output.search_result[0].weighted, vec![1]);
        assert_eq!(output.search_terms, vec!["quick"]);
        assert_eq!(output.stop_words, vec![false]);
    }

    #[test]
    fn stemmed_query_finds_inflected_form() {
        let mut engine = loaded();
        // "running" stems to "run", which "runs" also stems to.
        let output = engine.search("running").unwrap();
        assert_eq!(output.search_result.len(), 1);
        assert_eq!(output.search_result[0].doc_id, 1);
    }

    #[test]
    fn empty_query_is_a_no_op() {
        let mut engine = loaded();
        assert!(engine.search("").is_none());
    }

    #[test]
    fn whitespace_query_produces_empty_output() {
        let mut engine = loaded();
        let output = engine.search("   ").unwrap();
        assert!(output.search_result.is_empty());
        assert!(output.search_terms.is_empty());
    }

    #[test]
    fn match_exact_searches_the_whole_query() {
        let mut engine = loaded();
        engine.set_options(OptionsUpdate {
            match_exact: Some(true),
            ..OptionsUpdate::default()
        });
        let output = engine.search("brown fox").unwrap();
        assert_eq!(output.search_terms, vec!["\"brown fox\""]);
        assert_eq!(output.search_result.len(), 1);
        assert_eq!(output.search_result[0].doc_id, 0);

        // "brown dog" spans no document.
        let output = engine.search("brown dog").unwrap();
        assert!(output.search_result.is_empty());
    }

    #[test]
    fn context_follows_the_previous_search() {
        let mut engine = loaded();
        engine.search("quick").unwrap();

        let length = engine.document_length(0).unwrap();
        let result = engine.get_context(0, (0, length));
        assert!(result.snippet.contains("quick"));
        assert_eq!(result.highlights.len(), 1);
        let h = result.highlights[0];
        assert_eq!(&result.snippet[h.start..h.end], "quick");
    }

    #[test]
    fn context_for_unknown_document_is_empty() {
        let mut engine = loaded();
        engine.search("quick").unwrap();
        assert_eq!(engine.get_context(9, (0, 10)), ContextResult::empty((0, 10)));
    }

    #[test]
    fn new_search_replaces_previous_state() {
        let mut engine = loaded();
        engine.search("quick").unwrap();
        engine.search("lazy").unwrap();

        let length = engine.document_length(0).unwrap();
        // Doc 0 is not in the "lazy" result set, so no highlights.
        let result = engine.get_context(0, (0, length));
        assert!(result.highlights.is_empty());
    }

    #[test]
    fn events_fire_with_payloads() {
        use std::sync::mpsc;
        let (tx, rx) = mpsc::channel();

        let mut engine = Engine::new();
        let ready_tx = tx.clone();
        engine.on_index_ready(move |()| ready_tx.send("ready").unwrap());
        let search_tx = tx.clone();
        engine.on_search_finished(move |_| search_tx.send("search").unwrap());
        engine.on_context_finished(move |_| tx.send("context").unwrap());

        engine.load(corpus(&[("d", "hello world")]));
        engine.search("hello").unwrap();
        engine.get_context(0, (0, 5));

        assert_eq!(rx.try_recv().unwrap(), "ready");
        assert_eq!(rx.try_recv().unwrap(), "search");
        assert_eq!(rx.try_recv().unwrap(), "context");
    }

    #[test]
    fn getters_reflect_the_document_map() {
        let engine = loaded();
        assert_eq!(engine.doc_count(), 2);
        assert_eq!(engine.location_by_id(0), Some("doc1"));
        assert_eq!(engine.location_by_id(1), Some("doc2"));
        assert_eq!(engine.location_by_id(2), None);
        assert_eq!(
            engine.document_length(0),
            Some("\u{1c}doc1\u{1d}The quick brown fox".len())
        );
    }

    #[test]
    fn percentile_is_cached_per_load() {
        let mut engine = loaded();
        let before = engine.document_length_95th_percentile();
        assert_eq!(before, engine.document_length_95th_percentile());

        engine.load(corpus(&[("d", "tiny")]));
        assert_ne!(engine.document_length_95th_percentile(), before);
    }
}
