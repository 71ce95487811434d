use anyhow::{Context as _, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use talpa::{ContextResult, Engine, OptionsUpdate, SearchOutput, ShardedEngine};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            corpus,
            query,
            case_sensitive,
            match_exact,
            shards,
            context,
            json,
        } => {
            let update = OptionsUpdate {
                case_sensitive: Some(case_sensitive),
                match_exact: Some(match_exact),
            };
            if shards == 0 {
                run_search(&corpus, &query, update, context, json)
            } else {
                run_sharded_search(&corpus, &query, update, shards, context, json)
            }
        }
        Commands::Stats { corpus } => run_stats(&corpus),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn read_corpus(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read corpus {}", path.display()))
}

fn run_search(
    corpus_path: &Path,
    query: &str,
    update: OptionsUpdate,
    context: usize,
    json: bool,
) -> Result<()> {
    let corpus = read_corpus(corpus_path)?;

    let mut engine = Engine::new();
    engine.set_options(update);
    with_progress("indexing", || engine.load(corpus));

    let Some(output) = engine.search(query) else {
        anyhow::bail!("empty query");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    print_results(
        &output,
        context,
        |doc_id| engine.location_by_id(doc_id).map(str::to_string),
        |doc_id, range| engine.get_context(doc_id, range),
    );
    Ok(())
}

fn run_sharded_search(
    corpus_path: &Path,
    query: &str,
    update: OptionsUpdate,
    shards: usize,
    context: usize,
    json: bool,
) -> Result<()> {
    let corpus = read_corpus(corpus_path)?;

    let mut session = ShardedEngine::new(shards);
    let (search_tx, search_rx) = mpsc::channel::<SearchOutput>();
    session.on_search_finished(move |output| {
        let _ = search_tx.send(output.clone());
    });
    let (context_tx, context_rx) = mpsc::channel::<ContextResult>();
    session.on_context_finished(move |result| {
        let _ = context_tx.send(result.clone());
    });

    session.set_options(update);
    session.load(corpus);
    session.search(query);
    let output = with_progress("searching", || search_rx.recv())
        .context("search workers disconnected")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    print_results(
        &output,
        context,
        |doc_id| session.location_by_id(doc_id).map(str::to_string),
        |doc_id, range| {
            session.get_context(doc_id, range);
            context_rx.recv().unwrap_or_else(|_| ContextResult::empty(range))
        },
    );
    Ok(())
}

fn print_results(
    output: &SearchOutput,
    context: usize,
    location: impl Fn(usize) -> Option<String>,
    mut get_context: impl FnMut(usize, (usize, usize)) -> ContextResult,
) {
    println!("terms: {}", output.search_terms.join(" "));
    let suppressed: Vec<&str> = output
        .search_terms
        .iter()
        .zip(&output.stop_words)
        .filter_map(|(term, &flag)| flag.then_some(term.as_str()))
        .collect();
    if !suppressed.is_empty() {
        println!("suppressed stopwords: {}", suppressed.join(" "));
    }
    println!("{} matching documents\n", output.search_result.len());

    for doc in &output.search_result {
        // Score counts only the terms that are not suppressed.
        let score: usize = doc
            .weighted
            .iter()
            .zip(&output.stop_words)
            .filter_map(|(&weight, &flag)| (!flag).then_some(weight))
            .sum();
        let label = location(doc.doc_id).unwrap_or_default();
        println!("{label}  (score {score})");

        if let Some(&first_hit) = doc.details.term_offsets.iter().flatten().min() {
            let range = (first_hit.saturating_sub(context / 2), first_hit + context / 2);
            let snippet = get_context(doc.doc_id, range).snippet.replace('\n', " ");
            println!("    {snippet}");
        }
    }
}

fn run_stats(corpus_path: &Path) -> Result<()> {
    let corpus = read_corpus(corpus_path)?;
    let bytes = corpus.len();

    let mut engine = Engine::new();
    with_progress("indexing", || engine.load(corpus));

    println!("documents:              {}", engine.doc_count());
    println!("corpus bytes:           {bytes}");
    println!(
        "95th pct doc length:    {}",
        engine.document_length_95th_percentile()
    );
    Ok(())
}

/// Show a spinner while `f` runs. Progress display ships with the parallel
/// feature; without it the closure just runs.
fn with_progress<T>(message: &'static str, f: impl FnOnce() -> T) -> T {
    #[cfg(feature = "parallel")]
    {
        let bar = indicatif::ProgressBar::new_spinner();
        bar.set_message(message);
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        let out = f();
        bar.finish_and_clear();
        out
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = message;
        f()
    }
}
