//! Client-side full-text search over a delimited corpus.
//!
//! One text blob holds many documents, each introduced by a
//! `<FS>location<GS>` marker. Loading it builds an inverted index of surface
//! forms plus a stem index (Lancaster), and a session then answers queries
//! mixing three term shapes:
//!
//! - `word` finds every surface form sharing the word's stem;
//! - `'word'` is located by stem but must match the literal spelling;
//! - `"a phrase"` is scanned literally over the raw text.
//!
//! # Architecture
//!
//! ```text
//! query ──▶ query.rs ──▶ search.rs ──▶ stopword.rs ──▶ score.rs ──▶ results
//!              │            │                             │
//!              ▼            ▼                             ▼
//!         tokenize.rs   index.rs ◀── stem.rs         segment.rs
//! ```
//!
//! [`Engine`] is the single-threaded session; [`ShardedEngine`] fans the
//! same pipeline out over worker threads for large corpora. Snippets for
//! display come from [`Engine::get_context`] against the most recent search.
//!
//! # Usage
//!
//! ```
//! use talpa::Engine;
//!
//! let mut engine = Engine::new();
//! engine.load("\u{001C}notes/day1\u{001D}the quick brown fox jumps.".to_string());
//!
//! let output = engine.search("fox").unwrap();
//! assert_eq!(output.search_result[0].doc_id, 0);
//!
//! let length = engine.document_length(0).unwrap();
//! let context = engine.get_context(0, (0, length));
//! assert!(context.snippet.contains("fox"));
//! ```

// Module declarations
mod context;
mod engine;
mod events;
mod index;
mod query;
mod score;
mod search;
mod segment;
mod shard;
mod stem;
mod stopword;
mod tokenize;
mod types;

// Re-exports for public API
pub use engine::Engine;
pub use index::{build_index, CorpusIndex};
pub use query::{normalize_quotes, parse_query};
pub use search::{exact_search, partial_exact_search, regular_search};
pub use segment::{segment, DocumentMap, DOC_MARKER_END, DOC_MARKER_START};
pub use shard::ShardedEngine;
pub use stem::stem;
pub use stopword::suppress_cluttering;
pub use tokenize::{match_word_at, tokenize, Tokens};
pub use types::{
    ContextResult, DocResult, Highlight, IndexError, OptionsUpdate, QueryTerm, ResultDetails,
    SearchOptions, SearchOutput, SnippetRule, TermTag,
};
