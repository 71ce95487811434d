// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a search session.
//!
//! These types define what a query is made of and what a search hands back.
//! Everything the UI layer consumes lives here; the internal index structures
//! live in `index` and `segment`.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **SearchOutput**: `search_terms`, `stop_words`, and every document's
//!   `weighted` array all have one slot per parsed query term, in the original
//!   left-to-right order.
//! - **DocResult**: for every Exact-tagged term, the corresponding offsets
//!   slot in `details.term_offsets` is non-empty. Documents that violate this
//!   are dropped before emission, so downstream code may rely on it.
//! - **Highlight**: `start < end ≤ snippet.len()`, and highlights never
//!   overlap (each end is clamped to the next start).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a parsed query term must be matched.
///
/// The tag fixes both the search strategy and the mandatory-presence rule:
/// Exact terms must appear in every surviving document, the other two are
/// best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermTag {
    /// Double-quoted phrase, scanned literally over the raw corpus.
    Exact,
    /// Single-quoted word, located via the stem index but required to match
    /// the literal spelling.
    PartialExact,
    /// Bare word, matched through stem expansion.
    Regular,
}

/// One parsed query term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTerm {
    pub term: String,
    pub tag: TermTag,
}

impl QueryTerm {
    /// The display form the UI shows in its term chips: quoted the way the
    /// user typed it.
    pub fn display(&self) -> String {
        match self.tag {
            TermTag::Exact => format!("\"{}\"", self.term),
            TermTag::PartialExact => format!("'{}'", self.term),
            TermTag::Regular => self.term.clone(),
        }
    }
}

/// Matching options, updated via [`OptionsUpdate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Exact and PartialExact matching become case-sensitive.
    pub case_sensitive: bool,
    /// Treat the whole query as a single Exact phrase.
    pub match_exact: bool,
}

/// Partial options update: only the fields present are changed.
///
/// Unset fields keep their previous value rather than resetting, so a caller
/// can toggle one option without knowing the rest.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsUpdate {
    pub case_sensitive: Option<bool>,
    pub match_exact: Option<bool>,
}

impl SearchOptions {
    pub fn apply(&mut self, update: OptionsUpdate) {
        if let Some(case_sensitive) = update.case_sensitive {
            self.case_sensitive = case_sensitive;
        }
        if let Some(match_exact) = update.match_exact {
            self.match_exact = match_exact;
        }
    }
}

/// Per-document detail payload: where each term landed and how long the
/// document is. The occurrence plot in the UI is drawn from this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetails {
    /// One slot per query term, each an ascending list of offsets relative to
    /// the document's start.
    pub term_offsets: Vec<Vec<usize>>,
    /// Document length in bytes, marker included.
    pub doc_length: usize,
}

/// One retained document with its weighted per-term counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocResult {
    pub doc_id: usize,
    /// Capped occurrence count per term; the relevance score is the sum of
    /// the slots the UI has not hidden.
    pub weighted: Vec<usize>,
    pub details: ResultDetails,
}

/// Everything `search` produces for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutput {
    /// Retained documents in ascending document-id order.
    pub search_result: Vec<DocResult>,
    /// Display-quoted term strings, aligned to query-term order.
    pub search_terms: Vec<String>,
    /// Advisory suppression flags, aligned to query-term order.
    pub stop_words: Vec<bool>,
}

/// How long a highlight for a given term should be when extracting context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetRule {
    /// Exact terms highlight exactly the phrase length.
    Fixed(usize),
    /// Regular/PartialExact terms highlight the matched word, re-measured at
    /// the occurrence position.
    Word,
}

/// A highlighted span inside a snippet, in snippet-relative bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    /// Index of the query term this occurrence belongs to.
    pub term: usize,
}

/// A word-boundary-trimmed context snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResult {
    pub snippet: String,
    pub highlights: Vec<Highlight>,
    /// The trimmed `[start, end)` range, relative to the document.
    pub range: (usize, usize),
}

impl ContextResult {
    /// The explicit empty result for a range that collapses under trimming.
    pub fn empty(range: (usize, usize)) -> Self {
        ContextResult {
            snippet: String::new(),
            highlights: Vec::new(),
            range,
        }
    }
}

/// Structural problems in a document map, reported by
/// [`crate::segment::DocumentMap::validate`].
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("document map has {offsets} offsets for {locations} locations")]
    TableMismatch { offsets: usize, locations: usize },

    #[error("document boundaries not strictly increasing at index {0}")]
    UnsortedBoundaries(usize),

    #[error("sentinel boundary {sentinel} does not equal corpus length {corpus_len}")]
    BadSentinel { sentinel: usize, corpus_len: usize },
}
