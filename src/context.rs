// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Context extraction.
//!
//! Given a document and a byte range, produce a display snippet trimmed to
//! whole words, with the previous search's occurrences inside the range
//! converted to snippet-relative highlight spans. The leading trim drops any
//! partial word plus the separators after it; the trailing trim mirrors it.
//! A range that lands in text with no word characters at all collapses to
//! the explicit empty result rather than showing word fragments.

use crate::tokenize::match_word_at;
use crate::types::{ContextResult, Highlight, SnippetRule};
use regex::Regex;
use std::sync::LazyLock;

static START_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w*\W*\b").unwrap());
static END_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\W*\w*$").unwrap());

/// Extract a word-trimmed snippet of one document.
///
/// `doc_occurrences` is the retained per-term occurrence buckets for this
/// document from the previous search (empty slice when the document was not
/// in the result set); offsets in it and in `range` are relative to
/// `doc_start`. `rules` gives each term's highlight length policy.
pub fn get_context(
    text: &str,
    doc_start: usize,
    doc_occurrences: &[Vec<usize>],
    rules: &[SnippetRule],
    range: (usize, usize),
) -> ContextResult {
    let (requested_start, requested_end) = range;
    let abs_start = (doc_start + requested_start).min(text.len());
    let abs_end = (doc_start + requested_end).min(text.len());
    if abs_start >= abs_end {
        return ContextResult::empty(range);
    }
    // Arbitrary byte ranges may split a multi-byte character; treat that the
    // same as a range with nothing extractable in it.
    let Some(window) = text.get(abs_start..abs_end) else {
        return ContextResult::empty(range);
    };

    let (Some(lead), Some(trail)) = (START_TRIM.find(window), END_TRIM.find(window)) else {
        return ContextResult::empty(range);
    };

    let start = requested_start + lead.len();
    let finish = (abs_end - doc_start) - trail.len();
    if start >= finish {
        return ContextResult::empty((start, start));
    }

    let snippet = window[lead.len()..window.len() - trail.len()]
        .replace(['\u{001C}', '\u{001D}'], "|");

    // Occurrences inside the trimmed range, rebased onto the snippet.
    let mut hits: Vec<(usize, usize)> = Vec::new();
    for (term, offsets) in doc_occurrences.iter().enumerate() {
        for &offset in offsets {
            if start <= offset && offset < finish {
                hits.push((offset - start, term));
            }
        }
    }
    hits.sort_by_key(|&(offset, _)| offset);

    let highlights = hits
        .iter()
        .enumerate()
        .map(|(i, &(offset, term))| {
            let length = match rules.get(term) {
                Some(&SnippetRule::Fixed(length)) => length,
                _ => match_word_at(&snippet, offset).unwrap_or(0),
            };
            let mut end = (offset + length).min(snippet.len());
            if let Some(&(next_start, _)) = hits.get(i + 1) {
                end = end.min(next_start);
            }
            Highlight {
                start: offset,
                end,
                term,
            }
        })
        .collect();

    ContextResult {
        snippet,
        highlights,
        range: (start, finish),
    }
}
