// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-term search strategies.
//!
//! Each query term resolves to one ascending list of absolute corpus offsets.
//! Exact terms scan the raw text with a compiled pattern; Regular terms go
//! through stem expansion and the inverted index; PartialExact terms use the
//! same candidate set but keep only spellings that survive punctuation
//! stripping. After the per-term pass, adjacent Regular terms get a compound
//! pass so "text box" also finds "textbox".

use crate::index::CorpusIndex;
use crate::stem::stem;
use crate::tokenize::strip_non_word;
use crate::types::{QueryTerm, SearchOptions, TermTag};
use regex::Regex;
use std::sync::LazyLock;

/// A phrase of plain words gets `\b` anchors; anything with punctuation at
/// its edges must match unanchored or it would never match at all.
static ANCHORABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w[\w ]+\w$").unwrap());

/// Literal scan for a quoted phrase. Straight quotes inside the phrase also
/// match their curly equivalents in the corpus, since published text rarely
/// keeps the quotes the user typed.
pub fn exact_search(text: &str, phrase: &str, options: SearchOptions) -> Vec<usize> {
    let mut pattern = regex::escape(phrase)
        .replace('"', "[\"\u{201C}\u{201D}]")
        .replace('\'', "['\u{2018}\u{2019}]");
    if ANCHORABLE.is_match(&pattern) {
        pattern = format!(r"\b{pattern}\b");
    }
    if !options.case_sensitive {
        pattern = format!("(?i){pattern}");
    }
    // The pattern is escaped user text plus fixed decoration; it compiles.
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };
    re.find_iter(text).map(|m| m.start()).collect()
}

/// Stem-expanded lookup: offsets of every surface form sharing the term's
/// stem, merged into one ascending list.
pub fn regular_search(index: &CorpusIndex, term: &str) -> Vec<usize> {
    let stem_key = stem(term);
    let lists: Vec<&[usize]> = index
        .candidates(&stem_key)
        .map(|candidate| index.offsets(candidate))
        .filter(|offsets| !offsets.is_empty())
        .collect();
    merge_ascending(lists)
}

/// Stem-located but spelling-checked: only candidates whose stripped spelling
/// equals the term's contribute offsets. Comparison folds case unless the
/// session is case-sensitive.
pub fn partial_exact_search(index: &CorpusIndex, term: &str, options: SearchOptions) -> Vec<usize> {
    let wanted = comparison_form(term, options);
    let stem_key = stem(term);
    let lists: Vec<&[usize]> = index
        .candidates(&stem_key)
        .filter(|candidate| comparison_form(candidate, options) == wanted)
        .map(|candidate| index.offsets(candidate))
        .filter(|offsets| !offsets.is_empty())
        .collect();
    merge_ascending(lists)
}

fn comparison_form(word: &str, options: SearchOptions) -> String {
    let stripped = strip_non_word(word);
    if options.case_sensitive {
        stripped
    } else {
        stripped.to_lowercase()
    }
}

/// Resolve one term to its offsets.
pub fn term_search(
    text: &str,
    index: &CorpusIndex,
    term: &QueryTerm,
    options: SearchOptions,
) -> Vec<usize> {
    match term.tag {
        TermTag::Exact => exact_search(text, &term.term, options),
        TermTag::PartialExact => partial_exact_search(index, &term.term, options),
        TermTag::Regular => regular_search(index, &term.term),
    }
}

/// Compound pass: for each adjacent pair of Regular terms, search their
/// concatenation and splice every hit into BOTH terms' offset lists. A hit on
/// "textbox" then counts for "text" and for "box", and context extraction can
/// highlight the compound from either term's occurrence list.
pub fn expand_compounds(index: &CorpusIndex, terms: &[QueryTerm], per_term: &mut [Vec<usize>]) {
    for i in 0..terms.len().saturating_sub(1) {
        if terms[i].tag != TermTag::Regular || terms[i + 1].tag != TermTag::Regular {
            continue;
        }
        let compound = format!("{}{}", terms[i].term, terms[i + 1].term);
        let hits = regular_search(index, &compound);
        if hits.is_empty() {
            continue;
        }
        tracing::debug!(compound = %compound, hits = hits.len(), "compound expansion");
        let (left, right) = per_term.split_at_mut(i + 1);
        splice_ascending(&mut left[i], &hits);
        splice_ascending(&mut right[0], &hits);
    }
}

/// Insert `extra` (ascending) into `list` (ascending), keeping order. The
/// cursor only moves forward, so the whole splice is one linear walk.
fn splice_ascending(list: &mut Vec<usize>, extra: &[usize]) {
    let mut cursor = 0;
    for &offset in extra {
        while cursor < list.len() && list[cursor] < offset {
            cursor += 1;
        }
        list.insert(cursor, offset);
        cursor += 1;
    }
}

/// Tournament merge: pair up lists and merge in rounds, so merging k lists of
/// n total elements costs O(n log k) instead of the O(nk) of folding left.
fn merge_ascending(lists: Vec<&[usize]>) -> Vec<usize> {
    let mut round: Vec<Vec<usize>> = lists.into_iter().map(<[usize]>::to_vec).collect();
    while round.len() > 1 {
        let mut next = Vec::with_capacity(round.len().div_ceil(2));
        let mut iter = round.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(merge_two(&a, &b)),
                None => next.push(a),
            }
        }
        round = next;
    }
    round.pop().unwrap_or_default()
}

fn merge_two(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}
