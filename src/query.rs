//! Query parsing.
//!
//! A query mixes three term shapes: `"quoted phrases"` matched literally,
//! `'quoted words'` located by stem but verified against their spelling, and
//! bare words matched through stem expansion. Parsing preserves the user's
//! left-to-right term order, which the rest of the pipeline relies on when it
//! aligns `weighted` slots, stopword flags, and display strings.

use crate::tokenize::tokenize;
use crate::types::{QueryTerm, SearchOptions, TermTag};
use regex::Regex;
use std::sync::LazyLock;

static EXACT_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""(.*?)""#).unwrap());
static PARTIAL_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'(.*?)'").unwrap());

/// Replace curly quotes with their straight equivalents so pasted text
/// parses the same as typed text.
pub fn normalize_quotes(query: &str) -> String {
    query
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Parse a query string into tagged terms.
///
/// With `match_exact` set the whole query becomes one Exact phrase. Otherwise
/// double-quoted spans become Exact terms, single-quoted spans split into one
/// PartialExact term per word, and whatever text remains tokenizes into
/// Regular terms. Empty spans are dropped.
pub fn parse_query(query: &str, options: SearchOptions) -> Vec<QueryTerm> {
    let normalized = normalize_quotes(query);

    if options.match_exact {
        let phrase = normalized.trim();
        if phrase.is_empty() {
            return Vec::new();
        }
        return vec![QueryTerm {
            term: phrase.to_string(),
            tag: TermTag::Exact,
        }];
    }

    // (position, term) pairs, assembled per shape then ordered by position.
    let mut terms: Vec<(usize, QueryTerm)> = Vec::new();

    // Double-quoted spans first; the gaps between them feed the next pass.
    let mut gaps: Vec<(usize, String)> = Vec::new();
    let mut cursor = 0;
    for m in EXACT_SPAN.captures_iter(&normalized) {
        let whole = m.get(0).unwrap();
        let inner = m.get(1).unwrap().as_str();
        gaps.push((cursor, normalized[cursor..whole.start()].to_string()));
        if !inner.trim().is_empty() {
            terms.push((
                whole.start(),
                QueryTerm {
                    term: inner.to_string(),
                    tag: TermTag::Exact,
                },
            ));
        }
        cursor = whole.end();
    }
    gaps.push((cursor, normalized[cursor..].to_string()));

    // Single-quoted spans inside the gaps, splitting multi-word spans into
    // one PartialExact term per word.
    let mut plain: Vec<(usize, String)> = Vec::new();
    for (gap_start, gap) in gaps {
        let mut cursor = 0;
        for m in PARTIAL_SPAN.captures_iter(&gap) {
            let whole = m.get(0).unwrap();
            let inner = m.get(1).unwrap();
            plain.push((gap_start + cursor, gap[cursor..whole.start()].to_string()));
            for (word_offset, word) in tokenize(inner.as_str()) {
                terms.push((
                    gap_start + inner.start() + word_offset,
                    QueryTerm {
                        term: word.to_string(),
                        tag: TermTag::PartialExact,
                    },
                ));
            }
            cursor = whole.end();
        }
        plain.push((gap_start + cursor, gap[cursor..].to_string()));
    }

    // Everything left is Regular.
    for (segment_start, segment) in plain {
        for (word_offset, word) in tokenize(&segment) {
            terms.push((
                segment_start + word_offset,
                QueryTerm {
                    term: word.to_string(),
                    tag: TermTag::Regular,
                },
            ));
        }
    }

    terms.sort_by_key(|&(pos, _)| pos);
    terms.into_iter().map(|(_, term)| term).collect()
}
