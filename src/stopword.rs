//! Stopword suppression.
//!
//! Common English words are never removed from the search, but when one of
//! them crowds the result set its flag tells the UI to hide its column by
//! default. A term is flagged when its occurrence count exceeds twice the
//! mean count of the still-active terms; flagged terms leave the mean, so
//! the pass repeats until it flags nothing.

use crate::types::{QueryTerm, TermTag};
use std::collections::HashSet;
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "would",
        "should", "could", "ought", "i'm", "you're", "he's", "she's", "it's", "we're", "they're",
        "i've", "you've", "we've", "they've", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd",
        "i'll", "you'll", "he'll", "she'll", "we'll", "they'll", "isn't", "aren't", "wasn't",
        "weren't", "hasn't", "haven't", "hadn't", "doesn't", "don't", "didn't", "won't",
        "wouldn't", "shan't", "shouldn't", "can't", "cannot", "couldn't", "mustn't", "let's",
        "that's", "who's", "what's", "here's", "there's", "when's", "where's", "why's", "how's",
        "a", "an", "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at",
        "by", "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    ])
});

/// Whether a Regular term is even eligible for suppression.
fn is_stop_word(term: &QueryTerm) -> bool {
    term.tag == TermTag::Regular && STOP_WORDS.contains(term.term.to_lowercase().as_str())
}

/// Compute per-term suppression flags, aligned to query-term order.
///
/// Each pass fixes the threshold at `total / active * 2`, flags every
/// eligible term whose count strictly exceeds it, removes flagged terms from
/// the running totals, and repeats until a pass flags nothing. A flagged
/// term holds more than `2/active` of the results, so each pass flags fewer
/// than half the active terms and the loop always terminates with at least
/// one term active.
pub fn suppress_cluttering(terms: &[QueryTerm], per_term: &[Vec<usize>]) -> Vec<bool> {
    debug_assert_eq!(terms.len(), per_term.len());

    let eligible: Vec<bool> = terms.iter().map(is_stop_word).collect();
    let mut flagged = vec![false; terms.len()];

    let mut active = terms.len();
    let mut total: usize = per_term.iter().map(Vec::len).sum();

    loop {
        let threshold = total as f64 / active as f64 * 2.0;
        let mut changed = false;
        for i in 0..terms.len() {
            if eligible[i] && !flagged[i] && per_term[i].len() as f64 > threshold {
                flagged[i] = true;
                active -= 1;
                total -= per_term[i].len();
                changed = true;
            }
        }
        if !changed {
            return flagged;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(term: &str) -> QueryTerm {
        QueryTerm {
            term: term.to_string(),
            tag: TermTag::Regular,
        }
    }

    fn offsets(n: usize) -> Vec<usize> {
        (0..n).map(|i| i * 10).collect()
    }

    #[test]
    fn dominant_stopword_is_flagged() {
        // total 105, threshold 105/3*2 = 70, and 100 > 70.
        let terms = vec![regular("the"), regular("fox"), regular("dog")];
        let per_term = vec![offsets(100), offsets(3), offsets(2)];
        assert_eq!(
            suppress_cluttering(&terms, &per_term),
            vec![true, false, false]
        );
    }

    #[test]
    fn two_term_queries_never_flag() {
        // With two active terms the threshold equals the total, and no
        // single count exceeds the total.
        let terms = vec![regular("the"), regular("fox")];
        let per_term = vec![offsets(1000), offsets(1)];
        assert_eq!(suppress_cluttering(&terms, &per_term), vec![false, false]);
    }

    #[test]
    fn content_words_are_never_flagged() {
        let terms = vec![regular("fox"), regular("dog"), regular("cat")];
        let per_term = vec![offsets(100), offsets(1), offsets(1)];
        assert_eq!(
            suppress_cluttering(&terms, &per_term),
            vec![false, false, false]
        );
    }

    #[test]
    fn quoted_stopwords_are_exempt() {
        let terms = vec![
            QueryTerm {
                term: "the".to_string(),
                tag: TermTag::PartialExact,
            },
            regular("fox"),
            regular("dog"),
        ];
        let per_term = vec![offsets(100), offsets(1), offsets(1)];
        assert_eq!(
            suppress_cluttering(&terms, &per_term),
            vec![false, false, false]
        );
    }

    #[test]
    fn suppression_cascades() {
        // Pass one flags "the" (1000 > 1093/4*2). With it gone, pass two
        // flags "of" (90 > 93/3*2). Pass three flags nothing.
        let terms = vec![regular("the"), regular("of"), regular("fox"), regular("dog")];
        let per_term = vec![offsets(1000), offsets(90), offsets(2), offsets(1)];
        assert_eq!(
            suppress_cluttering(&terms, &per_term),
            vec![true, true, false, false]
        );
    }

    #[test]
    fn balanced_counts_flag_nothing() {
        let terms = vec![regular("the"), regular("a"), regular("of")];
        let per_term = vec![offsets(10), offsets(10), offsets(10)];
        assert_eq!(
            suppress_cluttering(&terms, &per_term),
            vec![false, false, false]
        );
    }
}
