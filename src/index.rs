//! Inverted index and stem index construction.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **OFFSETS_ASCENDING**: Every offset list in the inverted index is
//!    strictly ascending. This comes free from the single left-to-right
//!    tokenizer pass and the searcher's merge step depends on it.
//! 2. **IMMUTABLE_AFTER_BUILD**: Neither map is mutated after construction.
//!    Per-term searches copy offset lists before splicing compound results.
//! 3. **STEM_KEYS_ARE_STEMS**: A surface form appears under `stems[s]` only
//!    when `stem(surface) == s` and the two differ, so the candidate set for
//!    a query term is always `{stem} ∪ stems[stem]`.

use crate::stem::stem;
use crate::tokenize::tokenize;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

/// The searchable product of one corpus load.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    /// Surface form → ascending occurrence offsets.
    pub inverted: HashMap<String, Vec<usize>>,
    /// Stem → distinct surface forms that reduce to it (only where the stem
    /// differs from the surface form itself).
    pub stems: HashMap<String, Vec<String>>,
}

impl CorpusIndex {
    /// All surface forms a regular query term expands to: the stem itself
    /// plus every recorded surface form for it.
    pub fn candidates<'a>(&'a self, stem_key: &'a str) -> impl Iterator<Item = &'a str> {
        std::iter::once(stem_key).chain(
            self.stems
                .get(stem_key)
                .into_iter()
                .flat_map(|forms| forms.iter().map(String::as_str)),
        )
    }

    /// Ascending offsets for one surface form, empty if absent.
    pub fn offsets(&self, surface: &str) -> &[usize] {
        self.inverted.get(surface).map_or(&[], Vec::as_slice)
    }
}

/// Build both indexes in one pass over the corpus.
///
/// The tokenizer pass fills the inverted index (offsets arrive ascending by
/// construction); a second pass over the distinct surface keys derives the
/// stem index. Keys containing digits are skipped in the stem phase — dates
/// and issue numbers produce junk stems and nobody searches them by root.
pub fn build_index(corpus: &str) -> CorpusIndex {
    let started = Instant::now();

    let mut inverted: HashMap<String, Vec<usize>> = HashMap::new();
    for (offset, token) in tokenize(corpus) {
        inverted.entry(token.to_string()).or_default().push(offset);
    }

    let stems = build_stem_index(&inverted);

    tracing::debug!(
        terms = inverted.len(),
        stems = stems.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "index built"
    );

    CorpusIndex { inverted, stems }
}

#[cfg(not(feature = "parallel"))]
fn build_stem_index(inverted: &HashMap<String, Vec<usize>>) -> HashMap<String, Vec<String>> {
    let pairs = inverted
        .keys()
        .filter(|key| !key.chars().any(|c| c.is_ascii_digit()))
        .map(|key| (stem(key), key.clone()));
    collect_stem_pairs(pairs)
}

/// Parallel stem phase: stemming dominates build time on large archives, and
/// each key stems independently.
#[cfg(feature = "parallel")]
fn build_stem_index(inverted: &HashMap<String, Vec<usize>>) -> HashMap<String, Vec<String>> {
    let keys: Vec<&String> = inverted.keys().collect();
    let pairs: Vec<(String, String)> = keys
        .par_iter()
        .filter(|key| !key.chars().any(|c| c.is_ascii_digit()))
        .map(|key| (stem(key.as_str()), (*key).clone()))
        .collect();
    collect_stem_pairs(pairs.into_iter())
}

fn collect_stem_pairs(
    pairs: impl Iterator<Item = (String, String)>,
) -> HashMap<String, Vec<String>> {
    let mut stems: HashMap<String, Vec<String>> = HashMap::new();
    for (stem_key, surface) in pairs {
        if stem_key != surface {
            stems.entry(stem_key).or_default().push(surface);
        }
    }
    // Deterministic candidate order regardless of hash iteration order.
    for forms in stems.values_mut() {
        forms.sort_unstable();
    }
    stems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_ascending_per_surface_form() {
        let index = build_index("run and run and run");
        assert_eq!(index.offsets("run"), &[0, 8, 16]);
        assert_eq!(index.offsets("and"), &[4, 12]);
    }

    #[test]
    fn stem_index_records_surface_forms() {
        let index = build_index("Running runner runs");
        // All three reduce to "run", none of them spelled "run".
        let forms = index.stems.get("run").unwrap();
        assert_eq!(forms, &["Running", "runner", "runs"]);
        // The inverted index keeps the surface spellings.
        assert_eq!(index.offsets("Running"), &[0]);
        assert!(index.offsets("run").is_empty());
    }

    #[test]
    fn identity_stems_are_not_recorded() {
        let index = build_index("quick fox");
        assert!(index.stems.is_empty());
    }

    #[test]
    fn digit_keys_skip_the_stem_phase() {
        let index = build_index("1990s meeting");
        assert!(index.inverted.contains_key("1990s"));
        assert!(!index.stems.values().flatten().any(|form| form == "1990s"));
    }

    #[test]
    fn candidates_include_stem_and_forms() {
        let index = build_index("Walked walks");
        let candidates: Vec<&str> = index.candidates("walk").collect();
        assert_eq!(candidates, vec!["walk", "Walked", "walks"]);
    }
}
