//! Result aggregation and scoring.
//!
//! Per-term absolute offsets are folded into per-document buckets of
//! document-relative offsets, documents missing any Exact term are dropped,
//! and each surviving document gets a weighted count per term. The cap keeps
//! one common word from drowning out the terms that actually discriminate:
//! no term may contribute more than `2 * (min occurrences + 1)`.

use crate::segment::DocumentMap;
use crate::types::{DocResult, QueryTerm, ResultDetails, TermTag};
use std::collections::BTreeMap;

/// Per-document occurrence buckets: one slot per query term, each holding
/// ascending document-relative offsets. This is also the state that context
/// extraction reads on the follow-up call, so it is returned alongside the
/// emitted results.
pub type DocBuckets = BTreeMap<usize, Vec<Vec<usize>>>;

/// Fold per-term offset lists into scored per-document results.
pub fn aggregate(
    terms: &[QueryTerm],
    per_term: &[Vec<usize>],
    doc_map: &DocumentMap,
) -> (Vec<DocResult>, DocBuckets) {
    let mut buckets: DocBuckets = BTreeMap::new();

    for (term_position, offsets) in per_term.iter().enumerate() {
        let doc_ids = doc_map.map_offsets_to_docs(offsets);
        for (&offset, doc_id) in offsets.iter().zip(doc_ids) {
            let slots = buckets
                .entry(doc_id)
                .or_insert_with(|| vec![Vec::new(); terms.len()]);
            slots[term_position].push(offset - doc_map.offsets[doc_id]);
        }
    }

    // Every Exact term is mandatory.
    buckets.retain(|_, slots| {
        terms
            .iter()
            .zip(slots.iter())
            .all(|(term, slot)| term.tag != TermTag::Exact || !slot.is_empty())
    });

    let results = buckets
        .iter()
        .map(|(&doc_id, slots)| {
            let counts: Vec<usize> = slots.iter().map(Vec::len).collect();
            let min_occurrences = counts.iter().copied().min().unwrap_or(0) + 1;
            let weighted = counts
                .iter()
                .map(|&count| count.min(min_occurrences * 2))
                .collect();
            DocResult {
                doc_id,
                weighted,
                details: ResultDetails {
                    term_offsets: slots.clone(),
                    doc_length: doc_map.offsets[doc_id + 1] - doc_map.offsets[doc_id],
                },
            }
        })
        .collect();

    (results, buckets)
}
