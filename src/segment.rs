// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document segmentation.
//!
//! The corpus is one text blob in which every document is introduced by a
//! marker: a File Separator control character, the document's location label,
//! and a Group Separator (`<FS>label<GS>`). One scan produces the
//! [`DocumentMap`]: a strictly increasing offset table (with a sentinel equal
//! to the corpus length) and a parallel table of location labels.
//!
//! Offsets anywhere in the engine are mapped back to document ids through
//! this table. An offset below the first boundary means a caller handed us a
//! position from the ignored preamble — that is a bug in the caller, not bad
//! input, and it fails fatally rather than being clamped.

use crate::types::IndexError;

/// File Separator: starts a document marker.
pub const DOC_MARKER_START: char = '\u{001C}';
/// Group Separator: ends the marker's label.
pub const DOC_MARKER_END: char = '\u{001D}';

/// Boundary offsets and location labels for every document in a corpus.
///
/// Invariant: `offsets.len() == locations.len() + 1`; `offsets` is strictly
/// increasing and ends with the corpus length. Document `i` spans
/// `offsets[i]..offsets[i + 1]`, marker included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMap {
    pub offsets: Vec<usize>,
    pub locations: Vec<String>,
}

/// Scan a corpus for document markers.
///
/// Each `<FS>label<GS>` match contributes its start offset as a document
/// boundary and its label as that document's location. A corpus with no
/// markers degrades silently to a single unlabeled document covering
/// everything.
pub fn segment(corpus: &str) -> DocumentMap {
    let mut offsets = Vec::new();
    let mut locations = Vec::new();

    let mut pos = 0;
    while let Some(fs) = corpus[pos..].find(DOC_MARKER_START) {
        let marker_start = pos + fs;
        let label_start = marker_start + DOC_MARKER_START.len_utf8();
        let Some(gs) = corpus[label_start..].find(DOC_MARKER_END) else {
            break;
        };
        offsets.push(marker_start);
        locations.push(corpus[label_start..label_start + gs].to_string());
        pos = label_start + gs + DOC_MARKER_END.len_utf8();
    }

    if offsets.is_empty() {
        offsets.push(0);
        locations.push(String::new());
    }
    offsets.push(corpus.len());

    DocumentMap { offsets, locations }
}

impl DocumentMap {
    /// Number of documents.
    pub fn doc_count(&self) -> usize {
        self.locations.len()
    }

    /// The document containing `offset`.
    ///
    /// # Panics
    ///
    /// Panics when `offset` falls before the first boundary or at/after the
    /// sentinel. Both indicate a caller bug (see module docs).
    pub fn doc_at(&self, offset: usize) -> usize {
        assert!(
            offset >= self.offsets[0],
            "offset {offset} precedes the first document boundary {}",
            self.offsets[0]
        );
        assert!(
            offset < *self.offsets.last().unwrap(),
            "offset {offset} is past the end of the corpus"
        );
        self.offsets.partition_point(|&boundary| boundary <= offset) - 1
    }

    /// Map a batch of ascending offsets to document ids in one linear walk.
    ///
    /// Cheaper than repeated [`doc_at`](Self::doc_at) for the long ascending
    /// offset lists the searcher produces. Same fatal precondition on the
    /// first element.
    pub fn map_offsets_to_docs(&self, sorted_offsets: &[usize]) -> Vec<usize> {
        if let Some(&first) = sorted_offsets.first() {
            assert!(
                first >= self.offsets[0],
                "offset {first} precedes the first document boundary {}",
                self.offsets[0]
            );
        }
        let mut doc = 0;
        sorted_offsets
            .iter()
            .map(|&offset| {
                while doc + 1 < self.offsets.len() - 1 && offset >= self.offsets[doc + 1] {
                    doc += 1;
                }
                doc
            })
            .collect()
    }

    /// Starting offset of a document.
    pub fn doc_start(&self, doc_id: usize) -> Option<usize> {
        (doc_id < self.doc_count()).then(|| self.offsets[doc_id])
    }

    /// Document length in bytes, marker included.
    pub fn doc_length(&self, doc_id: usize) -> Option<usize> {
        (doc_id < self.doc_count()).then(|| self.offsets[doc_id + 1] - self.offsets[doc_id])
    }

    /// The location label captured from a document's marker.
    pub fn location(&self, doc_id: usize) -> Option<&str> {
        self.locations.get(doc_id).map(String::as_str)
    }

    /// 95th-percentile document length, used by the UI to scale occurrence
    /// plots to a common width.
    pub fn length_95th_percentile(&self) -> usize {
        let mut lengths: Vec<usize> = (0..self.doc_count())
            .map(|doc_id| self.offsets[doc_id + 1] - self.offsets[doc_id])
            .collect();
        lengths.sort_unstable();
        lengths[(self.doc_count() as f64 * 0.95).floor() as usize]
    }

    /// Check the structural invariants. Used by tests and debug assertions;
    /// `segment` upholds these by construction.
    pub fn validate(&self, corpus_len: usize) -> Result<(), IndexError> {
        if self.offsets.len() != self.locations.len() + 1 {
            return Err(IndexError::TableMismatch {
                offsets: self.offsets.len(),
                locations: self.locations.len(),
            });
        }
        // Strictly increasing, except the degenerate [0, 0] map an empty
        // corpus falls back to.
        let degenerate = self.offsets == [0, 0];
        for i in 1..self.offsets.len() {
            if self.offsets[i - 1] >= self.offsets[i] && !degenerate {
                return Err(IndexError::UnsortedBoundaries(i));
            }
        }
        let sentinel = *self.offsets.last().unwrap();
        if sentinel != corpus_len {
            return Err(IndexError::BadSentinel {
                sentinel,
                corpus_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn markers_become_boundaries_and_labels() {
        let text = corpus(&[("doc1", "The quick brown fox"), ("doc2", "A lazy dog runs")]);
        let map = segment(&text);

        assert_eq!(map.doc_count(), 2);
        assert_eq!(map.locations, vec!["doc1", "doc2"]);
        assert_eq!(map.offsets[0], 0);
        assert_eq!(map.offsets[1], "\u{1c}doc1\u{1d}The quick brown fox".len());
        assert_eq!(*map.offsets.last().unwrap(), text.len());
        map.validate(text.len()).unwrap();
    }

    #[test]
    fn markerless_corpus_is_one_document() {
        let map = segment("plain text with no markers");
        assert_eq!(map.doc_count(), 1);
        assert_eq!(map.location(0), Some(""));
        assert_eq!(map.offsets, vec![0, 26]);
        map.validate(26).unwrap();
    }

    #[test]
    fn doc_at_returns_the_enclosing_interval() {
        let text = corpus(&[("a", "0123"), ("b", "4567")]);
        let map = segment(&text);
        let second = map.offsets[1];

        for offset in 0..second {
            assert_eq!(map.doc_at(offset), 0);
        }
        for offset in second..text.len() {
            assert_eq!(map.doc_at(offset), 1);
        }
    }

    #[test]
    #[should_panic(expected = "precedes the first document boundary")]
    fn doc_at_below_first_boundary_is_fatal() {
        let mut text = String::from("preamble");
        text.push_str(&corpus(&[("a", "body")]));
        let map = segment(&text);
        map.doc_at(0);
    }

    #[test]
    fn batch_mapping_matches_doc_at() {
        let text = corpus(&[("a", "0123"), ("b", "4567"), ("c", "89")]);
        let map = segment(&text);
        let offsets: Vec<usize> = (0..text.len()).collect();
        let mapped = map.map_offsets_to_docs(&offsets);
        for (offset, doc) in offsets.iter().zip(&mapped) {
            assert_eq!(map.doc_at(*offset), *doc);
        }
    }

    #[test]
    fn lengths_and_percentile() {
        let text = corpus(&[("a", "xx"), ("b", "xxxx"), ("c", "x")]);
        let map = segment(&text);
        // Marker "<FS>a<GS>" is 3 bytes.
        assert_eq!(map.doc_length(0), Some(5));
        assert_eq!(map.doc_length(1), Some(7));
        assert_eq!(map.doc_length(2), Some(4));
        assert_eq!(map.doc_length(3), None);
        // floor(3 * 0.95) = 2 → third smallest.
        assert_eq!(map.length_95th_percentile(), 7);
    }
}
