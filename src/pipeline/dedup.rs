//! Overlap deduplicator (component 3): removes OCR duplicates by area
//! overlap.

use log::debug;

use crate::config::ProcessingConfig;
use crate::model::Element;

/// Deduplicate `elements`, keeping the first occurrence of any element
/// that overlaps a previously-kept one by more than
/// `config.overlap_threshold` (relative to the incoming element, per
/// design note (c)). Order is preserved. Always succeeds; returns the
/// deduplicated list plus the number of elements dropped.
pub fn deduplicate(elements: Vec<Element>, config: &ProcessingConfig) -> (Vec<Element>, usize) {
    let mut kept: Vec<Element> = Vec::with_capacity(elements.len());
    let mut dropped = 0usize;

    for incoming in elements {
        let is_duplicate = kept
            .iter()
            .any(|k| incoming.bbox.overlap_percentage(&k.bbox) > config.overlap_threshold);
        if is_duplicate {
            debug!(
                "dedup: dropping element on page {} as duplicate (text={:?})",
                incoming.page, incoming.text
            );
            dropped += 1;
        } else {
            kept.push(incoming);
        }
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::RawFragment;

    fn el(x: f32, y: f32, w: f32, h: f32, page: u32, text: &str) -> Element {
        Element::from_fragment(RawFragment::new(text, Rect::new(x, y, w, h), page, 0.9))
    }

    #[test]
    fn test_exact_duplicate_dropped() {
        let config = ProcessingConfig::default();
        let elements = vec![
            el(0.1, 0.1, 0.2, 0.05, 1, "first"),
            el(0.1, 0.1, 0.2, 0.05, 1, "duplicate"),
        ];
        let (kept, dropped) = deduplicate(elements, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].trimmed_text(), "first");
    }

    #[test]
    fn test_below_threshold_kept() {
        let mut config = ProcessingConfig::default();
        config.overlap_threshold = 0.9;
        let elements = vec![
            el(0.0, 0.0, 0.2, 0.05, 1, "a"),
            el(0.1, 0.0, 0.2, 0.05, 1, "b"),
        ];
        let (kept, dropped) = deduplicate(elements, &config);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_empty_input_returns_empty() {
        let config = ProcessingConfig::default();
        let (kept, dropped) = deduplicate(Vec::new(), &config);
        assert!(kept.is_empty());
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_no_mutual_overlap_invariant_holds() {
        let config = ProcessingConfig::default();
        let elements = vec![
            el(0.0, 0.0, 0.3, 0.1, 1, "a"),
            el(0.05, 0.0, 0.3, 0.1, 1, "b"),
            el(0.5, 0.5, 0.1, 0.1, 1, "c"),
        ];
        let (kept, _) = deduplicate(elements, &config);
        for i in 0..kept.len() {
            for j in 0..kept.len() {
                if i != j {
                    assert!(
                        kept[i].bbox.overlap_percentage(&kept[j].bbox) <= config.overlap_threshold
                    );
                }
            }
        }
    }
}
