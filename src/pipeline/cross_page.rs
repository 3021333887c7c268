//! Cross-page stitcher (component 9): at page boundaries, merges an
//! incomplete trailing sentence of page *N* with a safe opening fragment
//! of page *N+1*; suppressed when either page looks like a TOC.

use crate::model::Element;
use crate::pipeline::normalizer::toc_header_ratio;
use crate::pipeline::stitcher;

/// Threshold shared with [`crate::pipeline::normalizer::is_toc_page`]'s
/// ratio component; the cross-page stitcher only consults the ratio (no
/// element-count floor, per its own suppression rule in §4.9).
const TOC_SUPPRESSION_RATIO: f32 = 0.9;

/// Attempt to stitch the tail of `page_n` with the head of `page_n_plus_1`.
/// No-op (returns the inputs unchanged) when either page's TOC
/// header-ratio is `>= 0.9`, or when the last element of `page_n` is not
/// an incomplete sentence, or when the first element of
/// `page_n_plus_1` is not a safe continuation of it.
pub fn stitch_page_boundary(mut page_n: Vec<Element>, mut page_n_plus_1: Vec<Element>) -> (Vec<Element>, Vec<Element>) {
    if toc_header_ratio(&page_n) >= TOC_SUPPRESSION_RATIO || toc_header_ratio(&page_n_plus_1) >= TOC_SUPPRESSION_RATIO {
        return (page_n, page_n_plus_1);
    }

    let (Some(tail), Some(head)) = (page_n.last(), page_n_plus_1.first()) else {
        return (page_n, page_n_plus_1);
    };

    if !stitcher::is_incomplete(tail) {
        return (page_n, page_n_plus_1);
    }
    if !stitcher::is_safe_continuation(tail, head, true) {
        return (page_n, page_n_plus_1);
    }

    let merged = stitcher::merge_adjacent(tail, head);
    let last_idx = page_n.len() - 1;
    page_n[last_idx] = merged;
    page_n_plus_1.remove(0);

    (page_n, page_n_plus_1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::{ElementKind, RawFragment};

    fn para(text: &str, page: u32) -> Element {
        Element::from_fragment(RawFragment::new(text, Rect::new(0.1, 0.1, 0.65, 0.02), page, 0.9))
    }

    fn header(text: &str, page: u32) -> Element {
        let mut e = para(text, page);
        e.kind = ElementKind::Header;
        e
    }

    #[test]
    fn test_stitches_across_page_boundary() {
        let page_n = vec![para("The requirements are", 1)];
        let page_next = vec![para("mandatory.", 2)];
        let (stitched_n, stitched_next) = stitch_page_boundary(page_n, page_next);
        assert_eq!(stitched_n.len(), 1);
        assert_eq!(stitched_n[0].trimmed_text(), "The requirements aremandatory.");
        assert!(stitched_next.is_empty());
    }

    #[test]
    fn test_suppressed_when_next_page_is_toc() {
        let page_n = vec![para("The requirements are", 1)];
        let page_next = vec![
            header("1 范围", 2),
            header("2 术语", 2),
            header("3 参考文献", 2),
            header("4 总则", 2),
        ];
        let (stitched_n, stitched_next) = stitch_page_boundary(page_n.clone(), page_next.clone());
        assert_eq!(stitched_n.len(), page_n.len());
        assert_eq!(stitched_n[0].trimmed_text(), page_n[0].trimmed_text());
        assert_eq!(stitched_next.len(), page_next.len());
    }

    #[test]
    fn test_noop_when_tail_complete() {
        let page_n = vec![para("A complete sentence.", 1)];
        let page_next = vec![para("New paragraph starts here.", 2)];
        let (stitched_n, stitched_next) = stitch_page_boundary(page_n.clone(), page_next.clone());
        assert_eq!(stitched_n[0].trimmed_text(), page_n[0].trimmed_text());
        assert_eq!(stitched_next.len(), 1);
    }
}
