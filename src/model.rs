//! The element data model: the unit every pipeline stage consumes and
//! produces.
//!
//! Stages never mutate an `Element` in place; each one consumes a
//! `Vec<Element>` and produces a new one (see spec-mirroring notes in
//! `pipeline::mod`). Back-references (e.g. "the previous header at this
//! level") are resolved by index iteration over the vector, not by
//! storing pointers on the element itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Rect;

/// Semantic role assigned to an [`Element`] by the classifier (and
/// possibly revised by the page-context validator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A document or section title.
    Title,
    /// A header at some `header_level`.
    Header,
    /// Ordinary body text.
    Paragraph,
    /// A list item, possibly nested (`list_level` in metadata).
    ListItem,
    /// A table-of-contents entry.
    TocItem,
    /// A table, emitted as cells in row-major reading order.
    Table,
    /// A single table cell.
    TableCell,
    /// A non-text image.
    Image,
    /// A footnote.
    Footnote,
    /// A running-header region (e.g. page header band), not body content.
    HeaderRegion,
    /// A running-footer region, not body content.
    FooterRegion,
}

/// A typed hint an OCR/layout recognizer may attach to a [`RawFragment`],
/// mirroring what the underlying recognizer offers. The classifier treats
/// this as a strong prior, subject to override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKindHint {
    /// Recognizer believes this is a title.
    Title,
    /// Recognizer believes this is body paragraph text.
    Paragraph,
    /// Recognizer believes this is some kind of list.
    List,
    /// Recognizer believes this is a single list item.
    ListItem,
    /// Recognizer believes this is a table.
    Table,
    /// Recognizer believes this is a table cell.
    Cell,
}

/// The OCR adapter contract type: one recognized text fragment on one
/// page, with a normalized bounding box and an optional typed hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFragment {
    /// Recognized text, not yet trimmed.
    pub text: String,
    /// Normalized bounding box (origin top-left, `[0,1]`).
    pub bbox: Rect,
    /// 1-based page index.
    pub page: u32,
    /// Recognizer confidence, `[0,1]`.
    pub confidence: f32,
    /// Optional typed hint from the recognizer.
    pub kind_hint: Option<ElementKindHint>,
}

impl RawFragment {
    /// Construct a fragment with no typed hint.
    pub fn new(text: impl Into<String>, bbox: Rect, page: u32, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
            confidence,
            kind_hint: None,
        }
    }

    /// Builder: attach a typed hint.
    pub fn with_hint(mut self, hint: ElementKindHint) -> Self {
        self.kind_hint = Some(hint);
        self
    }
}

/// One unit of reconstructed layout: a fragment, a merged group of
/// fragments, or a stitched sentence, always carrying its page, bbox and
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Stable unique identifier, assigned at creation and preserved
    /// through stages that pass the element through unchanged.
    pub id: Uuid,
    /// Semantic role.
    pub kind: ElementKind,
    /// Normalized bounding box.
    pub bbox: Rect,
    /// 1-based page index.
    pub page: u32,
    /// Text content, `None` for pure-image elements.
    pub text: Option<String>,
    /// Confidence, `[0,1]`.
    pub confidence: f32,
    /// Heading depth, meaningful only when `kind == Header`.
    pub header_level: Option<u32>,
    /// Provenance metadata (`merged_headers`, `merge_timestamp`,
    /// `list_level`, `marker`, …).
    pub metadata: HashMap<String, String>,
    /// Raw bytes for non-text elements (e.g. embedded images).
    pub content_blob: Option<Vec<u8>>,
}

impl Element {
    /// Construct a fresh element from a raw fragment, defaulting to
    /// `Paragraph` kind with no header level. A new stable id is minted.
    pub fn from_fragment(fragment: RawFragment) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Paragraph,
            bbox: fragment.bbox,
            page: fragment.page,
            text: Some(fragment.text),
            confidence: fragment.confidence,
            header_level: None,
            metadata: HashMap::new(),
            content_blob: None,
        }
    }

    /// Trimmed text, or an empty string for textless elements.
    pub fn trimmed_text(&self) -> &str {
        self.text.as_deref().unwrap_or("").trim()
    }

    /// Center-y of this element's bbox, used for reading-order
    /// comparisons.
    pub fn center_y(&self) -> f32 {
        self.bbox.center().y
    }

    /// Center-x of this element's bbox.
    pub fn center_x(&self) -> f32 {
        self.bbox.center().x
    }
}

/// Reading order across a page (and, by extension, a document): `(page
/// asc, center-y asc, center-x asc)`, with center-y differences of at
/// most `tolerance` treated as the same line.
pub fn reading_order_key(e: &Element) -> (u32, f32, f32) {
    (e.page, e.center_y(), e.center_x())
}

/// Sort a vector of elements into reading order in place, collapsing
/// near-equal center-y values within `tolerance` so ties break on
/// center-x.
pub fn sort_reading_order(elements: &mut [Element], tolerance: f32) {
    elements.sort_by(|a, b| {
        if a.page != b.page {
            return a.page.cmp(&b.page);
        }
        let dy = a.center_y() - b.center_y();
        if dy.abs() <= tolerance {
            a.center_x()
                .partial_cmp(&b.center_x())
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            dy.partial_cmp(&0.0).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32, w: f32, h: f32, page: u32) -> RawFragment {
        RawFragment::new(text, Rect::new(x, y, w, h), page, 0.95)
    }

    #[test]
    fn test_from_fragment_defaults_to_paragraph() {
        let e = Element::from_fragment(frag("hello", 0.0, 0.0, 0.1, 0.1, 1));
        assert_eq!(e.kind, ElementKind::Paragraph);
        assert!(e.header_level.is_none());
        assert_eq!(e.trimmed_text(), "hello");
    }

    #[test]
    fn test_reading_order_sort() {
        let mut elements = vec![
            Element::from_fragment(frag("b", 0.5, 0.5, 0.1, 0.02, 1)),
            Element::from_fragment(frag("a", 0.1, 0.1, 0.1, 0.02, 1)),
            Element::from_fragment(frag("c-page2", 0.1, 0.1, 0.1, 0.02, 2)),
        ];
        sort_reading_order(&mut elements, 0.01);
        assert_eq!(elements[0].trimmed_text(), "a");
        assert_eq!(elements[1].trimmed_text(), "b");
        assert_eq!(elements[2].trimmed_text(), "c-page2");
    }

    #[test]
    fn test_reading_order_same_line_breaks_on_x() {
        let mut elements = vec![
            Element::from_fragment(frag("right", 0.5, 0.2, 0.1, 0.02, 1)),
            Element::from_fragment(frag("left", 0.1, 0.201, 0.1, 0.02, 1)),
        ];
        sort_reading_order(&mut elements, 0.01);
        assert_eq!(elements[0].trimmed_text(), "left");
        assert_eq!(elements[1].trimmed_text(), "right");
    }
}
