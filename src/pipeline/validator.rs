//! Page-context validator (component 8): rejects misclassified
//! headers/lists by checking numbering monotonicity at the same level
//! and detecting descriptive prose wrongly tagged as headers.

use std::collections::HashMap;

use log::debug;

use crate::model::{Element, ElementKind};
use crate::patterns;
use crate::pipeline::stitcher;

/// Context gathered from one page's classified elements, consulted by
/// the false-header and false-list-item rules.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Any header text matches `^\d+\s+[Han]+$`.
    pub has_chapter_headers: bool,
    /// Any header text matches `^附录[A-Z]`.
    pub has_appendix_headers: bool,
    /// Any header text matches `^(前言|引言|参考文献)`.
    pub has_named_headers: bool,
    /// Level → ordered (by Y) list of marker strings seen at that level.
    pub markers_by_level: HashMap<u32, Vec<String>>,
    /// 1-based page index.
    pub page_number: u32,
}

impl PageContext {
    /// Compute the context for one page's elements (already in reading
    /// order).
    pub fn compute(elements: &[Element]) -> Self {
        let mut ctx = PageContext {
            page_number: elements.first().map(|e| e.page).unwrap_or(0),
            ..Default::default()
        };
        for e in elements {
            if e.kind != ElementKind::Header {
                continue;
            }
            let text = e.trimmed_text();
            if patterns::RE_CHAPTER_HEADER.is_match(text) {
                ctx.has_chapter_headers = true;
            }
            if patterns::RE_APPENDIX_HEADER.is_match(text) {
                ctx.has_appendix_headers = true;
            }
            if patterns::RE_NAMED_HEADER.is_match(text) {
                ctx.has_named_headers = true;
            }
            if let Some(level) = e.header_level {
                if let Some(marker) = leading_marker(text) {
                    ctx.markers_by_level.entry(level).or_default().push(marker);
                }
            }
        }
        ctx
    }
}

/// Extract the leading numeric/dot marker of a header's text, e.g.
/// `"3.2 Foo"` → `"3.2"`.
fn leading_marker(text: &str) -> Option<String> {
    patterns::RE_NUMBERED_HEADER_MARKER
        .find(text)
        .map(|m| m.as_str().trim().trim_end_matches('.').to_string())
        .filter(|m| !m.is_empty())
}

/// Whether `marker` breaks the same-level monotonic sequence compared
/// to `predecessor`: allowed when the numeric gap is `1..=5`, or when
/// `marker` is a child of `predecessor` (e.g. `3.1` → `3.2`, `3.18` →
/// `4`).
fn breaks_monotonic_sequence(predecessor: &str, marker: &str) -> bool {
    let (Some(prev_last), Some(cur_last)) = (last_numeric_component(predecessor), last_numeric_component(marker))
    else {
        return false;
    };
    if marker.starts_with(predecessor) || predecessor.starts_with(marker) {
        return false;
    }
    let gap = cur_last as i64 - prev_last as i64;
    !(1..=5).contains(&gap)
}

fn last_numeric_component(marker: &str) -> Option<u32> {
    marker.split('.').next_back()?.parse().ok()
}

/// A header is "descriptive" (false-positive rule (b)): long and either
/// matches a small explanatory-phrase set, or a bare 4-digit run
/// followed by CJK text.
fn is_descriptive_header(text: &str) -> bool {
    text.chars().count() > 30
        && (patterns::RE_DESCRIPTIVE_EXPLANATION.is_match(text) || patterns::RE_DESCRIPTIVE_FOUR_DIGIT.is_match(text))
}

fn conflicts_with_context(text: &str, ctx: &PageContext) -> bool {
    let is_chapter = patterns::RE_CHAPTER_HEADER.is_match(text);
    let is_appendix = patterns::RE_APPENDIX_HEADER.is_match(text);
    let is_numbered = patterns::RE_NUMBERED_HEADER_MARKER.is_match(text);
    (is_chapter && ctx.has_appendix_headers)
        || (is_appendix && ctx.has_chapter_headers)
        || (is_numbered && !is_chapter && ctx.has_named_headers)
}

/// Re-classify false headers as `Paragraph` (clearing `header_level`)
/// and re-run the sentence stitcher over the page. A header is false
/// when it breaks same-level numbering monotonicity, reads as
/// descriptive prose, or conflicts with the page's chapter/appendix/
/// named-header context.
pub fn validate_page(elements: Vec<Element>) -> Vec<Element> {
    let ctx = PageContext::compute(&elements);
    let mut seen_marker_at_level: HashMap<u32, String> = HashMap::new();
    let mut reclassified = Vec::with_capacity(elements.len());

    for mut e in elements {
        if e.kind == ElementKind::Header {
            let text = e.trimmed_text().to_string();
            let marker = leading_marker(&text);
            let mut is_false = is_descriptive_header(&text) || conflicts_with_context(&text, &ctx);

            if !is_false {
                if let (Some(level), Some(marker)) = (e.header_level, marker.as_deref()) {
                    if let Some(predecessor) = seen_marker_at_level.get(&level) {
                        if breaks_monotonic_sequence(predecessor, marker) {
                            is_false = true;
                        }
                    }
                }
            }

            if is_false {
                debug!("validator: rejecting false header on page {}: {text:?}", e.page);
                e.kind = ElementKind::Paragraph;
                e.header_level = None;
            } else if let (Some(level), Some(marker)) = (e.header_level, marker) {
                seen_marker_at_level.insert(level, marker);
            }
        } else if e.kind == ElementKind::ListItem && is_false_list_item(&e) {
            debug!("validator: rejecting false list item on page {}", e.page);
            e.kind = ElementKind::Paragraph;
        }
        reclassified.push(e);
    }

    stitcher::stitch_page(reclassified)
}

fn is_false_list_item(e: &Element) -> bool {
    let text = e.trimmed_text();
    text.chars().count() > 80 && !patterns::ends_with_sentence_punctuation(text)
}
