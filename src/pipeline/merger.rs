//! Header / list merger (component 6): a two-phase (same-line then
//! multi-line) grouping that stitches split headers and split list
//! items.

use std::collections::HashMap;

use chrono::Utc;
use log::debug;
use uuid::Uuid;

use crate::config::{HeaderDetectionConfig, ListDetectionConfig};
use crate::model::{Element, ElementKind};
use crate::patterns;

/// Minimum length for a list item to be considered "complete" under
/// rule (e), combined with ending punctuation and a completeness
/// indicator.
const MIN_COMPLETE_LIST_ITEM_LEN: usize = 10;

/// A small domain-specific vocabulary whose presence, alongside
/// completion punctuation and sufficient length, marks a list item as
/// already complete (so the merger must not absorb the next line into
/// it).
const COMPLETENESS_INDICATORS: &[&str] = &["shall", "must", "required", "应", "须", "必须"];

/// Run both merge phases (tight tolerance, then loose tolerance) over
/// `elements`, once for headers and once for list items.
pub fn merge_headers_and_lists(
    elements: Vec<Element>,
    header_config: &HeaderDetectionConfig,
    list_config: &ListDetectionConfig,
) -> Vec<Element> {
    let mut current = elements;
    if header_config.enable_header_merging {
        current = merge_pass(current, ElementKind::Header, header_config.same_line_tolerance);
        current = merge_pass(current, ElementKind::Header, header_config.loose_same_line_tolerance);
    }
    if list_config.enable_list_item_merging {
        current = merge_pass(current, ElementKind::ListItem, list_config.same_line_tolerance);
        current = merge_pass(current, ElementKind::ListItem, list_config.loose_same_line_tolerance);
    }
    current
}

/// One merge pass: scan left to right, and for every element of `kind`
/// greedily absorb following elements that satisfy the merge
/// eligibility rules at `tolerance`.
fn merge_pass(elements: Vec<Element>, kind: ElementKind, tolerance: f32) -> Vec<Element> {
    let mut output = Vec::with_capacity(elements.len());
    let mut i = 0;
    while i < elements.len() {
        if elements[i].kind != kind {
            output.push(elements[i].clone());
            i += 1;
            continue;
        }
        let mut group = vec![elements[i].clone()];
        let mut j = i + 1;
        while j < elements.len() && can_absorb(&group[group.len() - 1], &elements[j], kind, tolerance) {
            group.push(elements[j].clone());
            j += 1;
        }
        if group.len() > 1 {
            output.push(merge_group(group, kind));
        } else {
            output.push(group.into_iter().next().expect("group has one element"));
        }
        i = j;
    }
    output
}

fn can_absorb(seed_tail: &Element, candidate: &Element, kind: ElementKind, tolerance: f32) -> bool {
    if seed_tail.page != candidate.page {
        return false;
    }
    if (seed_tail.center_y() - candidate.center_y()).abs() > tolerance {
        return false;
    }
    if patterns::ends_with_sentence_punctuation(seed_tail.trimmed_text()) {
        return false;
    }
    if kind == ElementKind::ListItem {
        let candidate_text = candidate.trimmed_text();
        if starts_with_list_marker(candidate_text) {
            return false;
        }
        if is_complete_list_item(seed_tail.trimmed_text()) {
            return false;
        }
    }
    true
}

fn starts_with_list_marker(text: &str) -> bool {
    patterns::starts_with_bullet_glyph(text) || {
        let trimmed = text.trim_start();
        trimmed.chars().next().is_some_and(|c| c.is_ascii_digit() || c.is_alphabetic())
            && trimmed.chars().nth(1).is_some_and(|c| patterns::MARKER_SEPARATORS.contains(&c))
    }
}

fn is_complete_list_item(text: &str) -> bool {
    text.chars().count() >= MIN_COMPLETE_LIST_ITEM_LEN
        && patterns::ends_with_completion_punctuation(text)
        && COMPLETENESS_INDICATORS
            .iter()
            .any(|kw| text.to_lowercase().contains(kw))
}

fn merge_group(group: Vec<Element>, kind: ElementKind) -> Element {
    let n = group.len();
    let bbox = group
        .iter()
        .skip(1)
        .fold(group[0].bbox, |acc, e| acc.union(&e.bbox));
    let text = group
        .iter()
        .map(|e| e.trimmed_text())
        .collect::<Vec<_>>()
        .join(" ");
    let confidence = group.iter().map(|e| e.confidence).sum::<f32>() / n as f32;
    let page = group[0].page;
    let header_level = group[0].header_level;

    let mut metadata: HashMap<String, String> = HashMap::new();
    metadata.insert("merge_timestamp".to_string(), Utc::now().to_rfc3339());
    if kind == ElementKind::Header {
        metadata.insert("merged_headers".to_string(), n.to_string());
        if let Some(level) = header_level {
            metadata.insert("header_level".to_string(), level.to_string());
        }
        debug!("merger: merged {n} fragments into one header on page {page}");
    } else {
        metadata.insert("merged_list_items".to_string(), n.to_string());
        if let Some(marker) = group[0].metadata.get("marker") {
            metadata.insert("marker".to_string(), marker.clone());
        }
        metadata.insert("list_level".to_string(), "0".to_string());
        debug!("merger: merged {n} fragments into one list item on page {page}");
    }

    Element {
        id: Uuid::new_v4(),
        kind,
        bbox,
        page,
        text: Some(text),
        confidence,
        header_level,
        metadata,
        content_blob: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::RawFragment;

    fn header(text: &str, x: f32, y: f32, page: u32) -> Element {
        let mut e = Element::from_fragment(RawFragment::new(text, Rect::new(x, y, 0.2, 0.02), page, 0.9));
        e.kind = ElementKind::Header;
        e.header_level = Some(1);
        e
    }

    #[test]
    fn test_merges_split_header_lines() {
        let elements = vec![
            header("The System Shall Provide", 0.1, 0.1, 1),
            header("Continuous Monitoring", 0.1, 0.105, 1),
        ];
        let merged = merge_pass(elements, ElementKind::Header, 0.01);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].metadata.get("merged_headers"), Some(&"2".to_string()));
    }

    #[test]
    fn test_does_not_merge_across_pages() {
        let elements = vec![header("A", 0.1, 0.1, 1), header("B", 0.1, 0.1, 2)];
        let merged = merge_pass(elements, ElementKind::Header, 0.01);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_stops_at_sentence_end() {
        let elements = vec![
            header("Complete sentence.", 0.1, 0.1, 1),
            header("Next header text", 0.1, 0.101, 1),
        ];
        let merged = merge_pass(elements, ElementKind::Header, 0.01);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_bbox_union_invariant() {
        let elements = vec![
            header("part one", 0.1, 0.1, 1),
            header("part two", 0.4, 0.1, 1),
        ];
        let expected_union = elements[0].bbox.union(&elements[1].bbox);
        let merged = merge_pass(elements, ElementKind::Header, 0.01);
        assert_eq!(merged[0].bbox, expected_union);
    }
}
