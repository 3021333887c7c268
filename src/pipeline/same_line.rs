//! Same-line fuser (component 4): merges fragments whose vertical
//! centers coincide within a tight tolerance, preserving left-to-right
//! reading order.

use log::debug;
use uuid::Uuid;

use crate::config::SameLineMergingConfig;
use crate::model::{Element, ElementKind};

/// Fuse co-linear runs of `elements` (assumed already in reading order)
/// into single merged elements. Runs are chained: an element joins the
/// current run if its center-y is within `config.vertical_tolerance` of
/// the previous run member, so a long line of many short fragments is
/// merged as one group even though tolerance is only checked pairwise.
///
/// Idempotent: re-running this over its own output is a no-op, since a
/// merged element's bbox spans the whole line and no sibling remains to
/// chain onto it.
pub fn fuse_same_line(elements: Vec<Element>, config: &SameLineMergingConfig, language: &str) -> Vec<Element> {
    if !config.enabled || elements.is_empty() {
        return elements;
    }

    let mut output = Vec::with_capacity(elements.len());
    let mut run: Vec<Element> = Vec::new();

    for element in elements {
        let chains = match run.last() {
            Some(prev) => {
                prev.page == element.page
                    && (prev.center_y() - element.center_y()).abs() <= config.vertical_tolerance
            }
            None => true,
        };
        if chains {
            run.push(element);
        } else {
            output.push(flush_run(std::mem::take(&mut run), config, language));
            run.push(element);
        }
    }
    if !run.is_empty() {
        output.push(flush_run(run, config, language));
    }

    output.into_iter().flatten().collect()
}

/// Resolve one run into either the untouched singleton or a merged
/// element. Returns a one- or zero-element `Vec` so the caller can
/// `flatten` uniformly.
fn flush_run(mut run: Vec<Element>, config: &SameLineMergingConfig, language: &str) -> Vec<Element> {
    if run.len() <= 1 {
        return run;
    }

    run.sort_by(|a, b| {
        a.center_x()
            .partial_cmp(&b.center_x())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let leading_kind = run[0].kind;
    let separator: &str = if leading_kind == ElementKind::Header {
        " "
    } else if language.starts_with("zh") {
        &config.separator_for_chinese
    } else {
        &config.separator_for_english
    };

    let bbox = run
        .iter()
        .skip(1)
        .fold(run[0].bbox, |acc, e| acc.union(&e.bbox));

    let text = run
        .iter()
        .map(|e| e.trimmed_text())
        .collect::<Vec<_>>()
        .join(separator);

    let confidence = run.iter().map(|e| e.confidence).sum::<f32>() / run.len() as f32;
    let page = run[0].page;

    if config.enable_logging {
        debug!(
            "same_line: fused {} fragments on page {} into {:?}",
            run.len(),
            page,
            text
        );
    }

    vec![Element {
        id: Uuid::new_v4(),
        kind: leading_kind,
        bbox,
        page,
        text: Some(text),
        confidence,
        header_level: run[0].header_level,
        metadata: std::collections::HashMap::new(),
        content_blob: None,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::RawFragment;

    fn el(x: f32, y: f32, w: f32, h: f32, page: u32, text: &str) -> Element {
        Element::from_fragment(RawFragment::new(text, Rect::new(x, y, w, h), page, 1.0))
    }

    #[test]
    fn test_fuses_two_colinear_fragments_en() {
        let config = SameLineMergingConfig::default();
        let elements = vec![
            el(0.1, 0.12, 0.04, 0.02, 1, "5.1"),
            el(0.15, 0.12, 0.35, 0.02, 1, "Access Control"),
        ];
        let fused = fuse_same_line(elements, &config, "en");
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].trimmed_text(), "5.1 Access Control");
    }

    #[test]
    fn test_fuses_uses_empty_separator_for_chinese() {
        let config = SameLineMergingConfig::default();
        let elements = vec![
            el(0.1, 0.12, 0.04, 0.02, 1, "范围"),
            el(0.15, 0.12, 0.1, 0.02, 1, "概述"),
        ];
        let fused = fuse_same_line(elements, &config, "zh-Hans");
        assert_eq!(fused[0].trimmed_text(), "范围概述");
    }

    #[test]
    fn test_configured_english_separator_is_honored() {
        let mut config = SameLineMergingConfig::default();
        config.separator_for_english = " | ".to_string();
        let elements = vec![
            el(0.1, 0.12, 0.04, 0.02, 1, "5.1"),
            el(0.15, 0.12, 0.35, 0.02, 1, "Access Control"),
        ];
        let fused = fuse_same_line(elements, &config, "en");
        assert_eq!(fused[0].trimmed_text(), "5.1 | Access Control");
    }

    #[test]
    fn test_configured_chinese_separator_is_honored() {
        let mut config = SameLineMergingConfig::default();
        config.separator_for_chinese = "·".to_string();
        let elements = vec![
            el(0.1, 0.12, 0.04, 0.02, 1, "范围"),
            el(0.15, 0.12, 0.1, 0.02, 1, "概述"),
        ];
        let fused = fuse_same_line(elements, &config, "zh-Hans");
        assert_eq!(fused[0].trimmed_text(), "范围·概述");
    }

    #[test]
    fn test_header_forces_space_even_for_chinese() {
        let config = SameLineMergingConfig::default();
        let mut numbering = el(0.1, 0.12, 0.04, 0.02, 1, "5.1");
        numbering.kind = ElementKind::Header;
        let title = el(0.15, 0.12, 0.1, 0.02, 1, "范围");
        let fused = fuse_same_line(vec![numbering, title], &config, "zh-Hans");
        assert_eq!(fused[0].trimmed_text(), "5.1 范围");
    }

    #[test]
    fn test_singleton_untouched() {
        let config = SameLineMergingConfig::default();
        let elements = vec![el(0.1, 0.12, 0.3, 0.02, 1, "solo line")];
        let fused = fuse_same_line(elements.clone(), &config, "en");
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].id, elements[0].id);
    }

    #[test]
    fn test_idempotent() {
        let config = SameLineMergingConfig::default();
        let elements = vec![
            el(0.1, 0.12, 0.04, 0.02, 1, "5.1"),
            el(0.15, 0.12, 0.35, 0.02, 1, "Access Control"),
        ];
        let once = fuse_same_line(elements, &config, "en");
        let twice = fuse_same_line(once.clone(), &config, "en");
        assert_eq!(once.len(), twice.len());
        assert_eq!(once[0].trimmed_text(), twice[0].trimmed_text());
    }

    #[test]
    fn test_different_pages_not_fused() {
        let config = SameLineMergingConfig::default();
        let elements = vec![
            el(0.1, 0.12, 0.04, 0.02, 1, "page1"),
            el(0.1, 0.12, 0.04, 0.02, 2, "page2"),
        ];
        let fused = fuse_same_line(elements, &config, "en");
        assert_eq!(fused.len(), 2);
    }
}
