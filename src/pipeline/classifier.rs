//! Classifier (component 5): pattern + geometry rules assign each
//! element a semantic role.

use crate::config::{HeaderDetectionConfig, HeaderFooterDetectionConfig, ListDetectionConfig, ProcessingConfig};
use crate::model::{Element, ElementKind};
use crate::patterns::{self, CompiledHeaderPatterns, CompiledListPatterns};

/// Classify one element, returning a new `Element` with `kind`,
/// `header_level`, `confidence` and (for list items) a `marker` metadata
/// entry updated. Total over well-formed input: never fails, worst case
/// the element stays `Paragraph`.
pub fn classify_element(
    element: &Element,
    header_patterns: &CompiledHeaderPatterns,
    list_patterns: &CompiledListPatterns,
    header_config: &HeaderDetectionConfig,
    list_config: &ListDetectionConfig,
    processing_config: &ProcessingConfig,
    header_footer_config: &HeaderFooterDetectionConfig,
) -> Element {
    let mut out = element.clone();
    let text = element.trimmed_text().to_string();

    // Step 0: running-header/footer bands take priority over every
    // other rule — page furniture is never promoted to a structural
    // Header/Title just because its text happens to look like one.
    if let Some(region_kind) = classify_header_footer_region(element, &text, processing_config, header_footer_config) {
        out.kind = region_kind;
        out.header_level = None;
        out.confidence = 0.8;
        return out;
    }

    // Step 1: short-circuit on prior typed kind.
    if matches!(out.kind, ElementKind::Header | ElementKind::ListItem) {
        out.confidence = 0.9;
        return out;
    }

    if header_config.enabled {
        if let Some((level, is_named)) = try_classify_header(&text, header_patterns, header_config) {
            out.kind = ElementKind::Header;
            out.header_level = Some(level);
            out.confidence = header_confidence(&text, is_named);
            return out;
        }
    }

    if list_config.enabled {
        if let Some(marker) = try_classify_list(&text, list_patterns) {
            out.kind = ElementKind::ListItem;
            out.header_level = None;
            out.confidence = list_confidence(&text, &marker);
            out.metadata.insert("marker".to_string(), marker);
            return out;
        }
        if patterns::starts_with_bullet_glyph(&text)
            || (text.chars().count() <= 3 && !patterns::contains_cjk(&text))
        {
            out.kind = ElementKind::ListItem;
            out.header_level = None;
            let marker = leading_bullet_or_short_marker(&text);
            out.confidence = list_confidence(&text, &marker);
            out.metadata.insert("marker".to_string(), marker);
            return out;
        }
    }

    out.kind = ElementKind::Paragraph;
    out.header_level = None;
    out
}

/// Tag an element `HeaderRegion`/`FooterRegion` when its bbox falls in
/// the configured running-header/footer Y band, subject to the smart
/// detection gates: an element longer than
/// `smart_detection.max_header_footer_length` is never tagged (running
/// headers/footers are short by nature, unlike a paragraph that merely
/// starts near the page edge), and a literal match in
/// `smart_detection.exclude_common_headers` is always exempted.
fn classify_header_footer_region(
    element: &Element,
    text: &str,
    processing_config: &ProcessingConfig,
    header_footer_config: &HeaderFooterDetectionConfig,
) -> Option<ElementKind> {
    if !processing_config.enable_header_footer_detection {
        return None;
    }
    let smart = &header_footer_config.smart_detection;
    if smart.enabled
        && smart.enable_content_based_detection
        && smart.exclude_common_headers.iter().any(|excluded| excluded == text)
    {
        return None;
    }
    if smart.enabled && text.chars().count() > smart.max_header_footer_length {
        return None;
    }

    let (top, bottom) = (element.bbox.top(), element.bbox.bottom());
    let (header_start, header_end) = processing_config.header_region;
    let (footer_start, footer_end) = processing_config.footer_region;
    if top >= header_start && bottom <= header_end {
        Some(ElementKind::HeaderRegion)
    } else if top >= footer_start && bottom <= footer_end {
        Some(ElementKind::FooterRegion)
    } else {
        None
    }
}

/// Try the header patterns in order (numbered, lettered, roman, named)
/// plus, if enabled, the content-based fallbacks. Returns `(level,
/// is_named)` on success.
fn try_classify_header(
    text: &str,
    patterns: &CompiledHeaderPatterns,
    config: &HeaderDetectionConfig,
) -> Option<(u32, bool)> {
    if patterns::ends_with_sentence_punctuation(text) {
        return None;
    }

    for re in &patterns.numbered {
        if let Some(m) = re.find(text) {
            return Some((resolve_level(m.as_str(), config, None), false));
        }
    }
    for re in &patterns.lettered {
        if let Some(m) = re.find(text) {
            return Some((resolve_level(m.as_str(), config, None), false));
        }
    }
    for re in &patterns.roman {
        if let Some(m) = re.find(text) {
            return Some((resolve_level(m.as_str(), config, None), false));
        }
    }
    let lowered = text.to_lowercase();
    for keyword in &patterns.named {
        if lowered.contains(keyword.as_str()) {
            let level = config
                .level_calculation
                .custom_levels
                .get(keyword)
                .copied()
                .unwrap_or(2);
            return Some((level, true));
        }
    }

    if config.enable_content_fallback && text.chars().count() <= config.content_fallback_max_len {
        if is_all_caps(text) {
            return Some((1, false));
        }
        if is_title_case(text) && !patterns::ends_with_sentence_punctuation(text) {
            return Some((2, false));
        }
        let lowered = text.to_lowercase();
        for keyword in ["introduction", "conclusion", "summary", "overview"] {
            if lowered.contains(keyword) {
                return Some((2, false));
            }
        }
    }

    None
}

fn resolve_level(marker_match: &str, config: &HeaderDetectionConfig, explicit: Option<u32>) -> u32 {
    let level = explicit.unwrap_or_else(|| count_dot_components(marker_match));
    let capped = level.min(config.level_calculation.max_level);
    let offset = config.markdown_level_offset;
    (capped as i32 + offset).max(1) as u32
}

/// Count non-empty dot-separated components of a matched marker, per
/// invariant 3: `header_level = min(dot_components(marker), max_level) +
/// markdown_level_offset`.
pub fn count_dot_components(marker_match: &str) -> u32 {
    let trimmed = marker_match.trim().trim_end_matches(|c: char| {
        c == '.' || c == ')' || c == '）' || c.is_whitespace()
    });
    if trimmed.is_empty() {
        return 1;
    }
    let count = trimmed.split('.').filter(|s| !s.is_empty()).count() as u32;
    count.max(1)
}

fn try_classify_list(text: &str, patterns: &CompiledListPatterns) -> Option<String> {
    for re in &patterns.numbered {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim().to_string());
        }
    }
    for re in &patterns.lettered {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim().to_string());
        }
    }
    for re in &patterns.bullet {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim().to_string());
        }
    }
    for re in &patterns.roman {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim().to_string());
        }
    }
    for re in &patterns.custom {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim().to_string());
        }
    }
    None
}

fn leading_bullet_or_short_marker(text: &str) -> String {
    text.trim_start()
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_default()
}

fn header_confidence(text: &str, is_named: bool) -> f32 {
    let len = text.chars().count();
    let mut c = 0.85f32;
    if len < 10 {
        c += 0.1;
    }
    if len > 50 {
        c -= 0.2;
    }
    c += if is_named { 0.1 } else { 0.06 };
    c.min(1.0)
}

fn list_confidence(text: &str, marker: &str) -> f32 {
    let len = text.chars().count();
    let mut c = 0.80f32;
    if len < 20 {
        c += 0.1;
    }
    if len > 100 {
        c -= 0.2;
    }
    let is_bullet = marker
        .chars()
        .next()
        .is_some_and(|ch| patterns::BULLET_GLYPHS.contains(&ch));
    c += if is_bullet { 0.1 } else { 0.06 };
    c.min(1.0)
}

fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 3 && letters.iter().all(|c| c.is_uppercase())
}

fn is_title_case(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    words.iter().all(|w| {
        w.chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || !c.is_alphabetic())
    })
}
