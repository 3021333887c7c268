//! Marker normalizer (component 10): canonicalizes list markers, predicts
//! missing TOC header numbers from context, and strips trailing page
//! numbers from TOC items.

use crate::model::{Element, ElementKind};
use crate::patterns;

/// Minimum ratio of header elements on a page for it to be considered a
/// Table of Contents page.
const TOC_HEADER_RATIO: f32 = 0.9;
/// Minimum element count for TOC classification.
const TOC_MIN_ELEMENTS: usize = 3;

/// A page is a TOC iff headers constitute at least
/// [`TOC_HEADER_RATIO`] of its elements and it has at least
/// [`TOC_MIN_ELEMENTS`] elements.
pub fn is_toc_page(elements: &[Element]) -> bool {
    if elements.len() < TOC_MIN_ELEMENTS {
        return false;
    }
    let headers = elements.iter().filter(|e| e.kind == ElementKind::Header).count();
    headers as f32 / elements.len() as f32 >= TOC_HEADER_RATIO
}

/// Fraction of headers among a page's elements, used by the cross-page
/// stitcher's suppression test (it compares this ratio against
/// [`TOC_HEADER_RATIO`] directly rather than calling [`is_toc_page`],
/// since the cross-page stitcher must not also apply the element-count
/// floor — a one-header boundary page still suppresses stitching).
pub fn toc_header_ratio(elements: &[Element]) -> f32 {
    if elements.is_empty() {
        return 0.0;
    }
    let headers = elements.iter().filter(|e| e.kind == ElementKind::Header).count();
    headers as f32 / elements.len() as f32
}

enum MarkerKind {
    LatinOrDigit,
    ChineseNumeralOrStem,
    Bullet,
}

/// Split `text` into `(marker_body, kind, rest)` if its prefix matches
/// the marker grammar: Latin letters, digits, Chinese ordinal numerals,
/// Chinese heavenly stems, or a bullet glyph, followed by one of the
/// recognized separators (or, for bullets, directly by whitespace).
fn parse_marker(text: &str) -> Option<(String, MarkerKind, String)> {
    let mut chars = text.chars().peekable();
    let first = *chars.peek()?;

    if patterns::BULLET_GLYPHS.contains(&first) {
        let rest = text[first.len_utf8()..].trim_start().to_string();
        return Some((first.to_string(), MarkerKind::Bullet, rest));
    }

    if patterns::CHINESE_ORDINALS.contains(&first) || patterns::CHINESE_STEMS.contains(&first) {
        let first_len = first.len_utf8();
        let remainder = &text[first_len..];
        let rest_start = match remainder.chars().next() {
            Some(sep) if patterns::MARKER_SEPARATORS.contains(&sep) => first_len + sep.len_utf8(),
            _ => first_len,
        };
        let rest = text[rest_start..].trim_start().to_string();
        return Some((first.to_string(), MarkerKind::ChineseNumeralOrStem, rest));
    }

    if first.is_ascii_alphanumeric() {
        let is_digit_run = first.is_ascii_digit();
        let mut body_end = 0usize;
        let bytes = text.as_bytes();
        while body_end < bytes.len() {
            let c = bytes[body_end] as char;
            let matches_kind = if is_digit_run {
                c.is_ascii_digit()
            } else {
                c.is_ascii_alphabetic()
            };
            if !matches_kind {
                break;
            }
            body_end += 1;
        }
        if body_end == 0 {
            return None;
        }
        let body = &text[..body_end];
        let remainder = &text[body_end..];
        let sep = remainder.chars().next()?;
        if !patterns::MARKER_SEPARATORS.contains(&sep) {
            return None;
        }
        let rest_start = body_end + sep.len_utf8();
        let rest = text[rest_start..].trim_start().to_string();
        return Some((body.to_string(), MarkerKind::LatinOrDigit, rest));
    }

    None
}

/// Collapse a 2-char marker whose characters are equal (an OCR
/// doubled-letter artifact, e.g. `gg` → `g`, `33` → `3`) to one
/// character.
fn collapse_doubled(marker: &str) -> String {
    let chars: Vec<char> = marker.chars().collect();
    if chars.len() == 2 && chars[0] == chars[1] {
        chars[0].to_string()
    } else {
        marker.to_string()
    }
}

/// Canonicalize one `ListItem`'s leading marker, per §4.8: Latin
/// letter/digit markers become `letter)`/`digit)` with a single
/// trailing space; Chinese numeral/stem markers are kept verbatim plus
/// a single space; bullets become a single `-` plus a space. Only the
/// first separator after the marker is rewritten — any further `）`
/// characters in the content are left untouched. Non-`ListItem`
/// elements, and list items whose text does not match the marker
/// grammar, pass through unchanged.
pub fn normalize_marker(mut element: Element) -> Element {
    if element.kind != ElementKind::ListItem {
        return element;
    }
    let text = element.trimmed_text().to_string();
    let Some((body, kind, rest)) = parse_marker(&text) else {
        return element;
    };

    let canonical = match kind {
        MarkerKind::LatinOrDigit => format!("{}) {}", collapse_doubled(&body), rest),
        MarkerKind::ChineseNumeralOrStem => format!("{body} {rest}"),
        MarkerKind::Bullet => format!("- {rest}"),
    };

    element.text = Some(canonical);
    element
}

fn next_alphanumeric(c: char) -> Option<char> {
    if c.is_ascii_digit() {
        char::from_digit(c.to_digit(10)? + 1, 10)
    } else if c.is_ascii_lowercase() {
        if c == 'z' { None } else { Some((c as u8 + 1) as char) }
    } else if c.is_ascii_uppercase() {
        if c == 'Z' { None } else { Some((c as u8 + 1) as char) }
    } else {
        None
    }
}

/// Repair OCR-doubled list markers across a run of sibling list items
/// at the same level: when collapsing a doubled 2-char marker would
/// break the surrounding monotone alphabetic/numeric sequence, the
/// character is re-positioned instead (e.g. `a, gg, c` → `b`).
pub fn repair_ocr_marker_sequence(elements: &mut [Element]) {
    let raw_markers: Vec<Option<String>> = elements
        .iter()
        .map(|e| e.metadata.get("marker").cloned())
        .collect();

    for i in 0..elements.len() {
        let Some(raw) = &raw_markers[i] else { continue };
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() != 2 || chars[0] != chars[1] {
            continue;
        }
        let collapsed = chars[0];
        let prev = (i > 0).then(|| raw_markers[i - 1].as_deref()).flatten().and_then(|m| m.chars().next());
        let next = raw_markers
            .get(i + 1)
            .and_then(|m| m.as_deref())
            .and_then(|m| m.chars().next());

        if let Some(prev_char) = prev {
            if let Some(expected) = next_alphanumeric(prev_char) {
                let fits_next = match next {
                    Some(next_char) => next_alphanumeric(expected) == Some(next_char),
                    None => true,
                };
                if expected != collapsed && fits_next {
                    if let Some(text) = &elements[i].text {
                        elements[i].text = Some(text.replacen(raw.as_str(), &expected.to_string(), 1));
                    }
                    if let Some(marker_meta) = elements[i].metadata.get_mut("marker") {
                        *marker_meta = expected.to_string();
                    }
                }
            }
        }
    }
}

fn toc_leading_number(text: &str) -> Option<(String, String)> {
    let m = patterns::RE_NUMBERED_HEADER_MARKER.find(text)?;
    let number = m.as_str().trim().trim_end_matches('.').to_string();
    if number.is_empty() || !number.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    let rest = text[m.end()..].trim_start().to_string();
    Some((number, rest))
}

fn increment_last_component(number: &str) -> Option<String> {
    let mut parts: Vec<&str> = number.split('.').collect();
    let last = parts.pop()?;
    let incremented: u32 = last.parse::<u32>().ok()?.checked_add(1)?;
    let prefix = parts.join(".");
    if prefix.is_empty() {
        Some(incremented.to_string())
    } else {
        Some(format!("{prefix}.{incremented}"))
    }
}

/// Normalize headers on a TOC page: strip a trailing page number from
/// each header's text, then predict a missing leading number for any
/// header that lacks one, chaining off the nearest preceding numbered
/// header.
pub fn normalize_toc_headers(elements: Vec<Element>) -> Vec<Element> {
    if !is_toc_page(&elements) {
        return elements;
    }

    let mut stripped: Vec<Element> = elements
        .into_iter()
        .map(|mut e| {
            if e.kind == ElementKind::Header {
                if let Some(text) = &e.text {
                    if let Some(caps) = patterns::RE_TRAILING_PAGE_NUMBER.captures(text.trim()) {
                        if let Some(body) = caps.get(1) {
                            e.text = Some(body.as_str().trim().to_string());
                        }
                    }
                }
            }
            e
        })
        .collect();

    let mut last_numbered: Option<String> = None;
    for e in stripped.iter_mut() {
        if e.kind != ElementKind::Header {
            continue;
        }
        let text = e.trimmed_text().to_string();
        match toc_leading_number(&text) {
            Some((number, _)) => last_numbered = Some(number),
            None => {
                if let Some(predecessor) = &last_numbered {
                    if let Some(predicted) = increment_last_component(predecessor) {
                        e.text = Some(format!("{predicted} {text}"));
                        last_numbered = Some(predicted);
                    }
                }
            }
        }
    }

    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::RawFragment;

    fn list_item(text: &str) -> Element {
        let mut e = Element::from_fragment(RawFragment::new(text, Rect::new(0.1, 0.1, 0.3, 0.02), 1, 0.9));
        e.kind = ElementKind::ListItem;
        e
    }

    fn header(text: &str) -> Element {
        let mut e = Element::from_fragment(RawFragment::new(text, Rect::new(0.1, 0.1, 0.3, 0.02), 1, 0.9));
        e.kind = ElementKind::Header;
        e
    }

    #[test]
    fn test_normalize_letter_marker() {
        let e = normalize_marker(list_item("a）sub item"));
        assert_eq!(e.trimmed_text(), "a) sub item");
    }

    #[test]
    fn test_normalize_bullet_marker() {
        let e = normalize_marker(list_item("• loose item"));
        assert_eq!(e.trimmed_text(), "- loose item");
    }

    #[test]
    fn test_normalize_chinese_stem_kept_verbatim() {
        let e = normalize_marker(list_item("甲）第一条"));
        assert_eq!(e.trimmed_text(), "甲 第一条");
    }

    #[test]
    fn test_collapse_doubled_marker() {
        assert_eq!(collapse_doubled("gg"), "g");
        assert_eq!(collapse_doubled("33"), "3");
        assert_eq!(collapse_doubled("ab"), "ab");
    }

    #[test]
    fn test_is_toc_page() {
        let elements = vec![header("1 范围"), header("2 术语"), header("3 参考文献")];
        assert!(is_toc_page(&elements));
    }

    #[test]
    fn test_toc_strips_trailing_page_number() {
        let mut h1 = header("范围   3");
        h1.kind = ElementKind::Header;
        let elements = vec![h1, header("a"), header("b")];
        let normalized = normalize_toc_headers(elements);
        assert_eq!(normalized[0].trimmed_text(), "范围");
    }

    #[test]
    fn test_toc_predicts_missing_number() {
        let elements = vec![
            header("1 范围"),
            header("规范性引用文件"),
            header("3 术语"),
        ];
        let normalized = normalize_toc_headers(elements);
        assert_eq!(normalized[1].trimmed_text(), "2 规范性引用文件");
    }
}
