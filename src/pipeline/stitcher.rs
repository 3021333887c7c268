//! Conservative sentence stitcher (component 7): iteratively glues
//! fragments that lack sentence-ending punctuation with safe
//! continuations on the next line.

use uuid::Uuid;

use crate::model::{Element, ElementKind};
use crate::patterns;

/// Whether `element` is an "incomplete sentence": not a Header and its
/// trimmed text does not end in sentence-ending punctuation.
pub fn is_incomplete(element: &Element) -> bool {
    element.kind != ElementKind::Header && !patterns::ends_with_sentence_punctuation(element.trimmed_text())
}

/// The sentence-completion positive test (§4.6): fires when `next`
/// looks like the safe tail of `current`'s sentence even though later
/// rejection rules would otherwise apply.
fn sentence_completion_test(current: &Element, next: &Element) -> bool {
    let next_text = next.trimmed_text();
    if next_text.chars().count() > 25 {
        return false;
    }
    if !patterns::ends_with_completion_punctuation(next_text) {
        return false;
    }
    if patterns::starts_with_dangerous_pattern(next_text) {
        return false;
    }
    let current_text = current.trimmed_text();
    if patterns::ends_with_sentence_punctuation(current_text) || current.kind == ElementKind::Header {
        return false;
    }
    // A one- or two-character tail (a lone trailing particle plus
    // punctuation, e.g. "的。") is too short to trust on its own: only
    // accept it when the current/next char pair is a known split-CJK
    // bigram. Longer short tails (up to 25 chars) are accepted on the
    // punctuation/danger checks above alone.
    if next_text.chars().count() <= 2 {
        return match (current_text.chars().next_back(), next_text.chars().next()) {
            (Some(a), Some(b)) => patterns::is_known_split_bigram(a, b),
            _ => false,
        };
    }
    true
}

fn starts_with_numbered_or_lettered_list_marker(text: &str) -> bool {
    patterns::RE_NUMBERED_OR_LETTERED_LIST_MARKER.is_match(text.trim_start())
}

/// Whether `next` is a safe continuation of `current`, per the
/// rejection cascade in §4.6. When `cross_page` is true (used only by
/// the cross-page stitcher) the same-page vertical distance test is
/// skipped.
pub fn is_safe_continuation(current: &Element, next: &Element, cross_page: bool) -> bool {
    if !cross_page && current.bbox.vertical_gap(&next.bbox) > 0.05 {
        return false;
    }

    if sentence_completion_test(current, next) {
        return true;
    }

    if current.bbox.right() < 0.7 {
        return false;
    }
    if next.kind == ElementKind::Header {
        return false;
    }
    if starts_with_numbered_or_lettered_list_marker(next.trimmed_text()) {
        return false;
    }
    if next.trimmed_text().starts_with("本项要求包括：") {
        return false;
    }
    !patterns::starts_with_dangerous_pattern(next.trimmed_text())
}

/// Merge `current` and `next` by straight concatenation, no separator
/// (per design note (b), distinct from the same-line fuser's language
/// join). Kept on `current`'s page; used by both the intra-page pass
/// and the cross-page stitcher.
pub fn merge_adjacent(current: &Element, next: &Element) -> Element {
    let text = format!("{}{}", current.trimmed_text(), next.trimmed_text());
    let confidence = (current.confidence + next.confidence) / 2.0;
    Element {
        id: Uuid::new_v4(),
        kind: current.kind,
        bbox: current.bbox.union(&next.bbox),
        page: current.page,
        text: Some(text),
        confidence,
        header_level: current.header_level,
        metadata: current.metadata.clone(),
        content_blob: None,
    }
}

/// Run the stitcher to a fixed point over one page's elements (already
/// in reading order). Invariant 5: applying this twice yields the same
/// result as applying it once, because a pass that performs no merge
/// returns its input unchanged.
pub fn stitch_page(mut elements: Vec<Element>) -> Vec<Element> {
    loop {
        let (next, changed) = stitch_pass(elements);
        elements = next;
        if !changed {
            return elements;
        }
    }
}

fn stitch_pass(elements: Vec<Element>) -> (Vec<Element>, bool) {
    let mut output = Vec::with_capacity(elements.len());
    let mut changed = false;
    let mut i = 0;
    while i < elements.len() {
        if i + 1 < elements.len() && is_incomplete(&elements[i]) && is_safe_continuation(&elements[i], &elements[i + 1], false) {
            output.push(merge_adjacent(&elements[i], &elements[i + 1]));
            changed = true;
            i += 2;
        } else {
            output.push(elements[i].clone());
            i += 1;
        }
    }
    (output, changed)
}

/// Run the stitcher over a whole document's elements, grouped by
/// contiguous page runs (elements are assumed already sorted by page).
pub fn stitch_document(elements: Vec<Element>) -> Vec<Element> {
    let mut output = Vec::with_capacity(elements.len());
    let mut run: Vec<Element> = Vec::new();
    for element in elements {
        if run.last().is_some_and(|e| e.page != element.page) {
            output.extend(stitch_page(std::mem::take(&mut run)));
        }
        run.push(element);
    }
    if !run.is_empty() {
        output.extend(stitch_page(run));
    }
    output
}
