//! Markdown emitter (component 11): serializes the final ordered
//! element stream, one page at a time, then appends a generated Table
//! of Contents.
//!
//! Deterministic modulo `merge_timestamp` (invariant 8): the same input
//! elements always produce the same Markdown body, since nothing here
//! reads wall-clock time or iterates a `HashMap` in emission order.

use crate::config::MarkdownGenerationConfig;
use crate::model::{Element, ElementKind};

/// Render a whole document's elements (already page-ordered) as a
/// single Markdown string, per §6's stream layout: a title, one
/// `---`-separated section per page, and a trailing Table of Contents.
pub fn to_markdown(elements: &[Element], config: &MarkdownGenerationConfig) -> String {
    let mut out = String::from("# Document Processing Results\n\n");

    for (page, page_elements) in group_by_page(elements) {
        out.push_str(&format!("\n\n---\n\n## Page {page}\n\n"));
        for element in page_elements {
            out.push_str(&emit_element(element));
        }
    }

    if config.add_table_of_contents {
        out.push_str("\n\n---\n\n## Table of Contents\n\n");
        out.push_str(&render_toc(elements));
    }

    out
}

fn group_by_page(elements: &[Element]) -> Vec<(u32, Vec<&Element>)> {
    let mut groups: Vec<(u32, Vec<&Element>)> = Vec::new();
    for element in elements {
        match groups.last_mut() {
            Some((page, members)) if *page == element.page => members.push(element),
            _ => groups.push((element.page, vec![element])),
        }
    }
    groups
}

/// Render one element per its `kind`, per §4.10's mapping.
fn emit_element(element: &Element) -> String {
    let text = element.trimmed_text();
    match element.kind {
        ElementKind::Title => format!("### {text}\n\n"),
        ElementKind::Header => {
            let level = element.header_level.unwrap_or(1).max(1) as usize;
            format!("{} {text}\n\n", "#".repeat(level))
        }
        ElementKind::Paragraph => format!("{text}\n\n"),
        ElementKind::ListItem => format!("{text}\n"),
        ElementKind::TocItem => format!("{text}\n"),
        ElementKind::Table => emit_table(element),
        ElementKind::TableCell => format!("{text}\n"),
        ElementKind::Footnote => format!("> Footnote: {text}\n\n"),
        ElementKind::Image => format!("![{text}]({text})\n\n"),
        ElementKind::HeaderRegion | ElementKind::FooterRegion => String::new(),
    }
}

/// A `Table` element carries its literal marker (e.g. `|---|---|`) as
/// its own text and its cells as a flat, row-major metadata list under
/// `cell_text` keys `cell_0`, `cell_1`, …; absent cells emit nothing
/// beyond the marker line.
fn emit_table(element: &Element) -> String {
    let mut out = format!("{}\n", element.trimmed_text());
    let mut i = 0;
    while let Some(cell) = element.metadata.get(&format!("cell_{i}")) {
        out.push_str(cell);
        out.push('\n');
        i += 1;
    }
    out.push('\n');
    out
}

/// Generate a Table of Contents from every Title/Header in `elements`,
/// indented `"  " * (level - 1)` with a GitHub-style anchor
/// (lowercased, spaces to dashes).
fn render_toc(elements: &[Element]) -> String {
    let mut toc = String::new();
    for element in elements {
        let level = match element.kind {
            ElementKind::Title => 1,
            ElementKind::Header => element.header_level.unwrap_or(1).max(1),
            _ => continue,
        };
        let text = element.trimmed_text();
        if text.is_empty() {
            continue;
        }
        let indent = "  ".repeat((level - 1) as usize);
        let anchor = text.to_lowercase().replace(' ', "-");
        toc.push_str(&format!("{indent}- [{text}](#{anchor})\n"));
    }
    toc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::RawFragment;

    fn element(kind: ElementKind, text: &str, page: u32) -> Element {
        let mut e = Element::from_fragment(RawFragment::new(text, Rect::new(0.1, 0.1, 0.3, 0.02), page, 0.9));
        e.kind = kind;
        e
    }

    #[test]
    fn test_document_wrapper_and_page_separator() {
        let elements = vec![element(ElementKind::Paragraph, "hello", 1)];
        let md = to_markdown(&elements, &MarkdownGenerationConfig { add_table_of_contents: false });
        assert!(md.starts_with("# Document Processing Results\n\n"));
        assert!(md.contains("\n\n---\n\n## Page 1\n\n"));
        assert!(md.contains("hello\n\n"));
    }

    #[test]
    fn test_header_emits_hash_count_from_level() {
        let mut h = element(ElementKind::Header, "Scope", 1);
        h.header_level = Some(3);
        let md = to_markdown(&[h], &MarkdownGenerationConfig { add_table_of_contents: false });
        assert!(md.contains("### Scope\n\n"));
    }

    #[test]
    fn test_title_emits_triple_hash() {
        let t = element(ElementKind::Title, "My Document", 1);
        let md = to_markdown(&[t], &MarkdownGenerationConfig { add_table_of_contents: false });
        assert!(md.contains("### My Document\n\n"));
    }

    #[test]
    fn test_footnote_and_image() {
        let footnote = element(ElementKind::Footnote, "see appendix", 1);
        let image = element(ElementKind::Image, "diagram", 1);
        let md = to_markdown(&[footnote, image], &MarkdownGenerationConfig { add_table_of_contents: false });
        assert!(md.contains("> Footnote: see appendix\n\n"));
        assert!(md.contains("![diagram](diagram)\n\n"));
    }

    #[test]
    fn test_toc_appended_with_indentation_and_anchor() {
        let mut h1 = element(ElementKind::Header, "Scope", 1);
        h1.header_level = Some(1);
        let mut h2 = element(ElementKind::Header, "Normative References", 1);
        h2.header_level = Some(2);
        let md = to_markdown(&[h1, h2], &MarkdownGenerationConfig { add_table_of_contents: true });
        assert!(md.contains("## Table of Contents\n\n"));
        assert!(md.contains("- [Scope](#scope)\n"));
        assert!(md.contains("  - [Normative References](#normative-references)\n"));
    }

    #[test]
    fn test_toc_omitted_when_disabled() {
        let h = element(ElementKind::Header, "Scope", 1);
        let md = to_markdown(&[h], &MarkdownGenerationConfig { add_table_of_contents: false });
        assert!(!md.contains("Table of Contents"));
    }

    #[test]
    fn test_deterministic_emission() {
        let elements = vec![
            element(ElementKind::Header, "Scope", 1),
            element(ElementKind::Paragraph, "Body text.", 1),
        ];
        let config = MarkdownGenerationConfig { add_table_of_contents: true };
        let once = to_markdown(&elements, &config);
        let twice = to_markdown(&elements, &config);
        assert_eq!(once, twice);
    }
}
