//! Pipeline orchestration: the document/page driver that runs the
//! eleven components in the order fixed by the concurrency model —
//! dedup, fuse, classify, merge, stitch, validate, stitch-again,
//! normalize — then stitches across page boundaries and hands the
//! ordered element stream to the Markdown emitter.
//!
//! ```text
//! page_N OCR → classify → merge → validate → stitch → [hold tail]
//!         ↓                                             ↓
//!      emit body of N                  stitch tail with head of N+1
//! ```

pub mod classifier;
pub mod cross_page;
pub mod dedup;
pub mod merger;
pub mod normalizer;
pub mod same_line;
pub mod stitcher;
pub mod validator;

use log::warn;

use crate::config::PipelineConfig;
use crate::converters::markdown;
use crate::error::{Error, Result};
use crate::model::{Element, RawFragment};
use crate::ocr_adapter::OcrAdapter;
use crate::patterns::{CompiledHeaderPatterns, CompiledListPatterns};

/// Runs the full per-document pipeline: a thin, stateless orchestrator
/// over the eleven components, holding only the compiled configuration
/// (read-only, shared by reference per the concurrency model).
pub struct DocumentPipeline {
    config: PipelineConfig,
    header_patterns: CompiledHeaderPatterns,
    list_patterns: CompiledListPatterns,
    language: String,
}

impl DocumentPipeline {
    /// Build a pipeline for the `en` language hint. Surfaces
    /// [`Error::InvalidPattern`] if any configured regex fails to
    /// compile.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_language(config, "en")
    }

    /// Build a pipeline with an explicit language hint (used only to
    /// choose the same-line join separator).
    pub fn with_language(config: PipelineConfig, language: impl Into<String>) -> Result<Self> {
        let header_patterns = CompiledHeaderPatterns::compile(&config.header_detection.patterns)?;
        let list_patterns = CompiledListPatterns::compile(&config.list_detection.patterns)?;
        Ok(Self {
            config,
            header_patterns,
            list_patterns,
            language: language.into(),
        })
    }

    /// Process every page of a document through `adapter`, returning
    /// the final ordered element stream. Pages whose adapter call fails
    /// are skipped with a `WARN` log; the document succeeds as long as
    /// at least one page was emitted.
    pub fn process_document(&self, adapter: &dyn OcrAdapter, page_count: u32) -> Result<Vec<Element>> {
        let mut pages: Vec<Vec<Element>> = Vec::new();
        let mut skipped = Vec::new();

        for page in 1..=page_count {
            match adapter.fragments_for_page(page) {
                Ok(fragments) => pages.push(self.process_page(fragments, page)),
                Err(e) => {
                    warn!("pipeline: skipping page {page}: {e}");
                    skipped.push(Error::PageSkipped {
                        page,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if pages.is_empty() {
            return Err(Error::DocumentFailed(skipped.len()));
        }

        let mut stitched_pages = pages;
        let mut i = 0;
        while i + 1 < stitched_pages.len() {
            let (left, right) = (
                std::mem::take(&mut stitched_pages[i]),
                std::mem::take(&mut stitched_pages[i + 1]),
            );
            let (left, right) = cross_page::stitch_page_boundary(left, right);
            stitched_pages[i] = left;
            stitched_pages[i + 1] = right;
            i += 1;
        }

        Ok(stitched_pages.into_iter().flatten().collect())
    }

    /// Convenience wrapper: process `adapter` and render the result as
    /// Markdown in one call.
    pub fn process_document_to_markdown(&self, adapter: &dyn OcrAdapter, page_count: u32) -> Result<String> {
        let elements = self.process_document(adapter, page_count)?;
        Ok(markdown::to_markdown(&elements, &self.config.markdown_generation))
    }

    /// Run components 2-8 over one page's raw fragments: fragment
    /// store, dedup, fuse, classify, merge, repair doubled OCR markers
    /// across sibling list runs, stitch, validate (which re-runs the
    /// stitcher internally), then the marker normalizer.
    /// Total over well-formed input; never returns an error.
    pub fn process_page(&self, fragments: Vec<RawFragment>, page: u32) -> Vec<Element> {
        let mut elements: Vec<Element> = fragments
            .into_iter()
            .map(|f| seed_element(f, page))
            .collect();

        crate::model::sort_reading_order(&mut elements, self.config.header_detection.same_line_tolerance);

        let (elements, _dropped) = dedup::deduplicate(elements, &self.config.processing);

        let elements = if self.config.same_line_merging.enabled {
            same_line::fuse_same_line(elements, &self.config.same_line_merging, &self.language)
        } else {
            elements
        };

        let elements: Vec<Element> = elements
            .iter()
            .map(|e| {
                classifier::classify_element(
                    e,
                    &self.header_patterns,
                    &self.list_patterns,
                    &self.config.header_detection,
                    &self.config.list_detection,
                    &self.config.processing,
                    &self.config.header_footer_detection,
                )
            })
            .collect();

        let mut elements = if self.config.processing.enable_element_merging {
            merger::merge_headers_and_lists(elements, &self.config.header_detection, &self.config.list_detection)
        } else {
            elements
        };
        normalizer::repair_ocr_marker_sequence(&mut elements);

        let elements = stitcher::stitch_page(elements);
        let elements = validator::validate_page(elements);

        let elements: Vec<Element> = elements
            .into_iter()
            .map(|e| normalizer::normalize_marker(e))
            .collect();
        normalizer::normalize_toc_headers(elements)
    }
}

/// Build the initial `Element` for a raw fragment, honoring its typed
/// hint as a strong prior per the fragment store's contract (the
/// classifier's short-circuit rule then accepts it with confidence
/// 0.9).
fn seed_element(fragment: RawFragment, page: u32) -> Element {
    use crate::model::{ElementKind, ElementKindHint};

    let hint = fragment.kind_hint;
    let mut element = Element::from_fragment(fragment);
    element.page = page;
    if let Some(hint) = hint {
        element.kind = match hint {
            ElementKindHint::Title => ElementKind::Title,
            ElementKindHint::Paragraph => ElementKind::Paragraph,
            ElementKindHint::List | ElementKindHint::ListItem => ElementKind::ListItem,
            ElementKindHint::Table => ElementKind::Table,
            ElementKindHint::Cell => ElementKind::TableCell,
        };
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::ocr_adapter::StaticAdapter;

    fn fragment(text: &str, x: f32, y: f32, w: f32, h: f32, page: u32) -> RawFragment {
        RawFragment::new(text, Rect::new(x, y, w, h), page, 0.95)
    }

    #[test]
    fn test_process_page_header_level_from_marker() {
        let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
        let elements = pipeline.process_page(
            vec![fragment("5.1.2 Access Control", 0.1, 0.12, 0.3, 0.02, 1)],
            1,
        );
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].header_level, Some(3));
    }

    #[test]
    fn test_process_document_skips_failing_pages() {
        struct FlakyAdapter;
        impl OcrAdapter for FlakyAdapter {
            fn fragments_for_page(&self, page: u32) -> Result<Vec<RawFragment>> {
                if page == 2 {
                    Err(Error::OcrAdapterError("timeout".to_string()))
                } else {
                    Ok(vec![fragment("Intro", 0.1, 0.1, 0.3, 0.02, page)])
                }
            }
        }
        let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
        let result = pipeline.process_document(&FlakyAdapter, 3).unwrap();
        assert!(!result.is_empty());
    }

    #[test]
    fn test_process_document_fails_when_all_pages_skipped() {
        struct AlwaysFailAdapter;
        impl OcrAdapter for AlwaysFailAdapter {
            fn fragments_for_page(&self, _page: u32) -> Result<Vec<RawFragment>> {
                Err(Error::OcrAdapterError("down".to_string()))
            }
        }
        let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
        let result = pipeline.process_document(&AlwaysFailAdapter, 2);
        assert!(matches!(result, Err(Error::DocumentFailed(2))));
    }

    #[test]
    fn test_static_adapter_round_trip() {
        let adapter = StaticAdapter::new(vec![fragment("5.1 Scope", 0.1, 0.1, 0.3, 0.02, 1)]);
        let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
        let result = pipeline.process_document(&adapter, 1).unwrap();
        assert_eq!(result.len(), 1);
    }
}
