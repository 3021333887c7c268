//! The pipeline's enumerated configuration surface.
//!
//! Every tunable named in the external interface lives here as a typed
//! struct tree, one sub-struct per concern, each with a `Default` that
//! matches the documented defaults. Loading this from a file (TOML,
//! JSON, environment) is deliberately not implemented here — that glue
//! is a host-application concern — but every type derives
//! [`serde::Deserialize`] so a host can wire up its own loader.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level configuration for a [`crate::pipeline::DocumentPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Dedup / merge toggles and header/footer bands.
    pub processing: ProcessingConfig,
    /// Header pattern sets and level calculation.
    pub header_detection: HeaderDetectionConfig,
    /// List-marker pattern sets and merging toggles.
    pub list_detection: ListDetectionConfig,
    /// Header/footer band smart detection.
    pub header_footer_detection: HeaderFooterDetectionConfig,
    /// Same-line fusion tuning.
    pub same_line_merging: SameLineMergingConfig,
    /// Markdown emission toggles.
    pub markdown_generation: MarkdownGenerationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            header_detection: HeaderDetectionConfig::default(),
            list_detection: ListDetectionConfig::default(),
            header_footer_detection: HeaderFooterDetectionConfig::default(),
            same_line_merging: SameLineMergingConfig::default(),
            markdown_generation: MarkdownGenerationConfig::default(),
        }
    }
}

/// Overlap-dedup threshold and header/footer region bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Overlap percentage (relative to the incoming element) above which
    /// an element is considered a duplicate, `[0,1]`.
    pub overlap_threshold: f32,
    /// Whether the header/list merger runs at all.
    pub enable_element_merging: bool,
    /// Normalized Y range, `(start, end)`, considered the running-header
    /// band.
    pub header_region: (f32, f32),
    /// Normalized Y range considered the running-footer band.
    pub footer_region: (f32, f32),
    /// Whether elements inside the header/footer bands are tagged
    /// `HeaderRegion`/`FooterRegion`.
    pub enable_header_footer_detection: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
            enable_element_merging: true,
            header_region: (0.0, 0.08),
            footer_region: (0.92, 1.0),
            enable_header_footer_detection: true,
        }
    }
}

/// Regex pattern set shared by header and list detection: each field is
/// a list of source patterns, compiled once by
/// [`crate::patterns::CompiledHeaderPatterns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPatterns {
    /// `1.`, `1.2.3`, …
    pub numbered: Vec<String>,
    /// `a.`, `A)`, …
    pub lettered: Vec<String>,
    /// `I.`, `iv.`, …
    pub roman: Vec<String>,
    /// Keyword-only headers (`Introduction`, `前言`, …), resolved through
    /// `level_calculation.custom_levels`.
    pub named: Vec<String>,
}

impl Default for HeaderPatterns {
    fn default() -> Self {
        Self {
            numbered: vec![r"^\d+(\.\d+)*\.?\s+".to_string()],
            lettered: vec![r"^[A-Za-z]\)\s+".to_string(), r"^[A-Za-z]\.\s+".to_string()],
            roman: vec![r"^(?i)[ivxlcdm]+\.\s+".to_string()],
            named: vec![
                "introduction".to_string(),
                "conclusion".to_string(),
                "abstract".to_string(),
                "前言".to_string(),
                "引言".to_string(),
                "参考文献".to_string(),
            ],
        }
    }
}

/// Level-calculation knobs for headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCalculationConfig {
    /// Derive `header_level` from the marker's dot-separated components.
    pub auto_calculate: bool,
    /// Cap on `header_level` before the markdown offset is applied.
    pub max_level: u32,
    /// Explicit level overrides for named headers (keyword → level).
    pub custom_levels: HashMap<String, u32>,
}

impl Default for LevelCalculationConfig {
    fn default() -> Self {
        let mut custom_levels = HashMap::new();
        for kw in [
            "introduction",
            "conclusion",
            "abstract",
            "前言",
            "引言",
            "参考文献",
        ] {
            custom_levels.insert(kw.to_string(), 2);
        }
        Self {
            auto_calculate: true,
            max_level: 6,
            custom_levels,
        }
    }
}

/// Header detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDetectionConfig {
    /// Whether header classification runs at all.
    pub enabled: bool,
    /// Header regex pattern set.
    pub patterns: HeaderPatterns,
    /// Level derivation knobs.
    pub level_calculation: LevelCalculationConfig,
    /// Added to the derived level before it is used as a markdown `#`
    /// count.
    pub markdown_level_offset: i32,
    /// Whether the two-phase header merger runs.
    pub enable_header_merging: bool,
    /// Tight same-line tolerance used by the merger's first pass.
    pub same_line_tolerance: f32,
    /// Loose same-line tolerance used by the merger's second pass.
    pub loose_same_line_tolerance: f32,
    /// Maximum text length for content-based header fallbacks to apply.
    pub content_fallback_max_len: usize,
    /// Whether ALL-CAPS / title-case / keyword content fallbacks run.
    pub enable_content_fallback: bool,
}

impl Default for HeaderDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: HeaderPatterns::default(),
            level_calculation: LevelCalculationConfig::default(),
            markdown_level_offset: 0,
            enable_header_merging: true,
            same_line_tolerance: 0.01,
            loose_same_line_tolerance: 0.03,
            content_fallback_max_len: 60,
            enable_content_fallback: true,
        }
    }
}

/// List-marker regex pattern set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPatterns {
    /// `1.`, `1)`, …
    pub numbered: Vec<String>,
    /// `a.`, `a)`, …
    pub lettered: Vec<String>,
    /// `- `, `• `, …
    pub bullet: Vec<String>,
    /// `i.`, `iv)`, …
    pub roman: Vec<String>,
    /// Host-supplied extra markers (e.g. Chinese ordinal/stem lists).
    pub custom: Vec<String>,
}

impl Default for ListPatterns {
    fn default() -> Self {
        Self {
            numbered: vec![r"^\d+[.)]\s+".to_string()],
            lettered: vec![r"^[A-Za-z][.)]\s+".to_string()],
            bullet: vec![r"^[-•·▪▫◦‣⁃]\s+".to_string()],
            roman: vec![r"^(?i)[ivxlcdm]+[.)]\s+".to_string()],
            custom: vec![r"^[一二三四五六七八九十][、.)]\s*".to_string()],
        }
    }
}

/// List detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetectionConfig {
    /// Whether list classification runs at all.
    pub enabled: bool,
    /// Whether the two-phase list merger runs.
    pub enable_list_item_merging: bool,
    /// Whether `list_level` is derived and recorded in metadata.
    pub enable_level_calculation: bool,
    /// Tight same-line tolerance used by the merger's first pass.
    pub same_line_tolerance: f32,
    /// Loose same-line tolerance used by the merger's second pass.
    pub loose_same_line_tolerance: f32,
    /// List marker pattern set.
    pub patterns: ListPatterns,
}

impl Default for ListDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_list_item_merging: true,
            enable_level_calculation: true,
            same_line_tolerance: 0.01,
            loose_same_line_tolerance: 0.02,
            patterns: ListPatterns::default(),
        }
    }
}

/// Smart detection knobs for running-header/footer bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartDetectionConfig {
    /// Whether smart (content-based, not just band-based) detection
    /// runs.
    pub enabled: bool,
    /// Whether content patterns (page numbers, short running titles) are
    /// consulted in addition to the Y band.
    pub enable_content_based_detection: bool,
    /// Elements longer than this are never tagged header/footer region.
    pub max_header_footer_length: usize,
    /// Literal header/footer strings to always exclude from region
    /// tagging (e.g. a recurring confidential-marking banner).
    pub exclude_common_headers: Vec<String>,
}

impl Default for SmartDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_content_based_detection: true,
            max_header_footer_length: 80,
            exclude_common_headers: Vec::new(),
        }
    }
}

/// Header/footer band detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooterDetectionConfig {
    /// Smart-detection sub-config.
    pub smart_detection: SmartDetectionConfig,
}

impl Default for HeaderFooterDetectionConfig {
    fn default() -> Self {
        Self {
            smart_detection: SmartDetectionConfig::default(),
        }
    }
}

/// Same-line fusion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SameLineMergingConfig {
    /// Whether the same-line fuser runs at all.
    pub enabled: bool,
    /// Maximum center-y distance for two fragments to be considered
    /// co-linear.
    pub vertical_tolerance: f32,
    /// Join separator for Chinese-language documents (empty string).
    pub separator_for_chinese: String,
    /// Join separator for other-language documents (single space).
    pub separator_for_english: String,
    /// Whether merges are logged at `DEBUG`.
    pub enable_logging: bool,
}

impl Default for SameLineMergingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vertical_tolerance: 0.01,
            separator_for_chinese: String::new(),
            separator_for_english: " ".to_string(),
            enable_logging: true,
        }
    }
}

/// Markdown emission configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownGenerationConfig {
    /// Whether a Table of Contents section is appended after all pages.
    pub add_table_of_contents: bool,
}

impl Default for MarkdownGenerationConfig {
    fn default() -> Self {
        Self {
            add_table_of_contents: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.header_detection.same_line_tolerance, 0.01);
        assert_eq!(cfg.header_detection.loose_same_line_tolerance, 0.03);
        assert_eq!(cfg.list_detection.loose_same_line_tolerance, 0.02);
        assert!(cfg.markdown_generation.add_table_of_contents);
    }

    #[test]
    fn test_pipeline_config_clone_eq() {
        let a = PipelineConfig::default();
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pipeline_config_roundtrips_through_json() {
        let cfg = PipelineConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: PipelineConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_level_calculation_custom_levels_seeded() {
        let lc = LevelCalculationConfig::default();
        assert_eq!(lc.custom_levels.get("introduction"), Some(&2));
    }
}
