//! Compiled pattern tables shared by the classifier, stitcher and
//! normalizer.
//!
//! Two kinds of patterns live here. Fixed ones — sentence-ending
//! punctuation, dangerous phrases, the split-CJK-bigram table, TOC page
//! number stripping — never change at runtime and are compiled once via
//! `lazy_static!`. User-configured ones (header/list marker regex lists
//! from [`crate::config::HeaderPatterns`] / [`crate::config::ListPatterns`])
//! are compiled per pipeline construction, surfacing
//! [`crate::error::Error::InvalidPattern`] instead of panicking if a
//! configured string fails to compile.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{HeaderPatterns, ListPatterns};
use crate::error::{Error, Result};

/// Design note (a): the core picks one full sentence-ending punctuation
/// set and applies it consistently, rather than the ASCII-only and
/// full-width variants found in places in the reference material.
pub const SENTENCE_ENDING_CHARS: &[char] = &['.', '!', '?', '。', '！', '？', '；', ';'];

/// Completion punctuation, used by the sentence-completion positive
/// test. Character-identical to [`SENTENCE_ENDING_CHARS`] but named
/// separately because the two concepts are distinct in the pipeline even
/// though this implementation resolves them to the same set.
pub const COMPLETION_PUNCTUATION_CHARS: &[char] = &['.', ';', '!', '?', '。', '；', '！', '？'];

/// Bullet glyphs recognized by the list content-fallback and the marker
/// normalizer's bullet canonicalization.
pub const BULLET_GLYPHS: &[char] = &['-', '•', '·', '▪', '▫', '◦', '‣', '⁃'];

/// Chinese ordinal numerals recognized by the marker grammar.
pub const CHINESE_ORDINALS: &[char] = &['一', '二', '三', '四', '五', '六', '七', '八', '九', '十'];

/// Chinese heavenly-stem numerals recognized by the marker grammar.
pub const CHINESE_STEMS: &[char] = &['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

/// Separators recognized after a list/header marker.
pub const MARKER_SEPARATORS: &[char] = &[')', '）', '〉', '.', '-', '*'];

/// Literal phrase that always starts new structure, per the glossary's
/// "dangerous pattern" definition.
pub const DANGEROUS_PHRASES: &[&str] = &["本项要求包括："];

lazy_static! {
    /// Strips a trailing page number from a TOC header: `"范围   3"` →
    /// `"范围"`.
    pub static ref RE_TRAILING_PAGE_NUMBER: Regex =
        Regex::new(r"^(.+?)\s*\d+\s*$").expect("static pattern is valid");

    /// `has_chapter_headers`: a bare number followed by CJK text.
    pub static ref RE_CHAPTER_HEADER: Regex =
        Regex::new(r"^\d+\s+\p{Han}+$").expect("static pattern is valid");

    /// `has_appendix_headers`: `附录` followed by a Latin letter.
    pub static ref RE_APPENDIX_HEADER: Regex =
        Regex::new(r"^附录[A-Z]").expect("static pattern is valid");

    /// `has_named_headers`: one of the three named-section openers.
    pub static ref RE_NAMED_HEADER: Regex =
        Regex::new(r"^(前言|引言|参考文献)").expect("static pattern is valid");

    /// Descriptive-prose false positive: a 4-digit run followed by CJK
    /// text (e.g. a year-prefixed sentence mistaken for a header).
    pub static ref RE_DESCRIPTIVE_FOUR_DIGIT: Regex =
        Regex::new(r"^\d{4}\s+\p{Han}").expect("static pattern is valid");

    /// A numbered header marker, including the ambiguous merged form
    /// `1.2` used by the sentence stitcher's header rejection rule.
    pub static ref RE_NUMBERED_HEADER_MARKER: Regex =
        Regex::new(r"^\d+(\.\d+)*\.?\s*").expect("static pattern is valid");

    /// A numbered or lettered list marker, used by the sentence
    /// stitcher's dangerous-pattern rejection.
    pub static ref RE_NUMBERED_OR_LETTERED_LIST_MARKER: Regex =
        Regex::new(r"^(\d+[.)]|[A-Za-z][.)])\s*").expect("static pattern is valid");

    /// Descriptive explanatory phrases that disqualify a long line from
    /// being a real header (page-context validator rule (b)).
    pub static ref RE_DESCRIPTIVE_EXPLANATION: Regex = Regex::new(
        r"(?i)(this (section|chapter|document)|as (described|shown|discussed)|the following (table|figure|section)|本(章|节|标准)(规定|描述|说明))"
    ).expect("static pattern is valid");

    /// A 2-char OCR-doubled marker, e.g. `gg`, `33`.
    pub static ref RE_DOUBLED_MARKER: Regex =
        Regex::new(r"^(.)\1$").expect("static pattern is valid");
}

/// Whether `text` ends with one of [`SENTENCE_ENDING_CHARS`].
pub fn ends_with_sentence_punctuation(text: &str) -> bool {
    text.trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| SENTENCE_ENDING_CHARS.contains(&c))
}

/// Whether `text` ends with one of [`COMPLETION_PUNCTUATION_CHARS`].
pub fn ends_with_completion_punctuation(text: &str) -> bool {
    text.trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| COMPLETION_PUNCTUATION_CHARS.contains(&c))
}

/// Whether `text` starts with a bullet glyph.
pub fn starts_with_bullet_glyph(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .is_some_and(|c| BULLET_GLYPHS.contains(&c))
}

/// Whether `text` contains any CJK (Han) characters.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        (0x4E00..=0x9FFF).contains(&cp) || (0x3400..=0x4DBF).contains(&cp)
    })
}

/// Whether the (current-ending-char, next-starting-char) pair is a known
/// split-CJK-bigram: a word OCR/line-break split into two adjacent
/// fragments. Covers exact pairs (`通` + `过`) and the `的`-suffix
/// wildcard (`*` + `的`).
pub fn is_known_split_bigram(current_last: char, next_first: char) -> bool {
    const EXACT_PAIRS: &[(char, char)] = &[
        ('通', '过'),
        ('因', '此'),
        ('所', '以'),
        ('但', '是'),
        ('如', '果'),
        ('为', '了'),
    ];
    if EXACT_PAIRS.contains(&(current_last, next_first)) {
        return true;
    }
    next_first == '的'
}

/// Whether `text` starts with a "dangerous pattern": a lettered list
/// marker, a numbered header marker, or one of [`DANGEROUS_PHRASES`].
pub fn starts_with_dangerous_pattern(text: &str) -> bool {
    let trimmed = text.trim_start();
    if RE_NUMBERED_OR_LETTERED_LIST_MARKER.is_match(trimmed) {
        return true;
    }
    if RE_NUMBERED_HEADER_MARKER.is_match(trimmed) {
        return true;
    }
    DANGEROUS_PHRASES
        .iter()
        .any(|phrase| trimmed.starts_with(phrase))
}

/// A compiled header-pattern set, derived from [`HeaderPatterns`].
pub struct CompiledHeaderPatterns {
    /// Compiled `numbered` patterns, tried in order.
    pub numbered: Vec<Regex>,
    /// Compiled `lettered` patterns.
    pub lettered: Vec<Regex>,
    /// Compiled `roman` patterns.
    pub roman: Vec<Regex>,
    /// Lower-cased named keywords (not regex; matched by substring).
    pub named: Vec<String>,
}

impl CompiledHeaderPatterns {
    /// Compile a configured [`HeaderPatterns`], surfacing
    /// [`Error::InvalidPattern`] on the first pattern that fails.
    pub fn compile(patterns: &HeaderPatterns) -> Result<Self> {
        Ok(Self {
            numbered: compile_all(&patterns.numbered)?,
            lettered: compile_all(&patterns.lettered)?,
            roman: compile_all(&patterns.roman)?,
            named: patterns.named.iter().map(|s| s.to_lowercase()).collect(),
        })
    }
}

/// A compiled list-marker pattern set, derived from [`ListPatterns`].
pub struct CompiledListPatterns {
    /// Compiled `numbered` patterns.
    pub numbered: Vec<Regex>,
    /// Compiled `lettered` patterns.
    pub lettered: Vec<Regex>,
    /// Compiled `bullet` patterns.
    pub bullet: Vec<Regex>,
    /// Compiled `roman` patterns.
    pub roman: Vec<Regex>,
    /// Compiled `custom` patterns.
    pub custom: Vec<Regex>,
}

impl CompiledListPatterns {
    /// Compile a configured [`ListPatterns`], surfacing
    /// [`Error::InvalidPattern`] on the first pattern that fails.
    pub fn compile(patterns: &ListPatterns) -> Result<Self> {
        Ok(Self {
            numbered: compile_all(&patterns.numbered)?,
            lettered: compile_all(&patterns.lettered)?,
            bullet: compile_all(&patterns.bullet)?,
            roman: compile_all(&patterns.roman)?,
            custom: compile_all(&patterns.custom)?,
        })
    }
}

fn compile_all(sources: &[String]) -> Result<Vec<Regex>> {
    sources
        .iter()
        .map(|src| Regex::new(src).map_err(|e| Error::InvalidPattern(format!("{src}: {e}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_with_sentence_punctuation() {
        assert!(ends_with_sentence_punctuation("Done. "));
        assert!(ends_with_sentence_punctuation("结束。"));
        assert!(!ends_with_sentence_punctuation("continuing"));
    }

    #[test]
    fn test_starts_with_bullet_glyph() {
        assert!(starts_with_bullet_glyph("- item"));
        assert!(starts_with_bullet_glyph("• item"));
        assert!(!starts_with_bullet_glyph("1. item"));
    }

    #[test]
    fn test_contains_cjk() {
        assert!(contains_cjk("范围"));
        assert!(!contains_cjk("scope"));
    }

    #[test]
    fn test_known_split_bigram() {
        assert!(is_known_split_bigram('通', '过'));
        assert!(is_known_split_bigram('x', '的'));
        assert!(!is_known_split_bigram('a', 'b'));
    }

    #[test]
    fn test_dangerous_pattern_detection() {
        assert!(starts_with_dangerous_pattern("a) sub item"));
        assert!(starts_with_dangerous_pattern("3.2 Next section"));
        assert!(starts_with_dangerous_pattern("本项要求包括：foo"));
        assert!(!starts_with_dangerous_pattern("continuous prose"));
    }

    #[test]
    fn test_compile_header_patterns_reports_invalid_pattern() {
        let mut patterns = HeaderPatterns::default();
        patterns.numbered.push("(unclosed".to_string());
        let err = CompiledHeaderPatterns::compile(&patterns).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
    }

    #[test]
    fn test_compile_header_patterns_succeeds() {
        let patterns = HeaderPatterns::default();
        let compiled = CompiledHeaderPatterns::compile(&patterns).unwrap();
        assert!(!compiled.numbered.is_empty());
    }
}
