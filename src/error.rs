//! Error types for the layout-reconstruction engine.
//!
//! Stages in this crate are total over well-formed input: a stage never
//! fails on a single element, it logs at `DEBUG` and passes the element
//! through unchanged. Only boundary conditions (a bad configured regex, an
//! adapter failure, a whole page that could not be salvaged) produce an
//! [`Error`]; those propagate to the document driver, which records a
//! warning and skips the page rather than aborting the run.

/// Result type alias for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can escape the layout engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured regular expression failed to compile.
    #[error("invalid configured pattern: {0}")]
    InvalidPattern(String),

    /// An `Element`/`RawFragment` carried a kind the core does not know
    /// how to classify or emit.
    #[error("unsupported element kind: {0}")]
    UnsupportedElementKind(String),

    /// A group-level merge could not be completed; callers fall back to
    /// emitting the seed element alone.
    #[error("merge failure: {0}")]
    MergeFailure(String),

    /// The OCR adapter failed to produce fragments for a page.
    #[error("OCR adapter error: {0}")]
    OcrAdapterError(String),

    /// Internal: a single page could not be salvaged and was skipped by
    /// the document driver. Aggregated into a final error only when every
    /// page of a document was skipped.
    #[error("page {page} skipped: {reason}")]
    PageSkipped {
        /// 1-based page index.
        page: u32,
        /// Human-readable reason the page was skipped.
        reason: String,
    },

    /// Every page of a document was skipped; nothing could be emitted.
    #[error("document produced no output: {0} page(s) skipped")]
    DocumentFailed(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_error() {
        let err = Error::InvalidPattern("(unclosed".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("invalid configured pattern"));
        assert!(msg.contains("(unclosed"));
    }

    #[test]
    fn test_page_skipped_error() {
        let err = Error::PageSkipped {
            page: 3,
            reason: "adapter timeout".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 3"));
        assert!(msg.contains("adapter timeout"));
    }

    #[test]
    fn test_document_failed_error() {
        let err = Error::DocumentFailed(4);
        let msg = format!("{}", err);
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
