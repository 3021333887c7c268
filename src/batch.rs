//! Batch driver: runs N independent documents across a thread pool
//! with no shared mutable state, per the concurrency model's rule that
//! parallelism exists only across documents, never within one.
//!
//! No async runtime: the per-document pipeline is synchronous, so
//! `std::thread::scope` gives bounded, borrow-checked parallelism
//! without pulling in an executor.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::Element;
use crate::ocr_adapter::OcrAdapter;
use crate::pipeline::DocumentPipeline;

/// One unit of batch work: an adapter plus its page count.
pub struct BatchJob<'a> {
    /// Adapter providing this document's fragments.
    pub adapter: &'a (dyn OcrAdapter + 'a),
    /// Total page count to process.
    pub page_count: u32,
}

impl<'a> BatchJob<'a> {
    /// Construct a job.
    pub fn new(adapter: &'a (dyn OcrAdapter + 'a), page_count: u32) -> Self {
        Self { adapter, page_count }
    }
}

/// Runs a batch of documents, each through its own
/// [`DocumentPipeline`], in parallel. Each thread builds its own
/// pipeline from the shared config, so no document mutates state
/// visible to another.
pub struct BatchProcessor {
    config: PipelineConfig,
}

impl BatchProcessor {
    /// Build a batch processor sharing one configuration across all
    /// documents.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Process every job in `jobs` concurrently, returning one
    /// `Result<Vec<Element>>` per job in input order.
    pub fn process_all(&self, jobs: Vec<BatchJob<'_>>) -> Vec<Result<Vec<Element>>> {
        let config = &self.config;
        std::thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .into_iter()
                .map(|job| {
                    scope.spawn(move || {
                        let pipeline = DocumentPipeline::new(config.clone())?;
                        pipeline.process_document(job.adapter, job.page_count)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("document worker thread panicked"))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::RawFragment;
    use crate::ocr_adapter::StaticAdapter;

    fn fragment(text: &str, page: u32) -> RawFragment {
        RawFragment::new(text, Rect::new(0.1, 0.1, 0.3, 0.02), page, 0.9)
    }

    #[test]
    fn test_batch_processes_independent_documents() {
        let adapter_a = StaticAdapter::new(vec![fragment("Doc A Intro", 1)]);
        let adapter_b = StaticAdapter::new(vec![fragment("Doc B Intro", 1)]);
        let processor = BatchProcessor::new(PipelineConfig::default());
        let results = processor.process_all(vec![
            BatchJob::new(&adapter_a, 1),
            BatchJob::new(&adapter_b, 1),
        ]);
        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap()[0].trimmed_text().contains("Doc A"));
        assert!(results[1].as_ref().unwrap()[0].trimmed_text().contains("Doc B"));
    }

    #[test]
    fn test_batch_empty_jobs_returns_empty() {
        let processor = BatchProcessor::new(PipelineConfig::default());
        let results = processor.process_all(Vec::new());
        assert!(results.is_empty());
    }
}
