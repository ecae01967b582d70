use rayon::prelude::*;

use codeloc_cache::TranslationCache;
use codeloc_domain::{FileRecord, TranslateOutcome, TranslateSummary};
use codeloc_translate::{translate_finding, TranslationBackend};

use crate::Result;

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Bounded pool size; every slot may block on one backend call.
    pub workers: usize,
    /// Store successful backend results into the cache.
    pub write_back: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            workers: 4,
            write_back: true,
        }
    }
}

/// Enrich every record in place. Files are processed on a bounded worker
/// pool; the cache serializes its own writes. A failed item is counted and
/// left resumable, never fatal.
pub fn translate_records(
    records: &mut [FileRecord],
    cache: Option<&TranslationCache>,
    backend: &dyn TranslationBackend,
    options: &TranslateOptions,
) -> Result<TranslateSummary> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;

    let per_file: Vec<Result<TranslateSummary>> = pool.install(|| {
        records
            .par_iter_mut()
            .map(|record| {
                let mut counts = TranslateSummary::default();
                for entry in &mut record.map {
                    counts.items += 1;
                    let mut failed_chunks = 0usize;
                    match translate_finding(
                        entry,
                        cache,
                        backend,
                        options.write_back,
                        &mut failed_chunks,
                    )? {
                        TranslateOutcome::CacheHit => counts.cache_hits += 1,
                        TranslateOutcome::Translated => counts.translated += 1,
                        TranslateOutcome::AlreadyEnglish => counts.already_english += 1,
                        TranslateOutcome::Failed => counts.failed += 1,
                    }
                    counts.failed_chunks += failed_chunks;
                }
                tracing::debug!(
                    event = "translate_file",
                    file = %record.file,
                    items = counts.items,
                    failed = counts.failed
                );
                Ok(counts)
            })
            .collect()
    });

    let mut summary = TranslateSummary::default();
    for counts in per_file {
        let counts = counts?;
        summary.items += counts.items;
        summary.cache_hits += counts.cache_hits;
        summary.translated += counts.translated;
        summary.already_english += counts.already_english;
        summary.failed += counts.failed;
        summary.failed_chunks += counts.failed_chunks;
    }
    Ok(summary)
}
