use codeloc_cache::TranslationCache;
use codeloc_domain::{CacheBuildSummary, FileRecord};

use crate::Result;

/// Bulk-load the cache from a translated record.
pub fn build_cache(records: &[FileRecord], cache: &TranslationCache) -> Result<CacheBuildSummary> {
    cache.ingest(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloc_domain::AggregatedFinding;

    #[test]
    fn loaded_rows_resolve_future_lookups() -> Result<()> {
        let cache = TranslationCache::open_in_memory()?;
        let records = vec![FileRecord {
            file: "demo.sql".into(),
            map: vec![AggregatedFinding {
                positions: vec![4],
                original_text: "-- 你好".into(),
                translation_input: Some("你好".into()),
                chunks: None,
                translated_text: Some("Hello".into()),
            }],
        }];

        let summary = build_cache(&records, &cache)?;
        assert_eq!(summary.rows_written, 1);
        // the comment marker is stripped from the key
        assert_eq!(cache.get("你好")?.as_deref(), Some("Hello"));
        Ok(())
    }
}
