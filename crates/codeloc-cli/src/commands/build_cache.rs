use codeloc_cache::TranslationCache;
use codeloc_services::{build_cache, util};

pub fn run_build_cache(
    input: std::path::PathBuf,
    cache_path: std::path::PathBuf,
) -> color_eyre::Result<()> {
    tracing::debug!(event = "build_cache_args", input = ?input, cache = ?cache_path);

    let records = util::read_records(&input)?;
    let cache = TranslationCache::open(&cache_path)?;
    let summary = build_cache(&records, &cache)?;

    ui_ok!(
        "cache at {} loaded with {} row(s) from {} record(s) ({} entries skipped without translation)",
        cache_path.display(),
        summary.rows_written,
        summary.records,
        summary.skipped_untranslated
    );
    Ok(())
}
