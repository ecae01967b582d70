use std::time::Duration;

use color_eyre::eyre::eyre;

use codeloc_cache::TranslationCache;
use codeloc_services::{translate_records, util, TranslateOptions};
use codeloc_translate::{HttpBackend, OfflineBackend, TranslationBackend};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[allow(clippy::too_many_arguments)]
pub fn run_translate(
    input: std::path::PathBuf,
    out: std::path::PathBuf,
    cache_path: Option<std::path::PathBuf>,
    offline: bool,
    workers: Option<usize>,
    format: String,
    use_color: bool,
) -> color_eyre::Result<()> {
    tracing::debug!(
        event = "translate_args",
        input = ?input,
        out = ?out,
        cache = ?cache_path,
        offline = offline,
        workers = ?workers
    );

    let cfg = codeloc_config::load_config().unwrap_or_default();
    let mut records = util::read_records(&input)?;

    let cache_path = cache_path.or_else(|| {
        cfg.cache
            .as_ref()
            .and_then(|c| c.path.clone())
            .map(std::path::PathBuf::from)
    });
    let cache = match cache_path {
        Some(path) => Some(TranslationCache::open(&path)?),
        None => None,
    };
    if offline && cache.is_none() {
        ui_warn!("offline without a cache: every item will fail");
    }

    let backend: Box<dyn TranslationBackend> = if offline {
        Box::new(OfflineBackend)
    } else {
        let backend_cfg = cfg.backend.clone().unwrap_or_default();
        let url = backend_cfg
            .url
            .ok_or_else(|| eyre!("no backend.url configured; set it in codeloc.toml or pass --offline"))?;
        let source = cfg.source_lang.as_deref().unwrap_or("auto");
        let target = cfg.target_lang.as_deref().unwrap_or("en");
        let timeout = Duration::from_secs(backend_cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Box::new(HttpBackend::new(
            &url,
            source,
            target,
            backend_cfg.api_key,
            timeout,
        )?)
    };

    let mut options = TranslateOptions::default();
    if let Some(n) = workers.or_else(|| cfg.translate.as_ref().and_then(|t| t.workers)) {
        options.workers = n.max(1);
    }
    if let Some(write_back) = cfg.translate.as_ref().and_then(|t| t.write_back) {
        options.write_back = write_back;
    }

    let summary = translate_records(&mut records, cache.as_ref(), backend.as_ref(), &options)?;
    util::write_records(&out, &records)?;

    if format == "json" {
        // keep stdout pure JSON
        ui_info!("translated map saved to {}", out.display());
        serde_json::to_writer(std::io::stdout().lock(), &summary)?;
        println!();
    } else {
        ui_ok!("translated map saved to {}", out.display());
        let failed = if use_color && summary.failed > 0 {
            use owo_colors::OwoColorize;
            format!("{}", summary.failed.red())
        } else {
            summary.failed.to_string()
        };
        ui_out!(
            "items: {} ({} cache hits, {} translated, {} already english, {} failed, {} failed chunks)",
            summary.items,
            summary.cache_hits,
            summary.translated,
            summary.already_english,
            failed,
            summary.failed_chunks
        );
    }
    if summary.failed > 0 {
        ui_warn!(
            "{} item(s) kept their translation input; rerun translate to retry",
            summary.failed
        );
    }
    Ok(())
}
