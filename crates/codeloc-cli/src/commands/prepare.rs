use codeloc_extract::{DotfileRule, IgnoreRule, NoIgnore};
use codeloc_patterns::{PatternTable, TableEntry};
use codeloc_services::{prepare, util, PrepareOptions};

pub fn run_prepare(
    root: std::path::PathBuf,
    out: std::path::PathBuf,
    include_ignored: bool,
    workers: Option<usize>,
    format: String,
) -> color_eyre::Result<()> {
    tracing::debug!(
        event = "prepare_args",
        root = ?root,
        out = ?out,
        include_ignored = include_ignored,
        workers = ?workers
    );

    let cfg = codeloc_config::load_config().unwrap_or_default();

    let mut table = PatternTable::builtin();
    if let Some(extra) = cfg.prepare.as_ref().and_then(|p| p.extra_text_extensions.clone()) {
        for ext in extra {
            table = table.with_entry(&ext, TableEntry::PlainText);
        }
    }

    let mut options = PrepareOptions::default();
    if let Some(n) = workers.or_else(|| cfg.prepare.as_ref().and_then(|p| p.workers)) {
        options.workers = n.max(1);
    }

    let ignore: &dyn IgnoreRule = if include_ignored { &NoIgnore } else { &DotfileRule };
    let (records, summary) = prepare(&root, &table, ignore, &options)?;

    util::write_records(&out, &records)?;

    if format == "json" {
        // keep stdout pure JSON
        ui_info!("translation map saved to {}", out.display());
        serde_json::to_writer(std::io::stdout().lock(), &summary)?;
        println!();
    } else {
        ui_ok!("translation map saved to {}", out.display());
        ui_out!(
            "files: {} seen, {} matched, {} skipped; findings: {} ({} need translation)",
            summary.files_seen,
            summary.files_matched,
            summary.files_skipped_decode + summary.files_skipped_io,
            summary.findings,
            summary.needs_translation
        );
    }
    Ok(())
}
