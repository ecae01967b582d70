use codeloc_services::{apply_records, util, ApplyOptions};

pub fn run_apply(
    input: std::path::PathBuf,
    dry_run: bool,
    backup: bool,
    format: String,
) -> color_eyre::Result<()> {
    tracing::debug!(
        event = "apply_args",
        input = ?input,
        dry_run = dry_run,
        backup = backup
    );

    let cfg = codeloc_config::load_config().unwrap_or_default();
    let records = util::read_records(&input)?;

    let options = ApplyOptions {
        dry_run,
        backup: backup || cfg.apply.as_ref().and_then(|a| a.backup).unwrap_or(false),
        partial_chunks: cfg
            .apply
            .as_ref()
            .and_then(|a| a.partial_chunks)
            .unwrap_or(true),
    };
    let summary = apply_records(&records, &options)?;

    if format == "json" {
        // keep stdout pure JSON
        if dry_run {
            ui_warn!(
                "DRY-RUN: would patch {} of {} file(s)",
                summary.files_patched,
                summary.files
            );
        }
        serde_json::to_writer(std::io::stdout().lock(), &summary)?;
        println!();
        return Ok(());
    }

    if dry_run {
        ui_out!(
            "DRY-RUN: would patch {} of {} file(s)",
            summary.files_patched,
            summary.files
        );
    } else {
        ui_ok!("patched {} of {} file(s)", summary.files_patched, summary.files);
    }
    ui_out!(
        "replacements: {} applied, {} partial, {} mismatched, {} untranslated; {} file(s) unreadable",
        summary.replaced,
        summary.partial,
        summary.skipped_mismatch,
        summary.skipped_untranslated,
        summary.files_skipped_io
    );
    Ok(())
}
