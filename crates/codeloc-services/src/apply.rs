use std::path::PathBuf;

use codeloc_domain::{AggregatedFinding, ApplySummary, FileRecord};

use crate::util::write_atomic;
use crate::Result;

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Compute and report everything, write nothing.
    pub dry_run: bool,
    /// Copy `<file>.bak` aside before the first rewrite of a file.
    pub backup: bool,
    /// When the whole-span translation is missing, patch the translated
    /// chunks anyway (with a warning).
    pub partial_chunks: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            dry_run: false,
            backup: false,
            partial_chunks: true,
        }
    }
}

/// Replay translations into the original files. Each file is rewritten at
/// most once, atomically; a mismatched or untranslated entry skips that
/// replacement only.
pub fn apply_records(records: &[FileRecord], options: &ApplyOptions) -> Result<ApplySummary> {
    let mut summary = ApplySummary::default();
    for record in records {
        apply_file(record, options, &mut summary)?;
    }
    Ok(summary)
}

fn apply_file(record: &FileRecord, options: &ApplyOptions, summary: &mut ApplySummary) -> Result<()> {
    summary.files += 1;
    let path = PathBuf::from(&record.file);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            summary.files_skipped_io += 1;
            tracing::warn!(event = "apply_skip_io", file = %record.file, error = %e);
            return Ok(());
        }
    };
    tracing::debug!(event = "apply_file", file = %record.file, entries = record.map.len());

    let mut out = String::with_capacity(content.len());
    let mut changed = false;
    for (idx, segment) in content.split_inclusive('\n').enumerate() {
        let line_number = idx + 1;
        let (line, ending) = split_ending(segment);

        let mut patched = line.to_string();
        for entry in &record.map {
            if entry.positions.binary_search(&line_number).is_err() {
                continue;
            }
            apply_entry(&mut patched, entry, line_number, record, options, summary);
        }

        if patched != line {
            changed = true;
        }
        out.push_str(&patched);
        out.push_str(ending);
    }

    if changed {
        summary.files_patched += 1;
        if !options.dry_run {
            if options.backup {
                let bak = PathBuf::from(format!("{}.bak", record.file));
                std::fs::copy(&path, &bak)?;
                tracing::warn!(event = "backup", from = %path.display(), to = %bak.display());
            }
            write_atomic(&path, out.as_bytes())?;
        }
    }
    Ok(())
}

/// One entry applied to one line: the whole-span replacement first, then
/// chunk-level replacements over the already-patched line.
fn apply_entry(
    line: &mut String,
    entry: &AggregatedFinding,
    line_number: usize,
    record: &FileRecord,
    options: &ApplyOptions,
    summary: &mut ApplySummary,
) {
    match entry.translated_text.as_deref() {
        Some(translated) => {
            if line.contains(&entry.original_text) {
                if translated != entry.original_text {
                    *line = line.replace(&entry.original_text, translated);
                }
                summary.replaced += 1;
                replace_chunks(line, entry);
            } else {
                summary.skipped_mismatch += 1;
                tracing::warn!(
                    event = "patch_mismatch",
                    file = %record.file,
                    line = line_number,
                    text = %entry.original_text
                );
            }
        }
        None => {
            let translated_chunks: Vec<(&str, &str)> = entry
                .chunks
                .iter()
                .flatten()
                .filter_map(|c| c.translated().map(|t| (c.original(), t)))
                .collect();
            if options.partial_chunks && !translated_chunks.is_empty() {
                let mut any = false;
                for (original, translated) in translated_chunks {
                    if line.contains(original) {
                        *line = line.replace(original, translated);
                        any = true;
                    }
                }
                if any {
                    summary.partial += 1;
                    tracing::warn!(
                        event = "patch_partial",
                        file = %record.file,
                        line = line_number,
                        text = %entry.original_text
                    );
                } else {
                    summary.skipped_mismatch += 1;
                }
            } else {
                summary.skipped_untranslated += 1;
            }
        }
    }
}

fn replace_chunks(line: &mut String, entry: &AggregatedFinding) {
    for chunk in entry.chunks.iter().flatten() {
        if let Some(translated) = chunk.translated() {
            let original = chunk.original();
            if original != translated && line.contains(original) {
                *line = line.replace(original, translated);
            }
        }
    }
}

fn split_ending(segment: &str) -> (&str, &str) {
    if let Some(line) = segment.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = segment.strip_suffix('\n') {
        (line, "\n")
    } else {
        (segment, "")
    }
}
