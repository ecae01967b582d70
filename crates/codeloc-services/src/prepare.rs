use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use codeloc_core::CodelocError;
use codeloc_domain::{FileRecord, PrepareSummary};
use codeloc_extract::{aggregate, extract_file, ExtractOutcome, IgnoreRule};
use codeloc_patterns::PatternTable;

use crate::Result;

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// Bounded pool size for per-file extraction.
    pub workers: usize,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        PrepareOptions {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// Walk `root`, extract findings from every matching file and aggregate
/// them per file. Files are independent units, so extraction runs on a
/// bounded worker pool; the output is sorted by path so repeated runs
/// produce identical records.
pub fn prepare(
    root: &Path,
    table: &PatternTable,
    ignore: &dyn IgnoreRule,
    options: &PrepareOptions,
) -> Result<(Vec<FileRecord>, PrepareSummary)> {
    if !root.is_dir() {
        return Err(
            CodelocError::Setup(format!("search directory not found: {}", root.display())).into(),
        );
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !ignore.is_ignored(e.path()))
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            candidates.push(entry.into_path());
        }
    }
    candidates.sort();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;
    let outcomes: Vec<(PathBuf, ExtractOutcome)> = pool.install(|| {
        candidates
            .into_par_iter()
            .map(|path| {
                let outcome = extract_file(&path, table);
                (path, outcome)
            })
            .collect()
    });

    let mut summary = PrepareSummary::default();
    let mut records = Vec::new();
    for (path, outcome) in outcomes {
        summary.files_seen += 1;
        match outcome {
            ExtractOutcome::NoEntry => {}
            ExtractOutcome::Undecodable => {
                summary.files_skipped_decode += 1;
                tracing::debug!(event = "prepare_skip_decode", path = %path.display());
            }
            ExtractOutcome::Unreadable(e) => {
                summary.files_skipped_io += 1;
                tracing::warn!(event = "prepare_skip_io", path = %path.display(), error = %e);
            }
            ExtractOutcome::Findings(findings) => {
                summary.files_matched += 1;
                if findings.is_empty() {
                    continue;
                }
                let map = aggregate(findings);
                summary.findings += map.len();
                summary.needs_translation += map
                    .iter()
                    .filter(|f| f.translation_input.is_some())
                    .count();
                tracing::debug!(event = "prepare_file", path = %path.display(), findings = map.len());
                records.push(FileRecord {
                    file: path.display().to_string(),
                    map,
                });
            }
        }
    }

    Ok((records, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloc_extract::{DotfileRule, NoIgnore};
    use std::fs;

    fn opts() -> PrepareOptions {
        PrepareOptions { workers: 2 }
    }

    #[test]
    fn walks_tree_and_aggregates_per_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.py"), "# 你好\nx = 1\n# 你好\n")?;
        fs::write(dir.path().join("b.rs"), "// plain english\n")?;
        fs::create_dir(dir.path().join(".git"))?;
        fs::write(dir.path().join(".git").join("c.py"), "# 你好\n")?;

        let table = PatternTable::builtin();
        let (records, summary) = prepare(dir.path(), &table, &DotfileRule, &opts())?;

        assert_eq!(records.len(), 1);
        assert!(records[0].file.ends_with("a.py"));
        assert_eq!(records[0].map.len(), 1);
        assert_eq!(records[0].map[0].positions, vec![1, 3]);
        assert_eq!(summary.files_matched, 2);
        assert_eq!(summary.needs_translation, 1);
        Ok(())
    }

    #[test]
    fn include_ignored_scans_hidden_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join(".hidden"))?;
        fs::write(dir.path().join(".hidden").join("a.py"), "# 你好\n")?;

        let table = PatternTable::builtin();
        let (records, _) = prepare(dir.path(), &table, &NoIgnore, &opts())?;
        assert_eq!(records.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_root_is_fatal() {
        let table = PatternTable::builtin();
        let err = prepare(
            Path::new("/definitely/not/here"),
            &table,
            &DotfileRule,
            &opts(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("search directory"));
    }

    #[test]
    fn binary_files_are_skipped_not_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("bin.py"), b"\xff\xfe\x00".as_slice())?;
        fs::write(dir.path().join("ok.py"), "# 你好\n")?;

        let table = PatternTable::builtin();
        let (records, summary) = prepare(dir.path(), &table, &DotfileRule, &opts())?;
        assert_eq!(records.len(), 1);
        assert_eq!(summary.files_skipped_decode, 1);
        Ok(())
    }
}
