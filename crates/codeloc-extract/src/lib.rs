//! Per-file span extraction and aggregation.
//!
//! Extraction works on a per-line residual: every structured match removes
//! its span from the residual before the next pattern runs, so each
//! character position contributes to at most one finding per pass. The
//! whole-line fallback then sweeps up unstructured prose.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use codeloc_domain::{AggregatedFinding, Chunk, Finding};
use codeloc_patterns::{
    find_non_english_chunks, is_english_or_technical, normalize, whole_line, CodePatterns,
    PatternTable, TableEntry,
};

/// Externally supplied path filter consulted for every directory and file
/// during the tree walk. Matching paths (and everything under matching
/// directories) are excluded from extraction.
pub trait IgnoreRule: Sync {
    fn is_ignored(&self, path: &Path) -> bool;
}

/// Default rule: skip dot-prefixed files and directories.
pub struct DotfileRule;

impl IgnoreRule for DotfileRule {
    fn is_ignored(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
    }
}

/// Rule that excludes nothing; used by `--include-ignored`.
pub struct NoIgnore;

impl IgnoreRule for NoIgnore {
    fn is_ignored(&self, _path: &Path) -> bool {
        false
    }
}

/// Result of scanning one file.
#[derive(Debug)]
pub enum ExtractOutcome {
    Findings(Vec<Finding>),
    /// Extension absent from the pattern table; file ignored.
    NoEntry,
    /// Content is not valid UTF-8 text; file skipped.
    Undecodable,
    /// File could not be read; skipped and reported.
    Unreadable(std::io::Error),
}

/// Scan one file using the table entry registered for its extension.
pub fn extract_file(path: &Path, table: &PatternTable) -> ExtractOutcome {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let Some(entry) = ext.as_deref().and_then(|e| table.entry(e)) else {
        return ExtractOutcome::NoEntry;
    };
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => return ExtractOutcome::Unreadable(e),
    };
    let Ok(content) = String::from_utf8(bytes) else {
        return ExtractOutcome::Undecodable;
    };
    ExtractOutcome::Findings(extract_content(&content, entry))
}

/// Scan decoded content with a specific table entry.
pub fn extract_content(content: &str, entry: &TableEntry) -> Vec<Finding> {
    match entry {
        TableEntry::Code(patterns) => extract_code(content, patterns),
        TableEntry::Markdown => extract_markdown(content),
        TableEntry::PlainText => extract_plain_text(content),
    }
}

/// Trim, normalize and classify one candidate span.
///
/// Non-English text yields a finding carrying the normalized
/// `translation_input` and its chunks; text that normalization alone
/// resolved to English yields a finding with `translated_text` already set;
/// unchanged English text yields nothing.
pub fn process_span(position: usize, text: &str) -> Option<Finding> {
    let original_text = text.trim();
    let processed = normalize(original_text);

    if !processed.is_empty() && !is_english_or_technical(&processed) {
        let chunks: Vec<Chunk> = find_non_english_chunks(&processed)
            .into_iter()
            .map(Chunk::Pending)
            .collect();
        Some(Finding {
            position,
            original_text: original_text.to_string(),
            translation_input: Some(processed),
            chunks: Some(chunks),
            translated_text: None,
        })
    } else if processed != original_text {
        Some(Finding {
            position,
            original_text: original_text.to_string(),
            translation_input: None,
            chunks: None,
            translated_text: Some(processed),
        })
    } else {
        None
    }
}

fn extract_code(content: &str, patterns: &CodePatterns) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let position = idx + 1;
        let mut residual = line.to_string();

        for (_category, regexes) in patterns.categories() {
            for re in regexes {
                drain_pattern(&mut residual, re, position, &mut findings);
            }
        }

        // one fallback pass over whatever no structured pattern claimed
        if let Some(caps) = whole_line().captures(&residual) {
            let inner = caps.get(1).map(|g| g.as_str()).unwrap_or("");
            if let Some(f) = process_span(position, inner) {
                findings.push(f);
            }
        }
    }
    findings
}

/// Repeatedly match `re` against the residual, emitting a finding per match
/// and removing the matched span so later patterns cannot re-claim it.
fn drain_pattern(residual: &mut String, re: &Regex, position: usize, out: &mut Vec<Finding>) {
    loop {
        let (range, inner) = match re.captures(residual) {
            Some(caps) => {
                let whole = caps.get(0).expect("match group 0 always present");
                let inner = caps
                    .get(1)
                    .map(|g| g.as_str().to_string())
                    .unwrap_or_default();
                (whole.range(), inner)
            }
            None => break,
        };
        if range.is_empty() {
            break;
        }
        if let Some(f) = process_span(position, &inner) {
            out.push(f);
        }
        residual.replace_range(range, "");
    }
}

fn link_regex() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern"))
}

fn extract_markdown(content: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let position = idx + 1;
        let stripped = line.trim();
        if stripped.contains('|') {
            // table row: each cell is an independent span
            for cell in stripped.split('|') {
                process_markdown_segment(position, cell.trim(), &mut findings);
            }
        } else {
            process_markdown_segment(position, stripped, &mut findings);
        }
    }
    findings
}

/// Classify link titles and the text around them; URLs are never
/// classified or translated.
fn process_markdown_segment(position: usize, text: &str, out: &mut Vec<Finding>) {
    let mut rest = text;
    while !rest.is_empty() {
        let Some(caps) = link_regex().captures(rest) else {
            if !rest.trim().is_empty() {
                if let Some(f) = process_span(position, rest.trim()) {
                    out.push(f);
                }
            }
            break;
        };
        let whole = caps.get(0).expect("match group 0 always present");

        let before = &rest[..whole.start()];
        if !before.trim().is_empty() {
            if let Some(f) = process_span(position, before.trim()) {
                out.push(f);
            }
        }

        let title = caps.get(1).map(|g| g.as_str()).unwrap_or("");
        if let Some(f) = process_span(position, title) {
            out.push(f);
        }

        rest = &rest[whole.end()..];
    }
}

fn extract_plain_text(content: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(f) = process_span(idx + 1, line.trim()) {
            findings.push(f);
        }
    }
    findings
}

/// Merge findings sharing the same original text into one record carrying
/// a sorted, deduplicated position set. First-seen order of distinct texts
/// is preserved; the derived fields are identical across duplicates by
/// construction, so the first occurrence wins.
pub fn aggregate(findings: Vec<Finding>) -> Vec<AggregatedFinding> {
    let mut merged: Vec<AggregatedFinding> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for finding in findings {
        let slot = match index.get(&finding.original_text) {
            Some(&i) => i,
            None => {
                index.insert(finding.original_text.clone(), merged.len());
                merged.push(AggregatedFinding {
                    positions: Vec::new(),
                    original_text: finding.original_text.clone(),
                    translation_input: finding.translation_input.clone(),
                    chunks: finding.chunks.clone(),
                    translated_text: finding.translated_text.clone(),
                });
                merged.len() - 1
            }
        };
        merged[slot].positions.push(finding.position);
    }

    for agg in &mut merged {
        agg.positions.sort_unstable();
        agg.positions.dedup();
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::builtin()
    }

    fn code_entry<'t>(table: &'t PatternTable, ext: &str) -> &'t TableEntry {
        table.entry(ext).expect("entry must exist")
    }

    #[test]
    fn chinese_comment_in_python_becomes_translation_input() {
        let table = table();
        let findings = extract_content("x = 1  # 这是中文注释\n", code_entry(&table, "py"));
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.position, 1);
        assert_eq!(f.original_text, "这是中文注释");
        assert_eq!(f.translation_input.as_deref(), Some("这是中文注释"));
        assert!(f.translated_text.is_none());
        let chunks = f.chunks.as_ref().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].original(), "这是中文注释");
    }

    #[test]
    fn english_comment_emits_nothing() {
        let table = table();
        let findings = extract_content("x = 1  # plain comment\n", code_entry(&table, "py"));
        assert!(findings.is_empty());
    }

    #[test]
    fn punctuation_only_difference_resolves_without_translation() {
        let table = table();
        let findings = extract_content("// done！\n", code_entry(&table, "rs"));
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.original_text, "done！");
        assert_eq!(f.translated_text.as_deref(), Some("done!"));
        assert!(f.translation_input.is_none());
        assert!(f.chunks.is_none());
    }

    #[test]
    fn string_inside_comment_is_claimed_once() {
        // the comment pattern runs first and removes the span, so the
        // double-quote pattern sees nothing
        let table = table();
        let findings = extract_content("// say \"你好\" twice\n", code_entry(&table, "rs"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_text, "say \"你好\" twice");
    }

    #[test]
    fn go_string_literal_is_extracted() {
        let table = table();
        let findings =
            extract_content("fmt.Println(\"开始处理\")\n", code_entry(&table, "go"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_text, "开始处理");
    }

    #[test]
    fn fallback_whole_line_catches_bare_prose() {
        let table = table();
        let findings = extract_content("这一行没有注释标记\n", code_entry(&table, "py"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_text, "这一行没有注释标记");
    }

    #[test]
    fn markdown_link_title_classified_url_ignored() {
        let table = table();
        let findings = extract_content("[查看详情](http://x/y)\n", code_entry(&table, "md"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_text, "查看详情");
    }

    #[test]
    fn markdown_table_cells_are_independent_spans() {
        let table = table();
        let findings = extract_content("| 名称 | value |\n", code_entry(&table, "md"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].original_text, "名称");
    }

    #[test]
    fn plain_text_lines_classified_whole() {
        let table = table();
        let findings = extract_content("hello\n你好世界\n", code_entry(&table, "txt"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].position, 2);
        assert_eq!(findings[0].original_text, "你好世界");
    }

    #[test]
    fn aggregation_merges_identical_text_across_lines() {
        let table = table();
        let content = "// 测试\nlet a = 1;\n// other line\n// 测试\n";
        let findings = extract_content(content, code_entry(&table, "rs"));
        let merged = aggregate(findings);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].original_text, "测试");
        assert_eq!(merged[0].positions, vec![1, 4]);
    }

    #[test]
    fn aggregation_keeps_distinct_texts_apart() {
        let findings = vec![
            Finding {
                position: 3,
                original_text: "甲".into(),
                translation_input: Some("甲".into()),
                chunks: Some(vec![Chunk::Pending("甲".into())]),
                translated_text: None,
            },
            Finding {
                position: 10,
                original_text: "甲".into(),
                translation_input: Some("甲".into()),
                chunks: Some(vec![Chunk::Pending("甲".into())]),
                translated_text: None,
            },
            Finding {
                position: 7,
                original_text: "乙".into(),
                translation_input: Some("乙".into()),
                chunks: Some(vec![Chunk::Pending("乙".into())]),
                translated_text: None,
            },
        ];
        let merged = aggregate(findings);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].positions, vec![3, 10]);
        assert_eq!(merged[1].positions, vec![7]);
    }

    #[test]
    fn extract_file_skips_unknown_extension_and_binary() {
        let dir = tempfile::tempdir().unwrap();
        let table = table();

        let unknown = dir.path().join("image.bin");
        std::fs::write(&unknown, b"\x00\x01").unwrap();
        assert!(matches!(
            extract_file(&unknown, &table),
            ExtractOutcome::NoEntry
        ));

        let binary = dir.path().join("data.py");
        std::fs::write(&binary, b"\xff\xfe\x00bad").unwrap();
        assert!(matches!(
            extract_file(&binary, &table),
            ExtractOutcome::Undecodable
        ));
    }

    #[test]
    fn dotfile_rule_matches_hidden_components() {
        assert!(DotfileRule.is_ignored(Path::new("src/.git")));
        assert!(DotfileRule.is_ignored(Path::new(".env")));
        assert!(!DotfileRule.is_ignored(Path::new("src/main.rs")));
        assert!(!NoIgnore.is_ignored(Path::new(".env")));
    }
}
