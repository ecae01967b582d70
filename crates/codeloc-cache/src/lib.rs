//! Persisted translation cache.
//!
//! One SQLite table, `translations(original_text PRIMARY KEY,
//! translated_text)`, with upsert-on-conflict writes. Keys are cleaned of
//! surrounding comment/quote delimiters before every read and write so the
//! same prose reached through different comment syntaxes shares one row.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use rusqlite::Connection;

use codeloc_core::Result;
use codeloc_domain::{CacheBuildSummary, FileRecord};

/// Ordered strip patterns for cache keys: leading comment markers, list
/// prefixes and surrounding quotes. Applied until no pattern changes the
/// text, then trimmed.
const CLEAN_PATTERNS: &[&str] = &[
    r"^--[\s]*(.*)$",
    r"^-[\s]*(.*)$",
    r"^[\s]*[*][\s]*(.*)$",
    r"^[0-9]+[.:][\s]*(.*)$",
    r"^'(.*)'$",
    r#"^"(.*)"$"#,
    r"^`(.*)`$",
    r"^/\*[\s]*(.*)\*/$",
    r"^#[\s]*(.*)$",
    r"^///[\s]*(.*)$",
    r"^//[\s]*(.*)$",
];

fn clean_regexes() -> &'static Vec<Regex> {
    static CLEAN: OnceLock<Vec<Regex>> = OnceLock::new();
    CLEAN.get_or_init(|| {
        CLEAN_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("clean pattern must compile"))
            .collect()
    })
}

/// Strip comment/quote delimiters from a cache key until no pattern
/// matches, then trim surrounding whitespace.
pub fn clean_key(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut changed = false;
        for re in clean_regexes() {
            if let Some(caps) = re.captures(&current) {
                let inner = caps.get(1).map(|g| g.as_str()).unwrap_or("").to_string();
                if inner != current {
                    current = inner;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    current.trim().to_string()
}

/// Cache over one SQLite connection. Reads may come from any thread;
/// writes serialize on the internal mutex.
pub struct TranslationCache {
    conn: Mutex<Connection>,
}

impl TranslationCache {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory cache for tests and one-shot runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS translations (
                original_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                PRIMARY KEY (original_text)
            );
            "#,
        )?;
        Ok(TranslationCache {
            conn: Mutex::new(conn),
        })
    }

    /// Look up a translation by (cleaned) original text.
    pub fn get(&self, original_text: &str) -> Result<Option<String>> {
        let key = clean_key(original_text);
        let conn = self.conn.lock().expect("cache mutex poisoned");
        let mut stmt =
            conn.prepare_cached("SELECT translated_text FROM translations WHERE original_text = ?1")?;
        let mut rows = stmt.query([key.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Insert or overwrite one translation; last write wins.
    pub fn upsert(&self, original_text: &str, translated_text: &str) -> Result<()> {
        let key = clean_key(original_text);
        let value = clean_key(translated_text);
        let conn = self.conn.lock().expect("cache mutex poisoned");
        conn.execute(
            r#"
            INSERT INTO translations (original_text, translated_text)
            VALUES (?1, ?2)
            ON CONFLICT(original_text) DO UPDATE SET
            translated_text = excluded.translated_text
            "#,
            [key.as_str(), value.as_str()],
        )?;
        Ok(())
    }

    /// Bulk-load the cache from a translated record. Entries without a
    /// translated text are counted and skipped.
    pub fn ingest(&self, records: &[FileRecord]) -> Result<CacheBuildSummary> {
        let mut summary = CacheBuildSummary {
            records: records.len(),
            ..Default::default()
        };
        for record in records {
            for entry in &record.map {
                let Some(translated) = entry.translated_text.as_deref() else {
                    summary.skipped_untranslated += 1;
                    continue;
                };
                self.upsert(&entry.original_text, translated)?;
                summary.rows_written += 1;
            }
        }
        tracing::debug!(
            event = "cache_ingest",
            records = summary.records,
            rows = summary.rows_written,
            skipped = summary.skipped_untranslated
        );
        Ok(summary)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("cache mutex poisoned");
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM translations", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloc_domain::AggregatedFinding;

    #[test]
    fn clean_key_strips_comment_markers_and_quotes() {
        assert_eq!(clean_key("// 你好"), "你好");
        assert_eq!(clean_key("# 你好"), "你好");
        assert_eq!(clean_key("-- 你好"), "你好");
        assert_eq!(clean_key("\"你好\""), "你好");
        assert_eq!(clean_key("/* 你好 */"), "你好");
        assert_eq!(clean_key("3. 你好"), "你好");
    }

    #[test]
    fn clean_key_repeats_until_fixpoint() {
        // doc-comment marker inside quotes needs two passes
        assert_eq!(clean_key("\"/// 你好\""), "你好");
        assert_eq!(clean_key("plain text"), "plain text");
    }

    #[test]
    fn get_and_upsert_round_trip() {
        let cache = TranslationCache::open_in_memory().unwrap();
        assert_eq!(cache.get("你好").unwrap(), None);

        cache.upsert("你好", "Hello").unwrap();
        assert_eq!(cache.get("你好").unwrap().as_deref(), Some("Hello"));

        // last write wins
        cache.upsert("你好", "Hi").unwrap();
        assert_eq!(cache.get("你好").unwrap().as_deref(), Some("Hi"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn different_comment_syntaxes_share_one_row() {
        let cache = TranslationCache::open_in_memory().unwrap();
        cache.upsert("// 你好", "Hello").unwrap();
        assert_eq!(cache.get("# 你好").unwrap().as_deref(), Some("Hello"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn ingest_loads_translated_entries_only() {
        let cache = TranslationCache::open_in_memory().unwrap();
        let records = vec![FileRecord {
            file: "demo.py".into(),
            map: vec![
                AggregatedFinding {
                    positions: vec![1],
                    original_text: "# 你好".into(),
                    translation_input: Some("你好".into()),
                    chunks: None,
                    translated_text: Some("Hello".into()),
                },
                AggregatedFinding {
                    positions: vec![2],
                    original_text: "# 再见".into(),
                    translation_input: Some("再见".into()),
                    chunks: None,
                    translated_text: None,
                },
            ],
        }];
        let summary = cache.ingest(&records).unwrap();
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.skipped_untranslated, 1);
        assert_eq!(cache.get("你好").unwrap().as_deref(), Some("Hello"));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cache.db");
        {
            let cache = TranslationCache::open(&db).unwrap();
            cache.upsert("你好", "Hello").unwrap();
        }
        let cache = TranslationCache::open(&db).unwrap();
        assert_eq!(cache.get("你好").unwrap().as_deref(), Some("Hello"));
    }
}
