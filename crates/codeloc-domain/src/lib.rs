use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One raw extracted text span before aggregation.
///
/// `position` is a 1-based line number. Exactly one of the optional fields
/// is populated when the span needs attention: `translation_input` (plus
/// `chunks`) when the normalized text is non-English, `translated_text`
/// when normalization alone already produced the final form.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub position: usize,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<Chunk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

/// A minimal non-English fragment of a mixed-language span.
///
/// Serialized as a bare string until translated, then as
/// `{"original": ..., "translated": ...}`. A chunk whose translation failed
/// stays a bare string so a later run can retry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Chunk {
    Translated { original: String, translated: String },
    Pending(String),
}

impl Chunk {
    pub fn original(&self) -> &str {
        match self {
            Chunk::Pending(s) => s,
            Chunk::Translated { original, .. } => original,
        }
    }

    pub fn translated(&self) -> Option<&str> {
        match self {
            Chunk::Pending(_) => None,
            Chunk::Translated { translated, .. } => Some(translated),
        }
    }
}

/// A `Finding` merged across every position in one file that shares the
/// same `original_text`. `positions` is sorted ascending and deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AggregatedFinding {
    pub positions: Vec<usize>,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<Chunk>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

/// Everything extracted from one file. `map` keeps first-seen order of
/// distinct original texts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileRecord {
    pub file: String,
    pub map: Vec<AggregatedFinding>,
}

/// Outcome of translating one aggregated finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TranslateOutcome {
    /// Resolved from the cache, no backend call.
    CacheHit,
    /// Resolved by the backend.
    Translated,
    /// Normalization already produced the final text; nothing to translate.
    AlreadyEnglish,
    /// Backend call failed; `translation_input` retained for a retry run.
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PrepareSummary {
    pub files_seen: usize,
    pub files_matched: usize,
    pub files_skipped_decode: usize,
    pub files_skipped_io: usize,
    pub findings: usize,
    pub needs_translation: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TranslateSummary {
    pub items: usize,
    pub cache_hits: usize,
    pub translated: usize,
    pub already_english: usize,
    pub failed: usize,
    pub failed_chunks: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ApplySummary {
    pub files: usize,
    pub files_patched: usize,
    pub files_skipped_io: usize,
    pub replaced: usize,
    pub partial: usize,
    pub skipped_mismatch: usize,
    pub skipped_untranslated: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheBuildSummary {
    pub records: usize,
    pub rows_written: usize,
    pub skipped_untranslated: usize,
}
