//! Cache-backed translation of aggregated findings.
//!
//! The backend is a trait so the translate phase can run against the HTTP
//! service, a fixed map in tests, or nothing at all in offline mode. A
//! failure for one item never aborts the batch: the item keeps its
//! `translation_input` so a retry run can resume.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use codeloc_cache::TranslationCache;
use codeloc_core::Result;
use codeloc_domain::{AggregatedFinding, Chunk, TranslateOutcome};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no translation for {0:?}")]
    Missing(String),
    #[error("offline mode: cache miss")]
    Offline,
}

/// The external translation service. One call per unique input; the
/// output is accepted as-is.
pub trait TranslationBackend: Send + Sync {
    fn translate(&self, text: &str) -> std::result::Result<String, BackendError>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// Blocking HTTP backend with a fixed per-call timeout.
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    url: String,
    source_lang: String,
    target_lang: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(
        url: &str,
        source_lang: &str,
        target_lang: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("codeloc/cli")
            .timeout(timeout)
            .build()?;
        Ok(HttpBackend {
            client,
            url: url.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            api_key,
        })
    }
}

impl TranslationBackend for HttpBackend {
    fn translate(&self, text: &str) -> std::result::Result<String, BackendError> {
        let request = TranslateRequest {
            q: text,
            source: &self.source_lang,
            target: &self.target_lang,
            api_key: self.api_key.as_deref(),
        };
        let response = self.client.post(&self.url).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: TranslateResponse = response.json()?;
        Ok(parsed.translated_text)
    }
}

/// Backend that refuses every call; `--offline` runs resolve from the
/// cache only and record misses as failures.
pub struct OfflineBackend;

impl TranslationBackend for OfflineBackend {
    fn translate(&self, _text: &str) -> std::result::Result<String, BackendError> {
        Err(BackendError::Offline)
    }
}

/// Fixed-map backend for tests.
#[derive(Default)]
pub struct FixedBackend {
    map: HashMap<String, String>,
}

impl FixedBackend {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        FixedBackend {
            map: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TranslationBackend for FixedBackend {
    fn translate(&self, text: &str) -> std::result::Result<String, BackendError> {
        self.map
            .get(text)
            .cloned()
            .ok_or_else(|| BackendError::Missing(text.to_string()))
    }
}

/// Resolve one text through the cache, then the backend; successful
/// backend results are written back when `write_back` is set.
fn resolve(
    text: &str,
    cache: Option<&TranslationCache>,
    backend: &dyn TranslationBackend,
    write_back: bool,
) -> Result<std::result::Result<(String, bool), BackendError>> {
    if let Some(cache) = cache {
        if let Some(hit) = cache.get(text)? {
            return Ok(Ok((hit, true)));
        }
    }
    match backend.translate(text) {
        Ok(translated) => {
            if write_back {
                if let Some(cache) = cache {
                    cache.upsert(text, &translated)?;
                }
            }
            Ok(Ok((translated, false)))
        }
        Err(e) => Ok(Err(e)),
    }
}

/// Translate one aggregated finding in place.
///
/// Returns the per-item outcome; `failed_chunks` counts chunks left
/// pending on an otherwise successful item.
pub fn translate_finding(
    finding: &mut AggregatedFinding,
    cache: Option<&TranslationCache>,
    backend: &dyn TranslationBackend,
    write_back: bool,
    failed_chunks: &mut usize,
) -> Result<TranslateOutcome> {
    let Some(input) = finding.translation_input.clone().filter(|s| !s.is_empty()) else {
        return Ok(TranslateOutcome::AlreadyEnglish);
    };

    let outcome = match resolve(&input, cache, backend, write_back)? {
        Ok((translated, from_cache)) => {
            finding.translated_text = Some(translated);
            if from_cache {
                TranslateOutcome::CacheHit
            } else {
                TranslateOutcome::Translated
            }
        }
        Err(e) => {
            tracing::warn!(event = "translate_failed", input = %input, error = %e);
            TranslateOutcome::Failed
        }
    };

    if let Some(chunks) = finding.chunks.as_mut() {
        for chunk in chunks.iter_mut() {
            let original = match chunk {
                Chunk::Pending(s) => s.clone(),
                Chunk::Translated { .. } => continue,
            };
            // on whole-item failure, only the cache is consulted for
            // chunks; a retry run will hit the backend again
            let chunk_result = if outcome == TranslateOutcome::Failed {
                cache
                    .map(|c| c.get(&original))
                    .transpose()?
                    .flatten()
                    .ok_or(BackendError::Offline)
            } else {
                resolve(&original, cache, backend, write_back)?.map(|(t, _)| t)
            };
            match chunk_result {
                Ok(translated) => {
                    *chunk = Chunk::Translated {
                        original,
                        translated,
                    };
                }
                Err(e) => {
                    tracing::warn!(event = "translate_chunk_failed", chunk = %original, error = %e);
                    *failed_chunks += 1;
                }
            }
        }
    }

    Ok(outcome)
}
