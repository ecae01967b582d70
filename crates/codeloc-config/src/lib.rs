use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodelocConfig {
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub backend: Option<BackendCfg>,
    pub prepare: Option<PrepareCfg>,
    pub translate: Option<TranslateCfg>,
    pub apply: Option<ApplyCfg>,
    pub cache: Option<CacheCfg>,
    pub schema: Option<SchemaCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendCfg {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrepareCfg {
    pub workers: Option<usize>,
    pub extra_text_extensions: Option<Vec<String>>, // extensions scanned as plain text
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateCfg {
    pub workers: Option<usize>,
    pub write_back: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyCfg {
    pub partial_chunks: Option<bool>,
    pub backup: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheCfg {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaCfg {
    pub out_dir: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Other(String),
}

/// Load and merge configuration.
/// Search order: CWD/codeloc.toml, then $CONFIG_DIR/codeloc/codeloc.toml;
/// earlier files win field by field.
pub fn load_config() -> Result<CodelocConfig, ConfigError> {
    let mut merged = CodelocConfig::default();
    if let Ok(p) = std::env::current_dir() {
        let path = p.join("codeloc.toml");
        if let Ok(s) = std::fs::read_to_string(&path) {
            if let Ok(cfg) = toml::from_str::<CodelocConfig>(&s) {
                merged = merge(merged, cfg);
            }
        }
    }
    if let Some(base) = dirs::config_dir() {
        let path = base.join("codeloc").join("codeloc.toml");
        if let Ok(s) = std::fs::read_to_string(&path) {
            if let Ok(cfg) = toml::from_str::<CodelocConfig>(&s) {
                merged = merge(merged, cfg);
            }
        }
    }
    Ok(merged)
}

fn merge(mut a: CodelocConfig, b: CodelocConfig) -> CodelocConfig {
    if a.source_lang.is_none() {
        a.source_lang = b.source_lang;
    }
    if a.target_lang.is_none() {
        a.target_lang = b.target_lang;
    }
    a.backend = merge_opt(a.backend, b.backend, merge_backend);
    a.prepare = merge_opt(a.prepare, b.prepare, merge_prepare);
    a.translate = merge_opt(a.translate, b.translate, merge_translate);
    a.apply = merge_opt(a.apply, b.apply, merge_apply);
    a.cache = merge_opt(a.cache, b.cache, merge_cache);
    a.schema = merge_opt(a.schema, b.schema, merge_schema);
    a
}

fn merge_opt<T: Default>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (None, Some(b)) => Some(b),
        (Some(a), None) => Some(a),
        (None, None) => None,
    }
}

fn merge_backend(mut a: BackendCfg, b: BackendCfg) -> BackendCfg {
    if a.url.is_none() {
        a.url = b.url;
    }
    if a.api_key.is_none() {
        a.api_key = b.api_key;
    }
    if a.timeout_secs.is_none() {
        a.timeout_secs = b.timeout_secs;
    }
    a
}
fn merge_prepare(mut a: PrepareCfg, b: PrepareCfg) -> PrepareCfg {
    if a.workers.is_none() {
        a.workers = b.workers;
    }
    if a.extra_text_extensions.is_none() {
        a.extra_text_extensions = b.extra_text_extensions;
    }
    a
}
fn merge_translate(mut a: TranslateCfg, b: TranslateCfg) -> TranslateCfg {
    if a.workers.is_none() {
        a.workers = b.workers;
    }
    if a.write_back.is_none() {
        a.write_back = b.write_back;
    }
    a
}
fn merge_apply(mut a: ApplyCfg, b: ApplyCfg) -> ApplyCfg {
    if a.partial_chunks.is_none() {
        a.partial_chunks = b.partial_chunks;
    }
    if a.backup.is_none() {
        a.backup = b.backup;
    }
    a
}
fn merge_cache(mut a: CacheCfg, b: CacheCfg) -> CacheCfg {
    if a.path.is_none() {
        a.path = b.path;
    }
    a
}
fn merge_schema(mut a: SchemaCfg, b: SchemaCfg) -> SchemaCfg {
    if a.out_dir.is_none() {
        a.out_dir = b.out_dir;
    }
    a
}
