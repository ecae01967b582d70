use std::fs;

pub fn run_schema(out_dir: std::path::PathBuf) -> color_eyre::Result<()> {
    let cfg = codeloc_config::load_config().unwrap_or_default();
    let out_dir = if out_dir.as_os_str().is_empty() {
        std::path::PathBuf::from(
            cfg.schema
                .and_then(|s| s.out_dir)
                .unwrap_or_else(|| "./docs/schemas".to_string()),
        )
    } else {
        out_dir
    };
    fs::create_dir_all(&out_dir)?;
    macro_rules! dump {
        ($ty:ty, $name:literal) => {{
            let schema = schemars::schema_for!($ty);
            let path = out_dir.join($name);
            let f = std::fs::File::create(&path)?;
            serde_json::to_writer_pretty(f, &schema)?;
        }};
    }
    dump!(codeloc_domain::FileRecord, "file_record.schema.json");
    dump!(
        codeloc_domain::AggregatedFinding,
        "aggregated_finding.schema.json"
    );
    dump!(codeloc_domain::PrepareSummary, "prepare_summary.schema.json");
    dump!(
        codeloc_domain::TranslateSummary,
        "translate_summary.schema.json"
    );
    dump!(codeloc_domain::ApplySummary, "apply_summary.schema.json");
    ui_ok!(
        "schemas (v{}) dumped to {}",
        codeloc_domain::SCHEMA_VERSION,
        out_dir.display()
    );
    Ok(())
}
