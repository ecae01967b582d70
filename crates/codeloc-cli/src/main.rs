use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[macro_use]
mod ui;
mod commands;

#[derive(Parser)]
#[command(
    name = "codeloc",
    version,
    about = "Source tree localization pipeline: extract, translate, patch back"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and write the intermediate translation map
    Prepare {
        #[arg(short, long)]
        root: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Also scan paths the ignore rule would skip
        #[arg(long, default_value_t = false)]
        include_ignored: bool,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Translate a prepared map through the cache and the backend
    Translate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Translation cache database (created when missing)
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Resolve from the cache only; misses are recorded as failures
        #[arg(long, default_value_t = false)]
        offline: bool,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Patch translated text back into the source files
    Apply {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, default_value_t = false)]
        backup: bool,
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Bulk-load the translation cache from a translated map
    BuildCache {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        cache: PathBuf,
    },

    /// Dump JSON Schemas for the record types
    Schema {
        #[arg(long, default_value = "")]
        out_dir: PathBuf,
    },
}

trait Runnable {
    fn run(self, use_color: bool) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, use_color: bool) -> Result<()> {
        let cmd_name = format!("{:?}", self);
        info!(event = "command_start", command = %cmd_name);

        let result = match self {
            Commands::Prepare {
                root,
                out,
                include_ignored,
                workers,
                format,
            } => commands::prepare::run_prepare(root, out, include_ignored, workers, format),
            Commands::Translate {
                input,
                out,
                cache,
                offline,
                workers,
                format,
            } => commands::translate::run_translate(
                input, out, cache, offline, workers, format, use_color,
            ),
            Commands::Apply {
                input,
                dry_run,
                backup,
                format,
            } => commands::apply::run_apply(input, dry_run, backup, format),
            Commands::BuildCache { input, cache } => {
                commands::build_cache::run_build_cache(input, cache)
            }
            Commands::Schema { out_dir } => commands::schema::run_schema(out_dir),
        };

        match &result {
            Ok(_) => info!(event = "command_finished", command = %cmd_name),
            Err(e) => error!(event = "command_failed", command = %cmd_name, error = ?e),
        }

        result
    }
}

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily("logs", "codeloc.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = init_tracing();

    let cli = Cli::parse();

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    cli.cmd.run(use_color)
}
