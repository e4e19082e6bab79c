//! prodtax: classify documents and build retrieval filters from the command line.
//!
//! JSON results go to stdout; logs go to stderr (or a file) so the output
//! can be piped.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use prodtax_classify::defaults::{LOG_FILE_NAME, LOG_FILTER};
use prodtax_classify::Taxonomy;
use prodtax_cli::{
    classify_paths, collect_paths, fallback_collection, render_classified, render_filter,
    render_taxonomy, FilterFormat,
};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "prodtax")]
#[command(author, version)]
#[command(about = "Product taxonomy classification for RAG ingestion and retrieval")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify documents and print their taxonomy tags
    Classify {
        /// Files or directories to classify
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// Collection name (default: each file's parent directory name)
        #[arg(short, long)]
        collection: Option<String>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Print flattened vector-store metadata instead of full tags
        #[arg(short, long)]
        metadata: bool,
    },

    /// Build the retrieval pre-filter for a query
    Filter {
        /// Query text (multiple words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "expr")]
        format: FilterFormat,
    },

    /// Print the built-in taxonomy vocabulary
    Taxonomy,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _guard = init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let taxonomy = Taxonomy::shared();

    match cli.command {
        Commands::Classify {
            paths,
            collection,
            recursive,
            metadata,
        } => {
            let files = collect_paths(&paths, recursive)?;
            let fallback = fallback_collection();
            let classified =
                classify_paths(taxonomy, &files, collection.as_deref(), &fallback)?;
            println!("{}", render_classified(&classified, metadata)?);
        }
        Commands::Filter { query, format } => {
            println!("{}", render_filter(taxonomy, &query.join(" "), format)?);
        }
        Commands::Taxonomy => {
            println!("{}", render_taxonomy(taxonomy)?);
        }
    }

    Ok(())
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: prodtax crates at info)
fn init_tracing() -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(LOG_FILE_NAME);
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // stdout carries command output
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    debug!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );

    guard
}
