//! # Inquiry Search CLI (`inq`)
//!
//! ```bash
//! inq --config ./config/inq.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `inq serve` | Start the HTTP server (cleans the upload dir first) |
//! | `inq ingest <file>` | Copy a CSV into the upload store |
//! | `inq search "<keywords>"` | One-shot similarity search |
//! | `inq categories` | List distinct category values |

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use inquiry_search::cache::DataCache;
use inquiry_search::config;
use inquiry_search::ingest;
use inquiry_search::search;
use inquiry_search::server;

/// Inquiry Search — similarity search over uploaded support-inquiry
/// datasets.
#[derive(Parser)]
#[command(
    name = "inq",
    about = "Similarity search over uploaded support-inquiry datasets",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/inq.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves the upload, categories, and
    /// search endpoints. Leftover uploads from a previous run are removed
    /// at startup, since the in-memory cache does not survive restarts.
    Serve,

    /// Copy a CSV file into the upload store.
    ///
    /// The CLI equivalent of `POST /api/upload`: the file becomes the
    /// newest upload and therefore the active dataset.
    Ingest {
        /// Path to the CSV file to ingest.
        file: PathBuf,
    },

    /// Run a one-shot similarity search against the active dataset.
    Search {
        /// Free-text query.
        keywords: String,

        /// Restrict to one category value (exact match). Omit or pass
        /// "all" to search the whole dataset.
        #[arg(long)]
        category: Option<String>,

        /// Maximum number of results to print.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List the distinct category values of the active dataset.
    Categories,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("INQ_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cfg = config::load_config(&cli.config);
    let cache = Arc::new(DataCache::new(
        cfg.storage.upload_dir.clone(),
        cfg.search.columns.clone(),
    ));

    match cli.command {
        Commands::Serve => {
            ingest::clean_uploads(&cfg.storage.upload_dir)?;
            server::run_server(&cfg.server.bind, cache).await?;
        }
        Commands::Ingest { file } => {
            let bytes = std::fs::read(&file)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.csv".to_string());
            let path = ingest::save_upload(&cfg.storage.upload_dir, &name, &bytes)?;
            cache.invalidate();
            println!("ingested {}", path.display());
        }
        Commands::Search {
            keywords,
            category,
            limit,
        } => {
            let results = search::run_search(&cache, &keywords, category.as_deref())?;
            if results.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, result) in results.iter().take(limit).enumerate() {
                println!("{}. [{:.3}]", i + 1, result.similarity);
                for (name, value) in &result.fields {
                    println!("    {}: {}", name, display_value(value));
                }
            }
        }
        Commands::Categories => {
            let categories = search::list_categories(&cache)?;
            if categories.is_empty() {
                println!("No dataset uploaded.");
            } else {
                for category in categories {
                    println!("{}", category);
                }
            }
        }
    }

    Ok(())
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
