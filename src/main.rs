//! Audioshelf main entry point
//!
//! This is the command-line interface for the Audioshelf catalog harvester.

use anyhow::Context;
use audioshelf::config::{resolve_config, Config, ConfigOverrides};
use audioshelf::ingest::{run_ingest, CatalogQuery};
use audioshelf::logging::{init_console_logging, init_run_logging};
use audioshelf::output::render_listing;
use audioshelf::storage::{seed_from_file, SeedOutcome, SqliteStore, Store, PAGE_SIZE};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Audioshelf: a polite audiobook catalog harvester
///
/// Audioshelf pages through a library's audiobook catalog, normalizes each
/// title into a flat record, and writes the records to a JSON snapshot. The
/// snapshot can then be loaded into SQLite and browsed page by page.
#[derive(Parser, Debug)]
#[command(name = "audioshelf")]
#[command(version = "1.0.0")]
#[command(about = "A polite audiobook catalog harvester", long_about = None)]
struct Cli {
    /// Language codes to harvest (default: de en)
    #[arg(value_name = "LANGUAGE")]
    languages: Vec<String>,

    /// Media type to harvest
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    media_type: Option<String>,

    /// Path of the JSON snapshot
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Append every raw catalog item to the debug file
    #[arg(short, long)]
    debug: bool,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the first request without harvesting
    #[arg(long, conflicts_with_all = ["seed", "browse"])]
    dry_run: bool,

    /// Load the snapshot into the database (if empty) and exit
    #[arg(long, conflicts_with_all = ["dry_run", "browse"])]
    seed: bool,

    /// Print one page of the stored audiobooks and exit
    #[arg(
        long,
        value_name = "PAGE",
        num_args = 0..=1,
        default_missing_value = "1",
        conflicts_with_all = ["dry_run", "seed"]
    )]
    browse: Option<u32>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            languages: (!self.languages.is_empty()).then(|| self.languages.clone()),
            media_type: self.media_type.clone(),
            metadata_path: self.output.clone(),
            debug: self.debug,
        }
    }

    fn harvests(&self) -> bool {
        !self.dry_run && !self.seed && self.browse.is_none()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let resolved = resolve_config(cli.config.as_deref(), cli.overrides());

    // Only a harvesting run writes the run log
    let _log_guard = match &resolved {
        Ok((config, _)) if cli.harvests() => Some(
            init_run_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_path))
                .with_context(|| format!("Failed to create log file {}", config.output.log_path))?,
        ),
        _ => {
            init_console_logging(cli.verbose, cli.quiet);
            None
        }
    };

    let config = match resolved {
        Ok((config, hash)) => {
            match (&cli.config, hash) {
                (Some(path), Some(hash)) => tracing::info!(
                    "Configuration loaded from {} (hash: {})",
                    path.display(),
                    hash
                ),
                _ => tracing::debug!("Using built-in configuration"),
            }
            config
        }
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
        Ok(ExitCode::SUCCESS)
    } else if cli.seed {
        handle_seed(&config)?;
        Ok(ExitCode::SUCCESS)
    } else if let Some(page) = cli.browse {
        handle_browse(&config, page)
    } else {
        handle_ingest(&config).await
    }
}

/// Handles the --dry-run mode: validates config and shows the first request
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Audioshelf Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!("  Library: {}", config.catalog.library);
    println!("  Client id: {}", config.catalog.client_id);
    println!("  Timeout: {}s", config.catalog.timeout_secs);

    println!("\nHarvest:");
    println!("  Languages: {}", config.ingest.languages.join(", "));
    println!("  Media type: {}", config.ingest.media_type);
    println!("  Debug capture: {}", config.ingest.debug);

    println!("\nPacing:");
    println!("  Retry delay: {}ms", config.pacing.retry_delay_ms);
    println!(
        "  Politeness delay: {}ms to {}ms in {}ms steps",
        config.pacing.min_delay_ms, config.pacing.max_delay_ms, config.pacing.step_ms
    );

    println!("\nOutput:");
    println!("  Snapshot: {}", config.output.metadata_path);
    println!("  Debug items: {}", config.output.debug_path);
    println!("  Run log: {}", config.output.log_path);
    println!("  Database: {}", config.output.database_path);

    let query = CatalogQuery::new(&config.catalog, &config.ingest)?;

    println!("\n✓ Configuration is valid");
    println!("✓ First request would be: {}", query.page_url(1));

    Ok(())
}

/// Opens the database and seeds it from the snapshot when it is empty
fn open_seeded_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let db_path = Path::new(&config.output.database_path);
    let mut store = SqliteStore::new(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match seed_from_file(&mut store, Path::new(&config.output.metadata_path))? {
        SeedOutcome::AlreadyPopulated { existing } => {
            tracing::info!("Database already holds {} audiobooks.", existing)
        }
        SeedOutcome::MissingSource | SeedOutcome::Seeded { .. } => {}
    }

    Ok(store)
}

/// Handles the --seed mode
fn handle_seed(config: &Config) -> anyhow::Result<()> {
    let store = open_seeded_store(config)?;
    println!(
        "✓ {} audiobooks in {}",
        store.count_books()?,
        config.output.database_path
    );
    Ok(())
}

/// Handles the --browse mode: prints one listing page
fn handle_browse(config: &Config, page: u32) -> anyhow::Result<ExitCode> {
    if page == 0 {
        tracing::error!("Page numbers start at 1");
        return Ok(ExitCode::FAILURE);
    }

    let store = open_seeded_store(config)?;
    let listing = store.page(page, PAGE_SIZE)?;
    print!("{}", render_listing(&listing));

    Ok(ExitCode::SUCCESS)
}

/// Handles the main harvesting run
async fn handle_ingest(config: &Config) -> anyhow::Result<ExitCode> {
    tracing::info!(
        "Harvesting {} ({}) from library {}",
        config.ingest.media_type,
        config.ingest.languages.join(", "),
        config.catalog.library
    );

    let report = run_ingest(config).await.context("Harvest failed")?;

    tracing::info!(
        "Run ended after {} pages: {:?} ({} records in {}, {} field problems)",
        report.pages_completed,
        report.outcome,
        report.records,
        report.output_path.display(),
        report.field_diagnostics
    );
    if report.debug_items > 0 {
        tracing::info!(
            "Captured {} raw items to {}",
            report.debug_items,
            config.output.debug_path
        );
    }

    if report.outcome.is_fatal() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
