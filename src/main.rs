//! urldb main entry point
//!
//! This is the command-line maintenance tool for urldb history and cookie
//! files.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use urldb::config::{load_config_with_hash, Config};
use urldb::output::{format_entry, print_statistics, write_dump};
use urldb::storage::{stamp_mismatch, stamp_path, write_stamp};
use urldb::UrlDb;

/// urldb: inspect and maintain a URL and cookie database
///
/// Loads the history and cookie files named in the configuration, then
/// reports on them or rewrites them without their expired entries.
#[derive(Parser, Debug)]
#[command(name = "urldb")]
#[command(version = "1.0.0")]
#[command(about = "Inspect and maintain a URL and cookie database", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics and exit (default)
    #[arg(long, conflicts_with_all = ["list", "search", "cookies", "compact", "dump"])]
    stats: bool,

    /// List every URL in the database
    #[arg(long, conflicts_with_all = ["stats", "search", "cookies", "compact", "dump"])]
    list: bool,

    /// List URLs matching a partially typed address
    #[arg(long, value_name = "PREFIX", conflicts_with_all = ["stats", "list", "cookies", "compact", "dump"])]
    search: Option<String>,

    /// Print the Cookie header that would be sent to a URL
    #[arg(long, value_name = "URL", conflicts_with_all = ["stats", "list", "search", "compact", "dump"])]
    cookies: Option<String>,

    /// Rewrite the files, dropping expired URLs and cookies
    #[arg(long, conflicts_with_all = ["stats", "list", "search", "cookies", "dump"])]
    compact: bool,

    /// Print the host, path and index structure
    #[arg(long, conflicts_with_all = ["stats", "list", "search", "cookies", "compact"])]
    dump: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    check_config_stamp(&config, &hash);

    let mut db = UrlDb::open(&config).context("Failed to open database")?;

    // Handle different modes
    if cli.list {
        handle_list(&db);
    } else if let Some(prefix) = &cli.search {
        handle_search(&db, prefix);
    } else if let Some(url) = &cli.cookies {
        handle_cookies(&mut db, url);
    } else if cli.compact {
        handle_compact(&db, &config, &hash)?;
    } else if cli.dump {
        write_dump(&mut std::io::stdout().lock(), &db).context("Failed to write dump")?;
    } else {
        print_statistics(&db.statistics());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("urldb=info,warn"),
            1 => EnvFilter::new("urldb=debug,info"),
            2 => EnvFilter::new("urldb=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --list mode: prints every URL
fn handle_list(db: &UrlDb) {
    let mut count = 0;
    for entry in db.entries() {
        println!("{}", format_entry(&entry));
        count += 1;
    }
    tracing::info!("Listed {} URLs", count);
}

/// Handles the --search mode: prints URLs matching a prefix
fn handle_search(db: &UrlDb, prefix: &str) {
    let mut count = 0;
    for entry in db.partial_entries(prefix) {
        println!("{}", format_entry(&entry));
        count += 1;
    }
    tracing::info!("{} URLs match {:?}", count, prefix);
}

/// Handles the --cookies mode: prints the Cookie header for a URL
fn handle_cookies(db: &mut UrlDb, url: &str) {
    match db.get_cookie(url) {
        Some(header) => println!("Cookie: {}", header),
        None => println!("No cookies for {}", url),
    }
}

/// Warns when the configuration differs from the one the files were last
/// compacted with
fn check_config_stamp(config: &Config, hash: &str) {
    let history = Path::new(&config.history.file_path);
    match stamp_mismatch(history, hash) {
        Ok(Some(previous)) => tracing::warn!(
            "Configuration changed since the last compaction (was {}, now {})",
            previous,
            hash
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!("Unable to read {}: {}", stamp_path(history).display(), e),
    }
}

/// Handles the --compact mode: rewrites both files and records the
/// configuration hash they were written with
fn handle_compact(db: &UrlDb, config: &Config, hash: &str) -> Result<()> {
    let history = Path::new(&config.history.file_path);
    let urls = db
        .save(history)
        .with_context(|| format!("Failed to save history {}", history.display()))?;
    println!("✓ Wrote {} URLs to {}", urls, history.display());

    if let Some(cookies) = &config.cookies {
        let path = Path::new(&cookies.file_path);
        let count = db
            .save_cookies(path)
            .with_context(|| format!("Failed to save cookies {}", path.display()))?;
        println!("✓ Wrote {} cookies to {}", count, path.display());
    }

    write_stamp(history, hash)
        .with_context(|| format!("Failed to record configuration hash for {}", history.display()))?;

    Ok(())
}
