//! harvest - AICTE approved-institution scraper
//!
//! Keeps one JSON document per Indian state up to date with the AICTE
//! dashboard, re-scraping a state only when its index listing changed.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::{Config, ConfigError};
use harvest_aicte::UnknownPartition;
use harvest_core::SharedProgress;

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Change-aware scraper for AICTE approved institutions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./harvest.toml or ~/.config/harvest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Give up on a request after this many retries (default: never)
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Seconds to wait between retries
    #[arg(long, global = true)]
    retry_delay: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape all states, or one with --state
    Scrape(cmd::scrape::ScrapeArgs),
    /// Summarize the scraped documents
    Report(cmd::report::ReportArgs),
    /// Show current configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(harvest_core::ProgressContext::new());

    // Logging:
    //   TTY:     warn unless --debug, the bars show activity
    //   non-TTY: info unless --debug, logs are the only progress signal
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    harvest_core::init_logging(quiet, cli.debug, multi);

    match dispatch(cli, &progress) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn dispatch(cli: Cli, progress: &SharedProgress) -> Result<()> {
    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // CLI overrides for the [http] section
    if let Some(n) = cli.max_retries {
        config.http.max_retries = Some(n);
    }
    if let Some(secs) = cli.retry_delay {
        config.http.retry_delay = secs;
    }
    harvest_core::set_http_config(config.http.to_http_config());

    match cli.command {
        Command::Scrape(args) => cmd::scrape::run(args, &config, progress),
        Command::Report(args) => cmd::report::run(args, &config),
        Command::Config => {
            show_config(&config);
            Ok(())
        }
    }
}

/// 2 for configuration errors, 1 for everything else.
fn exit_status(e: &anyhow::Error) -> u8 {
    let is_config = e.downcast_ref::<ConfigError>().is_some()
        || e.downcast_ref::<UnknownPartition>().is_some()
        || e.downcast_ref::<toml::de::Error>().is_some();
    if is_config { 2 } else { 1 }
}

fn show_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Output directory",
        &config.output.dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Workers",
        &format!("{} (max: {})", config.workers.default, config.workers.max),
    ]);
    table.add_row(vec!["Index URL", &config.source.index_url]);
    table.add_row(vec!["Detail URL", &config.source.detail_url]);
    table.add_row(vec!["Academic year", &config.source.year]);
    table.add_row(vec![
        "Request timeout",
        &format!("{}s", config.http.request_timeout),
    ]);
    table.add_row(vec![
        "Connect timeout",
        &format!("{}s", config.http.connect_timeout),
    ]);
    table.add_row(vec!["Retry delay", &format!("{}s", config.http.retry_delay)]);
    table.add_row(vec![
        "Max retries",
        &config
            .http
            .max_retries
            .map_or("unbounded".to_string(), |n| n.to_string()),
    ]);

    eprintln!("\n{table}");
}
