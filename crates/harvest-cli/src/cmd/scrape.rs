//! `harvest scrape` - refresh the per-state documents

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use harvest_aicte::{Partition, RunSummary, UnknownPartition};
use harvest_core::{HttpTransport, RetryPolicy, SharedProgress, fmt_num, http_config};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Scrape a single state (default: all)
    #[arg(short, long, value_parser = parse_state)]
    pub state: Option<Partition>,

    /// Number of states processed in parallel
    #[arg(short, long)]
    pub processes: Option<usize>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_state(s: &str) -> Result<Partition, UnknownPartition> {
    Partition::parse(s)
}

pub fn run(args: ScrapeArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let workers = config.workers.resolve(args.processes)?;
    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());

    let aicte_config = harvest_aicte::Config {
        output_dir: output_dir.clone(),
        workers,
        partition: args.state,
        endpoints: config.source.endpoints(),
        retry: RetryPolicy::from_config(http_config()),
    };

    log::info!("Scraping AICTE approved institutions ({})", aicte_config.endpoints.year);
    log::info!("  States: {}", args.state.map_or("all".to_string(), |p| p.to_string()));
    log::info!("  Output: {}", output_dir.display());

    let summary = harvest_aicte::run(&aicte_config, HttpTransport, progress)?;
    print_summary(&summary);

    if !summary.is_success() {
        bail!("{} of {} states failed", summary.failed, summary.total);
    }
    Ok(())
}

/// Print a key-value summary table on stderr
fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Scrape").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let failed = if summary.failed > 0 {
        Cell::new(summary.failed).fg(Color::Red)
    } else {
        Cell::new(summary.failed)
    };
    table.add_row(vec![Cell::new("States"), Cell::new(summary.total)]);
    table.add_row(vec![Cell::new("Unchanged"), Cell::new(summary.fresh)]);
    table.add_row(vec![Cell::new("Refreshed"), Cell::new(summary.refreshed)]);
    table.add_row(vec![Cell::new("Failed"), failed]);
    table.add_row(vec![Cell::new("Records"), Cell::new(fmt_num(summary.records))]);
    table.add_row(vec![
        Cell::new("Time"),
        Cell::new(format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ]);
    eprintln!("\n{table}");
}
