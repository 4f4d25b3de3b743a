//! `harvest report` - summarize the documents in an output directory

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{
    Cell, CellAlignment, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

use harvest_aicte::Partition;
use harvest_core::fmt_num;
use harvest_store::{CacheStore, short_hash};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output directory to read (default: from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// One state's line in the report
#[derive(Debug, PartialEq, Eq)]
struct Row {
    state: &'static str,
    /// `None` = no document yet
    records: Option<usize>,
    with_universities: usize,
    updated_at: Option<String>,
    fingerprint: Option<String>,
}

pub fn run(args: ReportArgs, config: &Config) -> Result<()> {
    let dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    let store = CacheStore::new(&dir)?;
    let rows = collect(&store)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("State").fg(Color::Cyan),
            Cell::new("Records").fg(Color::Cyan),
            Cell::new("Universities").fg(Color::Cyan),
            Cell::new("Updated").fg(Color::Cyan),
            Cell::new("Fingerprint").fg(Color::Cyan),
        ]);

    let mut total = 0;
    let mut scraped = 0;
    for row in &rows {
        let Some(records) = row.records else {
            table.add_row(vec![
                Cell::new(row.state).fg(Color::DarkGrey),
                Cell::new("-").fg(Color::DarkGrey),
                Cell::new("-").fg(Color::DarkGrey),
                Cell::new("never").fg(Color::DarkGrey),
                Cell::new("-").fg(Color::DarkGrey),
            ]);
            continue;
        };
        total += records;
        scraped += 1;

        let updated = match &row.updated_at {
            Some(t) => Cell::new(t),
            None => Cell::new("incomplete").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(row.state),
            Cell::new(fmt_num(records)).set_alignment(CellAlignment::Right),
            Cell::new(fmt_num(row.with_universities)).set_alignment(CellAlignment::Right),
            updated,
            Cell::new(row.fingerprint.as_deref().unwrap_or("-")),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} records in {scraped}/{} states ({})",
        fmt_num(total),
        rows.len(),
        dir.display()
    );
    Ok(())
}

/// Read every state's document. Files under the root that belong to no
/// known state, and documents that fail to parse, are reported and skipped.
fn collect(store: &CacheStore) -> Result<Vec<Row>> {
    let partitions = Partition::all();

    for key in store.list_keys()? {
        if !partitions.iter().any(|p| p.storage_key() == key) {
            log::warn!("Ignoring {key}.json: not a known state");
        }
    }

    let mut rows = Vec::with_capacity(partitions.len());
    for partition in partitions {
        let name = partition.name();
        if !store.exists(name) {
            rows.push(Row {
                state: name,
                records: None,
                with_universities: 0,
                updated_at: None,
                fingerprint: None,
            });
            continue;
        }
        let doc = match store.load(name) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Skipping {name}: {e:#}");
                continue;
            }
        };
        rows.push(Row {
            state: name,
            records: Some(doc.records.len()),
            with_universities: doc
                .records
                .values()
                .filter(|r| r.universities.as_ref().is_some_and(|u| !u.is_empty()))
                .count(),
            updated_at: doc
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string()),
            fingerprint: doc.fingerprint.as_deref().map(|fp| short_hash(fp).to_string()),
        });
    }
    Ok(rows)
}
