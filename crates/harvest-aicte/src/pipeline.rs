//! Per-partition ingestion: index → staleness gate → details → fingerprint

use anyhow::{Context, Result};
use harvest_core::{Fetcher, Transport, upgrade_to_bar};
use harvest_store::{CacheStore, Record, fingerprint, short_hash};
use indicatif::ProgressBar;

use crate::config::Endpoints;
use crate::extract::{parse_index, parse_universities};
use crate::state::Partition;

/// Detail-loop progress is logged every this many records.
pub const PROGRESS_EVERY: usize = 10;

/// How a partition run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Index body unchanged since the last complete run; nothing written.
    Fresh,
    /// Index changed (or first run); every record was re-derived.
    Refreshed { records: usize },
}

/// Runs one partition against a store.
///
/// The fingerprint is written last. Any error before that leaves the
/// previous fingerprint in place, so the next run sees the partition as
/// stale and redoes it from the index.
pub struct Pipeline<'a, T> {
    fetcher: &'a Fetcher<T>,
    store: &'a CacheStore,
    endpoints: &'a Endpoints,
}

impl<'a, T: Transport> Pipeline<'a, T> {
    pub fn new(fetcher: &'a Fetcher<T>, store: &'a CacheStore, endpoints: &'a Endpoints) -> Self {
        Self {
            fetcher,
            store,
            endpoints,
        }
    }

    pub fn run(&self, partition: Partition, pb: &ProgressBar) -> Result<Outcome> {
        let code = partition.log_code();
        let name = partition.name();

        pb.set_message("fetching index...");
        let url = self.endpoints.index_url(partition)?;
        let body = self
            .fetcher
            .fetch(&url, &code)
            .with_context(|| format!("failed to fetch index for {name}"))?;
        let fp = fingerprint(&body);

        self.store.ensure_exists(name)?;
        if !self.store.is_stale(name, &fp)? {
            log::info!("[{code}] Cache is fresh ({}), skipping", short_hash(&fp));
            return Ok(Outcome::Fresh);
        }
        log::info!("[{code}] Cache is stale, refreshing ({})", short_hash(&fp));

        self.store_index(partition, &body)?;
        let records = self.fetch_details(partition, pb)?;

        self.store.update_fingerprint(name, &fp)?;
        log::info!("[{code}] Done: {records} records");
        Ok(Outcome::Refreshed { records })
    }

    fn store_index(&self, partition: Partition, body: &[u8]) -> Result<()> {
        let code = partition.log_code();
        let parsed =
            parse_index(body).with_context(|| format!("bad index body for {partition}"))?;
        if parsed.skipped > 0 {
            log::warn!("[{code}] Skipped {} index rows without an id", parsed.skipped);
        }
        log::info!("[{code}] Storing {} records", parsed.records.len());
        self.store.replace_records(partition.name(), parsed.records)
    }

    /// Fetch and merge the detail page of every stored record.
    fn fetch_details(&self, partition: Partition, pb: &ProgressBar) -> Result<usize> {
        let code = partition.log_code();
        let name = partition.name();
        let ids: Vec<String> = self.store.load(name)?.records.into_keys().collect();
        let total = ids.len();

        upgrade_to_bar(pb, total as u64);
        pb.set_message("details");

        for (i, id) in ids.iter().enumerate() {
            let url = self.endpoints.detail_url(id)?;
            let body = self
                .fetcher
                .fetch(&url, &code)
                .with_context(|| format!("failed to fetch details of {id} in {name}"))?;
            let universities = parse_universities(&String::from_utf8_lossy(&body));
            self.store
                .merge_record(name, id, Record::with_universities(universities))?;

            let done = i + 1;
            pb.inc(1);
            if done % PROGRESS_EVERY == 0 {
                log::info!("[{code}] {done}/{total} records");
            }
        }
        Ok(total)
    }
}
