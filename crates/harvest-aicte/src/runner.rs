//! Orchestration over the partition set

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use harvest_core::{Fetcher, ProgressContext, Transport, WorkQueue, fmt_num};
use harvest_store::CacheStore;

use crate::config::Config;
use crate::pipeline::{Outcome, Pipeline};

/// Run the pipeline over every selected partition.
///
/// Partitions are handed out through a [`WorkQueue`] to `config.workers`
/// threads, so no partition is ever processed twice at once. A partition that
/// fails is logged and counted; the others still run.
pub fn run<T: Transport>(
    config: &Config,
    transport: T,
    progress: &ProgressContext,
) -> Result<RunSummary> {
    ensure!(config.workers >= 1, "worker count must be at least 1");
    let start = Instant::now();

    let partitions = config.partitions();
    if partitions.is_empty() {
        log::warn!("No partitions to process");
        return Ok(RunSummary::empty());
    }

    let store = CacheStore::new(&config.output_dir)?;
    let fetcher = Fetcher::new(transport, config.retry);
    let pipeline = Pipeline::new(&fetcher, &store, &config.endpoints);

    let workers = config.workers.min(partitions.len());
    log::info!(
        "Processing {} partitions with {} workers into {}",
        partitions.len(),
        workers,
        config.output_dir.display()
    );

    let queue = WorkQueue::new(partitions);
    let overall_pb = progress.overall_bar(queue.total());

    let fresh = AtomicUsize::new(0);
    let refreshed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let records = AtomicUsize::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("harvest-worker-{i}"))
        .build()
        .context("failed to build worker pool")?;

    pool.scope(|s| {
        for _ in 0..workers {
            s.spawn(|_| {
                while let Some(&partition) = queue.next() {
                    let code = partition.log_code();
                    let pb = progress.partition_bar(&code);

                    match pipeline.run(partition, &pb) {
                        Ok(Outcome::Fresh) => {
                            fresh.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(Outcome::Refreshed { records: n }) => {
                            refreshed.fetch_add(1, Ordering::Relaxed);
                            records.fetch_add(n, Ordering::Relaxed);
                        }
                        Err(e) => {
                            log::error!("[{code}] Failed: {e:#}");
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    pb.finish_and_clear();
                    overall_pb.inc(1);
                }
            });
        }
    });

    overall_pb.finish_and_clear();

    let summary = RunSummary {
        total: queue.total(),
        fresh: fresh.into_inner(),
        refreshed: refreshed.into_inner(),
        failed: failed.into_inner(),
        records: records.into_inner(),
        elapsed: start.elapsed(),
    };
    summary.log();
    Ok(summary)
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Unchanged since the last complete run
    pub fresh: usize,
    pub refreshed: usize,
    pub failed: usize,
    /// Records re-derived across refreshed partitions
    pub records: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            fresh: 0,
            refreshed: 0,
            failed: 0,
            records: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn log(&self) {
        log::info!("=== Harvest Summary ===");
        log::info!(
            "Partitions: {}/{} completed ({} fresh, {} refreshed, {} failed)",
            self.fresh + self.refreshed,
            self.total,
            self.fresh,
            self.refreshed,
            self.failed
        );
        log::info!("Records: {} refreshed", fmt_num(self.records));
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::{FetchError, RetryPolicy};

    struct Offline;

    impl Transport for Offline {
        fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Http {
                status: None,
                message: format!("offline: {url}"),
            })
        }
    }

    #[test]
    fn run_summary_empty() {
        let summary = RunSummary::empty();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.elapsed, Duration::ZERO);
        assert!(summary.is_success());
    }

    #[test]
    fn run_summary_log_does_not_panic() {
        let summary = RunSummary {
            total: 35,
            fresh: 30,
            refreshed: 4,
            failed: 1,
            records: 12_345,
            elapsed: Duration::from_secs(90),
        };
        summary.log();
        assert!(!summary.is_success());
    }

    #[test]
    fn zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            workers: 0,
            ..Config::default()
        };
        assert!(run(&config, Offline, &ProgressContext::hidden()).is_err());
    }

    #[test]
    fn failures_are_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            workers: 3,
            retry: RetryPolicy {
                delay: Duration::ZERO,
                max_retries: Some(0),
            },
            ..Config::default()
        };
        let summary = run(&config, Offline, &ProgressContext::hidden()).unwrap();
        assert_eq!(summary.total, 35);
        assert_eq!(summary.failed, 35);
        assert_eq!(summary.refreshed, 0);
    }
}
