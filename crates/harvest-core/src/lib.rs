//! Harvest Core - common infrastructure for partitioned scrape pipelines
//!
//! Provides the blocking HTTP transport, the wait-and-retry fetcher, the
//! claim-once work queue, logging and progress reporting.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod work_queue;

// Re-exports for convenience
pub use error::FetchError;
pub use http::{HttpConfig, HttpTransport, Transport, http_config, set_http_config};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num, upgrade_to_bar};
pub use retry::{Fetcher, RetryPolicy};
pub use work_queue::WorkQueue;
