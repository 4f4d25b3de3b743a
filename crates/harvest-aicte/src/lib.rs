//! AICTE approved-institution scraper
//!
//! For each state: fetch the bulk JSON index, and only when its fingerprint
//! changed since the last complete run, store the normalized records and
//! fetch every institution's detail page for its affiliated universities.
//!
//! Pipeline:
//! ```text
//! index fetch → fingerprint → fresh? stop
//!                           → stale? store index → detail loop → commit fingerprint
//! ```

pub mod config;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod runner;
pub mod state;

pub use config::{Config, Endpoints};
pub use normalize::{normalize, normalize_text};
pub use pipeline::{Outcome, Pipeline};
pub use runner::{RunSummary, run};
pub use state::{Partition, UnknownPartition};
