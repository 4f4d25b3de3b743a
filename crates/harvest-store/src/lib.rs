//! harvest-store: change-aware per-partition cache
//!
//! Each partition owns one JSON document holding its records and the
//! blake3 fingerprint of the index body they were derived from. The
//! fingerprint is committed last, so an interrupted run leaves the previous
//! fingerprint in place and the next run redoes the partition.

pub mod document;
pub mod hash;
pub mod store;

pub use document::{PartitionDocument, Record};
pub use hash::{fingerprint, short_hash};
pub use store::{CacheStore, UnknownRecord, storage_key};
