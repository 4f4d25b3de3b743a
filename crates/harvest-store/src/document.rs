//! Partition cache document: fingerprint, timestamp and records

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One institution. Every field is optional so the same type doubles as a
/// partial update (see [`Record::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_type: Option<String>,
    /// Affiliated universities, collected from the detail page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub universities: Option<Vec<String>>,
}

impl Record {
    /// Patch carrying only a university list.
    pub fn with_universities(universities: Vec<String>) -> Self {
        Self {
            universities: Some(universities),
            ..Self::default()
        }
    }

    /// Take every index-derived field from `index`, `None`s included.
    /// The university list belongs to the detail stage and is left alone.
    pub fn replace_index_fields(&mut self, index: Record) {
        self.name = index.name;
        self.address = index.address;
        self.district = index.district;
        self.institution_type = index.institution_type;
    }

    /// Field-level upsert: every `Some` field of `patch` overwrites ours.
    ///
    /// Returns whether anything changed.
    pub fn merge(&mut self, patch: Record) -> bool {
        fn set<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
            match value {
                Some(v) if slot.as_ref() != Some(&v) => {
                    *slot = Some(v);
                    true
                }
                _ => false,
            }
        }

        let mut changed = set(&mut self.name, patch.name);
        changed |= set(&mut self.address, patch.address);
        changed |= set(&mut self.district, patch.district);
        changed |= set(&mut self.institution_type, patch.institution_type);
        changed |= set(&mut self.universities, patch.universities);
        changed
    }
}

/// Durable state of one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDocument {
    /// Canonical partition name
    pub partition: String,
    /// Blake3 hex of the last fully processed index body
    pub fingerprint: Option<String>,
    /// When `fingerprint` was committed
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub records: BTreeMap<String, Record>,
}

impl PartitionDocument {
    pub fn empty(partition: &str) -> Self {
        Self {
            partition: partition.to_string(),
            ..Self::default()
        }
    }

    /// True unless the stored fingerprint equals `fingerprint`.
    pub fn is_stale(&self, fingerprint: &str) -> bool {
        self.fingerprint.as_deref() != Some(fingerprint)
    }

    /// Read a document. Missing or zero-length file = `None`.
    pub fn read_from(path: &Path) -> Result<Option<Self>> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        if json.trim().is_empty() {
            return Ok(None);
        }
        let doc = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(doc))
    }

    /// Overwrite `path` atomically (tmp file, then rename).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize document")?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to rename {} → {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}
