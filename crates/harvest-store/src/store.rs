//! Per-partition cache store
//!
//! Directory layout:
//! ```text
//! {root}/
//! ├── andhra_pradesh.json
//! ├── tamil_nadu.json
//! └── ...
//! ```
//!
//! Every operation is a full read-modify-write of one document. Nothing is
//! cached in memory between calls, so separate workers sharing the root
//! never see stale state as long as each partition has a single writer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::document::{PartitionDocument, Record};

/// `merge_record` was called for an id the index stage never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecord {
    pub partition: String,
    pub id: String,
}

impl std::fmt::Display for UnknownRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {} not present in {} (index stage must run first)",
            self.id, self.partition
        )
    }
}

impl std::error::Error for UnknownRecord {}

/// Storage key for a partition: lower-case words joined by `_`.
///
/// `"Andaman and Nicobar Islands"` → `"andaman_and_nicobar_islands"`.
pub fn storage_key(partition: &str) -> String {
    partition
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Cache store rooted at a directory, one JSON document per partition.
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("failed to create store dir: {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, partition: &str) -> PathBuf {
        self.root.join(format!("{}.json", storage_key(partition)))
    }

    pub fn exists(&self, partition: &str) -> bool {
        self.document_path(partition).exists()
    }

    /// Read the partition's document, or an empty one if absent.
    pub fn load(&self, partition: &str) -> Result<PartitionDocument> {
        let doc = PartitionDocument::read_from(&self.document_path(partition))?;
        Ok(doc.unwrap_or_else(|| PartitionDocument::empty(partition)))
    }

    fn save(&self, doc: &PartitionDocument) -> Result<()> {
        doc.write_to(&self.document_path(&doc.partition))
    }

    /// Create an empty document if none exists. Idempotent.
    pub fn ensure_exists(&self, partition: &str) -> Result<()> {
        if self.exists(partition) {
            return Ok(());
        }
        log::debug!("creating empty document for {partition}");
        self.save(&PartitionDocument::empty(partition))
    }

    /// True if no document exists yet or its fingerprint differs.
    pub fn is_stale(&self, partition: &str, fingerprint: &str) -> Result<bool> {
        Ok(self.load(partition)?.is_stale(fingerprint))
    }

    /// Store a freshly parsed index, one record per id.
    ///
    /// Index fields of each listed id are replaced; detail fields already on
    /// disk are kept until the detail stage rewrites them. Ids missing from
    /// `records` stay in the document untouched: upstream absence never
    /// deletes. Fingerprint and timestamp are kept.
    pub fn replace_records(&self, partition: &str, records: BTreeMap<String, Record>) -> Result<()> {
        let mut doc = self.load(partition)?;
        for (id, record) in records {
            doc.records.entry(id).or_default().replace_index_fields(record);
        }
        self.save(&doc)
    }

    /// Upsert fields of an existing record.
    ///
    /// Fails with [`UnknownRecord`] if `id` was not established by
    /// [`replace_records`](Self::replace_records). Skips the write when the
    /// patch changes nothing.
    pub fn merge_record(&self, partition: &str, id: &str, patch: Record) -> Result<()> {
        let mut doc = self.load(partition)?;
        let Some(record) = doc.records.get_mut(id) else {
            return Err(UnknownRecord {
                partition: partition.to_string(),
                id: id.to_string(),
            }
            .into());
        };
        if record.merge(patch) {
            self.save(&doc)?;
        }
        Ok(())
    }

    /// Commit a new fingerprint with the current time. Must be the last write of a run.
    pub fn update_fingerprint(&self, partition: &str, fingerprint: &str) -> Result<()> {
        let mut doc = self.load(partition)?;
        doc.fingerprint = Some(fingerprint.to_string());
        doc.updated_at = Some(chrono::Utc::now());
        self.save(&doc)
    }

    /// Storage keys of all documents under the root, sorted.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let pattern = self.root.join("*.json");
        let pattern_str = pattern.to_string_lossy();

        let mut keys: Vec<String> = glob::glob(&pattern_str)
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file())
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOA: &str = "Goa";

    fn record(name: &str) -> Record {
        Record {
            name: Some(name.to_string()),
            ..Record::default()
        }
    }

    fn index(ids: &[&str]) -> BTreeMap<String, Record> {
        ids.iter()
            .map(|id| (id.to_string(), record(&format!("College {id}"))))
            .collect()
    }

    fn store() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(&dir.path().join("output")).unwrap();
        (dir, store)
    }

    #[test]
    fn storage_key_examples() {
        assert_eq!(storage_key("Goa"), "goa");
        assert_eq!(storage_key("Tamil Nadu"), "tamil_nadu");
        assert_eq!(
            storage_key("Andaman and Nicobar Islands"),
            "andaman_and_nicobar_islands"
        );
        assert_eq!(storage_key("  Jammu   and Kashmir "), "jammu_and_kashmir");
    }

    #[test]
    fn new_creates_root() {
        let (dir, _store) = store();
        assert!(dir.path().join("output").is_dir());
    }

    #[test]
    fn ensure_exists_idempotent() {
        let (_dir, store) = store();
        assert!(!store.exists(GOA));
        store.ensure_exists(GOA).unwrap();
        assert!(store.exists(GOA));

        store.replace_records(GOA, index(&["1"])).unwrap();
        store.ensure_exists(GOA).unwrap();
        assert_eq!(store.load(GOA).unwrap().records.len(), 1);
    }

    #[test]
    fn missing_document_is_stale() {
        let (_dir, store) = store();
        assert!(store.is_stale(GOA, "abc").unwrap());
        store.ensure_exists(GOA).unwrap();
        assert!(store.is_stale(GOA, "abc").unwrap());
    }

    #[test]
    fn fingerprint_roundtrip() {
        let (_dir, store) = store();
        store.ensure_exists(GOA).unwrap();
        store.update_fingerprint(GOA, "abc").unwrap();
        assert!(!store.is_stale(GOA, "abc").unwrap());
        assert!(store.is_stale(GOA, "abd").unwrap());
        assert!(store.load(GOA).unwrap().updated_at.is_some());
    }

    #[test]
    fn replace_records_keeps_absent_ids() {
        let (_dir, store) = store();
        store.replace_records(GOA, index(&["1", "2"])).unwrap();
        store.replace_records(GOA, index(&["3"])).unwrap();
        let doc = store.load(GOA).unwrap();
        assert_eq!(doc.records.keys().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    }

    #[test]
    fn replace_records_updates_index_fields_only() {
        let (_dir, store) = store();
        store.replace_records(GOA, index(&["1"])).unwrap();
        store
            .merge_record(GOA, "1", Record::with_universities(vec!["Goa University".into()]))
            .unwrap();

        let mut renamed = BTreeMap::new();
        renamed.insert("1".to_string(), record("Renamed College"));
        store.replace_records(GOA, renamed).unwrap();

        let rec = &store.load(GOA).unwrap().records["1"];
        assert_eq!(rec.name.as_deref(), Some("Renamed College"));
        assert_eq!(rec.universities, Some(vec!["Goa University".to_string()]));
    }

    #[test]
    fn replace_records_keeps_fingerprint() {
        let (_dir, store) = store();
        store.update_fingerprint(GOA, "old").unwrap();
        store.replace_records(GOA, index(&["1"])).unwrap();
        assert_eq!(store.load(GOA).unwrap().fingerprint.as_deref(), Some("old"));
    }

    #[test]
    fn merge_record_adds_field() {
        let (_dir, store) = store();
        store.replace_records(GOA, index(&["1"])).unwrap();
        store
            .merge_record(GOA, "1", Record::with_universities(vec!["Goa University".into()]))
            .unwrap();
        let rec = &store.load(GOA).unwrap().records["1"];
        assert_eq!(rec.name.as_deref(), Some("College 1"));
        assert_eq!(rec.universities, Some(vec!["Goa University".to_string()]));
    }

    #[test]
    fn merge_record_twice_leaves_file_unchanged() {
        let (_dir, store) = store();
        store.replace_records(GOA, index(&["1"])).unwrap();
        let patch = Record::with_universities(vec!["Goa University".into()]);
        store.merge_record(GOA, "1", patch.clone()).unwrap();
        let before = fs::read(store.document_path(GOA)).unwrap();
        store.merge_record(GOA, "1", patch).unwrap();
        let after = fs::read(store.document_path(GOA)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn merge_record_unknown_id_fails() {
        let (_dir, store) = store();
        store.replace_records(GOA, index(&["1"])).unwrap();
        let err = store
            .merge_record(GOA, "2", Record::with_universities(vec![]))
            .unwrap_err();
        let unknown = err.downcast_ref::<UnknownRecord>().unwrap();
        assert_eq!(unknown.id, "2");
        assert_eq!(unknown.partition, GOA);
    }

    #[test]
    fn merge_before_index_fails() {
        let (_dir, store) = store();
        store.ensure_exists(GOA).unwrap();
        let err = store.merge_record(GOA, "1", record("x")).unwrap_err();
        assert!(err.downcast_ref::<UnknownRecord>().is_some());
    }

    #[test]
    fn partitions_use_distinct_files() {
        let (_dir, store) = store();
        store.replace_records("Goa", index(&["1"])).unwrap();
        store.replace_records("Tamil Nadu", index(&["2", "3"])).unwrap();
        assert_eq!(store.load("Goa").unwrap().records.len(), 1);
        assert_eq!(store.load("Tamil Nadu").unwrap().records.len(), 2);
        assert_eq!(store.list_keys().unwrap(), vec!["goa", "tamil_nadu"]);
    }

    #[test]
    fn list_keys_empty_root() {
        let (_dir, store) = store();
        assert!(store.list_keys().unwrap().is_empty());
    }
}
