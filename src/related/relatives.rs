//! Append-only store of user-entered relatives
//!
//! Every [`RelativeStore::save`] returns a new snapshot; snapshots already
//! handed to an aggregation run never change underneath it.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use ownership_types::RelativeRecord;

use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct RelativeStore {
    entries: Arc<Vec<RelativeRecord>>,
}

impl RelativeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<RelativeRecord>) -> Self {
        Self {
            entries: Arc::new(records),
        }
    }

    /// Snapshot with `record` appended
    pub fn save(&self, record: RelativeRecord) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push(record);
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn entries(&self) -> &[RelativeRecord] {
        &self.entries
    }

    /// Relatives registered under `company_code`, in insertion order
    pub fn for_company<'a>(
        &'a self,
        company_code: &'a str,
    ) -> impl Iterator<Item = &'a RelativeRecord> + 'a {
        self.entries
            .iter()
            .filter(move |r| r.company_code == company_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.entries.as_ref())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<RelativeRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Read a snapshot written by [`Self::to_json`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!("Loaded {} relatives from {}", store.len(), path.display());
        Ok(store)
    }
}
