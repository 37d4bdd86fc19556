use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::snapshot_model::Snapshot;
use crate::errors::ValidationError;

/// The whole portfolio: one snapshot per calendar date.
///
/// Serializes as a JSON object keyed by `YYYY-MM-DD`, in date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioDocument {
    snapshots: BTreeMap<NaiveDate, Snapshot>,
}

impl PortfolioDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Snapshot> {
        self.snapshots.get(&date)
    }

    pub fn get_mut(&mut self, date: NaiveDate) -> Option<&mut Snapshot> {
        self.snapshots.get_mut(&date)
    }

    /// Returns the snapshot for `date`, creating an empty one if needed.
    pub fn get_or_create(&mut self, date: NaiveDate) -> &mut Snapshot {
        self.snapshots.entry(date).or_insert_with(|| {
            log::debug!("Creating snapshot for {}", date);
            Snapshot::new()
        })
    }

    pub fn insert(&mut self, date: NaiveDate, snapshot: Snapshot) -> Option<Snapshot> {
        self.snapshots.insert(date, snapshot)
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<Snapshot> {
        self.snapshots.remove(&date)
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.snapshots.keys().next_back().copied()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Snapshot)> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Structural checks applied after loading.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (date, snapshot) in &self.snapshots {
            snapshot
                .validate()
                .map_err(|e| ValidationError::InvalidInput(format!("snapshot {}: {}", date, e)))?;
        }
        Ok(())
    }
}
