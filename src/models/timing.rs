//! Timing records, the eligible module set and summary data models

use crate::types::LoadStrategy;
use serde::{Deserialize, Serialize};

/// Working set of modules still eligible for timing, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSet {
    names: Vec<String>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module name, ignoring duplicates. Returns whether it was new.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Permanently remove a module. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Copy of the current members, taken at the start of a run
    pub fn snapshot(&self) -> Vec<String> {
        self.names.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ModuleSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Load-time samples for one module, one entry per successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub name: String,
    /// Elapsed nanoseconds, in run order
    pub samples: Vec<u64>,
    /// Strategy used for the most recent sample
    pub strategy: LoadStrategy,
}

impl TimingRecord {
    pub fn new(name: impl Into<String>, strategy: LoadStrategy) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
            strategy,
        }
    }

    pub fn total_nanos(&self) -> u64 {
        self.samples.iter().fold(0u64, |acc, s| acc.saturating_add(*s))
    }

    /// `sum / count`, or `None` for an empty record
    pub fn average_nanos(&self) -> Option<f64> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.total_nanos() as f64 / self.samples.len() as f64)
        }
    }
}

/// Timing records for every module, kept in first-recorded order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingRecords {
    records: Vec<TimingRecord>,
}

impl TimingRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, creating the record on first use
    pub fn record(&mut self, name: &str, nanos: u64, strategy: LoadStrategy) {
        match self.records.iter_mut().find(|r| r.name == name) {
            Some(record) => {
                record.samples.push(nanos);
                record.strategy = strategy;
            }
            None => {
                let mut record = TimingRecord::new(name, strategy);
                record.samples.push(nanos);
                self.records.push(record);
            }
        }
    }

    /// Drop every sample recorded for a module
    pub fn evict(&mut self, name: &str) -> Option<TimingRecord> {
        let index = self.records.iter().position(|r| r.name == name)?;
        Some(self.records.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&TimingRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimingRecord> {
        self.records.iter()
    }
}

impl FromIterator<TimingRecord> for TimingRecords {
    fn from_iter<I: IntoIterator<Item = TimingRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// One row of the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub average_nanos: f64,
    /// Module average relative to the cross-module average, in percent
    pub percentage: f64,
    pub samples: usize,
    pub strategy: LoadStrategy,
}

/// Aggregated result of a whole timing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Configured number of runs
    pub runs: u32,
    /// Rows sorted ascending by average load time
    pub rows: Vec<SummaryRow>,
    /// Mean of the per-module averages
    pub average_nanos: f64,
    /// Sum of every raw sample across all modules and runs
    pub total_nanos: u64,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
