//! Data models and structures for timeload

pub mod config;
pub mod timing;

// Re-export main model types
pub use config::{Config, RunConfig};
pub use timing::{ModuleSet, Summary, SummaryRow, TimingRecord, TimingRecords};
