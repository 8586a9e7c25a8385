//! Output formatting and display system
//!
//! Renders progress lines, the results table and summary lines, either
//! plain or colored, and the JSON report used with `--json`.

mod colored;
mod duration;
mod formatter;
mod progress;

pub use colored::{ColorScheme, ColoredFormatter};
pub use duration::{format_nanos, DurationStyle, SUB_MILLIS_THRESHOLD_NANOS};
pub use formatter::{
    layout_table, Alignment, FormattingOptions, OutputFormatter, PlainFormatter, RowData,
    COLUMN_SEPARATOR,
};
pub use progress::{progress_line, CursorGuard, CLEAR_LINE, HIDE_CURSOR, SHOW_CURSOR};

use crate::error::{AppError, Result};
use crate::models::Summary;
use serde::Serialize;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Machine readable report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub node_version: Option<&'a str>,
    pub runs: u32,
    pub modules: Vec<JsonRow<'a>>,
    pub evicted: &'a [String],
    /// `null` for a single run, matching the text report
    pub average_nanos: Option<f64>,
    pub average: Option<String>,
    pub total_nanos: u64,
    pub total: String,
}

#[derive(Debug, Serialize)]
pub struct JsonRow<'a> {
    pub name: &'a str,
    pub average_nanos: f64,
    pub average: String,
    pub percentage: f64,
    pub samples: usize,
    pub strategy: crate::types::LoadStrategy,
}

impl<'a> JsonReport<'a> {
    pub fn new(summary: &'a Summary, evicted: &'a [String], node_version: Option<&'a str>) -> Self {
        let modules = summary
            .rows
            .iter()
            .map(|row| JsonRow {
                name: &row.name,
                average_nanos: row.average_nanos,
                average: format_nanos(row.average_nanos, DurationStyle::COMPACT),
                percentage: row.percentage,
                samples: row.samples,
                strategy: row.strategy,
            })
            .collect();

        let multi_run = summary.runs > 1;
        let total = summary.total_nanos as f64;

        Self {
            version: crate::VERSION,
            node_version,
            runs: summary.runs,
            modules,
            evicted,
            average_nanos: multi_run.then_some(summary.average_nanos),
            average: multi_run.then(|| {
                format_nanos(summary.average_nanos, DurationStyle::for_total(summary.average_nanos))
            }),
            total_nanos: summary.total_nanos,
            total: format_nanos(total, DurationStyle::for_total(total)),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::internal(format!("Failed to serialize report: {}", e)))
    }
}
