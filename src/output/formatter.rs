//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use super::duration::{format_nanos, DurationStyle};
use crate::executor::{Eviction, Progress};
use crate::models::{Summary, SummaryRow};

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format the results table, one line per module
    fn format_table(&self, summary: &Summary) -> String;

    /// Format the run count, average and total lines
    fn format_totals(&self, summary: &Summary) -> String;

    /// Format a transient progress line (without the leading clear or trailing `\r`)
    fn format_progress(&self, progress: &Progress<'_>) -> String;

    /// Format the progress line for a load that failed and evicted its module
    fn format_failure(&self, eviction: &Eviction<'_>) -> String;

    /// Table followed by totals
    fn format_report(&self, summary: &Summary) -> String {
        let mut output = self.format_table(summary);
        output.push_str(&self.format_totals(summary));
        output
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone, Default)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Add samples and strategy columns
    pub verbose_mode: bool,
}

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Column separator between table cells
pub const COLUMN_SEPARATOR: &str = " | ";

/// Cell text for each summary row
pub fn table_rows(summary: &Summary, verbose: bool) -> Vec<RowData> {
    summary.rows.iter().map(|row| row_cells(row, verbose)).collect()
}

fn row_cells(row: &SummaryRow, verbose: bool) -> RowData {
    let mut cells = vec![
        row.name.clone(),
        format_nanos(row.average_nanos, DurationStyle::COMPACT),
        format!("{:.2}%", row.percentage),
    ];
    if verbose {
        cells.push(format!("{}x", row.samples));
        cells.push(row.strategy.to_string());
    }
    cells
}

pub fn alignments(verbose: bool) -> Vec<Alignment> {
    let mut alignments = vec![Alignment::Left, Alignment::Left, Alignment::Right];
    if verbose {
        alignments.push(Alignment::Right);
        alignments.push(Alignment::Left);
    }
    alignments
}

/// Pad every cell to its column width. Widths count characters of the
/// uncolored text; a trailing left-aligned column is left unpadded.
pub fn layout_table(rows: &[RowData], alignments: &[Alignment]) -> Vec<RowData> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(col, cell)| {
                    let alignment = alignments.get(col).copied().unwrap_or(Alignment::Left);
                    let last = col + 1 == columns;
                    align_text(cell, widths[col], alignment, last)
                })
                .collect()
        })
        .collect()
}

fn align_text(text: &str, width: usize, alignment: Alignment, last: bool) -> String {
    let padding = width.saturating_sub(text.chars().count());
    match alignment {
        Alignment::Left if last => text.to_string(),
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
    }
}

/// Lines shown below the table, without styling
pub(crate) fn totals_lines(summary: &Summary) -> (String, Option<String>, String) {
    let runs = summary.runs;
    let performed = format!("Performed {} run{}.", runs, if runs > 1 { "s" } else { "" });

    let average = (runs > 1).then(|| {
        format_nanos(summary.average_nanos, DurationStyle::for_total(summary.average_nanos))
    });

    let total = summary.total_nanos as f64;
    let total = format_nanos(total, DurationStyle::for_total(total));

    (performed, average, total)
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_table(&self, summary: &Summary) -> String {
        let verbose = self.options.verbose_mode;
        let rows = layout_table(&table_rows(summary, verbose), &alignments(verbose));

        let mut output = String::new();
        for row in rows {
            output.push_str(&row.join(COLUMN_SEPARATOR));
            output.push('\n');
        }
        output
    }

    fn format_totals(&self, summary: &Summary) -> String {
        let (performed, average, total) = totals_lines(summary);

        let mut output = format!("{}\n\n", performed);
        if let Some(average) = average {
            output.push_str(&format!("Average load time: {}\n", average));
        }
        output.push_str(&format!("Total load time: {}\n", total));
        output
    }

    fn format_progress(&self, progress: &Progress<'_>) -> String {
        format!(
            "+ Run {}/{} - Loading: {} {}",
            progress.run,
            progress.runs,
            progress.module,
            format_nanos(progress.nanos as f64, DurationStyle::PRECISE)
        )
    }

    fn format_failure(&self, eviction: &Eviction<'_>) -> String {
        format!(
            "+ Run {}/{} - Loading: {} failed",
            eviction.run, eviction.runs, eviction.module
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::types::LoadStrategy;

    fn summary(runs: u32) -> Summary {
        Summary {
            runs,
            rows: vec![
                SummaryRow {
                    name: "ms".to_string(),
                    average_nanos: 456_789.0,
                    percentage: 4.46,
                    samples: runs as usize,
                    strategy: LoadStrategy::InProcess,
                },
                SummaryRow {
                    name: "express".to_string(),
                    average_nanos: 20_000_000.0,
                    percentage: 195.54,
                    samples: runs as usize,
                    strategy: LoadStrategy::Isolated,
                },
            ],
            average_nanos: 10_228_394.5,
            total_nanos: 102_283_945,
        }
    }

    fn plain(verbose: bool) -> PlainFormatter {
        PlainFormatter::new(FormattingOptions { enable_color: false, verbose_mode: verbose })
    }

    #[test]
    fn test_table_alignment() {
        let table = plain(false).format_table(&summary(5));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "ms      | 456µs |   4.46%");
        assert_eq!(lines[1], "express | 20ms  | 195.54%");
    }

    #[test]
    fn test_verbose_table_has_extra_columns() {
        let table = plain(true).format_table(&summary(3));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "ms      | 456µs |   4.46% | 3x | in-process");
        assert_eq!(lines[1], "express | 20ms  | 195.54% | 3x | isolated");
    }

    #[test]
    fn test_totals_with_multiple_runs() {
        let totals = plain(false).format_totals(&summary(5));
        assert_eq!(
            totals,
            "Performed 5 runs.\n\nAverage load time: 10ms 228µs 394ns\nTotal load time: 102ms\n"
        );
    }

    #[test]
    fn test_totals_single_run_omits_average() {
        let totals = plain(false).format_totals(&summary(1));
        assert!(totals.starts_with("Performed 1 run.\n"));
        assert!(!totals.contains("Average"));
    }

    #[test]
    fn test_progress_line() {
        let progress = Progress {
            run: 2,
            runs: 5,
            module: "lodash",
            nanos: 1_234_567,
            strategy: LoadStrategy::InProcess,
        };
        assert_eq!(
            plain(false).format_progress(&progress),
            "+ Run 2/5 - Loading: lodash 1ms 234µs 567ns"
        );
    }

    #[test]
    fn test_failure_line_keeps_run_position() {
        let error = LoadError::module("boom");
        let eviction = Eviction { run: 3, runs: 5, module: "flaky", error: &error };
        assert_eq!(
            plain(false).format_failure(&eviction),
            "+ Run 3/5 - Loading: flaky failed"
        );
    }

    #[test]
    fn test_layout_counts_characters_not_bytes() {
        let rows = vec![
            vec!["µ".to_string(), "x".to_string()],
            vec!["ab".to_string(), "y".to_string()],
        ];
        let laid = layout_table(&rows, &[Alignment::Left, Alignment::Left]);
        assert_eq!(laid[0][0], "µ ");
        assert_eq!(laid[1][1], "y");
    }
}
