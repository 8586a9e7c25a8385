//! Aggregation of timing records into the final report

use crate::models::{Summary, SummaryRow, TimingRecords};
use std::cmp::Ordering;

/// Build the report rows and totals from the surviving records.
///
/// - a module's average is `sum / count` over its own samples
/// - the cross-module average is the mean of the per-module averages, not of
///   the raw samples
/// - rows are sorted ascending by average; ties keep discovery order
/// - the total is the sum of every raw sample
pub fn aggregate(records: &TimingRecords, runs: u32) -> Summary {
    let mut rows: Vec<SummaryRow> = records
        .iter()
        .filter_map(|record| {
            record.average_nanos().map(|average_nanos| SummaryRow {
                name: record.name.clone(),
                average_nanos,
                percentage: 0.0,
                samples: record.samples.len(),
                strategy: record.strategy,
            })
        })
        .collect();

    let average_nanos = cross_average(&rows);
    for row in &mut rows {
        row.percentage = percentage_of(row.average_nanos, average_nanos);
    }

    // sort_by is stable
    rows.sort_by(|a, b| {
        a.average_nanos
            .partial_cmp(&b.average_nanos)
            .unwrap_or(Ordering::Equal)
    });

    let total_nanos = records
        .iter()
        .fold(0u64, |acc, record| acc.saturating_add(record.total_nanos()));

    Summary {
        runs,
        rows,
        average_nanos,
        total_nanos,
    }
}

fn cross_average(rows: &[SummaryRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.average_nanos).sum::<f64>() / rows.len() as f64
}

/// `value / reference * 100`, rounded to two decimals. Zero when the
/// reference is zero.
pub fn percentage_of(value: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    round2(value / reference * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
