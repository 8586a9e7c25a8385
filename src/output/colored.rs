//! Colored formatter implementation with terminal color support
//!
//! Same layout as the plain formatter; colors are applied after column
//! widths have been computed so escape codes never skew alignment.

use super::duration::{format_nanos, DurationStyle};
use super::formatter::{
    alignments, layout_table, table_rows, totals_lines, FormattingOptions, OutputFormatter,
    COLUMN_SEPARATOR,
};
use crate::executor::{Eviction, Progress};
use crate::models::Summary;
use colored::*;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub marker: Color,
    pub module: Color,
    pub separator: Color,
    pub muted: Color,
    pub total: Color,
    pub failure: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            marker: Color::Cyan,
            module: Color::Yellow,
            separator: Color::Cyan,
            muted: Color::BrightBlack,
            total: Color::Green,
            failure: Color::Red,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_table(&self, summary: &Summary) -> String {
        let verbose = self.options.verbose_mode;
        let rows = layout_table(&table_rows(summary, verbose), &alignments(verbose));
        let separator = self.colorize(COLUMN_SEPARATOR, self.color_scheme.separator).to_string();

        let mut output = String::new();
        for row in rows {
            output.push_str(&row.join(&separator));
            output.push('\n');
        }
        output
    }

    fn format_totals(&self, summary: &Summary) -> String {
        let (performed, average, total) = totals_lines(summary);

        let mut output = format!("{}\n\n", self.colorize(&performed, self.color_scheme.muted));
        if let Some(average) = average {
            output.push_str(&format!(
                "Average load time: {}\n",
                self.colorize(&average, self.color_scheme.total)
            ));
        }
        output.push_str(&format!(
            "Total load time: {}\n",
            self.colorize(&total, self.color_scheme.total)
        ));
        output
    }

    fn format_progress(&self, progress: &Progress<'_>) -> String {
        format!(
            "{} Run {}/{} - Loading: {} {}",
            self.colorize("+", self.color_scheme.marker),
            progress.run,
            progress.runs,
            self.colorize(progress.module, self.color_scheme.module),
            format_nanos(progress.nanos as f64, DurationStyle::PRECISE)
        )
    }

    fn format_failure(&self, eviction: &Eviction<'_>) -> String {
        format!(
            "{} Run {}/{} - Loading: {} {}",
            self.colorize("+", self.color_scheme.marker),
            eviction.run,
            eviction.runs,
            self.colorize(eviction.module, self.color_scheme.module),
            self.colorize("failed", self.color_scheme.failure)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::models::SummaryRow;
    use crate::output::PlainFormatter;
    use crate::types::LoadStrategy;

    fn summary() -> Summary {
        Summary {
            runs: 2,
            rows: vec![SummaryRow {
                name: "chalk".to_string(),
                average_nanos: 2_000_000.0,
                percentage: 100.0,
                samples: 2,
                strategy: LoadStrategy::InProcess,
            }],
            average_nanos: 2_000_000.0,
            total_nanos: 4_000_000,
        }
    }

    #[test]
    fn test_disabled_colors_match_plain_output() {
        let options = FormattingOptions { enable_color: false, verbose_mode: false };
        let colored = ColoredFormatter::new(options.clone());
        let plain = PlainFormatter::new(options);

        assert_eq!(colored.format_report(&summary()), plain.format_report(&summary()));
    }

    #[test]
    fn test_colored_output_keeps_text() {
        ::colored::control::set_override(true);
        let formatter = ColoredFormatter::new(FormattingOptions { enable_color: true, verbose_mode: false });
        let table = formatter.format_table(&summary());
        ::colored::control::unset_override();

        assert!(table.contains("chalk"));
        assert!(table.contains("100.00%"));
        assert!(table.contains("\u{1b}["));
    }

    #[test]
    fn test_failure_line_without_colors_matches_plain() {
        let options = FormattingOptions { enable_color: false, verbose_mode: false };
        let error = LoadError::ClosedBeforeResult;
        let eviction = Eviction { run: 1, runs: 2, module: "chalk", error: &error };

        assert_eq!(
            ColoredFormatter::new(options.clone()).format_failure(&eviction),
            PlainFormatter::new(options).format_failure(&eviction)
        );
    }
}
