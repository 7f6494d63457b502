//! Output formatting and writing utilities
//!
//! Results are written to stdout either machine-readable (JSON, YAML) or as
//! human-readable text. Status messages only appear in human mode so that
//! machine output stays parseable.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use cms_bridge_core::{FormatStatistics, MappingStats, TransformMetrics, ValidationReport};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Formatting of command results per output format
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report, listing every error and warning
    fn format_validation_report(&self, report: &ValidationReport) -> Result<String>;

    /// Format detection statistics
    fn format_statistics(&self, stats: &FormatStatistics) -> Result<String>;

    /// Format identity registry statistics
    fn format_mapping_stats(&self, stats: &MappingStats) -> Result<String>;

    /// Format transformation metrics
    fn format_metrics(&self, metrics: &TransformMetrics) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // payloads have no better human rendering than indented JSON
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_validation_report(&self, report: &ValidationReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_report_human(report)),
            _ => self.format(report),
        }
    }

    fn format_statistics(&self, stats: &FormatStatistics) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_statistics_human(stats)),
            _ => self.format(stats),
        }
    }

    fn format_mapping_stats(&self, stats: &MappingStats) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_mapping_stats_human(stats)),
            _ => self.format(stats),
        }
    }

    fn format_metrics(&self, metrics: &TransformMetrics) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_metrics_human(metrics)),
            _ => self.format(metrics),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if tracing::enabled!(tracing::Level::TRACE) {
            let mut redacted = serde_json::to_value(value)?;
            redaction::redact_json_value(&mut redacted);
            trace!(data = %redacted, "Writing data");
        }

        let formatted = self.format.format(value)?;
        self.emit(&formatted)
    }

    /// Write a validation report
    pub fn validation_report(&mut self, report: &ValidationReport) -> Result<()> {
        let formatted = self.format.format_validation_report(report)?;
        self.emit(&formatted)
    }

    /// Write detection statistics
    pub fn statistics(&mut self, stats: &FormatStatistics) -> Result<()> {
        let formatted = self.format.format_statistics(stats)?;
        self.emit(&formatted)
    }

    /// Write identity registry statistics
    pub fn mapping_stats(&mut self, stats: &MappingStats) -> Result<()> {
        let formatted = self.format.format_mapping_stats(stats)?;
        self.emit(&formatted)
    }

    /// Write transformation metrics
    pub fn metrics(&mut self, metrics: &TransformMetrics) -> Result<()> {
        let formatted = self.format.format_metrics(metrics)?;
        self.emit(&formatted)
    }

    fn emit(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Write a table (human format only)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let header_row = join_cells(headers.iter().copied(), &widths);
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in &rows {
            let line = join_cells(row.iter().map(String::as_str), &widths);
            self.writeln(&line)?;
        }

        Ok(())
    }
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(width) => format!("{:width$}", cell, width = *width),
            None => cell.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" │ ")
        .trim_end()
        .to_string()
}

fn format_validation_report_human(report: &ValidationReport) -> String {
    let mut output = String::new();

    if report.is_valid {
        output.push_str(&format!("✓ Valid {} payload\n", report.expected_format));
    } else {
        output.push_str(&format!(
            "✗ Invalid {} payload - {} error(s)\n",
            report.expected_format,
            report.errors.len()
        ));
    }

    output.push_str(&format!("  Detected format: {}\n", report.detected_format));
    output.push_str(&format!(
        "  Items: {} total, {} valid, {} invalid\n",
        report.total_items, report.valid_items, report.invalid_items
    ));

    if !report.errors.is_empty() {
        output.push_str("\nErrors:\n");
        for (i, error) in report.errors.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, error));
        }
    }

    if report.has_warnings() {
        output.push_str("\nWarnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!("  • {}\n", warning));
        }
    }

    output
}

fn format_statistics_human(stats: &FormatStatistics) -> String {
    format!(
        "Format: {}\n  Items: {}\n  Legacy: {}\n  Modern: {}\n  Unknown: {}\n",
        stats.format, stats.total, stats.legacy, stats.modern, stats.unknown
    )
}

fn format_mapping_stats_human(stats: &MappingStats) -> String {
    let mut output = format!("Mappings: {}\n", stats.total_mappings);

    if !stats.resource_types.is_empty() {
        output.push_str(&format!("  Resource types: {}\n", stats.resource_types.join(", ")));
    }
    if let Some(oldest) = stats.oldest {
        output.push_str(&format!("  Oldest: {}\n", oldest.to_rfc3339()));
    }
    if let Some(newest) = stats.newest {
        output.push_str(&format!("  Newest: {}\n", newest.to_rfc3339()));
    }

    output
}

fn format_metrics_human(metrics: &TransformMetrics) -> String {
    format!(
        "Duration: {:.3}ms\n  Items: {}\n  Avg per item: {:.3}ms\n  Converted: {}\n  Circular refs: {}\n  Depth cut-offs: {}\n",
        metrics.duration_ms(),
        metrics.items,
        metrics.avg_item_duration_ms(),
        metrics.converted_items,
        metrics.circular_refs,
        metrics.depth_cutoffs
    )
}
