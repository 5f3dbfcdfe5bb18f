//! Output formatter trait

use super::report::RoomReport;
use investa_domain::OutputFormat;

/// Trait for formatting room reports
pub trait OutputFormatter {
    /// Summary, members, tallies, allocation and settlement
    fn format(&self, report: &RoomReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &RoomReport) -> String;

    /// One-line room summary
    fn format_summary(&self, report: &RoomReport) -> String;

    /// Dispatch on the configured format.
    fn render(&self, report: &RoomReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(report),
            OutputFormat::Summary => self.format_summary(report),
            OutputFormat::Json => self.format_json(report),
        }
    }
}
