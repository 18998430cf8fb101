//! Human-readable summaries of a report
//!
//! Provides Table, JSON and one-line summary formats for the CLI. The
//! structured XML document is produced by `xml`, not here.

use crate::models::{CumulativeReport, ResultStatus, ScopeAggregate};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Report summary formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format the whole report
    pub fn format_report(&self, report: &CumulativeReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Summary => report.to_string(),
        }
    }

    fn format_suite_row(&self, suite: &ScopeAggregate) -> String {
        let worst = if suite.errors() > 0 {
            ResultStatus::Error
        } else if suite.failures() > 0 {
            ResultStatus::Failure
        } else if suite.skipped() > 0 && suite.passed() == 0 {
            ResultStatus::Skip
        } else {
            ResultStatus::Pass
        };

        let status = format!("{} {:5}", worst.symbol(), worst.to_string());
        let status = if self.colorize {
            let color = match worst {
                ResultStatus::Pass => "32",
                ResultStatus::Skip => "33",
                ResultStatus::Failure | ResultStatus::Error => "31",
            };
            format!("\x1b[{color}m{status}\x1b[0m")
        } else {
            status
        };

        format!(
            "{:30} {} {:>4} {:>4} {:>4} {:>4}",
            truncate(suite.name(), 30),
            status,
            suite.tests(),
            suite.failures(),
            suite.errors(),
            suite.skipped()
        )
    }

    fn format_report_table(&self, report: &CumulativeReport) -> String {
        let mut output = String::new();

        output.push_str("\n══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(
            " {:30} {:7} {:>4} {:>4} {:>4} {:>4}\n",
            "Suite", "Status", "Tot", "Fail", "Err", "Skip"
        ));
        output.push_str("──────────────────────────────────────────────────────────────\n");

        for suite in report.suites() {
            output.push_str(&format!(" {}\n", self.format_suite_row(suite)));
        }

        output.push_str("──────────────────────────────────────────────────────────────\n");

        let fail_str = if self.colorize && report.failures() + report.errors() > 0 {
            format!("\x1b[31m{}\x1b[0m", report.failures())
        } else {
            report.failures().to_string()
        };
        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Error: {} | Skip: {}\n",
            report.tests(),
            report.passed(),
            fail_str,
            report.errors(),
            report.skipped()
        ));
        output.push_str(&format!(" Pass Rate: {:.1}%\n", report.pass_rate()));
        output.push_str("══════════════════════════════════════════════════════════════\n");

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
