//! JUnit-style XML rendering
//!
//! Output layout, consumed by CI systems:
//!
//! ```text
//! <testsuites tests="3" failures="1" errors="0" skipped="1">
//!   <testsuite name="Adding negative" tests="2" failures="1" errors="0" skipped="0">
//!     <testcase></testcase>
//!     <testcase>
//!       <failure>Expected: -5 Actual: -2</failure>
//!     </testcase>
//!   </testsuite>
//!   <testsuite name="Inserting edges" tests="1" failures="0" errors="0" skipped="1">
//!     <testcase>
//!       <skipped>true</skipped>
//!     </testcase>
//!   </testsuite>
//! </testsuites>
//! ```
//!
//! There is no XML declaration and no trailing newline. Elements without
//! children close on the same line.

use std::fmt::Write;

use crate::error::Result;
use crate::models::{CumulativeReport, ResultRecord, ScopeAggregate};

const INDENT: &str = "  ";

/// Render the whole report
pub fn render(report: &CumulativeReport) -> Result<String> {
    let mut out = String::new();

    write!(
        out,
        "<testsuites tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\">",
        report.tests(),
        report.failures(),
        report.errors(),
        report.skipped()
    )?;
    for suite in report.suites() {
        write_suite(&mut out, suite)?;
    }
    if !report.is_empty() {
        out.push('\n');
    }
    out.push_str("</testsuites>");

    Ok(out)
}

fn write_suite(out: &mut String, suite: &ScopeAggregate) -> Result<()> {
    write!(
        out,
        "\n{INDENT}<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\">",
        escape(suite.name()),
        suite.tests(),
        suite.failures(),
        suite.errors(),
        suite.skipped()
    )?;
    for record in suite.records() {
        write_case(out, record)?;
    }
    if !suite.is_empty() {
        write!(out, "\n{INDENT}")?;
    }
    out.push_str("</testsuite>");
    Ok(())
}

fn write_case(out: &mut String, record: &ResultRecord) -> Result<()> {
    let level = INDENT.repeat(2);
    write!(out, "\n{level}<testcase>")?;

    let mut has_children = false;
    if record.is_skipped() {
        write!(out, "\n{level}{INDENT}<skipped>true</skipped>")?;
        has_children = true;
    }
    if let Some(message) = record.failure_message() {
        write!(out, "\n{level}{INDENT}<failure>{}</failure>", escape(message))?;
        has_children = true;
    }

    if has_children {
        write!(out, "\n{level}")?;
    }
    out.push_str("</testcase>");
    Ok(())
}

/// Escape text for use in attribute values and character data
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\t' => escaped.push_str("&#x9;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            c if is_xml_char(c) => escaped.push(c),
            _ => escaped.push(char::REPLACEMENT_CHARACTER),
        }
    }
    escaped
}

/// Characters allowed by the XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
