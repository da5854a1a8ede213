//! CLI output formatting.
//!
//! Each `format_*` function is pure and returns the lines to show, so the
//! wording is testable. The `print_*` wrappers write them to stdout.
//!
//! ```text
//! Test Page → s3://www.fracturedfairfax.com/Test_Page.html (2.1 KB)
//!     Redirect: /Main_Street.html
//! ```
//!
//! A dry run names the destination it would have written:
//!
//! ```text
//! Dry run: Test Page → s3://www.fracturedfairfax.com/Test_Page.html (2.1 KB), nothing written
//! ```

use crate::pipeline::Report;
use crate::types::ApiError;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Byte count as `N B` below one kilobyte, else `N.N KB`.
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

/// Lines for an API error: a heading, then one `*key - value` per diagnostic.
pub fn format_api_error(err: &ApiError) -> Vec<String> {
    let mut lines = vec!["Error in parsed page:".to_string()];
    lines.extend(
        err.diagnostics
            .iter()
            .map(|(key, value)| format!("*{key} - {value}")),
    );
    lines
}

pub fn format_report(report: &Report) -> Vec<String> {
    let size = format_size(report.page.len());
    let mut lines = if report.dry_run {
        vec![format!(
            "Dry run: {} → {} ({}), nothing written",
            report.title, report.destination, size
        )]
    } else {
        vec![format!("{} → {} ({})", report.title, report.destination, size)]
    };
    if let Some(location) = &report.target.redirect {
        lines.push(format!("{}Redirect: {}", indent(1), location));
    }
    lines
}

pub fn print_api_error(err: &ApiError) {
    for line in format_api_error(err) {
        println!("{}", line);
    }
}

pub fn print_report(report: &Report) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PublishTarget, RenderedPage};
    use std::collections::BTreeMap;

    fn report(destination: &str, dry_run: bool, redirect: Option<&str>) -> Report {
        Report {
            title: "Test Page".to_string(),
            target: PublishTarget::new("www.example.org", "Test_Page.html")
                .with_redirect(redirect.map(str::to_string)),
            page: RenderedPage::new("x".repeat(2150)),
            destination: destination.to_string(),
            dry_run,
        }
    }

    #[test]
    fn api_error_lines() {
        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("code".to_string(), "missingtitle".to_string());
        diagnostics.insert("info".to_string(), "The page you specified doesn't exist.".to_string());

        assert_eq!(
            format_api_error(&ApiError { diagnostics }),
            vec![
                "Error in parsed page:",
                "*code - missingtitle",
                "*info - The page you specified doesn't exist.",
            ]
        );
    }

    #[test]
    fn published_report_line() {
        let lines = format_report(&report("s3://www.example.org/Test_Page.html", false, None));
        assert_eq!(
            lines,
            vec!["Test Page → s3://www.example.org/Test_Page.html (2.1 KB)"]
        );
    }

    #[test]
    fn dry_run_report_line() {
        let lines = format_report(&report("s3://www.example.org/Test_Page.html", true, None));
        assert_eq!(
            lines,
            vec!["Dry run: Test Page → s3://www.example.org/Test_Page.html (2.1 KB), nothing written"]
        );
    }

    #[test]
    fn dry_run_to_directory_names_the_file() {
        let lines = format_report(&report("dist/Test_Page.html", true, None));
        assert_eq!(
            lines,
            vec!["Dry run: Test Page → dist/Test_Page.html (2.1 KB), nothing written"]
        );
    }

    #[test]
    fn redirect_shown_indented() {
        let lines = format_report(&report("dist/Test_Page.html", false, Some("/Other.html")));
        assert_eq!(lines[1], "    Redirect: /Other.html");
    }

    #[test]
    fn small_sizes_in_bytes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
    }
}
