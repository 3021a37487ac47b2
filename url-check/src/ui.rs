//! Terminal output for the url-check CLI.
//!
//! Result lines keep the exact plain format of `ProbeResult`'s `Display`; only
//! the status tag is colored, and `console` drops the styling when stdout is
//! not a terminal.

use console::style;
use std::time::Duration;
use url_check_lib::ProbeResult;

/// Print the line that precedes the results.
pub fn print_header(url_count: usize, timeout: Duration) {
    println!("Checking {} URLs with timeout {:?}...", url_count, timeout);
    println!();
}

/// Print one result line as it arrives.
pub fn print_result(result: &ProbeResult) {
    println!("{}", format_result(result));
}

/// Format a result line with a colored status tag.
pub fn format_result(result: &ProbeResult) -> String {
    let plain = result.to_string();

    // The tag is everything up to the first `]`.
    let Some(end) = plain.find(']') else {
        return plain;
    };
    let (tag, rest) = plain.split_at(end + 1);

    let tag = match result {
        ProbeResult::Success { status, .. } => match status {
            200..=299 => style(tag).green(),
            300..=399 => style(tag).cyan(),
            400..=499 => style(tag).yellow(),
            _ => style(tag).red(),
        },
        ProbeResult::Failure { .. } => style(tag).red().bold(),
    };

    format!("{}{}", tag, rest)
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &str, had_failures: bool) {
    if had_failures {
        println!("{}", style(summary).yellow());
    } else {
        println!("{}", style(summary).green());
    }
}
