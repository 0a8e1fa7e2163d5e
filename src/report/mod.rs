pub mod table;
pub mod json;

use crossterm::style::{style, Stylize};

use crate::store::diff::ComparisonResult;
use crate::util::{format_elapsed, format_optional_timestamp};

pub struct ReportOptions {
    pub json: bool,
    pub color: bool,
}

pub fn print(result: &ComparisonResult, opts: &ReportOptions) -> serde_json::Result<()> {
    if opts.json {
        println!("{}", json::render(result)?);
    } else {
        print!("{}", render_header(result, opts.color));
        print!("{}", table::render(result, opts.color));
        print!("{}", render_summary(result, opts.color));
    }
    Ok(())
}

fn highlight<F>(text: String, color: bool, paint: F) -> String
where
    F: Fn(String) -> String,
{
    if color {
        paint(text)
    } else {
        text
    }
}

/// When each snapshot was taken and how far apart they are.
pub fn render_header(result: &ComparisonResult, color: bool) -> String {
    let cyan = |s: String| style(s).cyan().to_string();
    let mut output = String::new();

    output.push_str(&format!(
        "Before data loaded from: {}\n",
        highlight(format_optional_timestamp(result.before_timestamp), color, cyan)
    ));
    output.push_str(&format!(
        "After data loaded from: {}\n",
        highlight(format_optional_timestamp(result.after_timestamp), color, cyan)
    ));

    if let (Some(before), Some(after)) = (result.before_timestamp, result.after_timestamp) {
        output.push_str(&format!(
            "Time between before/after: {}\n",
            highlight(format_elapsed(before, after), color, |s| style(s).yellow().to_string())
        ));
    }

    output
}

pub fn render_summary(result: &ComparisonResult, color: bool) -> String {
    let counts = &result.counts;
    let mut output = String::new();

    output.push_str(&format!("Total number of APs: {}\n", counts.total_aps));
    output.push_str(&format!("Total number of status changes: {}\n", counts.status_changes()));
    output.push_str(&format!(
        "Number of APs that changed from Down to Up: {}\n",
        highlight(counts.down_to_up.to_string(), color, |s| style(s).green().to_string())
    ));
    output.push_str(&format!(
        "Number of APs that changed from Up to Down: {}\n",
        highlight(counts.up_to_down.to_string(), color, |s| style(s).red().to_string())
    ));
    if counts.other_change > 0 {
        output.push_str(&format!(
            "Number of APs with other status changes: {}\n",
            counts.other_change
        ));
    }
    output.push_str(&format!(
        "Number of APs Missing: {}\n",
        highlight(counts.missing.to_string(), color, |s| style(s).magenta().to_string())
    ));
    output.push_str(&format!(
        "Number of New APs: {}\n",
        highlight(counts.new.to_string(), color, |s| style(s).cyan().to_string())
    ));

    output
}
