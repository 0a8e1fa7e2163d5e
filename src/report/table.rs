//! Terminal table rendering.
//!
//! Boxed ASCII table with one row per reported AP:
//! - AP Name, Before Status, After Status
//! - statuses colored by meaning (Up green, Down red, Missing magenta, New cyan)
//! - padding is applied before coloring so escape codes do not skew widths

use crossterm::style::{style, Stylize};

use crate::controller::BssEntry;
use crate::controller::LldpNeighbor;
use crate::snapshot::ApRecord;
use crate::store::diff::{CompareMode, ComparisonResult, DiffEntry, Transition};

const MISSING: &str = "Missing";
const NEW: &str = "New";

pub fn render(result: &ComparisonResult, color: bool) -> String {
    if !result.has_rows() {
        let message = match result.mode {
            CompareMode::All => "No status changes detected.\n",
            CompareMode::OnlyDownTransitions => "No APs went down.\n",
        };
        return String::from(message);
    }

    let rows: Vec<[String; 3]> = result.rows().map(cells).collect();
    render_grid(["AP Name", "Before Status", "After Status"], &rows, |col, cell| {
        if col == 0 {
            cell.to_string()
        } else {
            paint(cell, color)
        }
    })
}

pub fn render_bss(entries: &[BssEntry]) -> String {
    if entries.is_empty() {
        return String::from("No BSS entries reported.\n");
    }

    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|e| [e.bss.clone(), e.ess.clone(), e.ap_name.clone()])
        .collect();
    render_grid(["bss", "ess", "ap name"], &rows, |_, cell| cell.to_string())
}

/// APs the controller currently reports as down.
pub fn render_down(records: &[ApRecord], color: bool) -> String {
    if records.is_empty() {
        return String::from("No APs are down.\n");
    }

    let rows: Vec<[String; 2]> = records
        .iter()
        .map(|r| [r.name.clone(), r.status.clone()])
        .collect();
    render_grid(["AP Name", "Status"], &rows, |col, cell| {
        if col == 0 {
            cell.to_string()
        } else {
            paint(cell, color)
        }
    })
}

pub fn render_lldp(ap_name: &str, neighbors: &[LldpNeighbor]) -> String {
    if neighbors.is_empty() {
        return format!("No LLDP neighbors reported for {ap_name}.\n");
    }

    let rows: Vec<[String; 4]> = neighbors
        .iter()
        .map(|n| {
            [
                n.interface.clone(),
                n.neighbor.clone(),
                n.port.clone(),
                n.mgmt_address.clone(),
            ]
        })
        .collect();
    render_grid(["Interface", "Neighbor", "Port", "Mgmt. Address"], &rows, |_, cell| {
        cell.to_string()
    })
}

/// Before/after cell text for an entry.
fn cells(entry: &DiffEntry) -> [String; 3] {
    let (before, after) = match entry.transition {
        Transition::Missing => (entry.before.as_deref().unwrap_or(""), MISSING),
        Transition::New => (MISSING, NEW),
        _ => (
            entry.before.as_deref().unwrap_or(""),
            entry.after.as_deref().unwrap_or(""),
        ),
    };
    [entry.name.clone(), before.to_string(), after.to_string()]
}

/// Color a padded cell according to the status word it contains.
fn paint(padded: &str, color: bool) -> String {
    if !color {
        return padded.to_string();
    }
    match padded.trim() {
        "Up" => style(padded).green().to_string(),
        "Down" => style(padded).red().to_string(),
        MISSING => style(padded).magenta().to_string(),
        NEW => style(padded).cyan().to_string(),
        _ => padded.to_string(),
    }
}

fn render_grid<const N: usize, F>(headers: [&str; N], rows: &[[String; N]], decorate: F) -> String
where
    F: Fn(usize, &str) -> String,
{
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut output = String::new();
    output.push_str(&border);

    output.push('|');
    for (i, header) in headers.iter().enumerate() {
        output.push_str(&format!(" {:^width$} |", header, width = widths[i]));
    }
    output.push('\n');
    output.push_str(&border);

    for row in rows {
        output.push('|');
        for (i, cell) in row.iter().enumerate() {
            let padded = format!("{:<width$}", cell, width = widths[i]);
            output.push_str(&format!(" {} |", decorate(i, &padded)));
        }
        output.push('\n');
    }
    output.push_str(&border);

    output
}
