//! Snapshot comparison engine.
//!
//! Compares a before and an after snapshot and classifies every AP:
//! - Matches records by AP name (last record wins on duplicates)
//! - Compares normalized statuses (uptime detail stripped)
//! - Reports up/down transitions, other changes, missing and new APs
//! - Aggregate counts are computed regardless of the output mode

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::snapshot::{ApRecord, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Unchanged,
    UpToDown,
    DownToUp,
    OtherChange,
    Missing,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Every AP whose status changed, disappeared or appeared.
    #[default]
    All,
    /// Only APs that went from Up to Down.
    OnlyDownTransitions,
}

impl CompareMode {
    pub fn emits(&self, transition: Transition) -> bool {
        match self {
            CompareMode::All => transition != Transition::Unchanged,
            CompareMode::OnlyDownTransitions => transition == Transition::UpToDown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub name: String,
    /// Normalized status in the before snapshot, None if the AP is new.
    pub before: Option<String>,
    /// Normalized status in the after snapshot, None if the AP is missing.
    pub after: Option<String>,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffCounts {
    pub total_aps: usize,
    pub up_to_down: usize,
    pub down_to_up: usize,
    pub other_change: usize,
    pub missing: usize,
    pub new: usize,
}

impl DiffCounts {
    /// Up/down transitions only, matching the "status changes" summary line.
    pub fn status_changes(&self) -> usize {
        self.up_to_down + self.down_to_up
    }

    fn record(&mut self, transition: Transition) {
        match transition {
            Transition::Unchanged => {}
            Transition::UpToDown => self.up_to_down += 1,
            Transition::DownToUp => self.down_to_up += 1,
            Transition::OtherChange => self.other_change += 1,
            Transition::Missing => self.missing += 1,
            Transition::New => self.new += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub mode: CompareMode,
    /// One entry per name in the union of both snapshots, before order then after order.
    pub entries: Vec<DiffEntry>,
    pub counts: DiffCounts,
    pub before_timestamp: Option<DateTime<Utc>>,
    pub after_timestamp: Option<DateTime<Utc>>,
}

impl ComparisonResult {
    /// Entries selected by the comparison mode, in classification order.
    pub fn rows(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(move |entry| self.mode.emits(entry.transition))
    }

    pub fn has_rows(&self) -> bool {
        self.rows().next().is_some()
    }
}

pub fn classify(before_status: &str, after_status: &str) -> Transition {
    match (before_status, after_status) {
        (b, a) if b == a => Transition::Unchanged,
        ("Up", "Down") => Transition::UpToDown,
        ("Down", "Up") => Transition::DownToUp,
        _ => Transition::OtherChange,
    }
}

/// Index records by name, last record wins.
fn index_by_name(records: &[ApRecord]) -> HashMap<&str, &ApRecord> {
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        map.insert(record.name.as_str(), record);
    }
    map
}

/// Compare two snapshots. Pure: no I/O and the inputs are not modified.
pub fn compare(before: &Snapshot, after: &Snapshot, mode: CompareMode) -> ComparisonResult {
    let before_map = index_by_name(&before.records);
    let after_map = index_by_name(&after.records);

    let mut counts = DiffCounts {
        total_aps: before_map
            .keys()
            .chain(after_map.keys())
            .collect::<HashSet<_>>()
            .len(),
        ..DiffCounts::default()
    };

    let mut entries = Vec::with_capacity(counts.total_aps);
    let mut visited: HashSet<&str> = HashSet::with_capacity(before_map.len());

    for record in &before.records {
        let name = record.name.as_str();
        if !visited.insert(name) {
            continue;
        }

        let before_status = before_map[name].normalized_status();
        let entry = match after_map.get(name) {
            None => DiffEntry {
                name: name.to_string(),
                before: Some(before_status.to_string()),
                after: None,
                transition: Transition::Missing,
            },
            Some(after_record) => {
                let after_status = after_record.normalized_status();
                DiffEntry {
                    name: name.to_string(),
                    before: Some(before_status.to_string()),
                    after: Some(after_status.to_string()),
                    transition: classify(before_status, after_status),
                }
            }
        };

        counts.record(entry.transition);
        entries.push(entry);
    }

    for record in &after.records {
        let name = record.name.as_str();
        if before_map.contains_key(name) || !visited.insert(name) {
            continue;
        }

        let entry = DiffEntry {
            name: name.to_string(),
            before: None,
            after: Some(after_map[name].normalized_status().to_string()),
            transition: Transition::New,
        };

        counts.record(entry.transition);
        entries.push(entry);
    }

    ComparisonResult {
        mode,
        entries,
        counts,
        before_timestamp: before.captured_at,
        after_timestamp: after.captured_at,
    }
}
