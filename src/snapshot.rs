//! Access point snapshot model.
//!
//! A snapshot is the list of APs the controller reported at one point in time,
//! reduced to the two fields the comparison needs: name and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApRecord {
    #[serde(rename = "Name")]
    pub name: String,
    /// Raw status, may carry uptime detail ("Up 10d:3h:14m:20s").
    #[serde(rename = "Status")]
    pub status: String,
}

impl ApRecord {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        ApRecord {
            name: name.into(),
            status: status.into(),
        }
    }

    pub fn normalized_status(&self) -> &str {
        normalize_status(&self.status)
    }
}

/// First whitespace-delimited token of a status string.
/// Unknown tokens pass through unchanged; a blank status yields "".
pub fn normalize_status(status: &str) -> &str {
    status.split_whitespace().next().unwrap_or("")
}

/// On-disk and on-wire shape: `{"AP Database": [...]}`.
/// Any other keys (the controller sends `_meta`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApDatabase {
    #[serde(rename = "AP Database")]
    pub records: Vec<ApRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Before,
    After,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Before => "before",
            Role::After => "after",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Role::Before => "before.json",
            Role::After => "after.json",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub role: Role,
    pub records: Vec<ApRecord>,
    /// Modification time of the file the snapshot was loaded from.
    pub captured_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(role: Role, records: Vec<ApRecord>) -> Self {
        Snapshot {
            role,
            records,
            captured_at: None,
        }
    }

    pub fn with_timestamp(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = Some(captured_at);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names that occur more than once, in first-appearance order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for record in &self.records {
            if !seen.insert(record.name.as_str()) && !dups.contains(&record.name.as_str()) {
                dups.push(record.name.as_str());
            }
        }
        dups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_uptime_suffix() {
        assert_eq!(normalize_status("Up 10d:3h:14m:20s"), "Up");
        assert_eq!(normalize_status("Down"), "Down");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["Up 1d", "  Down  ", "Unprovisioned 3m", "", "Up"] {
            let once = normalize_status(raw);
            assert_eq!(normalize_status(once), once);
        }
    }

    #[test]
    fn unknown_status_passes_through() {
        assert_eq!(normalize_status("Unprovisioned"), "Unprovisioned");
        assert_eq!(normalize_status("   "), "");
    }

    #[test]
    fn extra_controller_fields_are_dropped() {
        let raw = r#"{
            "AP Database": [
                {"Name": "AP1", "Status": "Up 2h:1m", "IP Address": "10.0.0.5", "Group": "default"}
            ],
            "_meta": ["Name", "Group", "IP Address", "Status"]
        }"#;
        let db: ApDatabase = serde_json::from_str(raw).unwrap();
        assert_eq!(db.records, vec![ApRecord::new("AP1", "Up 2h:1m")]);

        let out = serde_json::to_value(&db).unwrap();
        assert_eq!(out["AP Database"][0].as_object().unwrap().len(), 2);
    }

    #[test]
    fn duplicate_names_reported_once() {
        let snapshot = Snapshot::new(
            Role::Before,
            vec![
                ApRecord::new("AP1", "Up"),
                ApRecord::new("AP1", "Down"),
                ApRecord::new("AP2", "Up"),
                ApRecord::new("AP1", "Up"),
            ],
        );
        assert_eq!(snapshot.duplicate_names(), vec!["AP1"]);
    }
}
