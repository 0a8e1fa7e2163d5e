use chrono::{DateTime, Local, Utc};
use std::time::Duration;

/// Local wall-clock time, minute precision.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_optional_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| "unknown".to_string())
}

/// Time from `from` to `to` at second precision, e.g. "2h 14m 5s".
/// A negative span is prefixed with '-'.
pub fn format_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let secs = to.signed_duration_since(from).num_seconds();
    if secs == 0 {
        return "0s".to_string();
    }

    let formatted = humantime::format_duration(Duration::from_secs(secs.unsigned_abs())).to_string();
    if secs < 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}
