//! Shared helpers for CLI commands: snapshot file I/O and time parsing.

use std::path::Path;

use chrono::{DateTime, Utc};
use slotwise_core::Snapshot;

/// Load and validate a snapshot JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read snapshot {}: {e}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Write a snapshot back to its JSON file.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
    let raw = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, raw)
        .map_err(|e| format!("cannot write snapshot {}: {e}", path.display()))?;
    Ok(())
}

/// Parse an RFC3339 instant, defaulting to the current time.
pub fn parse_instant(at: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match at {
        None => Ok(Utc::now()),
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid instant '{raw}': {e}"))?
            .with_timezone(&Utc)),
    }
}
