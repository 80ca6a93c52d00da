//! Availability window inspection.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;
use slotwise_core::Config;

use crate::common;

#[derive(Subcommand)]
pub enum WindowsAction {
    /// Print the resolved window for a local calendar date
    Show {
        /// Date, YYYY-MM-DD, in the configured timezone
        date: String,
        /// Snapshot JSON file providing group definitions
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Resolve with this group's auto-schedule hours
        #[arg(long)]
        group: Option<String>,
    },
}

pub fn run(action: WindowsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let availability = config.availability()?;

    match action {
        WindowsAction::Show {
            date,
            snapshot,
            group,
        } => {
            let date: NaiveDate = date
                .parse()
                .map_err(|e| format!("invalid date '{date}': {e}"))?;

            let snapshot = match &snapshot {
                Some(path) => Some(common::load_snapshot(path)?),
                None => None,
            };
            let group = match (&snapshot, group.as_deref()) {
                (Some(snap), Some(id)) => Some(
                    snap.group(id)
                        .ok_or_else(|| format!("no group with id '{id}'"))?
                        .clone(),
                ),
                (None, Some(_)) => {
                    return Err("--group requires --snapshot for group definitions".into())
                }
                _ => None,
            };

            let windows = availability.windows_for(date, group.as_ref());
            if windows.is_empty() {
                println!("{date}: unavailable");
            }
            for window in windows {
                println!(
                    "{date}: {} .. {} ({} min)",
                    window.start.to_rfc3339(),
                    window.end.to_rfc3339(),
                    window.duration_minutes()
                );
            }
        }
    }
    Ok(())
}
