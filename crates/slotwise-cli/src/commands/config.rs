//! Configuration commands.

use clap::Subcommand;
use slotwise_core::{Config, HourRange};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Set the IANA timezone
    SetTimezone {
        /// Timezone name, e.g. America/Chicago
        timezone: String,
    },
    /// Set awake-hours for a weekday
    SetDay {
        /// Weekday: monday .. sunday
        day: String,
        /// First available hour (0-23)
        start: u8,
        /// Hour the window closes (0-23)
        end: u8,
    },
    /// Mark a weekday as fully unavailable
    DisableDay {
        /// Weekday: monday .. sunday
        day: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }
        ConfigAction::SetTimezone { timezone } => {
            let mut config = Config::load_or_default();
            config.timezone = timezone;
            // Reject unknown zones before they reach disk
            config.availability()?;
            config.save()?;
            println!("timezone updated");
        }
        ConfigAction::SetDay { day, start, end } => {
            let mut config = Config::load_or_default();
            set_day(&mut config, &day, Some(HourRange::new(start, end)))?;
            config.availability()?;
            config.save()?;
            println!("awake-hours updated");
        }
        ConfigAction::DisableDay { day } => {
            let mut config = Config::load_or_default();
            set_day(&mut config, &day, None)?;
            config.save()?;
            println!("{day} disabled");
        }
    }
    Ok(())
}

fn set_day(
    config: &mut Config,
    day: &str,
    range: Option<HourRange>,
) -> Result<(), Box<dyn std::error::Error>> {
    let hours = &mut config.awake_hours;
    match day.to_ascii_lowercase().as_str() {
        "monday" => hours.monday = range,
        "tuesday" => hours.tuesday = range,
        "wednesday" => hours.wednesday = range,
        "thursday" => hours.thursday = range,
        "friday" => hours.friday = range,
        "saturday" => hours.saturday = range,
        "sunday" => hours.sunday = range,
        other => return Err(format!("unknown weekday: {other}").into()),
    }
    Ok(())
}
