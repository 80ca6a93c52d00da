//! Availability windows and the time-window resolver.
//!
//! This module provides:
//! - Typed per-weekday availability hours ([`WeekHours`], [`HourRange`])
//! - User-level awake-hours with an IANA timezone ([`Availability`])
//! - Group-level scheduling windows that override awake-hours ([`TaskGroup`])
//! - Resolution of a calendar date to concrete UTC window instants
//!
//! Hours are validated once at the boundary; the resolver itself assumes
//! well-formed input. All weekday computation happens in the user's
//! timezone, never the server/UTC weekday.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::Slot;

/// An allowed `[start, end)` span of whole hours within one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourRange {
    /// First available hour of the day (0-23)
    pub start: u8,
    /// Hour the window closes (0-23, exclusive, must be greater than start)
    pub end: u8,
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }
}

/// Per-weekday optional availability hours.
///
/// `None` means the day is fully unavailable for scheduling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekHours {
    #[serde(default)]
    pub monday: Option<HourRange>,
    #[serde(default)]
    pub tuesday: Option<HourRange>,
    #[serde(default)]
    pub wednesday: Option<HourRange>,
    #[serde(default)]
    pub thursday: Option<HourRange>,
    #[serde(default)]
    pub friday: Option<HourRange>,
    #[serde(default)]
    pub saturday: Option<HourRange>,
    #[serde(default)]
    pub sunday: Option<HourRange>,
}

impl WeekHours {
    /// Same hours every day of the week.
    pub fn uniform(range: HourRange) -> Self {
        Self {
            monday: Some(range),
            tuesday: Some(range),
            wednesday: Some(range),
            thursday: Some(range),
            friday: Some(range),
            saturday: Some(range),
            sunday: Some(range),
        }
    }

    /// The entry for a given weekday.
    pub fn for_weekday(&self, weekday: Weekday) -> Option<HourRange> {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// Validate every configured range: hours 0-23 and start < end.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let days = [
            ("monday", self.monday),
            ("tuesday", self.tuesday),
            ("wednesday", self.wednesday),
            ("thursday", self.thursday),
            ("friday", self.friday),
            ("saturday", self.saturday),
            ("sunday", self.sunday),
        ];
        for (name, entry) in days {
            if let Some(range) = entry {
                if range.start > 23 || range.end > 23 || range.start >= range.end {
                    return Err(ValidationError::InvalidHourRange {
                        weekday: name.to_string(),
                        start: range.start,
                        end: range.end,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A group of tasks that may carry its own scheduling window.
///
/// When `auto_schedule_enabled` is set, the group's hours replace the user's
/// awake-hours entirely for tasks in the group -- a `None` weekday entry
/// disables that day even if the user is otherwise awake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGroup {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether the group's hours override the user's awake-hours
    pub auto_schedule_enabled: bool,
    /// Per-weekday scheduling window for tasks in this group
    #[serde(default)]
    pub auto_schedule_hours: WeekHours,
    /// Priority 1-10, tie-break among groups
    pub priority: u8,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TaskGroup {
    /// Create a new group with auto-scheduling disabled.
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            auto_schedule_enabled: false,
            auto_schedule_hours: WeekHours::default(),
            priority: 5,
            created_at,
        }
    }
}

/// A user's availability configuration: timezone plus awake-hours.
#[derive(Debug, Clone)]
pub struct Availability {
    /// IANA timezone all wall-clock hours are interpreted in
    pub timezone: Tz,
    /// Default per-weekday awake-hours
    pub awake_hours: WeekHours,
}

impl Availability {
    pub fn new(timezone: Tz, awake_hours: WeekHours) -> Self {
        Self {
            timezone,
            awake_hours,
        }
    }

    /// The user-local calendar date containing a UTC instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    /// Resolve the allowed window(s) for a user-local calendar date.
    ///
    /// If `group` is provided and has auto-scheduling enabled, its weekday
    /// entry decides the window (a `None` entry disables the day); otherwise
    /// the user's awake-hours entry applies. Returns an empty vector when
    /// the day is fully unavailable.
    pub fn windows_for(&self, date: NaiveDate, group: Option<&TaskGroup>) -> Vec<Slot> {
        let hours = match group {
            Some(g) if g.auto_schedule_enabled => &g.auto_schedule_hours,
            _ => &self.awake_hours,
        };

        let Some(range) = hours.for_weekday(date.weekday()) else {
            return Vec::new();
        };

        match (
            self.instant_at(date, range.start),
            self.instant_at(date, range.end),
        ) {
            (Some(start), Some(end)) if start < end => vec![Slot::new(start, end)],
            // A DST transition swallowed an endpoint; treat the day as closed
            _ => Vec::new(),
        }
    }

    /// The UTC instant a user-local calendar date begins.
    ///
    /// When midnight does not exist locally (a DST gap), the first hour of
    /// the day that does exist is used instead.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        for hour in 0..24 {
            if let Some(instant) = self.instant_at(date, hour) {
                return instant;
            }
        }
        Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
    }

    /// Convert a local wall-clock hour on a date into a UTC instant.
    ///
    /// Ambiguous local times (fall-back transitions) resolve to the earlier
    /// instant; nonexistent local times (spring-forward gaps) yield `None`.
    fn instant_at(&self, date: NaiveDate, hour: u8) -> Option<DateTime<Utc>> {
        let naive = date.and_hms_opt(u32::from(hour), 0, 0)?;
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
