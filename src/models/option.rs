use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// A candidate as it arrives from the options step, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OptionInput {
    Date { date: String },
    TimeSlot { start: String, end: String },
}

impl OptionInput {
    pub fn date(date: impl Into<String>) -> Self {
        OptionInput::Date { date: date.into() }
    }

    pub fn time_slot(start: impl Into<String>, end: impl Into<String>) -> Self {
        OptionInput::TimeSlot {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Turns raw input into a `(start, duration)` pair.
    pub fn normalize(&self) -> Result<NewOption, ValidationError> {
        self.normalize_in(None)
    }

    /// Like [`normalize`](Self::normalize), but zoned times (RFC 3339 with
    /// `Z` or an offset) are moved to `poll_zone`'s wall clock first. Without
    /// a zone they keep the wall time they were written in.
    pub fn normalize_in(&self, poll_zone: Option<Tz>) -> Result<NewOption, ValidationError> {
        match self {
            OptionInput::Date { date } => {
                let day = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| {
                    ValidationError::Unparsable {
                        field: "date",
                        value: date.clone(),
                    }
                })?;
                Ok(NewOption {
                    start: day.and_hms_opt(0, 0, 0).unwrap_or_default(),
                    duration: 0,
                })
            }
            OptionInput::TimeSlot { start, end } => {
                let from = parse_date_time("start", start, poll_zone)?;
                let to = parse_date_time("end", end, poll_zone)?;
                if to <= from {
                    return Err(ValidationError::EndBeforeStart {
                        start: start.clone(),
                        end: end.clone(),
                    });
                }
                let duration = (to - from).num_minutes();
                // A sub-minute slot would otherwise turn into an all-day option.
                if duration == 0 {
                    return Err(ValidationError::SlotTooShort);
                }
                Ok(NewOption {
                    start: from,
                    duration,
                })
            }
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, OptionInput::TimeSlot { .. })
    }
}

fn parse_date_time(
    field: &'static str,
    value: &str,
    poll_zone: Option<Tz>,
) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = value.trim();
    if let Ok(zoned) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(match poll_zone {
            Some(zone) => zoned.with_timezone(&zone).naive_local(),
            None => zoned.naive_local(),
        });
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ValidationError::Unparsable {
            field,
            value: value.to_string(),
        })
}

/// A normalized candidate that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NewOption {
    pub start: NaiveDateTime,
    /// Minutes. `0` means the option is a whole day.
    pub duration: i64,
}

impl NewOption {
    pub fn is_all_day(&self) -> bool {
        self.duration == 0
    }
}

impl fmt::Display for NewOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_slot(f, self.start, self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub start: NaiveDateTime,
    pub duration: i64,
}

impl PollOption {
    pub fn is_all_day(&self) -> bool {
        self.duration == 0
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(self.duration)
    }

    /// Start time as seen from `viewer`'s zone. All-day options are not
    /// anchored to a zone and come back untouched, as do local times that
    /// don't exist in the poll's zone.
    pub fn start_in(&self, poll_zone: Tz, viewer: Tz) -> NaiveDateTime {
        if self.is_all_day() {
            return self.start;
        }
        poll_zone
            .from_local_datetime(&self.start)
            .earliest()
            .map(|zoned| zoned.with_timezone(&viewer).naive_local())
            .unwrap_or(self.start)
    }

    pub fn as_new(&self) -> NewOption {
        NewOption {
            start: self.start,
            duration: self.duration,
        }
    }
}

impl fmt::Display for PollOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_slot(f, self.start, self.duration)
    }
}

fn write_slot(f: &mut fmt::Formatter<'_>, start: NaiveDateTime, duration: i64) -> fmt::Result {
    if duration == 0 {
        write!(f, "{}", start.format("%a %-d %b %Y"))
    } else {
        let end = start + Duration::minutes(duration);
        write!(
            f,
            "{} {}-{}",
            start.format("%a %-d %b %Y"),
            start.format("%H:%M"),
            end.format("%H:%M")
        )
    }
}

pub fn parse_time_zone(name: &str) -> Result<Tz, ValidationError> {
    name.parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimeZone(name.to_string()))
}
