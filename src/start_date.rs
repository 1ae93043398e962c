//! start_date.rs
//!
//! The zero-point the love timer counts from, and its persisted string form:
//!     "{year}-{month}-{day}-{hour}-{minute}"
//!
//! Fields are written without zero-padding. Seconds are always zero.
//! Only the first three tokens are required when parsing; a missing or
//! unreadable hour/minute falls back to 0.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartDateError {
    /// The persisted string could not be read as a start date.
    #[error("malformed start date `{input}`: expected year-month-day[-hour-minute]")]
    Malformed { input: String },

    #[error("{year}-{month}-{day} {hour}:{minute:02} is not a valid start date")]
    InvalidDate {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StartDate {
    at: NaiveDateTime,
}

impl StartDate {
    /// Builds a start date, rejecting anything that is not a real calendar
    /// date and time of day, or whose year falls outside 1..=9999.
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<Self, StartDateError> {
        let invalid = || StartDateError::InvalidDate {
            year,
            month,
            day,
            hour,
            minute,
        };

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(invalid());
        }
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;

        Ok(Self {
            at: date.and_time(time),
        })
    }

    /// Midnight at the start of `today`.
    pub fn midnight(today: NaiveDate) -> Self {
        Self {
            at: today.and_time(NaiveTime::MIN),
        }
    }

    pub fn year(&self) -> i32 {
        self.at.year()
    }

    pub fn month(&self) -> u32 {
        self.at.month()
    }

    pub fn day(&self) -> u32 {
        self.at.day()
    }

    pub fn hour(&self) -> u32 {
        self.at.hour()
    }

    pub fn minute(&self) -> u32 {
        self.at.minute()
    }

    /// The start date as a wall-clock timestamp (seconds always zero).
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.at
    }
}

impl fmt::Display for StartDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute()
        )
    }
}

/// Serializes a start date into its persisted string form.
pub fn format(date: &StartDate) -> String {
    date.to_string()
}

/// Parses the persisted string form of a start date.
pub fn parse(input: &str) -> Result<StartDate, StartDateError> {
    let malformed = || StartDateError::Malformed {
        input: input.to_string(),
    };

    let tokens: Vec<&str> = input.split('-').map(str::trim).collect();
    if tokens.len() < 3 {
        return Err(malformed());
    }

    let year: i32 = tokens[0].parse().map_err(|_| malformed())?;
    let month: u32 = tokens[1].parse().map_err(|_| malformed())?;
    let day: u32 = tokens[2].parse().map_err(|_| malformed())?;

    let hour = optional_field(tokens.get(3), 23);
    let minute = optional_field(tokens.get(4), 59);

    StartDate::new(year, month, day, hour, minute).map_err(|_| malformed())
}

/// Parses a persisted value, falling back to midnight of `today` when the
/// value is absent or malformed. Never fails.
pub fn parse_or_default(input: Option<&str>, today: NaiveDate) -> StartDate {
    match input {
        None => StartDate::midnight(today),
        Some(raw) => parse(raw).unwrap_or_else(|err| {
            log::warn!("{err}; using {today} 00:00 instead");
            StartDate::midnight(today)
        }),
    }
}

fn optional_field(token: Option<&&str>, max: u32) -> u32 {
    token
        .and_then(|t| t.parse::<u32>().ok())
        .filter(|v| *v <= max)
        .unwrap_or(0)
}

impl FromStr for StartDate {
    type Err = StartDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for StartDate {
    type Error = StartDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<StartDate> for String {
    fn from(date: StartDate) -> Self {
        format(&date)
    }
}
