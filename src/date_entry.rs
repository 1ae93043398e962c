//! The start-date entry form: five free-text fields submitted together.
//!
//! Blank or non-numeric fields fall back to today's year/month/day and to
//! midnight for the time. A combination that is not a real date is rejected.

use chrono::{Datelike, NaiveDate};

use crate::start_date::{StartDate, StartDateError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntry {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
}

impl Default for DateEntry {
    fn default() -> Self {
        Self {
            year: String::new(),
            month: String::new(),
            day: String::new(),
            hour: "0".to_string(),
            minute: "0".to_string(),
        }
    }
}

impl DateEntry {
    /// Resolves the submitted fields into a start date.
    pub fn resolve(&self, today: NaiveDate) -> Result<StartDate, StartDateError> {
        StartDate::new(
            field(&self.year).unwrap_or(today.year()),
            field(&self.month).unwrap_or(today.month()),
            field(&self.day).unwrap_or(today.day()),
            field(&self.hour).unwrap_or(0),
            field(&self.minute).unwrap_or(0),
        )
    }
}

fn field<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}
