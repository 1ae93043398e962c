//! elapsed.rs
//!
//! This module turns (start date, now) into the "love time" breakdown:
//!     "X years, Y months, Z days, H hours, M minutes, S seconds"
//!
//! Calendar units are not uniform, so this is not a duration divided into
//! buckets. Each field is counted in whole units from a running anchor that
//! has already been advanced by every larger field:
//!   • years and months come from one whole-month count (months % 12)
//!   • the anchor moves by years, then by months, clamping to month end
//!   • days, hours, minutes and seconds are counted from the moved anchor
//!
//! A month is only counted once the day-of-month *and* time-of-day of `now`
//! have reached those of the anchor, so Jan 31 → Mar 1 is 1 month and 1 day
//! (the anchor clamps to Feb 28).

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::start_date::StartDate;

/// Calendar-aware decomposition of elapsed time.
///
/// Ordering is lexicographic over (years, months, days, hours, minutes,
/// seconds), which is also the order elapsed time grows in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElapsedBreakdown {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ElapsedBreakdown {
    pub const ZERO: Self = Self {
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Fields paired with their singular unit names, largest first.
    pub fn fields(&self) -> [(&'static str, u32); 6] {
        [
            ("year", self.years),
            ("month", self.months),
            ("day", self.days),
            ("hour", self.hours),
            ("minute", self.minutes),
            ("second", self.seconds),
        ]
    }
}

impl fmt::Display for ElapsedBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (unit, n)) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{n} {unit}{}", plural(*n))?;
        }
        Ok(())
    }
}

/// Computes the elapsed breakdown from `start` to `now`.
///
/// Sub-second precision in `now` is dropped. A start date at or after `now`
/// yields [`ElapsedBreakdown::ZERO`].
pub fn compute(start: &StartDate, now: NaiveDateTime) -> ElapsedBreakdown {
    let start = start.as_datetime();
    let now = now.with_nanosecond(0).unwrap_or(now);

    if now <= start {
        return ElapsedBreakdown::ZERO;
    }

    cascade(start, now).unwrap_or_else(|| {
        log::error!("calendar overflow computing elapsed time from {start} to {now}");
        ElapsedBreakdown::ZERO
    })
}

fn cascade(start: NaiveDateTime, now: NaiveDateTime) -> Option<ElapsedBreakdown> {
    let total_months = months_between(start, now);
    let years = total_months / 12;
    let months = total_months % 12;

    let anchor = plus_months(start, years.checked_mul(12)?)?;
    let anchor = plus_months(anchor, months)?;

    let days = days_between(anchor, now);
    let anchor = anchor.checked_add_signed(TimeDelta::try_days(days)?)?;

    let hours = now.signed_duration_since(anchor).num_hours();
    let anchor = anchor.checked_add_signed(TimeDelta::try_hours(hours)?)?;

    let minutes = now.signed_duration_since(anchor).num_minutes() % 60;
    let anchor = anchor.checked_add_signed(TimeDelta::try_minutes(minutes)?)?;

    let seconds = now.signed_duration_since(anchor).num_seconds() % 60;

    Some(ElapsedBreakdown {
        years: whole(years),
        months: whole(months),
        days: whole(days),
        hours: whole(hours),
        minutes: whole(minutes),
        seconds: whole(seconds),
    })
}

fn whole(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

/// Whole months from `from` to `to`, truncated toward zero.
///
/// Dates are packed as `(year * 12 + month0) * 32 + day` so that a partial
/// month (day-of-month not yet reached) never rounds up.
pub fn months_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let end = adjusted_end_date(from, to);
    (packed_month_day(end) - packed_month_day(from.date())) / 32
}

/// Whole days from `from` to `to`, truncated toward zero.
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    adjusted_end_date(from, to)
        .signed_duration_since(from.date())
        .num_days()
}

// A date-based count only includes the final day once its time-of-day
// reaches that of `from`.
fn adjusted_end_date(from: NaiveDateTime, to: NaiveDateTime) -> NaiveDate {
    let (start, end) = (from.date(), to.date());
    if end > start && to.time() < from.time() {
        end.pred_opt().unwrap_or(end)
    } else if end < start && to.time() > from.time() {
        end.succ_opt().unwrap_or(end)
    } else {
        end
    }
}

fn packed_month_day(date: NaiveDate) -> i64 {
    (i64::from(date.year()) * 12 + i64::from(date.month0())) * 32 + i64::from(date.day())
}

/// Moves `at` by `months` calendar months, keeping the time of day.
///
/// The day-of-month is clamped to the length of the target month:
/// Jan 31 + 1 month = Feb 28 (or 29), Feb 29 + 12 months = Feb 28.
pub fn plus_months(at: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let total = i64::from(at.year()) * 12 + i64::from(at.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = at.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(at.time()))
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Returns number of days in a given year/month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // should never occur but keeps function total
    }
}

/// Leap-year rule (Gregorian):
///   - divisible by 4 → leap year
///   - except divisible by 100 → not leap year
///   - except divisible by 400 → leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
