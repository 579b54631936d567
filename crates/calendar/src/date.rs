//! Hour-resolution Gregorian date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::doy::{Doy, days_in_month, days_in_year, is_leap_year};
use crate::error::CalendarError;

/// A calendar date with an hour of day, the time index of every series.
///
/// Series offsets are computed as `start.hours_between(t) / timestep`, so
/// the arithmetic here is exact integer arithmetic on a day count; there is
/// no timezone and no leap second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateHour {
    // Field order drives the derived lexicographic ordering.
    year: u16,
    month: u16,
    day: u16,
    hour: u16,
}

impl DateHour {
    /// Creates a new `DateHour`.
    ///
    /// An hour of 24 is normalised to hour 0 of the next day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError`] if the hour is outside 0..=24 or the
    /// month/day do not form a valid Gregorian date.
    pub fn new(year: u16, month: u16, day: u16, hour: u16) -> Result<Self, CalendarError> {
        if hour > 24 {
            return Err(CalendarError::InvalidHour { hour });
        }
        let max_day = days_in_month(year, month)?;
        if !(1..=max_day).contains(&day) {
            return Err(CalendarError::InvalidDay {
                year,
                month,
                day,
                max_day,
            });
        }

        let date = Self {
            year,
            month,
            day,
            hour: 0,
        };
        if hour == 24 {
            date.checked_plus_hours(24)
        } else {
            Ok(Self { hour, ..date })
        }
    }

    /// Creates a `DateHour` from a year, a day-of-year (1-based) and an hour.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDoy`] if `doy` exceeds the length of
    /// `year`, or [`CalendarError::InvalidHour`] for hours above 24.
    pub fn from_day_of_year(year: u16, doy: u16, hour: u16) -> Result<Self, CalendarError> {
        if doy == 0 || doy > days_in_year(year) {
            return Err(CalendarError::InvalidDoy { year, doy });
        }
        let jan1 = Self::new(year, 1, 1, 0)?;
        let date = jan1.checked_plus_hours(i64::from(doy - 1) * 24)?;
        Self::new(date.year, date.month, date.day, hour)
    }

    /// Creates a `DateHour` from seconds since 1970-01-01 00:00.
    ///
    /// Minutes and seconds are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] for timestamps chrono cannot
    /// represent or whose year does not fit in `u16`.
    pub fn from_epoch_seconds(seconds: i64) -> Result<Self, CalendarError> {
        let dt = chrono::DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| CalendarError::OutOfRange {
                reason: format!("epoch seconds {seconds}"),
            })?
            .naive_utc();
        Self::try_from(dt)
    }

    /// Returns seconds since 1970-01-01 00:00, ignoring any timezone.
    pub fn to_epoch_seconds(self) -> i64 {
        NaiveDateTime::from(self).and_utc().timestamp()
    }

    /// Returns the year.
    pub fn year(self) -> u16 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u16 {
        self.month
    }

    /// Returns the day of month (1..=31).
    pub fn day(self) -> u16 {
        self.day
    }

    /// Returns the hour (0..=23).
    pub fn hour(self) -> u16 {
        self.hour
    }

    /// Returns `true` if this date's year is a leap year.
    pub fn is_leap_year(self) -> bool {
        is_leap_year(self.year)
    }

    /// Returns the day-of-year (1..=366).
    pub fn day_of_year(self) -> Doy {
        // The ordinal of a valid date is always within 1..=366.
        Doy::new(self.naive_date().ordinal() as u16).expect("ordinal is within 1..=366")
    }

    /// Returns the same day at hour 0.
    pub fn start_of_day(self) -> Self {
        Self { hour: 0, ..self }
    }

    /// Adds `hours` (any sign, any magnitude) in place.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves the years 0..=65535.
    pub fn add_hours(&mut self, hours: i64) {
        *self = self.plus_hours(hours);
    }

    /// Subtracts `hours` (any sign, any magnitude) in place.
    ///
    /// A negative hour remainder rolls the date back one day, leaving
    /// `hour = 24 - (|remainder| mod 24)`.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves the years 0..=65535.
    pub fn subtract_hours(&mut self, hours: i64) {
        *self = self.plus_hours(-hours);
    }

    /// Returns this date shifted by `hours`.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves the years 0..=65535.
    pub fn plus_hours(self, hours: i64) -> Self {
        self.checked_plus_hours(hours)
            .expect("DateHour arithmetic stays within years 0..=65535")
    }

    /// Returns this date shifted by `hours`, or an error on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the result leaves the years
    /// 0..=65535.
    pub fn checked_plus_hours(self, hours: i64) -> Result<Self, CalendarError> {
        let total = self.day_number() * 24 + i64::from(self.hour) + hours;
        let days = total.div_euclid(24);
        let hour = total.rem_euclid(24) as u16;
        Self::from_day_number(days, hour)
    }

    /// Returns the number of calendar days from `self` to `other`.
    ///
    /// Only the dates count; hours are ignored.
    pub fn days_between(self, other: Self) -> i64 {
        other.day_number() - self.day_number()
    }

    /// Returns the number of hours from `self` to `other`.
    pub fn hours_between(self, other: Self) -> i64 {
        self.days_between(other) * 24 + i64::from(other.hour) - i64::from(self.hour)
    }

    fn naive_date(self) -> NaiveDate {
        // Constructors only produce valid Gregorian dates.
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))
            .expect("DateHour always holds a valid date")
    }

    fn day_number(self) -> i64 {
        i64::from(self.naive_date().num_days_from_ce())
    }

    fn from_day_number(days: i64, hour: u16) -> Result<Self, CalendarError> {
        let date = i32::try_from(days)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(|| CalendarError::OutOfRange {
                reason: format!("day number {days}"),
            })?;
        let year = u16::try_from(date.year()).map_err(|_| CalendarError::OutOfRange {
            reason: format!("year {}", date.year()),
        })?;
        Ok(Self {
            year,
            month: date.month() as u16,
            day: date.day() as u16,
            hour,
        })
    }
}

impl Default for DateHour {
    /// 1970-01-01 00h, the epoch of [`DateHour::to_epoch_seconds`].
    fn default() -> Self {
        Self {
            year: 1970,
            month: 1,
            day: 1,
            hour: 0,
        }
    }
}

impl fmt::Display for DateHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}",
            self.year, self.month, self.day, self.hour
        )
    }
}

impl FromStr for DateHour {
    type Err = CalendarError;

    /// Parses `"YYYY-MM-DD HH"`; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason: &str| CalendarError::Parse {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split_whitespace();
        let date = parts.next().ok_or_else(|| parse_err("empty input"))?;
        let hour = parts
            .next()
            .ok_or_else(|| parse_err("missing hour after the date"))?;
        if parts.next().is_some() {
            return Err(parse_err("trailing characters after the hour"));
        }

        let fields: Vec<&str> = date.split('-').collect();
        if fields.len() != 3 {
            return Err(parse_err("date must be YYYY-MM-DD"));
        }
        let number = |text: &str, what: &str| {
            text.parse::<u16>()
                .map_err(|e| parse_err(&format!("{what} '{text}': {e}")))
        };

        Self::new(
            number(fields[0], "year")?,
            number(fields[1], "month")?,
            number(fields[2], "day")?,
            number(hour, "hour")?,
        )
    }
}

impl From<DateHour> for NaiveDateTime {
    fn from(value: DateHour) -> Self {
        value
            .naive_date()
            .and_hms_opt(u32::from(value.hour), 0, 0)
            .expect("hour is always within 0..=23")
    }
}

impl TryFrom<NaiveDateTime> for DateHour {
    type Error = CalendarError;

    /// Converts a chrono timestamp, truncating minutes and seconds.
    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        let year = u16::try_from(value.year()).map_err(|_| CalendarError::OutOfRange {
            reason: format!("year {}", value.year()),
        })?;
        Self::new(
            year,
            value.month() as u16,
            value.day() as u16,
            value.hour() as u16,
        )
    }
}
