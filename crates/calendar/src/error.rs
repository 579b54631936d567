//! Error types for the hydromet-calendar crate.

/// Error type for all fallible operations in the hydromet-calendar crate.
///
/// This enum covers validation failures for the components of a
/// [`DateHour`](crate::DateHour) and parse failures of its text form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum CalendarError {
    /// Returned when an hour is outside 0..=24.
    #[error("invalid hour: {hour} (must be 0..=24)")]
    InvalidHour {
        /// The invalid hour that was provided.
        hour: u16,
    },

    /// Returned when a month number is outside 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u16,
    },

    /// Returned when a day number exceeds the length of its month.
    #[error("invalid day: {day} for {year}-{month:02} (max {max_day})")]
    InvalidDay {
        /// Year of the rejected date.
        year: u16,
        /// Month of the rejected date.
        month: u16,
        /// The invalid day number that was provided.
        day: u16,
        /// The maximum valid day for that month.
        max_day: u16,
    },

    /// Returned when a day-of-year is outside the length of its year.
    #[error("invalid day of year: {doy} for year {year}")]
    InvalidDoy {
        /// Year the day-of-year was resolved against.
        year: u16,
        /// The invalid day-of-year value.
        doy: u16,
    },

    /// Returned when a `YYYY-MM-DD HH` string cannot be parsed.
    #[error("cannot parse '{input}' as YYYY-MM-DD HH: {reason}")]
    Parse {
        /// The text that failed to parse.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Returned when arithmetic leaves the representable year range.
    #[error("date out of range: {reason}")]
    OutOfRange {
        /// Description of the overflowing operation.
        reason: String,
    },
}
