//! Timestep sequence generation.

use crate::date::DateHour;

/// Generates the timesteps of the half-open interval `[start, end)`.
///
/// Starting from `start`, produces every `timestep_hours`-spaced
/// [`DateHour`] strictly before `end`. A zero timestep or an empty
/// interval yields an empty vector.
///
/// # Example
///
/// ```
/// use hydromet_calendar::{DateHour, timesteps};
///
/// let start = DateHour::new(2000, 12, 31, 0).unwrap();
/// let end = DateHour::new(2001, 1, 1, 12).unwrap();
/// let steps = timesteps(start, end, 12);
/// assert_eq!(steps.len(), 3);
/// ```
pub fn timesteps(start: DateHour, end: DateHour, timestep_hours: u16) -> Vec<DateHour> {
    if timestep_hours == 0 || end <= start {
        return Vec::new();
    }
    let step = i64::from(timestep_hours);
    let n = (start.hours_between(end) + step - 1) / step;
    let mut dates = Vec::with_capacity(n as usize);
    let mut current = start;
    while current < end {
        dates.push(current);
        current.add_hours(i64::from(timestep_hours));
    }
    dates
}
