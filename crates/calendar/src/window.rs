//! Day-aligned read windows.

use crate::date::DateHour;

/// A half-open `[start, end)` interval whose bounds fall on midnight.
///
/// Station series are read over a day-aligned window so that daily
/// min/max queries always find a complete day of backing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: DateHour,
    end: DateHour,
}

impl DayWindow {
    /// Snaps `[start, end)` outward to whole days.
    ///
    /// The start moves back to 00h of its day; the end moves to 00h of the
    /// day following `end`'s day (so `end` itself is always covered).
    pub fn snap(start: DateHour, end: DateHour) -> Self {
        Self {
            start: start.start_of_day(),
            end: end.start_of_day().plus_hours(24),
        }
    }

    /// Returns the first hour of the window.
    pub fn start(self) -> DateHour {
        self.start
    }

    /// Returns the exclusive end of the window.
    pub fn end(self) -> DateHour {
        self.end
    }

    /// Returns the number of whole days covered.
    pub fn n_days(self) -> i64 {
        self.start.days_between(self.end)
    }

    /// Returns `true` if `at` lies in `[start, end)`.
    pub fn contains(self, at: DateHour) -> bool {
        self.start <= at && at < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dh(y: u16, m: u16, d: u16, h: u16) -> DateHour {
        DateHour::new(y, m, d, h).unwrap()
    }

    #[test]
    fn snaps_outward() {
        let window = DayWindow::snap(dh(2020, 1, 1, 6), dh(2020, 1, 3, 18));
        assert_eq!(window.start(), dh(2020, 1, 1, 0));
        assert_eq!(window.end(), dh(2020, 1, 4, 0));
        assert_eq!(window.n_days(), 3);
    }

    #[test]
    fn midnight_end_still_gains_a_day() {
        let window = DayWindow::snap(dh(2020, 1, 1, 0), dh(2020, 1, 2, 0));
        assert_eq!(window.end(), dh(2020, 1, 3, 0));
    }

    #[test]
    fn contains_is_half_open() {
        let window = DayWindow::snap(dh(2020, 1, 1, 0), dh(2020, 1, 1, 0));
        assert!(window.contains(dh(2020, 1, 1, 23)));
        assert!(!window.contains(dh(2020, 1, 2, 0)));
    }
}
