//! Day-of-year newtype and Gregorian month tables.

use crate::error::CalendarError;

/// Day-of-year in the Gregorian calendar (1..=366).
///
/// The value is year independent: day 366 only exists in leap years but
/// the newtype itself accepts it so that per-day caches can be sized once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Doy(u16);

/// Number of days in each month of a common year (index 0 unused).
pub(crate) const DAYS_PER_MONTH: [u16; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Largest day-of-year value.
pub const MAX_DOY: u16 = 366;

/// Returns `true` for Gregorian leap years.
///
/// Divisible by 4, except centuries, except centuries divisible by 400.
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in `month` of `year`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if `month` is not in 1..=12.
pub fn days_in_month(year: u16, month: u16) -> Result<u16, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth { month });
    }
    if month == 2 && is_leap_year(year) {
        Ok(29)
    } else {
        Ok(DAYS_PER_MONTH[month as usize])
    }
}

/// Returns the number of days in `year`.
pub fn days_in_year(year: u16) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

impl Doy {
    /// Creates a new `Doy`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDoy`] if `doy` is not in 1..=366.
    /// The error reports year 0 because no year context is available.
    pub fn new(doy: u16) -> Result<Self, CalendarError> {
        if !(1..=MAX_DOY).contains(&doy) {
            return Err(CalendarError::InvalidDoy { year: 0, doy });
        }
        Ok(Self(doy))
    }

    /// Returns the inner day-of-year value (1..=366).
    pub fn get(self) -> u16 {
        self.0
    }

    /// Returns the 0-based index suitable for array indexing (0..=365).
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
    }

    #[test]
    fn february_length() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(2023, 12).unwrap(), 31);
    }

    #[test]
    fn invalid_month() {
        assert_eq!(
            days_in_month(2023, 13).unwrap_err(),
            CalendarError::InvalidMonth { month: 13 }
        );
    }

    #[test]
    fn year_length() {
        assert_eq!(days_in_year(2020), 366);
        assert_eq!(days_in_year(2021), 365);
    }

    #[test]
    fn doy_bounds() {
        assert!(Doy::new(0).is_err());
        assert!(Doy::new(367).is_err());
        assert_eq!(Doy::new(366).unwrap().index(), 365);
        assert_eq!(Doy::new(1).unwrap().index(), 0);
    }
}
