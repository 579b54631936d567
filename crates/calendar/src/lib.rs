//! # hydromet-calendar
//!
//! Hour-resolution Gregorian date arithmetic. Every time series offset in
//! the workspace is `start.hours_between(t) / timestep`, so this crate is the
//! foundation for aligning station records, forecast rasters and the
//! simulation clock.
//!
//! ## Quick Start
//!
//! ```
//! use hydromet_calendar::{DateHour, DayWindow, is_leap_year};
//!
//! let mut t: DateHour = "2024-02-28 24".parse().unwrap();
//! assert_eq!(t, DateHour::new(2024, 2, 29, 0).unwrap());
//!
//! t.subtract_hours(3);
//! assert_eq!(t.to_string(), "2024-02-28 21");
//! assert!(is_leap_year(2024));
//!
//! let window = DayWindow::snap(t, t);
//! assert_eq!(window.n_days(), 1);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `date` | `DateHour` value type and its arithmetic |
//! | `doy` | Day-of-year newtype, leap years and month lengths |
//! | `sequence` | Timestep sequence generation |
//! | `window` | Day-aligned read windows |
//! | `error` | Error types |

mod date;
mod doy;
mod error;
mod sequence;
mod window;

pub use date::DateHour;
pub use doy::{Doy, MAX_DOY, days_in_month, days_in_year, is_leap_year};
pub use error::CalendarError;
pub use sequence::timesteps;
pub use window::DayWindow;
