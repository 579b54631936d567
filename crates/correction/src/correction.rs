//! The correction record.

use std::fmt;

use hydromet_calendar::DateHour;

/// Variable a correction adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionVariable {
    /// Air temperature.
    Temperature,
    /// Liquid precipitation.
    Rain,
    /// Solid precipitation.
    Snow,
    /// Soil water reserve.
    SoilReserve,
    /// Snow on the ground.
    SnowOnGround,
    /// Soil layer saturation (three layer coefficients).
    Saturation,
}

impl CorrectionVariable {
    /// Maps the file code (1..=6).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CorrectionVariable::Temperature),
            2 => Some(CorrectionVariable::Rain),
            3 => Some(CorrectionVariable::Snow),
            4 => Some(CorrectionVariable::SoilReserve),
            5 => Some(CorrectionVariable::SnowOnGround),
            6 => Some(CorrectionVariable::Saturation),
            _ => None,
        }
    }

    /// File code of this variable.
    pub fn code(self) -> u8 {
        match self {
            CorrectionVariable::Temperature => 1,
            CorrectionVariable::Rain => 2,
            CorrectionVariable::Snow => 3,
            CorrectionVariable::SoilReserve => 4,
            CorrectionVariable::SnowOnGround => 5,
            CorrectionVariable::Saturation => 6,
        }
    }
}

impl fmt::Display for CorrectionVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorrectionVariable::Temperature => "temperature",
            CorrectionVariable::Rain => "rain",
            CorrectionVariable::Snow => "snow",
            CorrectionVariable::SoilReserve => "soil reserve",
            CorrectionVariable::SnowOnGround => "snow on ground",
            CorrectionVariable::Saturation => "saturation",
        };
        f.write_str(name)
    }
}

/// Which zones a correction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupScope {
    /// Every simulated zone.
    AllZones,
    /// One hydrological zone group.
    HydroGroup,
    /// One correction group.
    CorrectionGroup,
}

impl GroupScope {
    /// Maps the file code (0..=2).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(GroupScope::AllZones),
            1 => Some(GroupScope::HydroGroup),
            2 => Some(GroupScope::CorrectionGroup),
            _ => None,
        }
    }
}

/// Correction coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficients {
    /// `value * multiplicative + additive`.
    Linear {
        /// Added after scaling.
        additive: f64,
        /// Scale factor.
        multiplicative: f64,
    },
    /// One coefficient per soil layer.
    Saturation([f64; 3]),
}

/// A time-windowed correction of one forcing variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    /// Adjusted variable.
    pub variable: CorrectionVariable,
    /// Targeted zones.
    pub scope: GroupScope,
    /// Group name; `None` for [`GroupScope::AllZones`].
    pub group: Option<String>,
    /// Inactive corrections never apply.
    pub active: bool,
    /// First date of validity.
    pub start: DateHour,
    /// Last date of validity (inclusive).
    pub end: DateHour,
    /// Coefficients; [`Coefficients::Saturation`] iff the variable is
    /// [`CorrectionVariable::Saturation`].
    pub coefficients: Coefficients,
}

impl Correction {
    /// True iff active and `start <= at <= end`.
    pub fn applicable(&self, at: DateHour) -> bool {
        self.active && self.start <= at && at <= self.end
    }

    /// Applies linear coefficients to `value`; `None` for saturation
    /// corrections, which act on soil layers rather than a single value.
    pub fn adjust(&self, value: f64) -> Option<f64> {
        match self.coefficients {
            Coefficients::Linear {
                additive,
                multiplicative,
            } => Some(value * multiplicative + additive),
            Coefficients::Saturation(_) => None,
        }
    }

    /// True if the correction targets `group`, comparing names without
    /// regard to case. All-zone corrections target every group.
    pub fn targets(&self, group: &str) -> bool {
        match (&self.scope, &self.group) {
            (GroupScope::AllZones, _) => true,
            (_, Some(name)) => name.eq_ignore_ascii_case(group),
            (_, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dh(y: u16, m: u16, d: u16, h: u16) -> DateHour {
        DateHour::new(y, m, d, h).unwrap()
    }

    fn rain_boost(active: bool) -> Correction {
        Correction {
            variable: CorrectionVariable::Rain,
            scope: GroupScope::HydroGroup,
            group: Some("Upper".to_string()),
            active,
            start: dh(2020, 4, 1, 0),
            end: dh(2020, 4, 30, 0),
            coefficients: Coefficients::Linear {
                additive: 0.5,
                multiplicative: 1.1,
            },
        }
    }

    #[test]
    fn inactive_never_applies() {
        let c = rain_boost(false);
        assert!(!c.applicable(dh(2020, 4, 1, 0)));
        assert!(!c.applicable(dh(2020, 4, 15, 12)));
        assert!(!c.applicable(dh(2020, 4, 30, 0)));
    }

    #[test]
    fn bounds_are_inclusive() {
        let c = rain_boost(true);
        assert!(c.applicable(dh(2020, 4, 1, 0)));
        assert!(c.applicable(dh(2020, 4, 30, 0)));
        assert!(!c.applicable(dh(2020, 3, 31, 23)));
        assert!(!c.applicable(dh(2020, 4, 30, 1)));
    }

    #[test]
    fn linear_adjustment() {
        let c = rain_boost(true);
        assert_eq!(c.adjust(10.0), Some(11.5));
        assert!(c.targets("UPPER"));
        assert!(!c.targets("lower"));
    }

    #[test]
    fn codes_round_trip() {
        for code in 1..=6 {
            assert_eq!(CorrectionVariable::from_code(code).map(|v| i64::from(v.code())), Some(code));
        }
        assert_eq!(CorrectionVariable::from_code(7), None);
        assert_eq!(GroupScope::from_code(3), None);
    }
}
