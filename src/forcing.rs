//! Application of the correction layer to zone forcing.

use hydromet_calendar::DateHour;
use hydromet_correction::{Correction, CorrectionSet, CorrectionVariable, GroupScope};
use hydromet_station::WeatherSample;

/// Corrections together with the group names of every zone.
#[derive(Debug, Default)]
pub struct ZoneCorrections {
    set: CorrectionSet,
    zone_groups: Vec<Vec<String>>,
}

impl ZoneCorrections {
    pub fn new(set: CorrectionSet, zone_groups: Vec<Vec<String>>) -> Self {
        Self { set, zone_groups }
    }

    /// Adjusts `samples` (one per zone index) with every correction
    /// applicable at `at`. Returns the number of adjusted zone values.
    pub fn apply(&self, at: DateHour, samples: &mut [WeatherSample]) -> usize {
        let mut n_adjusted = 0;
        for variable in [CorrectionVariable::Temperature, CorrectionVariable::Rain, CorrectionVariable::Snow] {
            for correction in self.set.applicable(at, variable) {
                for (index, sample) in samples.iter_mut().enumerate() {
                    let groups = self.zone_groups.get(index).map_or(&[][..], Vec::as_slice);
                    if !targets_zone(correction, groups) {
                        continue;
                    }
                    n_adjusted += match variable {
                        CorrectionVariable::Temperature => {
                            usize::from(adjust(&mut sample.tmin, correction))
                                + usize::from(adjust(&mut sample.tmax, correction))
                        }
                        CorrectionVariable::Rain => usize::from(adjust(&mut sample.rain, correction)),
                        _ => usize::from(adjust(&mut sample.snow, correction)),
                    };
                }
            }
        }
        n_adjusted
    }
}

fn targets_zone(correction: &Correction, groups: &[String]) -> bool {
    correction.scope == GroupScope::AllZones || groups.iter().any(|g| correction.targets(g))
}

fn adjust(value: &mut Option<f64>, correction: &Correction) -> bool {
    if let Some(v) = value.as_mut()
        && let Some(adjusted) = correction.adjust(*v)
    {
        *v = adjusted;
        return true;
    }
    false
}
