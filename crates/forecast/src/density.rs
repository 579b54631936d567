//! Fresh snow density.

/// Density of liquid water (kg/m³).
pub const WATER_DENSITY: f64 = 1000.0;

/// Density of freshly fallen snow as a function of air temperature.
pub trait SnowDensity: std::fmt::Debug {
    /// Density (kg/m³) at mean air temperature `temperature` (°C).
    fn density(&self, temperature: f64) -> f64;

    /// Snow depth (mm) of `water_equivalent` mm of water.
    fn depth(&self, water_equivalent: f64, temperature: f64) -> f64 {
        water_equivalent / (self.density(temperature) / WATER_DENSITY)
    }

    /// Water equivalent (mm) of `depth` mm of snow.
    fn water_equivalent(&self, depth: f64, temperature: f64) -> f64 {
        depth * self.density(temperature) / WATER_DENSITY
    }
}

/// Hedstrom & Pomeroy (1998) for sub-freezing air, with a linear warm
/// branch capped at 200 kg/m³.
#[derive(Debug, Clone, Copy, Default)]
pub struct HedstromPomeroy;

impl SnowDensity for HedstromPomeroy {
    fn density(&self, temperature: f64) -> f64 {
        if temperature <= 0.0 {
            67.92 + 51.25 * (temperature / 2.59).exp()
        } else {
            (119.17 + 20.0 * temperature).min(200.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn branches() {
        let model = HedstromPomeroy;
        assert_abs_diff_eq!(model.density(0.0), 119.17, epsilon = 1e-9);
        assert_abs_diff_eq!(model.density(2.0), 159.17, epsilon = 1e-9);
        assert_eq!(model.density(10.0), 200.0);
        assert!(model.density(-20.0) < 70.0);
    }

    #[test]
    fn depth_and_water_equivalent_are_inverse() {
        let model = HedstromPomeroy;
        let depth = model.depth(12.0, -3.0);
        assert!(depth > 12.0);
        assert_abs_diff_eq!(model.water_equivalent(depth, -3.0), 12.0, epsilon = 1e-9);
    }
}
