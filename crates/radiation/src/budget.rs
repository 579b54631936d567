//! Daily net radiation budget from temperatures.

/// Stefan-Boltzmann constant (MJ K⁻⁴ m⁻² d⁻¹).
pub const STEFAN_BOLTZMANN: f64 = 4.903e-9;

/// Transmissivity above which the sky is clear.
const CLEAR_SKY: f64 = 0.75;
/// Transmissivity below which the sky is overcast.
const OVERCAST: f64 = 0.15;

/// Empirical coefficients of the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationCoefficients {
    /// `A, B, C` of `τ = A (1 − exp(−B ΔT^C))`.
    pub transmissivity: [f64; 3],
    /// `A, B, C` of `ε = A + B T̄ + C cf`.
    pub atmospheric_emissivity: [f64; 3],
    /// `A, B` of `ε = A + B T̄`.
    pub surface_emissivity: [f64; 2],
}

/// Terms of one day's budget (MJ m⁻² d⁻¹).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationBudget {
    /// Incoming shortwave.
    pub shortwave_in: f64,
    /// Reflected shortwave.
    pub shortwave_out: f64,
    /// Incoming atmospheric longwave.
    pub longwave_in: f64,
    /// Outgoing surface longwave.
    pub longwave_out: f64,
}

impl RadiationBudget {
    /// Net radiation.
    pub fn net(&self) -> f64 {
        self.shortwave_in - self.shortwave_out + self.longwave_in - self.longwave_out
    }
}

/// Atmospheric transmissivity from the daily temperature range.
pub fn transmissivity(tmin: f64, tmax: f64, coefficients: &RadiationCoefficients) -> f64 {
    let [a, b, c] = coefficients.transmissivity;
    let range = (tmax - tmin).max(0.0);
    a * (1.0 - (-b * range.powf(c)).exp())
}

/// Cloud fraction: 0 for a clear sky, 1 when overcast, linear between.
pub fn cloud_fraction(tau: f64) -> f64 {
    if tau >= CLEAR_SKY {
        0.0
    } else if tau <= OVERCAST {
        1.0
    } else {
        (CLEAR_SKY - tau) / (CLEAR_SKY - OVERCAST)
    }
}

/// Budget of a surface with `albedo` receiving `ra` extraterrestrial
/// radiation on a day ranging from `tmin` to `tmax` (°C).
pub fn compute_budget(
    ra: f64,
    albedo: f64,
    tmin: f64,
    tmax: f64,
    coefficients: &RadiationCoefficients,
) -> RadiationBudget {
    let tau = transmissivity(tmin, tmax, coefficients);
    let shortwave_in = tau * ra;
    let mean = (tmin + tmax) / 2.0;
    let black_body = STEFAN_BOLTZMANN * (mean + 273.15).powi(4);

    let [ea, eb, ec] = coefficients.atmospheric_emissivity;
    let atmosphere = (ea + eb * mean + ec * cloud_fraction(tau)).min(1.0);
    let [sa, sb] = coefficients.surface_emissivity;
    let surface = (sa + sb * mean).min(1.0);

    RadiationBudget {
        shortwave_in,
        shortwave_out: albedo * shortwave_in,
        longwave_in: atmosphere * black_body,
        longwave_out: surface * black_body,
    }
}
