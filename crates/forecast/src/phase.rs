//! Rain/snow phase partition.
//!
//! Amounts here are water equivalents; converting snow to a depth is left
//! to the caller.

/// Fraction of precipitation falling as rain over a period whose air
/// temperature ranges from `tmin` to `tmax`.
///
/// 0 when the whole range is below `threshold`, 1 when it is entirely at
/// or above it, linear in between.
pub fn transformation_rate(tmin: f64, tmax: f64, threshold: f64) -> f64 {
    if tmax < threshold {
        0.0
    } else if tmin >= threshold {
        1.0
    } else {
        ((tmax - threshold) / (tmax - tmin)).min(1.0)
    }
}

/// Repartitions `rain` and `snow_we` between the two phases and returns the
/// new `(rain, snow_we)`.
///
/// With an hourly step the whole amount switches phase on `tmin` alone;
/// longer steps split it by [`transformation_rate`].
pub fn partition_phase(rain: f64, snow_we: f64, tmin: f64, tmax: f64, threshold: f64, timestep: u16) -> (f64, f64) {
    let total = rain + snow_we;
    if timestep == 1 {
        if tmin > threshold { (total, 0.0) } else { (0.0, total) }
    } else {
        let tau = transformation_rate(tmin, tmax, threshold);
        (tau * total, (1.0 - tau) * total)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn rate_boundaries() {
        assert_abs_diff_eq!(transformation_rate(-5.0, 5.0, 0.0), 0.5);
        assert_eq!(transformation_rate(-5.0, -1.0, 0.0), 0.0);
        assert_eq!(transformation_rate(2.0, 5.0, 0.0), 1.0);
        assert_eq!(transformation_rate(0.0, 0.0, 0.0), 1.0);
        assert_eq!(transformation_rate(-1.0, -1.0, 0.0), 0.0);
    }

    #[test]
    fn daily_split_conserves_mass() {
        let (rain, snow) = partition_phase(6.0, 4.0, -2.0, 6.0, 1.0, 24);
        assert_abs_diff_eq!(rain, 6.25, epsilon = 1e-12);
        assert_abs_diff_eq!(rain + snow, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn hourly_switch() {
        assert_eq!(partition_phase(1.0, 2.0, 1.5, 3.0, 1.0, 1), (3.0, 0.0));
        assert_eq!(partition_phase(1.0, 2.0, 1.0, 3.0, 1.0, 1), (0.0, 3.0));
    }
}
