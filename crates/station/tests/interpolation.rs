use approx::assert_abs_diff_eq;
use hydromet_calendar::DateHour;
use hydromet_station::{
    CoordinateKind, InterpolationVersion, MemoryStation, SampleSeries, StationInfo, StationSet,
    WeatherSample,
};

fn start() -> DateHour {
    DateHour::new(2021, 6, 1, 0).unwrap()
}

fn station(name: &str, x: f64, altitude: f64, sample: WeatherSample) -> Box<MemoryStation> {
    let info = StationInfo::new(name, x, 0.0, altitude, CoordinateKind::Projected);
    Box::new(MemoryStation::new(info, SampleSeries::new(start(), 24, vec![sample])))
}

fn sample(tmin: Option<f64>, tmax: Option<f64>, rain: Option<f64>, snow: Option<f64>) -> WeatherSample {
    WeatherSample { tmin, tmax, rain, snow }
}

#[test]
fn nearest_donor_with_the_field_wins() {
    let mut set = StationSet::new(InterpolationVersion::V1);
    set.push(station("target", 0.0, 0.0, sample(None, None, None, None)));
    set.push(station("far", 100.0, 0.0, sample(Some(-9.0), Some(9.0), Some(7.0), Some(0.0))));
    set.push(station("near", 10.0, 0.0, sample(Some(1.0), Some(2.0), None, None)));

    let report = set.load_series(start(), start(), 24).unwrap();
    let filled = set.find("target").unwrap().sample(start(), 24);
    assert_eq!(filled.tmin, Some(1.0));
    assert_eq!(filled.tmax, Some(2.0));
    assert_eq!(filled.rain, Some(7.0));
    assert_eq!(filled.snow, Some(0.0));
    // `near` is patched from `target`, which was patched first.
    assert_eq!(set.find("near").unwrap().sample(start(), 24).rain, Some(7.0));
    assert_eq!(report.filled, 2);
    assert_eq!(report.still_missing, 0);
}

#[test]
fn later_stations_draw_on_earlier_patches() {
    let version = InterpolationVersion::V2 {
        temperature_gradient: 0.0,
        precipitation_gradient: -1.0,
    };
    let mut set = StationSet::new(version);
    // A sits 100 m above C; its rain clamps to 0. B is next to A and
    // takes A's dry value rather than C's 0.2.
    set.push(station("A", 0.0, 100.0, sample(Some(1.0), Some(2.0), None, None)));
    set.push(station("B", 1.0, 0.0, sample(Some(1.0), Some(2.0), None, None)));
    set.push(station("C", 100.0, 0.0, sample(Some(1.0), Some(2.0), Some(0.2), Some(0.0))));

    set.load_series(start(), start(), 24).unwrap();
    assert_eq!(set.find("A").unwrap().sample(start(), 24).rain, Some(0.0));
    assert_eq!(set.find("B").unwrap().sample(start(), 24).rain, Some(0.0));
}

#[test]
fn lone_station_keeps_its_gaps() {
    let mut set = StationSet::new(InterpolationVersion::V1);
    set.push(station("alone", 0.0, 0.0, sample(Some(1.0), None, Some(0.0), Some(0.0))));
    let report = set.load_series(start(), start(), 24).unwrap();
    assert_eq!(report.filled, 0);
    assert_eq!(report.still_missing, 1);
    assert_eq!(set.missing_count(start(), start().plus_hours(24), 24), 1);
}

#[test]
fn v2_orders_filled_temperatures() {
    let version = InterpolationVersion::V2 {
        temperature_gradient: -1.0,
        precipitation_gradient: 0.0,
    };
    let mut set = StationSet::new(version);
    // tmin 4.0 from a donor 500 m higher becomes 9.0, above the own tmax.
    set.push(station("valley", 0.0, 0.0, sample(None, Some(6.0), Some(0.0), Some(0.0))));
    set.push(station("peak", 5.0, 500.0, sample(Some(4.0), Some(5.0), Some(0.0), Some(0.0))));
    set.load_series(start(), start(), 24).unwrap();
    let valley = set.find("valley").unwrap().sample(start(), 24);
    assert_eq!((valley.tmin, valley.tmax), (Some(6.0), Some(9.0)));
}

/// Fills the valley's missing tmin from a donor 100 m higher.
fn fill_valley_tmin(version: InterpolationVersion) -> f64 {
    let mut set = StationSet::new(version);
    set.push(station("valley", 0.0, 0.0, sample(None, Some(10.0), Some(0.0), Some(0.0))));
    set.push(station("slope", 10.0, 100.0, sample(Some(4.0), Some(9.0), Some(0.0), Some(0.0))));
    set.load_series(start(), start(), 24).unwrap();
    set.find("valley").unwrap().sample(start(), 24).tmin.unwrap()
}

#[test]
fn v1_and_v2_fill_the_same_gap_differently() {
    let v1 = fill_valley_tmin(InterpolationVersion::V1);
    let v2 = fill_valley_tmin(InterpolationVersion::V2 {
        temperature_gradient: -0.8,
        precipitation_gradient: 0.0,
    });
    assert_abs_diff_eq!(v1, 4.0 - 0.5 * (-100.0 / 100.0), epsilon = 1e-12);
    assert_abs_diff_eq!(v2, 4.0 - 0.8 * (-100.0 / 100.0), epsilon = 1e-12);
    assert!(v1 != v2);
}
