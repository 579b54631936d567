use approx::assert_relative_eq;
use hydromet_calendar::DateHour;
use hydromet_radiation::{
    NetRadiation, NetRadiationParams, RadiationCoefficients, RadiationError, SurfaceGeometry, daily_extraterrestrial,
};
use hydromet_zones::{Zone, ZoneSet};

fn params() -> NetRadiationParams {
    NetRadiationParams {
        albedo: 0.15,
        coefficients: RadiationCoefficients {
            transmissivity: [0.75, 0.01, 2.0],
            atmospheric_emissivity: [0.6, 0.005, 0.2],
            surface_emissivity: [0.97, 0.0],
        },
    }
}

fn zones() -> ZoneSet {
    ZoneSet::new(vec![
        Zone::new(1, 200.0).with_location(46.8, -71.2),
        Zone::new(2, 700.0).with_location(46.9, -71.0).with_slope_aspect(25.0, 3),
    ])
    .unwrap()
}

fn engine() -> NetRadiation {
    NetRadiation::new(&zones(), vec![params(); 2], 24).unwrap()
}

#[test]
fn cache_is_year_independent() {
    let mut engine = engine();
    let leap = DateHour::new(2024, 2, 29, 0).unwrap();
    let common = DateHour::new(2023, 3, 1, 0).unwrap();
    assert_eq!(leap.day_of_year(), common.day_of_year());

    assert_eq!(engine.cached(leap.day_of_year(), 1), None);
    let first = engine.compute(leap, 1, -8.0, 2.0, false).unwrap();
    assert!(engine.cached(leap.day_of_year(), 1).is_some());
    let second = engine.compute(common, 1, -8.0, 2.0, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cached_value_matches_direct_computation() {
    let mut engine = engine();
    let day = DateHour::new(2021, 7, 15, 0).unwrap().day_of_year();
    let ra = engine.extraterrestrial(day, 0).unwrap();
    let direct = daily_extraterrestrial(day, &SurfaceGeometry::new(46.8, -71.2, 0.0, 180.0));
    assert_relative_eq!(ra, direct, max_relative = 1e-12);
}

#[test]
fn budget_follows_temperatures() {
    let mut engine = engine();
    let date = DateHour::new(2021, 7, 15, 0).unwrap();
    let wide = engine.compute(date, 0, 10.0, 28.0, false).unwrap();
    let narrow = engine.compute(date, 0, 17.0, 21.0, false).unwrap();
    assert!(wide.shortwave_in > narrow.shortwave_in);
    assert_ne!(wide.net(), narrow.net());
}

#[test]
fn snow_cover_raises_albedo() {
    let mut engine = engine().with_snow_albedo(0.85);
    let date = DateHour::new(2021, 2, 1, 0).unwrap();
    let bare = engine.compute(date, 0, -12.0, -2.0, false).unwrap();
    let snow = engine.compute(date, 0, -12.0, -2.0, true).unwrap();
    assert_relative_eq!(snow.shortwave_out, 0.85 * snow.shortwave_in, max_relative = 1e-12);
    assert!(snow.net() < bare.net());
}

#[test]
fn only_daily_timestep_is_supported() {
    let err = NetRadiation::new(&zones(), vec![params(); 2], 6).unwrap_err();
    assert!(matches!(err, RadiationError::Configuration { .. }));
}

#[test]
fn invalid_aspect_is_rejected() {
    let zones = ZoneSet::new(vec![Zone::new(5, 100.0).with_slope_aspect(10.0, 9)]).unwrap();
    let err = NetRadiation::new(&zones, vec![params()], 24).unwrap_err();
    assert!(err.to_string().contains("zone 5"));
}

#[test]
fn unknown_zone_index_is_rejected() {
    let mut engine = engine();
    let date = DateHour::new(2021, 7, 15, 0).unwrap();
    assert!(engine.compute(date, 2, 0.0, 10.0, false).is_err());
}
