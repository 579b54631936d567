use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use hydromet_calendar::DateHour;
use hydromet_forecast::{
    AsciiGridReader, ForecastError, ForecastGrid, ForecastGridConfig, GridGeometry, HedstromPomeroy, PixelWeights,
    Raster, SnowDensity, ZoneForecastParams,
};
use hydromet_zones::{Zone, ZoneSet};
use tempfile::{TempDir, tempdir};

const NODATA: f64 = -9999.0;

fn write_grid(path: &Path, ncols: usize, nrows: usize, cell: f64, data: Vec<f64>) {
    let geometry = GridGeometry::new(ncols, nrows, 0.0, nrows as f64 * cell, cell);
    let raster = Raster::new(geometry, Some(NODATA), data).unwrap();
    AsciiGridReader.write(&raster, path).unwrap();
}

fn zones() -> ZoneSet {
    ZoneSet::new(vec![Zone::new(1, 600.0), Zone::new(2, 300.0)]).unwrap()
}

fn params() -> Vec<ZoneForecastParams> {
    vec![
        ZoneForecastParams {
            temperature_gradient: -0.6,
            precipitation_gradient: 0.1,
            rain_snow_threshold: 1.0,
        },
        ZoneForecastParams::default(),
    ]
}

fn start() -> DateHour {
    DateHour::new(2021, 4, 1, 0).unwrap()
}

/// Two zones side by side on 1 m cells, each under one 2 m forecast pixel.
struct Fixture {
    dir: TempDir,
    grp: PathBuf,
}

impl Fixture {
    fn new(total_precipitation: bool) -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("rasters")).unwrap();
        let flag = if total_precipitation { "1\n" } else { "" };
        let grp = root.join("gem.grp");
        fs::write(
            &grp,
            format!("1\nmm\n0\ntest forecast\n22 24 rasters\nfc_\n4\n.tn.asc\n.tx.asc\n.pr.asc\n.sn.asc\n{flag}"),
        )
        .unwrap();
        write_grid(&root.join("zones.asc"), 4, 2, 1.0, vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0]);
        write_grid(
            &root.join("dem.asc"),
            4,
            2,
            1.0,
            vec![450.0, 550.0, 300.0, 300.0, 500.0, 500.0, 300.0, 300.0],
        );
        let fixture = Self { dir, grp };
        fixture.write_day(start(), [-2.0, 4.0], [6.0, 10.0], [10.0, 20.0], [5.0, NODATA]);
        fixture
    }

    fn raster(&self, date: DateHour, ext: &str) -> PathBuf {
        self.dir.path().join("rasters").join(format!(
            "fc_{:04}{:02}{:02}{:02}{ext}",
            date.year(),
            date.month(),
            date.day(),
            date.hour()
        ))
    }

    fn write_day(&self, date: DateHour, tmin: [f64; 2], tmax: [f64; 2], pr: [f64; 2], sn: [f64; 2]) {
        for (ext, values) in [(".tn.asc", tmin), (".tx.asc", tmax), (".pr.asc", pr), (".sn.asc", sn)] {
            write_grid(&self.raster(date, ext), 2, 1, 2.0, values.to_vec());
        }
    }

    fn grid(&self) -> ForecastGrid {
        let config = ForecastGridConfig::load(&self.grp).unwrap();
        ForecastGrid::new(config, self.dir.path().join("zones.asc"), self.dir.path().join("dem.asc"))
            .with_params(params())
    }
}

#[test]
fn distributes_with_elevation_correction() {
    let fixture = Fixture::new(false);
    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();
    let samples = grid.compute(start(), &zones()).unwrap();

    // Zone 1 sits 100 m above its pixel (mean DEM altitude 500 m).
    let high = samples[0];
    assert_abs_diff_eq!(high.tmin.unwrap(), -2.6, epsilon = 1e-9);
    assert_abs_diff_eq!(high.tmax.unwrap(), 5.4, epsilon = 1e-9);
    assert_abs_diff_eq!(high.rain.unwrap(), 11.0, epsilon = 1e-9);
    let depth = HedstromPomeroy.depth(5.5, 1.4);
    assert_abs_diff_eq!(high.snow.unwrap(), depth, epsilon = 1e-9);

    let low = samples[1];
    assert_eq!(low.tmin, Some(4.0));
    assert_eq!(low.rain, Some(20.0));
    assert_eq!(low.snow, None);
}

#[test]
fn caches_are_saved_then_reused() {
    let fixture = Fixture::new(false);
    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();
    assert_eq!(grid.weights().unwrap().zone(0), &[(0, 1.0)]);
    assert!(fixture.grp.with_extension("pgp").exists());
    assert!(fixture.grp.with_extension("agp").exists());

    // With both sidecars present the source rasters are no longer needed.
    fs::remove_file(fixture.dir.path().join("zones.asc")).unwrap();
    fs::remove_file(fixture.dir.path().join("dem.asc")).unwrap();
    let mut again = fixture.grid();
    again.initialise(&zones(), start()).unwrap();
    assert_eq!(again.weights(), grid.weights());
    assert_eq!(again.altitudes(), grid.altitudes());
}

#[test]
fn weighting_cache_with_wrong_zone_count_is_rebuilt() {
    let fixture = Fixture::new(false);
    let pgp = fixture.grp.with_extension("pgp");
    fs::write(&pgp, "\n0 0 1 -1\n").unwrap();

    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();
    let rebuilt = PixelWeights::load(&pgp, 2, 2).unwrap();
    assert_eq!(rebuilt.zone(1), &[(1, 1.0)]);
}

#[test]
fn missing_raster_names_expected_path() {
    let fixture = Fixture::new(false);
    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();

    let next = start().plus_hours(24);
    match grid.compute(next, &zones()).unwrap_err() {
        ForecastError::FileNotFound { path } => assert_eq!(path, fixture.raster(next, ".tn.asc")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn raster_shape_change_is_data_integrity() {
    let fixture = Fixture::new(false);
    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();

    let next = start().plus_hours(24);
    fixture.write_day(next, [0.0; 2], [0.0; 2], [0.0; 2], [0.0; 2]);
    write_grid(&fixture.raster(next, ".tx.asc"), 3, 1, 2.0, vec![0.0; 3]);
    let err = grid.compute(next, &zones()).unwrap_err();
    assert!(matches!(err, ForecastError::DataIntegrity { .. }));
}

#[test]
fn total_precipitation_is_partitioned() {
    let fixture = Fixture::new(true);
    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();
    let samples = grid.compute(start(), &zones()).unwrap();

    // Zone 1: tau = (5.4 - 1) / 8 of 11 mm.
    let high = samples[0];
    assert_abs_diff_eq!(high.rain.unwrap(), 6.05, epsilon = 1e-9);
    let depth = HedstromPomeroy.depth(4.95, 1.4);
    assert_abs_diff_eq!(high.snow.unwrap(), depth, epsilon = 1e-9);

    // Zone 2 is entirely above the threshold.
    assert_eq!(samples[1].rain, Some(20.0));
    assert_eq!(samples[1].snow, Some(0.0));
}

#[test]
fn distribute_before_initialise_is_rejected() {
    let fixture = Fixture::new(false);
    let err = fixture.grid().distribute(start(), &zones()).unwrap_err();
    assert!(matches!(err, ForecastError::Configuration { .. }));
}

#[test]
fn missing_total_precipitation_stays_missing() {
    let fixture = Fixture::new(true);
    let next = start().plus_hours(24);
    fixture.write_day(next, [-2.0, 4.0], [6.0, 10.0], [10.0, NODATA], [0.0, 0.0]);
    let mut grid = fixture.grid();
    grid.initialise(&zones(), start()).unwrap();
    let samples = grid.compute(next, &zones()).unwrap();

    assert!(samples[0].rain.is_some());
    let low = samples[1];
    assert_eq!(low.tmin, Some(4.0));
    assert_eq!(low.rain, None);
    assert_eq!(low.snow, None);
}

#[test]
fn six_hour_steps_read_the_daily_rasters() {
    let fixture = Fixture::new(false);
    let mut grid = fixture.grid().with_timestep(6);
    grid.initialise(&zones(), start()).unwrap();

    let daily = grid.compute(start(), &zones()).unwrap();
    for hours in [6, 12, 18] {
        assert_eq!(grid.compute(start().plus_hours(hours), &zones()).unwrap(), daily);
    }
}

#[test]
fn hourly_step_switches_phase_on_tmin() {
    let fixture = Fixture::new(true);
    let mut grid = fixture.grid().with_timestep(1);
    grid.initialise(&zones(), start().plus_hours(1)).unwrap();
    let samples = grid.compute(start().plus_hours(1), &zones()).unwrap();

    // Zone 1: tmin -2.6 is below its 1.0 threshold, all 11 mm fall as snow.
    let high = samples[0];
    assert_eq!(high.rain, Some(0.0));
    let depth = HedstromPomeroy.depth(11.0, 1.4);
    assert_abs_diff_eq!(high.snow.unwrap(), depth, epsilon = 1e-9);

    // Zone 2: tmin 4.0 is above the default threshold, all rain.
    assert_eq!(samples[1].rain, Some(20.0));
    assert_eq!(samples[1].snow, Some(0.0));
}
