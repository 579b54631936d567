//! Pure conversion functions: TOML config structs -> crate API types.

use std::path::Path;

use anyhow::{Context, Result, bail};

use hydromet_calendar::DateHour;
use hydromet_correction::KnownGroups;
use hydromet_station::{CoordinateTransform, Equirectangular, IdentityTransform, InterpolationVersion, StationFormat};
use hydromet_zones::{ParameterSource, ZoneSet};

use crate::config::{GroupToml, ProjectionToml, StationsToml};

/// Parses a `YYYY-MM-DD HH` date.
pub fn parse_date(s: &str) -> Result<DateHour> {
    s.parse().with_context(|| format!("invalid date {s:?}"))
}

/// Builds the interpolation strategy from its name and gradients.
pub fn parse_interpolation(stations: &StationsToml) -> Result<InterpolationVersion> {
    match stations.interpolation.to_lowercase().as_str() {
        "v1" => Ok(InterpolationVersion::V1),
        "v2" => Ok(InterpolationVersion::V2 {
            temperature_gradient: stations.temperature_gradient,
            precipitation_gradient: stations.precipitation_gradient,
        }),
        other => bail!("unknown interpolation version: {other:?}"),
    }
}

/// Backend for the station source: the configured name, or the one implied
/// by the file extension.
pub fn parse_station_format(stations: &StationsToml) -> Result<StationFormat> {
    match &stations.format {
        Some(name) => name.parse().with_context(|| format!("invalid station format {name:?}")),
        None => StationFormat::from_path(&stations.path)
            .with_context(|| format!("cannot infer station format of {}", stations.path.display())),
    }
}

/// Projection of geographic station coordinates.
pub fn build_transform(projection: Option<&ProjectionToml>) -> Box<dyn CoordinateTransform> {
    match projection {
        Some(p) => Box::new(Equirectangular::new(p.lon0, p.lat0)),
        None => Box::new(IdentityTransform),
    }
}

/// A dedicated parameter table when configured, otherwise `section` of the
/// global parameter file.
pub fn parameter_source(table: Option<&Path>, global: Option<&Path>, section: &str) -> Result<ParameterSource> {
    match (table, global) {
        (Some(table), _) => Ok(ParameterSource::ZoneTable(table.to_path_buf())),
        (None, Some(global)) => Ok(ParameterSource::Global {
            path: global.to_path_buf(),
            section: section.to_string(),
        }),
        (None, None) => bail!("no parameter table for {section:?} and no global_parameters file"),
    }
}

/// Group names known to the correction file parser.
pub fn build_group_catalog(groups: &[GroupToml]) -> Result<KnownGroups> {
    let mut catalog = KnownGroups::new();
    for group in groups {
        catalog = match group.kind.to_lowercase().as_str() {
            "hydro" => catalog.with_hydro_group(&group.name),
            "correction" => catalog.with_correction_group(&group.name),
            other => bail!("unknown group kind {other:?} for group {:?}", group.name),
        };
    }
    Ok(catalog)
}

/// Names of the groups each zone belongs to, by zone index.
pub fn build_zone_groups(groups: &[GroupToml], zones: &ZoneSet) -> Result<Vec<Vec<String>>> {
    let mut names = vec![Vec::new(); zones.len()];
    for group in groups {
        for &id in &group.zones {
            let Some(index) = zones.index_of(id) else {
                bail!("group {:?} lists unknown zone {id}", group.name);
            };
            names[index].push(group.name.clone());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use hydromet_correction::GroupCatalog;
    use hydromet_zones::Zone;

    use super::*;

    fn stations(interpolation: &str) -> StationsToml {
        StationsToml {
            path: PathBuf::from("net.h5"),
            format: None,
            interpolation: interpolation.to_string(),
            temperature_gradient: -0.6,
            precipitation_gradient: 0.1,
            projection: None,
        }
    }

    fn group(name: &str, kind: &str, zones: Vec<i32>) -> GroupToml {
        GroupToml {
            name: name.to_string(),
            kind: kind.to_string(),
            zones,
        }
    }

    #[test]
    fn interpolation_names() {
        assert_eq!(parse_interpolation(&stations("V1")).unwrap(), InterpolationVersion::V1);
        assert_eq!(
            parse_interpolation(&stations("v2")).unwrap(),
            InterpolationVersion::V2 {
                temperature_gradient: -0.6,
                precipitation_gradient: 0.1,
            }
        );
        assert!(parse_interpolation(&stations("v3")).is_err());
    }

    #[test]
    fn station_format_from_extension() {
        assert_eq!(parse_station_format(&stations("v1")).unwrap(), StationFormat::Hdf5);
        let mut explicit = stations("v1");
        explicit.format = Some("grid-netcdf".to_string());
        assert_eq!(parse_station_format(&explicit).unwrap(), StationFormat::GridNetcdf);
    }

    #[test]
    fn table_takes_precedence_over_global_file() {
        let source = parameter_source(Some(Path::new("t.csv")), Some(Path::new("g.csv")), "X").unwrap();
        assert_eq!(source, ParameterSource::ZoneTable(PathBuf::from("t.csv")));
        let source = parameter_source(None, Some(Path::new("g.csv")), "X").unwrap();
        assert!(matches!(source, ParameterSource::Global { .. }));
        assert!(parameter_source(None, None, "X").is_err());
    }

    #[test]
    fn groups() {
        let groups = vec![group("north", "hydro", vec![1, 2]), group("belt", "correction", vec![2])];
        let catalog = build_group_catalog(&groups).unwrap();
        assert!(catalog.has_hydro_group("NORTH"));
        assert!(catalog.has_correction_group("belt"));
        assert!(build_group_catalog(&[group("x", "soil", vec![])]).is_err());

        let zones = ZoneSet::new(vec![Zone::new(1, 0.0), Zone::new(2, 0.0)]).unwrap();
        let names = build_zone_groups(&groups, &zones).unwrap();
        assert_eq!(names[1], vec!["north".to_string(), "belt".to_string()]);
        assert!(build_zone_groups(&[group("x", "hydro", vec![7])], &zones).is_err());
    }
}
