//! Integration tests for reprojection with the built-in projector.

use geo_common::{BoundingBox, Crs, CrsCode, GridSpec, LambertParams};
use grid_engine::{
    InterpolationMethod, PointFailurePolicy, PointSet, ReprojectionResampler, ScalarField, ScatterMethod,
};
use projection::Projector;
use test_utils::{assert_approx_eq, axis, global, plane_values, stations, MISSING};

fn resampler() -> ReprojectionResampler<Projector> {
    ReprojectionResampler::new(Projector::new())
}

/// Field whose value is `2 * lon + lat` over the given axes.
fn linear_field(lon: Vec<f64>, lat: Vec<f64>) -> ScalarField {
    let values = lat
        .iter()
        .flat_map(|&y| lon.iter().map(move |&x| 2.0 * x + y))
        .collect();
    ScalarField::new(lon, lat, values, MISSING).unwrap()
}

// ============================================================================
// Fields
// ============================================================================

#[test]
fn test_global_field_to_web_mercator_wraps_seam() {
    let lon = global::lon_1deg();
    let lat = global::lat_1deg();
    let values = lat.iter().flat_map(|&y| lon.iter().map(move |_| y)).collect();
    let field = ScalarField::new(lon, lat, values, MISSING).unwrap();

    let out = resampler()
        .reproject_field(&field, &Crs::wgs84(), &Crs::web_mercator(), &InterpolationMethod::Bilinear)
        .unwrap();

    assert_eq!(out.dims(), field.dims());
    assert_eq!(out.crs(), Some(&Crs::web_mercator()));
    let bounds = Crs::web_mercator().valid_bounds().unwrap();
    let extent = out.extent();
    assert_approx_eq!(extent.min_x, bounds.min_x, 1e-3);
    assert_approx_eq!(extent.max_x, bounds.max_x, 1e-3);
    assert_approx_eq!(extent.min_y, bounds.min_y, 1e-3);
    assert_approx_eq!(extent.max_y, bounds.max_y, 1e-3);
    // Every target longitude, including those between 359° and 360°, has data
    assert_eq!(out.valid_count(), out.len());

    let projector = Projector::new();
    for (x, y, v) in out.cells().step_by(997) {
        let (_, lat) = projector.to_geographic(&Crs::web_mercator(), x, y).unwrap();
        assert_approx_eq!(v, lat, 1e-6);
    }
}

#[test]
fn test_regional_field_to_lambert() {
    let field = linear_field(axis(-110.0, 0.5, 61), axis(30.0, 0.5, 41));
    let lcc = Crs::lambert(LambertParams::hrrr());

    let out = resampler()
        .reproject_field(&field, &Crs::wgs84(), &lcc, &InterpolationMethod::Bilinear)
        .unwrap();

    assert_eq!(out.dims(), (41, 61));
    let valid = out.valid_count();
    assert!(valid > 0, "no cell was filled");
    assert!(valid < out.len(), "bbox corners outside the source should be missing");

    let projector = Projector::new();
    for (x, y, v) in out.cells() {
        if v == MISSING {
            continue;
        }
        let (lon, lat) = projector.to_geographic(&lcc, x, y).unwrap();
        assert_approx_eq!(v, 2.0 * lon + lat, 1e-6);
    }
}

#[test]
fn test_regional_field_on_0_360_longitudes_to_lambert() {
    let lcc = Crs::lambert(LambertParams::hrrr());
    let east = linear_field(axis(230.0, 5.0, 15), axis(20.0, 5.0, 7));
    let signed = linear_field(axis(-130.0, 5.0, 15), axis(20.0, 5.0, 7));

    let out = resampler()
        .reproject_field(&east, &Crs::wgs84(), &lcc, &InterpolationMethod::Bilinear)
        .unwrap();
    let reference = resampler()
        .reproject_field(&signed, &Crs::wgs84(), &lcc, &InterpolationMethod::Bilinear)
        .unwrap();

    let valid = out.valid_count();
    assert!(valid > 0, "no cell was filled");
    // Corner cells sit exactly on the source edge in both layouts
    assert!(valid.abs_diff(reference.valid_count()) <= 2);

    let projector = Projector::new();
    for (x, y, v) in out.cells() {
        if v == MISSING {
            continue;
        }
        let (lon, lat) = projector.to_geographic(&lcc, x, y).unwrap();
        assert_approx_eq!(v, 2.0 * lon.rem_euclid(360.0) + lat, 1e-6);
    }
}

#[test]
fn test_reproject_onto_explicit_axes_with_failures() {
    // Mercator source; target rows at the poles cannot be transformed back
    let extent = 2.0e7;
    let x = axis(-extent, extent / 10.0, 21);
    let y = axis(-extent, extent / 10.0, 21);
    let values = plane_values(&x, &y, 1.0, 1e-6, 0.0);
    let field = ScalarField::new(x, y, values, MISSING).unwrap();

    let out = resampler()
        .reproject_field_to(
            &field,
            &Crs::web_mercator(),
            &Crs::wgs84(),
            &[-20.0, 20.0],
            &[-90.0, 60.0, 90.0],
            &InterpolationMethod::Bilinear,
        )
        .unwrap();

    assert_eq!(out.dims(), (3, 2));
    assert_eq!(out.crs(), Some(&Crs::wgs84()));
    for col in 0..2 {
        assert_eq!(out.get(col, 0), Some(MISSING));
        assert_eq!(out.get(col, 2), Some(MISSING));
    }
    let (mx, _) = Projector::new()
        .from_geographic(&Crs::web_mercator(), 20.0, 60.0)
        .unwrap();
    assert_approx_eq!(out.get(1, 1).unwrap(), 1.0 + 1e-6 * mx, 1e-6);
    assert_eq!(out.valid_count(), 2);
}

#[test]
fn test_same_crs_round_trip_is_identity() {
    let field = linear_field(axis(0.0, 1.0, 5), axis(0.0, 1.0, 4));
    let out = resampler()
        .reproject_field(&field, &Crs::wgs84(), &Crs::wgs84(), &InterpolationMethod::Nearest)
        .unwrap();
    assert_eq!(out.values(), field.values());
}

#[test]
fn test_polar_stereographic_target() {
    let field = linear_field(axis(-60.0, 1.0, 31), axis(65.0, 1.0, 21));
    let polar = Crs::Code(CrsCode::Epsg3413);
    let out = resampler()
        .reproject_field(&field, &Crs::wgs84(), &polar, &InterpolationMethod::Bilinear)
        .unwrap();

    let projector = Projector::new();
    let mut checked = 0;
    for (x, y, v) in out.cells().filter(|c| c.2 != MISSING) {
        let (lon, lat) = projector.to_geographic(&polar, x, y).unwrap();
        assert_approx_eq!(v, 2.0 * lon + lat, 1e-6);
        checked += 1;
    }
    assert!(checked > 0);
}

// ============================================================================
// Points
// ============================================================================

fn cities_with_pole() -> PointSet {
    let mut points = PointSet::from_records(stations::CITIES, MISSING);
    points.append("POLE", 0.0, 90.0, 250.0);
    points
}

#[test]
fn test_point_reprojection_drops_failures_by_default() {
    let points = cities_with_pole();
    let out = resampler().reproject_points(&points, &Crs::wgs84(), &Crs::web_mercator());

    assert_eq!(out.len(), 5);
    assert!(out.labels().iter().all(|l| l != "POLE"));
    assert_eq!(out.crs(), Some(&Crs::web_mercator()));
    let (x, _) = out.coords()[0];
    assert_approx_eq!(x, -104.99_f64.to_radians() * 6378137.0, 1e-3);
}

#[test]
fn test_point_reprojection_keep_missing() {
    let points = cities_with_pole();
    let out = resampler().reproject_points_with(
        &points,
        &Crs::wgs84(),
        &Crs::web_mercator(),
        PointFailurePolicy::KeepMissing,
    );

    assert_eq!(out.len(), 6);
    let pole = out.get(5).unwrap();
    assert_eq!(pole.label, "POLE");
    assert_eq!((pole.x, pole.y), (0.0, 90.0));
    assert_eq!(pole.value, MISSING);
    assert_eq!(out.valid_count(), 5);
}

#[test]
fn test_sample_points_from_geographic_field() {
    let field = linear_field(axis(-130.0, 1.0, 71), axis(20.0, 1.0, 36));
    let projector = Projector::new();
    let mut points = PointSet::new(MISSING);
    for (label, lon, lat, _) in stations::CITIES {
        let (x, y) = projector.from_geographic(&Crs::web_mercator(), lon, lat).unwrap();
        points.append(label, x, y, 0.0);
    }

    let sampled = resampler()
        .sample_points(
            &field,
            &Crs::wgs84(),
            &points,
            &Crs::web_mercator(),
            &InterpolationMethod::Bilinear,
        )
        .unwrap();

    assert_eq!(sampled.crs(), Some(&Crs::web_mercator()));
    for ((_, lon, lat, _), value) in stations::CITIES.iter().zip(sampled.values()) {
        assert_approx_eq!(*value, 2.0 * lon + lat, 1e-6);
    }
}

#[test]
fn test_sample_points_from_0_360_field() {
    let field = linear_field(axis(230.0, 1.0, 71), axis(20.0, 1.0, 36));
    let projector = Projector::new();
    let mut points = PointSet::new(MISSING);
    for (label, lon, lat, _) in stations::CITIES {
        let (x, y) = projector.from_geographic(&Crs::web_mercator(), lon, lat).unwrap();
        points.append(label, x, y, 0.0);
    }

    let sampled = resampler()
        .sample_points(
            &field,
            &Crs::wgs84(),
            &points,
            &Crs::web_mercator(),
            &InterpolationMethod::Bilinear,
        )
        .unwrap();

    for ((_, lon, lat, _), value) in stations::CITIES.iter().zip(sampled.values()) {
        assert_approx_eq!(*value, 2.0 * (lon + 360.0) + lat, 1e-6);
    }
}

#[test]
fn test_interpolate_points_into_projected_grid() {
    let points = PointSet::from_records(stations::CITIES, MISSING);
    let merc = resampler().reproject_points(&points, &Crs::wgs84(), &Crs::web_mercator());
    let extent: BoundingBox = merc.extent().unwrap().expand(1000.0);
    let spec = GridSpec::from_bbox(&extent, 20, 20).unwrap();

    let field = resampler()
        .interpolate_points(
            &points,
            &Crs::wgs84(),
            &Crs::web_mercator(),
            &spec,
            &ScatterMethod::NearestAssign,
            MISSING,
        )
        .unwrap();

    assert_eq!(field.crs(), Some(&Crs::web_mercator()));
    assert_eq!(field.valid_count(), 5);
    let mut observed: Vec<f64> = field.values().iter().copied().filter(|&v| v != MISSING).collect();
    observed.sort_by(f64::total_cmp);
    assert_eq!(observed, vec![276.0, 279.8, 281.5, 288.1, 290.2]);
}
