//! Scatter-to-grid interpolation.
//!
//! Every method starts by discarding observations whose value is missing
//! (by the point set's sentinel or the requested output sentinel) or not
//! finite. Radius-bounded methods also discard observations farther than
//! the largest radius from the target grid's bounding box, since those
//! cannot reach any cell.

use geo_common::{BoundingBox, GridSpec};
use tracing::debug;

use crate::error::{GridError, Result};
use crate::field::{require_extent, validate_axis, ScalarField};
use crate::sampler::GridSampler;
use crate::station::PointSet;
use crate::types::ScatterMethod;

#[derive(Debug, Clone, Copy)]
struct Observation {
    x: f64,
    y: f64,
    value: f64,
}

impl Observation {
    fn dist_sq(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

/// Observations usable as interpolation input, in input order.
///
/// With a `reach`, observations farther than it from `target` are dropped.
fn prefilter(
    points: &PointSet,
    missing: f64,
    target: &BoundingBox,
    reach: Option<f64>,
) -> Vec<Observation> {
    points
        .iter()
        .filter(|s| {
            !points.is_missing(s.value)
                && s.value != missing
                && s.value.is_finite()
                && s.x.is_finite()
                && s.y.is_finite()
        })
        .filter(|s| reach.map_or(true, |r| target.distance_to(s.x, s.y) <= r))
        .map(|s| Observation {
            x: s.x,
            y: s.y,
            value: s.value,
        })
        .collect()
}

fn check_target(x_axis: &[f64], y_axis: &[f64]) -> Result<BoundingBox> {
    require_extent("x", x_axis)?;
    require_extent("y", y_axis)?;
    validate_axis("x", x_axis)?;
    validate_axis("y", y_axis)?;
    let bbox = BoundingBox::new(
        x_axis[0].min(x_axis[x_axis.len() - 1]),
        y_axis[0].min(y_axis[y_axis.len() - 1]),
        x_axis[0].max(x_axis[x_axis.len() - 1]),
        y_axis[0].max(y_axis[y_axis.len() - 1]),
    );
    Ok(bbox)
}

fn check_radius(radius: f64) -> Result<()> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(GridError::invalid_parameter(format!(
            "radius must be positive and finite, got {}",
            radius
        )));
    }
    Ok(())
}

/// Fill every cell with `cell_value(x, y)`.
fn fill<F>(x_axis: &[f64], y_axis: &[f64], missing: f64, mut cell_value: F) -> Result<ScalarField>
where
    F: FnMut(f64, f64) -> f64,
{
    let mut values = Vec::with_capacity(x_axis.len() * y_axis.len());
    for &y in y_axis {
        for &x in x_axis {
            values.push(cell_value(x, y));
        }
    }
    ScalarField::new(x_axis.to_vec(), y_axis.to_vec(), values, missing)
}

fn log_result(method: &str, points: &PointSet, kept: usize, field: &ScalarField) {
    debug!(
        method = method,
        input_points = points.len(),
        kept_points = kept,
        cells = field.len(),
        filled_cells = field.valid_count(),
        "Scatter interpolation complete"
    );
}

/// Inverse distance weighting over all observations within `radius`.
///
/// A cell with fewer than `min_points` observations in range is missing.
/// Otherwise it takes the `1/d²` weighted mean, or the value of the first
/// observation sitting exactly on it.
pub fn idw_radius(
    points: &PointSet,
    x_axis: &[f64],
    y_axis: &[f64],
    min_points: usize,
    radius: f64,
    missing: f64,
) -> Result<ScalarField> {
    check_radius(radius)?;
    let target = check_target(x_axis, y_axis)?;
    let observations = prefilter(points, missing, &target, Some(radius));
    let radius_sq = radius * radius;

    let field = fill(x_axis, y_axis, missing, |x, y| {
        let mut count = 0;
        let mut exact = None;
        let mut sum_w = 0.0;
        let mut sum_wv = 0.0;

        for obs in &observations {
            let d2 = obs.dist_sq(x, y);
            if d2 > radius_sq {
                continue;
            }
            count += 1;
            if d2 == 0.0 {
                exact.get_or_insert(obs.value);
                continue;
            }
            let w = 1.0 / d2;
            sum_w += w;
            sum_wv += w * obs.value;
        }

        if count == 0 || count < min_points {
            missing
        } else if let Some(value) = exact {
            value
        } else {
            sum_wv / sum_w
        }
    })?;

    log_result("idw_radius", points, observations.len(), &field);
    Ok(field)
}

/// Inverse distance weighting over the `k` nearest observations.
///
/// Distance is unbounded; equally distant observations are taken in input
/// order. With fewer than `k` observations all of them are used.
pub fn idw_neighbors(
    points: &PointSet,
    x_axis: &[f64],
    y_axis: &[f64],
    k: usize,
    missing: f64,
) -> Result<ScalarField> {
    if k == 0 {
        return Err(GridError::invalid_parameter("neighbour count must be at least 1"));
    }
    let target = check_target(x_axis, y_axis)?;
    let observations = prefilter(points, missing, &target, None);
    let take = k.min(observations.len());

    let mut ranked: Vec<(f64, usize)> = Vec::with_capacity(observations.len());
    let field = fill(x_axis, y_axis, missing, |x, y| {
        if take == 0 {
            return missing;
        }

        ranked.clear();
        ranked.extend(
            observations
                .iter()
                .enumerate()
                .map(|(idx, obs)| (obs.dist_sq(x, y), idx)),
        );
        let by_distance = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
        if take < ranked.len() {
            ranked.select_nth_unstable_by(take - 1, by_distance);
            ranked.truncate(take);
        }
        ranked.sort_unstable_by(by_distance);

        let mut sum_w = 0.0;
        let mut sum_wv = 0.0;
        for &(d2, idx) in ranked.iter() {
            let value = observations[idx].value;
            if d2 == 0.0 {
                return value;
            }
            let w = 1.0 / d2;
            sum_w += w;
            sum_wv += w * value;
        }
        sum_wv / sum_w
    })?;

    log_result("idw_neighbors", points, observations.len(), &field);
    Ok(field)
}

/// Cressman weight for squared distance `d2` and squared radius `r2`.
fn cressman_weight(d2: f64, r2: f64) -> f64 {
    if d2 > r2 {
        0.0
    } else {
        (r2 - d2) / (r2 + d2)
    }
}

/// Multi-pass Cressman objective analysis, one pass per radius in order.
///
/// The first pass is the Cressman-weighted mean of the observations; cells
/// out of reach of every observation are missing. Each later pass samples
/// the running field at the observations, spreads the residuals with the
/// pass radius and adds the weighted correction to present cells.
pub fn cressman(
    points: &PointSet,
    x_axis: &[f64],
    y_axis: &[f64],
    radii: &[f64],
    missing: f64,
) -> Result<ScalarField> {
    if radii.is_empty() {
        return Err(GridError::invalid_parameter("cressman needs at least one radius"));
    }
    for &r in radii {
        check_radius(r)?;
    }
    let reach = radii.iter().copied().fold(0.0, f64::max);
    let target = check_target(x_axis, y_axis)?;
    let observations = prefilter(points, missing, &target, Some(reach));

    let first_r2 = radii[0] * radii[0];
    let mut field = fill(x_axis, y_axis, missing, |x, y| {
        let mut sum_w = 0.0;
        let mut sum_wv = 0.0;
        for obs in &observations {
            let w = cressman_weight(obs.dist_sq(x, y), first_r2);
            sum_w += w;
            sum_wv += w * obs.value;
        }
        if sum_w > 0.0 {
            sum_wv / sum_w
        } else {
            missing
        }
    })?;

    for &radius in &radii[1..] {
        let residuals: Vec<Observation> = {
            let grid = GridSampler::new(&field)?;
            observations
                .iter()
                .filter_map(|obs| {
                    let estimate = grid.value_at(obs.x, obs.y);
                    if field.is_missing(estimate) {
                        return None;
                    }
                    Some(Observation {
                        value: obs.value - estimate,
                        ..*obs
                    })
                })
                .collect()
        };

        let r2 = radius * radius;
        let current = field.clone();
        field = current.map_cells(|x, y, v| {
            if current.is_missing(v) {
                return v;
            }
            let mut sum_w = 0.0;
            let mut sum_wr = 0.0;
            for res in &residuals {
                let w = cressman_weight(res.dist_sq(x, y), r2);
                sum_w += w;
                sum_wr += w * res.value;
            }
            if sum_w > 0.0 {
                v + sum_wr / sum_w
            } else {
                v
            }
        });

        debug!(radius, residuals = residuals.len(), "Cressman correction pass");
    }

    log_result("cressman", points, observations.len(), &field);
    Ok(field)
}

/// Index of the cell containing `coord`, the last edge belonging to the
/// last cell. `None` outside the axis.
fn containing_index(axis: &[f64], coord: f64) -> Option<usize> {
    let (lo, hi) = (axis[0].min(axis[axis.len() - 1]), axis[0].max(axis[axis.len() - 1]));
    if coord < lo || coord > hi {
        return None;
    }
    let position = ((coord - axis[0]) / (axis[1] - axis[0])).floor();
    Some((position.max(0.0) as usize).min(axis.len() - 1))
}

/// Write each observation into its containing cell; later observations
/// overwrite earlier ones. Cells receiving nothing are missing.
pub fn nearest_assign(
    points: &PointSet,
    x_axis: &[f64],
    y_axis: &[f64],
    missing: f64,
) -> Result<ScalarField> {
    let target = check_target(x_axis, y_axis)?;
    let observations = prefilter(points, missing, &target, None);

    let nx = x_axis.len();
    let mut values = vec![missing; nx * y_axis.len()];
    let mut assigned = 0usize;
    for obs in &observations {
        if let (Some(i), Some(j)) = (containing_index(x_axis, obs.x), containing_index(y_axis, obs.y)) {
            values[j * nx + i] = obs.value;
            assigned += 1;
        }
    }

    let field = ScalarField::new(x_axis.to_vec(), y_axis.to_vec(), values, missing)?;
    debug!(assigned, "Nearest assignment");
    log_result("nearest_assign", points, observations.len(), &field);
    Ok(field)
}

/// Interpolate onto the grid described by `spec` with the chosen method.
pub fn interpolate(
    points: &PointSet,
    spec: &GridSpec,
    method: &ScatterMethod,
    missing: f64,
) -> Result<ScalarField> {
    spec.validate()?;
    let x_axis = spec.x_axis();
    let y_axis = spec.y_axis();

    let field = match method {
        ScatterMethod::IdwRadius { min_points, radius } => {
            idw_radius(points, &x_axis, &y_axis, *min_points, *radius, missing)
        }
        ScatterMethod::IdwNeighbors { k } => idw_neighbors(points, &x_axis, &y_axis, *k, missing),
        ScatterMethod::Cressman { radii } => cressman(points, &x_axis, &y_axis, radii, missing),
        ScatterMethod::NearestAssign => nearest_assign(points, &x_axis, &y_axis, missing),
    }?;

    Ok(match points.crs() {
        Some(crs) => field.with_crs(*crs),
        None => field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, MISSING};

    const AXIS: [f64; 3] = [-1.0, 0.0, 1.0];

    fn single(x: f64, y: f64, value: f64) -> PointSet {
        PointSet::from_records([("p", x, y, value)], MISSING)
    }

    #[test]
    fn test_idw_radius_single_point_fills_reach() {
        let field = idw_radius(&single(0.0, 0.0, 5.0), &AXIS, &AXIS, 1, 10.0, MISSING).unwrap();
        assert!(field.values().iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_idw_radius_respects_radius_and_min_points() {
        let field = idw_radius(&single(-1.0, -1.0, 5.0), &AXIS, &AXIS, 1, 1.0, MISSING).unwrap();
        assert_eq!(field.get(0, 0), Some(5.0));
        assert_eq!(field.get(1, 0), Some(5.0));
        // sqrt(2) away
        assert_eq!(field.get(1, 1), Some(MISSING));

        let strict = idw_radius(&single(-1.0, -1.0, 5.0), &AXIS, &AXIS, 2, 10.0, MISSING).unwrap();
        assert_eq!(strict.valid_count(), 0);
    }

    #[test]
    fn test_idw_radius_weighting() {
        let points = PointSet::from_records([("a", -1.0, 0.0, 10.0), ("b", 1.0, 0.0, 20.0)], MISSING);
        let field = idw_radius(&points, &AXIS, &AXIS, 1, 5.0, MISSING).unwrap();
        assert_approx_eq!(field.get(1, 1).unwrap(), 15.0, 1e-12);
        assert_eq!(field.get(0, 1), Some(10.0));
    }

    #[test]
    fn test_idw_radius_invalid_radius() {
        let result = idw_radius(&single(0.0, 0.0, 1.0), &AXIS, &AXIS, 1, 0.0, MISSING);
        assert!(matches!(result, Err(GridError::InvalidParameter(_))));
    }

    #[test]
    fn test_idw_neighbors_uses_k_nearest() {
        let points = PointSet::from_records(
            [("near", 0.0, 0.5, 1.0), ("mid", 0.0, -0.5, 3.0), ("far", 100.0, 100.0, 1000.0)],
            MISSING,
        );
        let field = idw_neighbors(&points, &AXIS, &AXIS, 2, MISSING).unwrap();
        assert_approx_eq!(field.get(1, 1).unwrap(), 2.0, 1e-12);
        assert!(field.values().iter().all(|&v| v < 1000.0));
    }

    #[test]
    fn test_idw_neighbors_fewer_points_than_k() {
        let field = idw_neighbors(&single(0.3, 0.3, 7.0), &AXIS, &AXIS, 8, MISSING).unwrap();
        for &v in field.values() {
            assert_approx_eq!(v, 7.0, 1e-12);
        }
    }

    #[test]
    fn test_idw_neighbors_zero_k_rejected() {
        let result = idw_neighbors(&single(0.0, 0.0, 1.0), &AXIS, &AXIS, 0, MISSING);
        assert!(matches!(result, Err(GridError::InvalidParameter(_))));
    }

    #[test]
    fn test_idw_neighbors_no_points() {
        let field = idw_neighbors(&PointSet::new(MISSING), &AXIS, &AXIS, 3, MISSING).unwrap();
        assert_eq!(field.valid_count(), 0);
    }

    #[test]
    fn test_cressman_single_point() {
        let field = cressman(&single(0.0, 0.0, 4.0), &AXIS, &AXIS, &[1.2, 0.5], MISSING).unwrap();
        assert_eq!(field.get(1, 1), Some(4.0));
        assert_eq!(field.get(0, 1), Some(4.0));
        // Corner is sqrt(2) away, beyond the first radius
        assert_eq!(field.get(0, 0), Some(MISSING));
    }

    #[test]
    fn test_cressman_rejects_bad_radii() {
        let points = single(0.0, 0.0, 1.0);
        assert!(matches!(
            cressman(&points, &AXIS, &AXIS, &[], MISSING),
            Err(GridError::InvalidParameter(_))
        ));
        assert!(matches!(
            cressman(&points, &AXIS, &AXIS, &[2.0, -1.0], MISSING),
            Err(GridError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_nearest_assign_last_write_wins() {
        let points = PointSet::from_records(
            [("a", -0.9, -0.9, 1.0), ("b", -0.5, -0.2, 2.0), ("c", 1.0, 1.0, 3.0), ("d", 9.0, 9.0, 4.0)],
            MISSING,
        );
        let field = nearest_assign(&points, &AXIS, &AXIS, MISSING).unwrap();
        assert_eq!(field.get(0, 0), Some(2.0));
        assert_eq!(field.get(2, 2), Some(3.0));
        assert_eq!(field.valid_count(), 2);
    }

    #[test]
    fn test_missing_points_are_discarded() {
        let mut points = single(0.0, 0.0, 5.0);
        points.append("gap", 1.0, 1.0, MISSING);
        points.append("nan", -1.0, -1.0, f64::NAN);
        let field = idw_neighbors(&points, &AXIS, &AXIS, 3, MISSING).unwrap();
        assert!(field.values().iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_target_needs_two_samples() {
        let result = nearest_assign(&single(0.0, 0.0, 1.0), &[0.0], &AXIS, MISSING);
        assert!(matches!(result, Err(GridError::InsufficientExtent { axis: "x", .. })));
    }

    #[test]
    fn test_interpolate_dispatch() {
        let spec = GridSpec::new(-1.0, 1.0, -1.0, 1.0, 3, 3).unwrap();
        let points = single(0.0, 0.0, 5.0).with_crs(geo_common::Crs::wgs84());
        let field = interpolate(
            &points,
            &spec,
            &ScatterMethod::IdwRadius {
                min_points: 1,
                radius: 10.0,
            },
            MISSING,
        )
        .unwrap();
        assert!(field.values().iter().all(|&v| v == 5.0));
        assert_eq!(field.crs(), Some(&geo_common::Crs::wgs84()));

        let assigned = interpolate(&points, &spec, &ScatterMethod::NearestAssign, MISSING).unwrap();
        assert_eq!(assigned.valid_count(), 1);
    }
}
