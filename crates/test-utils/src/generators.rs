//! Test data generators for synthetic grids and station sets.
//!
//! These generators create predictable, verifiable data patterns. Grids
//! are returned row-major (row = y index, column = x index); stations are
//! `(label, x, y, value)` tuples.

/// A generated station record: `(label, x, y, value)`.
pub type StationTuple = (String, f64, f64, f64);

/// Builds an axis of `count` values starting at `start` with spacing `step`.
///
/// # Example
///
/// ```
/// use test_utils::axis;
///
/// assert_eq!(axis(0.0, 0.5, 3), vec![0.0, 0.5, 1.0]);
/// ```
pub fn axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Creates a grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly by
/// checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::index_values;
///
/// let grid = index_values(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn index_values(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Samples the plane `a + b*x + c*y` on the given axes.
///
/// Bilinear interpolation must reproduce such a field exactly, which makes
/// it the reference input for sampler tests.
pub fn plane_values(x_axis: &[f64], y_axis: &[f64], a: f64, b: f64, c: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(x_axis.len() * y_axis.len());
    for &y in y_axis {
        for &x in x_axis {
            data.push(a + b * x + c * y);
        }
    }
    data
}

/// Creates a grid with temperature-like values in Kelvin.
///
/// The values range from approximately 250K to 310K, warming towards the
/// last row and column.
pub fn temperature_values(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f64 / width.max(1) as f64;
            let y_factor = row as f64 / height.max(1) as f64;
            data.push(250.0 + (x_factor * 30.0) + (y_factor * 30.0));
        }
    }
    data
}

/// Replaces the listed `(col, row)` cells with `missing`.
pub fn with_missing(
    mut data: Vec<f64>,
    width: usize,
    positions: &[(usize, usize)],
    missing: f64,
) -> Vec<f64> {
    for &(col, row) in positions {
        if let Some(cell) = data.get_mut(row * width + col) {
            *cell = missing;
        }
    }
    data
}

/// Places `count` stations evenly on a circle around `center`.
///
/// Station values come from `value_fn(x, y)`.
pub fn ring_of_stations<F>(center: (f64, f64), radius: f64, count: usize, value_fn: F) -> Vec<StationTuple>
where
    F: Fn(f64, f64) -> f64,
{
    (0..count)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / count as f64;
            let x = center.0 + radius * angle.cos();
            let y = center.1 + radius * angle.sin();
            (format!("R{:03}", k), x, y, value_fn(x, y))
        })
        .collect()
}

/// Scatters `count` stations pseudo-randomly inside `bbox`
/// (`min_x, min_y, max_x, max_y`), reproducibly for a given `seed`.
///
/// Station values come from `value_fn(x, y)`.
pub fn scattered_stations<F>(
    count: usize,
    bbox: (f64, f64, f64, f64),
    seed: u32,
    value_fn: F,
) -> Vec<StationTuple>
where
    F: Fn(f64, f64) -> f64,
{
    let (min_x, min_y, max_x, max_y) = bbox;
    (0..count)
        .map(|k| {
            let fx = unit_interval(simple_hash(k as u32, 0, seed));
            let fy = unit_interval(simple_hash(k as u32, 1, seed));
            let x = min_x + fx * (max_x - min_x);
            let y = min_y + fy * (max_y - min_y);
            (format!("S{:04}", k), x, y, value_fn(x, y))
        })
        .collect()
}

fn unit_interval(h: u32) -> f64 {
    h as f64 / u32::MAX as f64
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
