//! Interpolation and resampling engine for gridded and station data.
//!
//! This crate turns irregular observations into regular grids, evaluates
//! grids at arbitrary locations and moves both between coordinate
//! reference systems:
//!
//! - **Grid sampling**: bilinear or nearest-node lookup with a tolerant
//!   missing-corner policy
//! - **Scatter interpolation**: IDW by radius or neighbour count, Cressman
//!   multi-pass analysis and nearest assignment
//! - **Reprojection**: per-cell and per-point coordinate transforms through
//!   the [`projection::Reproject`] seam
//!
//! # Architecture
//!
//! ```text
//!   PointSet ──► scatter::interpolate(spec, ScatterMethod) ──► ScalarField
//!      ▲                                                          │
//!      │                                                          ▼
//!      └──────────── sampler::to_points ◄──────────────── GridSampler
//!                                                                 │
//!                                           sampler::resample ◄───┘
//!
//!   ReprojectionResampler<R: Reproject>
//!      ├─► reproject_field      target cell ─► inverse transform ─► sample
//!      ├─► reproject_points     per point, failures dropped or kept missing
//!      ├─► sample_points        grid-to-point across CRSs
//!      └─► interpolate_points   reproject, then scatter
//! ```
//!
//! Out-of-range coordinates, transform failures and empty inputs are not
//! errors: they produce the missing sentinel. Only structural problems
//! (too few samples, shape mismatches, bad parameters) return
//! [`GridError`].
//!
//! # Example
//!
//! ```
//! use geo_common::GridSpec;
//! use grid_engine::{scatter, GridSampler, PointSet, ScatterMethod};
//!
//! let mut points = PointSet::new(-9999.0);
//! points.append("A", 0.0, 0.0, 5.0);
//!
//! let spec = GridSpec::new(-1.0, 1.0, -1.0, 1.0, 3, 3).unwrap();
//! let method = ScatterMethod::IdwRadius { min_points: 1, radius: 10.0 };
//! let field = scatter::interpolate(&points, &spec, &method, -9999.0).unwrap();
//!
//! let grid = GridSampler::new(&field).unwrap();
//! assert_eq!(grid.value_at(0.5, 0.5), 5.0);
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod mask;
pub mod ops;
pub mod reproject;
pub mod sampler;
pub mod scatter;
pub mod station;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{EngineConfig, DEFAULT_MISSING_VALUE};
pub use error::{GridError, Result};
pub use field::ScalarField;
pub use mask::Containment;
pub use ops::BinaryOp;
pub use reproject::{PointFailurePolicy, ReprojectionResampler};
pub use sampler::{nearest_at, resample, to_points, value_at, GridSampler, Sampler};
pub use station::{PointSet, Station};
pub use types::{InterpolationMethod, ScatterKind, ScatterMethod, ValueStats};
