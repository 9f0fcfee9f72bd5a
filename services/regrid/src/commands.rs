//! Subcommands of the `regrid` CLI.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use geo_common::{BoundingBox, Crs, GridSpec};
use grid_engine::{
    resample, scatter, to_points, EngineConfig, InterpolationMethod, PointSet, ReprojectionResampler,
    ScalarField, ScatterKind, ValueStats,
};
use projection::Projector;
use serde::Serialize;
use tracing::info;

use crate::io::read_json;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interpolate station observations onto a regular grid
    Grid(GridArgs),

    /// Evaluate a field at station locations
    Sample(SampleArgs),

    /// Resample a field onto a regular grid over the same extent
    Resample(ResampleArgs),

    /// Reproject a field into another CRS
    Reproject(ReprojectArgs),

    /// Print summary statistics of a field
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct GridArgs {
    /// Point set JSON file
    #[arg(long)]
    pub points: PathBuf,

    /// Scatter method (idw-radius, idw-neighbors, cressman, nearest)
    #[arg(long, default_value = "idw-radius")]
    pub method: ScatterKind,

    /// Target extent as minx,miny,maxx,maxy
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: BoundingBox,

    /// Target column count
    #[arg(long)]
    pub nx: usize,

    /// Target row count
    #[arg(long)]
    pub ny: usize,

    /// IDW search radius
    #[arg(long)]
    pub radius: Option<f64>,

    /// Minimum points within the IDW radius
    #[arg(long)]
    pub min_points: Option<usize>,

    /// Neighbour count for idw-neighbors
    #[arg(long)]
    pub neighbors: Option<usize>,

    /// Cressman pass radii, comma separated
    #[arg(long, value_delimiter = ',')]
    pub radii: Option<Vec<f64>>,

    /// CRS of the target grid; points carrying another CRS are reprojected
    #[arg(long)]
    pub crs: Option<Crs>,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Field JSON file
    #[arg(long)]
    pub field: PathBuf,

    /// Point set JSON file with the sampling locations
    #[arg(long)]
    pub points: PathBuf,

    /// Interpolation method (bilinear, nearest)
    #[arg(long)]
    pub method: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResampleArgs {
    /// Field JSON file
    #[arg(long)]
    pub field: PathBuf,

    /// Target column count
    #[arg(long)]
    pub nx: usize,

    /// Target row count
    #[arg(long)]
    pub ny: usize,

    /// Interpolation method (bilinear, nearest)
    #[arg(long)]
    pub method: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReprojectArgs {
    /// Field JSON file
    #[arg(long)]
    pub field: PathBuf,

    /// Source CRS; defaults to the CRS stored in the field
    #[arg(long)]
    pub from: Option<Crs>,

    /// Target CRS
    #[arg(long)]
    pub to: Crs,

    /// Interpolation method (bilinear, nearest)
    #[arg(long)]
    pub method: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Field JSON file
    #[arg(long)]
    pub field: PathBuf,
}

/// Result of a subcommand, serialized as-is.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Field(ScalarField),
    Points(PointSet),
    Summary(FieldSummary),
}

#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub nx: usize,
    pub ny: usize,
    pub extent: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<Crs>,
    pub is_global: bool,
    pub stats: Option<ValueStats>,
}

fn resampler() -> ReprojectionResampler<Projector> {
    ReprojectionResampler::new(Projector::new())
}

fn interpolation(name: Option<&str>, config: &EngineConfig) -> InterpolationMethod {
    name.map(InterpolationMethod::from_str)
        .unwrap_or(config.interpolation)
}

/// Engine configuration with the scatter flags of `args` applied on top.
fn scatter_config(config: &EngineConfig, args: &GridArgs) -> Result<EngineConfig> {
    let mut config = config.clone();
    if let Some(radius) = args.radius {
        config.idw_radius = radius;
    }
    if let Some(min_points) = args.min_points {
        config.idw_min_points = min_points;
    }
    if let Some(k) = args.neighbors {
        config.idw_neighbors = k;
    }
    if let Some(radii) = &args.radii {
        config.cressman_radii = radii.clone();
    }
    config
        .validate()
        .map_err(|e| anyhow!("invalid scatter parameters: {}", e))?;
    Ok(config)
}

pub fn run(command: &Command, config: &EngineConfig) -> Result<Output> {
    match command {
        Command::Grid(args) => grid(args, config).map(Output::Field),
        Command::Sample(args) => sample(args, config).map(Output::Points),
        Command::Resample(args) => resample_field(args, config).map(Output::Field),
        Command::Reproject(args) => reproject(args, config).map(Output::Field),
        Command::Stats(args) => stats(args).map(Output::Summary),
    }
}

fn grid(args: &GridArgs, config: &EngineConfig) -> Result<ScalarField> {
    let points: PointSet = read_json(&args.points)?;
    let config = scatter_config(config, args)?;
    let method = config.scatter_method(args.method);
    let spec = GridSpec::from_bbox(&args.bbox, args.nx, args.ny).context("invalid target grid")?;

    info!(
        method = %method,
        points = points.len(),
        nx = args.nx,
        ny = args.ny,
        "Interpolating stations"
    );

    let field = match (points.crs(), args.crs) {
        (Some(from), Some(to)) if *from != to => {
            resampler().interpolate_points(&points, from, &to, &spec, &method, config.missing_value)?
        }
        (_, target) => {
            let field = scatter::interpolate(&points, &spec, &method, config.missing_value)?;
            match target {
                Some(crs) => field.with_crs(crs),
                None => field,
            }
        }
    };

    info!(filled = field.valid_count(), cells = field.len(), "Grid complete");
    Ok(field)
}

fn sample(args: &SampleArgs, config: &EngineConfig) -> Result<PointSet> {
    let field: ScalarField = read_json(&args.field)?;
    let points: PointSet = read_json(&args.points)?;
    let method = interpolation(args.method.as_deref(), config);

    let sampled = match (field.crs(), points.crs()) {
        (Some(field_crs), Some(points_crs)) if field_crs != points_crs => {
            resampler().sample_points(&field, field_crs, &points, points_crs, &method)?
        }
        _ => to_points(&field, &points, &method)?,
    };

    info!(
        method = %method,
        points = sampled.len(),
        valid = sampled.valid_count(),
        "Sampled field at points"
    );
    Ok(sampled)
}

fn resample_field(args: &ResampleArgs, config: &EngineConfig) -> Result<ScalarField> {
    let field: ScalarField = read_json(&args.field)?;
    let method = interpolation(args.method.as_deref(), config);
    let spec = GridSpec::from_bbox(&field.extent(), args.nx, args.ny).context("invalid target grid")?;

    let out = resample(&field, &spec.x_axis(), &spec.y_axis(), &method)?;
    info!(
        method = %method,
        from = ?field.dims(),
        to = ?out.dims(),
        "Resampled field"
    );
    Ok(out)
}

fn reproject(args: &ReprojectArgs, config: &EngineConfig) -> Result<ScalarField> {
    let field: ScalarField = read_json(&args.field)?;
    let from = args
        .from
        .or_else(|| field.crs().copied())
        .context("source CRS unknown: pass --from or store a crs in the field")?;
    let method = interpolation(args.method.as_deref(), config);

    let out = resampler().reproject_field(&field, &from, &args.to, &method)?;
    info!(
        from = %from,
        to = %args.to,
        filled = out.valid_count(),
        cells = out.len(),
        "Reprojected field"
    );
    Ok(out)
}

fn stats(args: &StatsArgs) -> Result<FieldSummary> {
    let field: ScalarField = read_json(&args.field)?;
    Ok(FieldSummary {
        nx: field.nx(),
        ny: field.ny(),
        extent: field.extent(),
        crs: field.crs().copied(),
        is_global: field.is_global(),
        stats: field.stats(),
    })
}
