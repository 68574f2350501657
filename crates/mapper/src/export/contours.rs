use geo_types::Coord;
use tracing::debug;

use crate::{
    config::ContourConfig,
    error::Result,
    graph::{GraphBuilder, PolylineId},
    pipeline::ContourPipeline,
    traits::TerrainSampler,
    types::{GridSample, is_closed},
};

/// Sample water depth (water surface minus ground) on the configured grid.
///
/// The grid has `steps + 2` samples per axis centred on the origin; its
/// outermost ring holds `border_value` so every contour closes inside it.
pub fn sample_water_depth(terrain: &dyn TerrainSampler, config: &ContourConfig) -> Result<GridSample> {
    let n = config.steps + 2;
    let half = (config.steps / 2) as f64;
    let axis: Vec<f64> = (0..n)
        .map(|i| (i as f64 - 1.0 - half) * config.grid_size)
        .collect();

    let coords = axis.clone();
    GridSample::from_fn(axis.clone(), axis, |row, col| {
        if row == 0 || col == 0 || row == n - 1 || col == n - 1 {
            return Ok(config.border_value);
        }
        let pos = Coord {
            x: coords[row],
            y: coords[col],
        };
        Ok(terrain.sample_water_level(pos)? - terrain.sample_height(pos)?)
    })
}

/// Trace every configured level and add the chains as tagged polylines.
///
/// Closed chains become closed polylines; the repeated end coordinate maps
/// back onto the first point instead of a duplicate.
pub fn export_contours(
    builder: &mut GraphBuilder,
    terrain: &dyn TerrainSampler,
    config: &ContourConfig,
) -> Result<Vec<PolylineId>> {
    if !config.enabled || config.levels.is_empty() {
        return Ok(Vec::new());
    }
    let grid = sample_water_depth(terrain, config)?;
    debug!(rows = grid.rows(), cols = grid.cols(), range = ?grid.value_range(), "sampled water depth");

    let pipeline = ContourPipeline::builder()
        .with_method(config.method, config.tolerance)
        .build();
    let sets = pipeline.process_levels(&grid, &config.levels)?;
    drop(grid);

    let mut written = Vec::new();
    for set in sets {
        for chain in set.chains {
            let id = if is_closed(&chain) {
                let ring = builder.add_points(chain[..chain.len() - 1].iter().copied())?;
                builder.add_closed_polyline(ring, config.tags.clone())?
            } else {
                let line = builder.add_points(chain)?;
                builder.add_polyline(line, config.tags.clone())?
            };
            written.push(id);
        }
    }
    Ok(written)
}
