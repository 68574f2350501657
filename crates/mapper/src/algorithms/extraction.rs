use geo_types::Coord;
use tracing::debug;

use crate::{
    error::Result,
    traits::ContourExtractor,
    types::{GridSample, SegmentMap},
};

/// Marching-squares extractor with linear interpolation along cell edges.
///
/// Corners strictly greater than the level are "above"; a corner equal to
/// the level counts as below. Saddle cells are resolved by the cell centre,
/// taken as the mean of the four corners: when the centre is above, the two
/// above corners are joined through the cell and the segments cut off the
/// two below corners, and the other way round when it is not.
#[derive(Debug, Clone, Default)]
pub struct MarchingSquaresExtractor;

impl ContourExtractor for MarchingSquaresExtractor {
    fn extract_segments(&self, grid: &GridSample, level: f64) -> Result<SegmentMap> {
        Ok(extract_segments(grid, level))
    }
}

type Node = (usize, usize);

/// Trace the `level` crossings of every 2x2 cell of `grid`.
///
/// Degenerate grids and non-finite levels produce an empty map. Cells with a
/// non-finite corner emit nothing.
pub fn extract_segments(grid: &GridSample, level: f64) -> SegmentMap {
    let mut segments = SegmentMap::new();
    if grid.is_degenerate() || !level.is_finite() {
        return segments;
    }

    for row in 0..grid.rows() - 1 {
        for col in 0..grid.cols() - 1 {
            // Counter-clockwise; edge k joins corner k and corner k + 1.
            let corners: [Node; 4] = [(row, col), (row + 1, col), (row + 1, col + 1), (row, col + 1)];
            let values = corners.map(|(r, c)| grid.value(r, c));
            if values.iter().any(|v| !v.is_finite()) {
                continue;
            }

            let above = values.map(|v| v > level);
            let case = above
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &a)| acc | (u8::from(a) << i));

            let crossing = |edge: usize| interpolate(grid, corners[edge], corners[(edge + 1) % 4], level);

            match case {
                0b0000 | 0b1111 => {}
                0b0101 | 0b1010 => {
                    let centre_above = values.iter().sum::<f64>() / 4.0 > level;
                    for corner in 0..4 {
                        if above[corner] != centre_above {
                            segments.insert(crossing((corner + 3) % 4), crossing(corner));
                        }
                    }
                }
                _ => {
                    let mut edges = (0..4).filter(|&e| above[e] != above[(e + 1) % 4]);
                    if let (Some(a), Some(b)) = (edges.next(), edges.next()) {
                        segments.insert(crossing(a), crossing(b));
                    }
                }
            }
        }
    }

    debug!(level, segments = segments.len(), "extracted contour segments");
    segments
}

/// Crossing point on the edge between two grid nodes.
///
/// The nodes are ordered first so that the two cells sharing an edge compute
/// bit-identical points, which chain assembly depends on.
fn interpolate(grid: &GridSample, a: Node, b: Node, level: f64) -> Coord<f64> {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let (va, vb) = (grid.value(a.0, a.1), grid.value(b.0, b.1));
    let (pa, pb) = (grid.position(a.0, a.1), grid.position(b.0, b.1));
    let t = (level - va) / (vb - va);
    Coord {
        x: pa.x + t * (pb.x - pa.x),
        y: pa.y + t * (pb.y - pa.y),
    }
}
