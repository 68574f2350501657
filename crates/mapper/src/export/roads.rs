use std::collections::HashMap;

use geo_types::Coord;
use tracing::debug;

use crate::{
    error::Result,
    export::entities::{RoadNode, RoadSegment},
    graph::{GraphBuilder, PointId, PolylineId},
    types::Tags,
};

/// Segments bending more than this many degrees get interior points.
pub const CURVE_THRESHOLD_DEG: f64 = 3.0;

const CURVE_SAMPLES: [f64; 3] = [0.25, 0.5, 0.75];

/// Add every road node, then one polyline per tagged segment.
///
/// Node points are untagged; the ones no segment references disappear in
/// the final filter. Returns the number of polylines written.
pub fn export_roads(
    builder: &mut GraphBuilder,
    nodes: &[RoadNode],
    segments: &[RoadSegment],
) -> Result<usize> {
    let mut node_ids: HashMap<u32, (PointId, Coord<f64>)> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let id = builder.add_point(node.position, Tags::new())?;
        node_ids.insert(node.id, (id, node.position));
    }

    let mut written = 0;
    for segment in segments {
        if segment.tags.is_empty() {
            continue;
        }
        let (start_node, end_node, start_dir, end_dir) = if segment.inverted {
            (segment.end_node, segment.start_node, segment.end_direction, segment.start_direction)
        } else {
            (segment.start_node, segment.end_node, segment.start_direction, segment.end_direction)
        };
        let (Some(&(start_id, start)), Some(&(end_id, end))) =
            (node_ids.get(&start_node), node_ids.get(&end_node))
        else {
            debug!(segment = segment.id, start_node, end_node, "segment references unknown node");
            continue;
        };

        let mut points = vec![start_id];
        if angle_deg(start_dir, -end_dir) > CURVE_THRESHOLD_DEG {
            let curve = CubicBezier::through(start, start_dir, end, end_dir);
            for t in CURVE_SAMPLES {
                points.push(builder.add_point(curve.position(t), Tags::new())?);
            }
        }
        points.push(end_id);

        builder.add_polyline_with_id(PolylineId(segment.id), points, segment.tags.clone())?;
        written += 1;
    }
    Ok(written)
}

/// Unsigned angle between two vectors in degrees; 0 if either is zero.
fn angle_deg(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let cross = a.x * b.y - a.y * b.x;
    let dot = a.x * b.x + a.y * b.y;
    if cross == 0.0 && dot == 0.0 {
        return 0.0;
    }
    cross.abs().atan2(dot).to_degrees()
}

fn normalized(v: Coord<f64>) -> Coord<f64> {
    let len = v.x.hypot(v.y);
    if len > 0.0 { v / len } else { v }
}

struct CubicBezier {
    a: Coord<f64>,
    b: Coord<f64>,
    c: Coord<f64>,
    d: Coord<f64>,
}

impl CubicBezier {
    /// Curve leaving `start` along `start_dir` and arriving at `end` against
    /// `end_dir`, with handles a third of the chord long.
    fn through(start: Coord<f64>, start_dir: Coord<f64>, end: Coord<f64>, end_dir: Coord<f64>) -> Self {
        let handle = (end - start).x.hypot((end - start).y) / 3.0;
        Self {
            a: start,
            b: start + normalized(start_dir) * handle,
            c: end + normalized(end_dir) * handle,
            d: end,
        }
    }

    fn position(&self, t: f64) -> Coord<f64> {
        let s = 1.0 - t;
        self.a * (s * s * s) + self.b * (3.0 * s * s * t) + self.c * (3.0 * s * t * t) + self.d * (t * t * t)
    }
}
