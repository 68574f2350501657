use std::collections::HashSet;

use crate::graph::{GraphPoint, GraphPolyline, PointId};

/// Keep the points that carry a tag or are referenced by a polyline.
///
/// Insertion order is preserved so identical input always yields identical
/// output.
pub fn filter_unused(points: Vec<GraphPoint>, polylines: &[GraphPolyline]) -> Vec<GraphPoint> {
    let referenced: HashSet<PointId> = polylines
        .iter()
        .flat_map(|line| line.points.iter().copied())
        .collect();

    points
        .into_iter()
        .filter(|point| point.is_tagged() || referenced.contains(&point.id))
        .collect()
}
