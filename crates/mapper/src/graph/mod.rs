pub mod filter;

use std::{collections::HashSet, fmt};

use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{MapperError, Result},
    traits::GeoProjection,
    types::{GeoCoord, Tags},
};

pub use filter::filter_unused;

/// Identifier of a [`GraphPoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

/// Identifier of a [`GraphPolyline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolylineId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PolylineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    pub id: PointId,
    /// Planar world position
    pub position: Coord<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoCoord>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl GraphPoint {
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPolyline {
    pub id: PolylineId,
    pub points: Vec<PointId>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl GraphPolyline {
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }
}

/// First identifiers handed out by a [`GraphBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IdConfig {
    pub first_point_id: u64,
    pub first_polyline_id: u64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            first_point_id: 128_000,
            first_polyline_id: 128_000,
        }
    }
}

/// Shared point/polyline collection every exporter contributes to.
///
/// Points and polylines draw identifiers from independent counters. A point
/// identifier is valid from the moment `add_point` returns it, and polylines
/// may only reference valid identifiers.
pub struct GraphBuilder {
    projection: Box<dyn GeoProjection>,
    points: Vec<GraphPoint>,
    polylines: Vec<GraphPolyline>,
    polyline_ids: HashSet<PolylineId>,
    first_point_id: u64,
    next_point_id: u64,
    next_polyline_id: u64,
}

impl GraphBuilder {
    pub fn new<P>(projection: P, ids: IdConfig) -> Self
    where
        P: GeoProjection + 'static,
    {
        Self::with_boxed_projection(Box::new(projection), ids)
    }

    pub fn with_boxed_projection(projection: Box<dyn GeoProjection>, ids: IdConfig) -> Self {
        Self {
            projection,
            points: Vec::new(),
            polylines: Vec::new(),
            polyline_ids: HashSet::new(),
            first_point_id: ids.first_point_id,
            next_point_id: ids.first_point_id,
            next_polyline_id: ids.first_polyline_id,
        }
    }

    /// Project `position` and append it as a new point.
    ///
    /// Projection failures propagate and no identifier is consumed.
    pub fn add_point(&mut self, position: Coord<f64>, tags: Tags) -> Result<PointId> {
        let geo = self.projection.project(position)?;
        let id = PointId(self.next_point_id);
        self.next_point_id += 1;
        self.points.push(GraphPoint {
            id,
            position,
            geo: Some(geo),
            tags,
        });
        Ok(id)
    }

    /// Standalone tagged point; kept by the filter on its tags alone.
    pub fn add_landmark(&mut self, position: Coord<f64>, tags: Tags) -> Result<PointId> {
        debug_assert!(!tags.is_empty(), "landmark without tags would be filtered");
        self.add_point(position, tags)
    }

    /// Append an untagged point per position, in order.
    pub fn add_points<I>(&mut self, positions: I) -> Result<Vec<PointId>>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        positions
            .into_iter()
            .map(|p| self.add_point(p, Tags::new()))
            .collect()
    }

    /// Append a polyline with the next free identifier.
    pub fn add_polyline(&mut self, points: Vec<PointId>, tags: Tags) -> Result<PolylineId> {
        self.validate_refs(&points)?;
        while self.polyline_ids.contains(&PolylineId(self.next_polyline_id)) {
            self.next_polyline_id += 1;
        }
        let id = PolylineId(self.next_polyline_id);
        self.next_polyline_id += 1;
        self.push_polyline(id, points, tags);
        Ok(id)
    }

    /// Append a polyline under an identifier chosen by the caller, for
    /// entities that carry a stable id of their own.
    pub fn add_polyline_with_id(
        &mut self,
        id: PolylineId,
        points: Vec<PointId>,
        tags: Tags,
    ) -> Result<PolylineId> {
        if self.polyline_ids.contains(&id) {
            return Err(MapperError::DuplicatePolyline(id));
        }
        self.validate_refs(&points)?;
        self.push_polyline(id, points, tags);
        Ok(id)
    }

    /// Append a polyline that returns to its first point.
    pub fn add_closed_polyline(&mut self, mut points: Vec<PointId>, tags: Tags) -> Result<PolylineId> {
        if let Some(&first) = points.first() {
            points.push(first);
        }
        self.add_polyline(points, tags)
    }

    fn validate_refs(&self, points: &[PointId]) -> Result<()> {
        if points.len() < 2 {
            return Err(MapperError::DegeneratePolyline(points.len()));
        }
        match points.iter().find(|id| !self.contains_point(**id)) {
            Some(&missing) => Err(MapperError::DanglingPoint(missing)),
            None => Ok(()),
        }
    }

    fn push_polyline(&mut self, id: PolylineId, points: Vec<PointId>, tags: Tags) {
        self.polyline_ids.insert(id);
        self.polylines.push(GraphPolyline { id, points, tags });
    }

    pub fn contains_point(&self, id: PointId) -> bool {
        (self.first_point_id..self.next_point_id).contains(&id.0)
    }

    pub fn point(&self, id: PointId) -> Option<&GraphPoint> {
        if !self.contains_point(id) {
            return None;
        }
        let index = usize::try_from(id.0 - self.first_point_id).ok()?;
        self.points.get(index)
    }

    pub fn points(&self) -> &[GraphPoint] {
        &self.points
    }

    pub fn polylines(&self) -> &[GraphPolyline] {
        &self.polylines
    }

    /// Drop unused points and freeze the collection.
    pub fn finish(self) -> MapGraph {
        let total = self.points.len();
        let points = filter_unused(self.points, &self.polylines);
        debug!(
            kept = points.len(),
            dropped = total - points.len(),
            polylines = self.polylines.len(),
            "filtered unused points"
        );
        MapGraph {
            points,
            polylines: self.polylines,
        }
    }
}

/// Finished export: every point is tagged or referenced, every reference
/// resolves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapGraph {
    pub points: Vec<GraphPoint>,
    pub polylines: Vec<GraphPolyline>,
}

impl MapGraph {
    pub fn point(&self, id: PointId) -> Option<&GraphPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Point references that do not resolve, in polyline order.
    pub fn unresolved_references(&self) -> Vec<PointId> {
        let known: HashSet<PointId> = self.points.iter().map(|p| p.id).collect();
        self.polylines
            .iter()
            .flat_map(|line| line.points.iter().copied())
            .filter(|id| !known.contains(id))
            .collect()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{error::ProjectionError, types::tags};

    /// Projection stub: lon/lat equal world x/y scaled down.
    pub(crate) struct ScaleProjection;

    impl GeoProjection for ScaleProjection {
        fn project(&self, pos: Coord<f64>) -> std::result::Result<GeoCoord, ProjectionError> {
            Ok(GeoCoord {
                lon: pos.x / 1000.0,
                lat: pos.y / 1000.0,
            })
        }
    }

    struct FailingProjection;

    impl GeoProjection for FailingProjection {
        fn project(&self, _pos: Coord<f64>) -> std::result::Result<GeoCoord, ProjectionError> {
            Err(ProjectionError::Other("offline".into()))
        }
    }

    fn builder() -> GraphBuilder {
        GraphBuilder::new(ScaleProjection, IdConfig::default())
    }

    #[test]
    fn test_ids_are_monotonic_and_independent() {
        let mut graph = builder();
        let a = graph.add_point(Coord { x: 0.0, y: 0.0 }, Tags::new()).expect("point");
        let b = graph.add_point(Coord { x: 10.0, y: 0.0 }, Tags::new()).expect("point");
        let line = graph.add_polyline(vec![a, b], tags([("highway", "residential")])).expect("line");
        let c = graph.add_point(Coord { x: 20.0, y: 0.0 }, Tags::new()).expect("point");

        assert_eq!((a, b, c), (PointId(128_000), PointId(128_001), PointId(128_002)));
        assert_eq!(line, PolylineId(128_000));
        assert_eq!(
            graph.point(b).and_then(|p| p.geo),
            Some(GeoCoord { lon: 0.01, lat: 0.0 })
        );
    }

    #[test]
    fn test_rejects_dangling_and_degenerate_polylines() {
        let mut graph = builder();
        let a = graph.add_point(Coord { x: 0.0, y: 0.0 }, Tags::new()).expect("point");

        let dangling = graph.add_polyline(vec![a, PointId(7)], Tags::new());
        assert!(matches!(dangling, Err(MapperError::DanglingPoint(PointId(7)))));

        let short = graph.add_polyline(vec![a], Tags::new());
        assert!(matches!(short, Err(MapperError::DegeneratePolyline(1))));
        assert!(graph.polylines().is_empty());
    }

    #[test]
    fn test_explicit_ids_are_skipped_by_counter() {
        let mut graph = GraphBuilder::new(
            ScaleProjection,
            IdConfig {
                first_point_id: 1,
                first_polyline_id: 10,
            },
        );
        let pts = graph
            .add_points([Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }])
            .expect("points");
        let explicit = graph
            .add_polyline_with_id(PolylineId(10), pts.clone(), Tags::new())
            .expect("explicit");
        assert_eq!(explicit, PolylineId(10));

        let duplicate = graph.add_polyline_with_id(PolylineId(10), pts.clone(), Tags::new());
        assert!(matches!(duplicate, Err(MapperError::DuplicatePolyline(PolylineId(10)))));

        let next = graph.add_polyline(pts, Tags::new()).expect("counted");
        assert_eq!(next, PolylineId(11));
    }

    #[test]
    fn test_closed_polyline_repeats_first_reference() {
        let mut graph = builder();
        let pts = graph
            .add_points([
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
            ])
            .expect("points");
        graph.add_closed_polyline(pts.clone(), Tags::new()).expect("ring");
        let ring = &graph.polylines()[0];
        assert!(ring.is_closed());
        assert_eq!(ring.points.len(), 4);
        assert_eq!(ring.points[3], pts[0]);
    }

    #[test]
    fn test_projection_failure_propagates_without_consuming_id() {
        let mut graph = GraphBuilder::new(FailingProjection, IdConfig::default());
        let err = graph.add_point(Coord { x: 0.0, y: 0.0 }, Tags::new());
        assert!(matches!(err, Err(MapperError::Projection(_))));
        assert!(graph.points().is_empty());
        assert!(!graph.contains_point(PointId(128_000)));
    }

    #[test]
    fn test_finish_keeps_referential_integrity() {
        let mut graph = builder();
        let landmark = graph
            .add_point(Coord { x: 5.0, y: 5.0 }, tags([("amenity", "school")]))
            .expect("landmark");
        let orphan = graph.add_point(Coord { x: 6.0, y: 6.0 }, Tags::new()).expect("orphan");
        let pts = graph
            .add_points([Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }])
            .expect("points");
        graph.add_polyline(pts.clone(), tags([("natural", "water")])).expect("line");

        let map = graph.finish();
        let ids: Vec<PointId> = map.points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![landmark, pts[0], pts[1]]);
        assert!(map.point(orphan).is_none());
        assert!(map.unresolved_references().is_empty());

        let json = map.to_json_string().expect("json");
        let back: MapGraph = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, map);
    }
}
