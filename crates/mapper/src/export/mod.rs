//! Feature exporters and the session that runs them in order.

pub mod buildings;
pub mod contours;
pub mod entities;
pub mod places;
pub mod roads;

use tracing::info;

use crate::{
    config::ExportConfig,
    error::Result,
    graph::{GraphBuilder, MapGraph},
    projection::BoundingBoxProjection,
    traits::{EntityCatalog, GeoProjection, TerrainSampler},
};

pub use entities::{Building, CitySummary, District, RoadNode, RoadSegment, StaticCatalog, TransitStop};

/// One export run over a single shared graph.
///
/// Exporters run in a fixed order (roads, buildings, districts, city,
/// contours, transit stops) and unused points are filtered once at the end.
pub struct ExportSession {
    config: ExportConfig,
    builder: GraphBuilder,
}

impl ExportSession {
    pub fn new<P>(config: ExportConfig, projection: P) -> Result<Self>
    where
        P: GeoProjection + 'static,
    {
        config.validate()?;
        let builder = GraphBuilder::new(projection, config.ids);
        Ok(Self { config, builder })
    }

    /// Session projecting through the configured bounding box.
    pub fn from_config(config: ExportConfig) -> Result<Self> {
        let projection = BoundingBoxProjection::new(&config.projection)?;
        Self::new(config, projection)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Direct access for callers adding entities of their own before `run`.
    pub fn builder_mut(&mut self) -> &mut GraphBuilder {
        &mut self.builder
    }

    pub fn run(mut self, terrain: &dyn TerrainSampler, catalog: &dyn EntityCatalog) -> Result<MapGraph> {
        info!("Beginning export");
        let builder = &mut self.builder;

        let nodes = catalog.road_nodes()?;
        let segments = catalog.road_segments()?;
        let roads = roads::export_roads(builder, &nodes, &segments)?;
        info!(nodes = nodes.len(), segments = segments.len(), roads, "exported roads");

        let stats = buildings::export_buildings(builder, &catalog.buildings()?)?;
        info!(
            footprints = stats.footprints,
            landmarks = stats.landmarks,
            "exported buildings"
        );

        let districts = places::export_districts(builder, &catalog.districts()?)?;
        info!(districts, "exported districts");

        if let Some(city) = catalog.city()? {
            if places::export_city(builder, &city, stats.centre)?.is_some() {
                info!(city = %city.name, population = city.population, "exported city centre");
            }
        }

        let contours = contours::export_contours(builder, terrain, &self.config.contours)?;
        info!(contours = contours.len(), levels = ?self.config.contours.levels, "exported contours");

        let stops = places::export_transit_stops(builder, &catalog.transit_stops()?)?;
        info!(stops, "exported transit stops");

        let graph = self.builder.finish();
        info!(
            points = graph.points.len(),
            polylines = graph.polylines.len(),
            "export finished"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use geo_types::Coord;

    use super::*;
    use crate::{
        config::ContourConfig,
        error::MapperError,
        graph::{PointId, PolylineId, tests::ScaleProjection},
        types::{Tags, tags},
    };

    struct Pond;

    impl TerrainSampler for Pond {
        fn sample_height(&self, _pos: Coord<f64>) -> Result<f64> {
            Ok(10.0)
        }

        fn sample_water_level(&self, pos: Coord<f64>) -> Result<f64> {
            let inside = pos.x.abs() <= 20.0 && pos.y.abs() <= 20.0;
            Ok(if inside { 13.0 } else { 10.0 })
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog {
            road_nodes: vec![
                RoadNode {
                    id: 1,
                    position: Coord { x: -50.0, y: 0.0 },
                },
                RoadNode {
                    id: 2,
                    position: Coord { x: 50.0, y: 0.0 },
                },
                RoadNode {
                    id: 3,
                    position: Coord { x: 0.0, y: 80.0 },
                },
            ],
            road_segments: vec![RoadSegment {
                id: 5,
                start_node: 1,
                end_node: 2,
                start_direction: Coord { x: 1.0, y: 0.0 },
                end_direction: Coord { x: -1.0, y: 0.0 },
                inverted: false,
                tags: tags([("highway", "primary")]),
            }],
            buildings: vec![
                Building {
                    id: 1,
                    position: Coord { x: 60.0, y: 60.0 },
                    angle: 0.0,
                    width: 1,
                    length: 1,
                    tags: tags([("building", "yes")]),
                    amenity: Some("school".into()),
                },
                Building {
                    id: 2,
                    position: Coord { x: 80.0, y: 60.0 },
                    angle: 0.0,
                    width: 1,
                    length: 1,
                    tags: Tags::new(),
                    amenity: None,
                },
            ],
            districts: vec![District {
                name: "Centre".into(),
                position: Coord { x: 0.0, y: 0.0 },
            }],
            city: Some(CitySummary {
                name: "Harbour".into(),
                population: 900,
            }),
            transit_stops: vec![TransitStop {
                position: Coord { x: 10.0, y: 0.0 },
                tags: tags([("highway", "bus_stop")]),
            }],
        }
    }

    fn config() -> ExportConfig {
        ExportConfig {
            contours: ContourConfig {
                steps: 16,
                grid_size: 10.0,
                tolerance: 1.0,
                ..ContourConfig::default()
            },
            ..ExportConfig::default()
        }
    }

    #[test]
    fn test_full_session() {
        let session = ExportSession::new(config(), ScaleProjection).expect("session");
        let graph = session.run(&Pond, &catalog()).expect("export");

        // Road first, then the building footprint, then the pond ring.
        let ids: Vec<PolylineId> = graph.polylines.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![PolylineId(5), PolylineId(128_000), PolylineId(128_001)]);
        assert_eq!(graph.polylines[1].tags, tags([("building", "yes")]));
        assert_eq!(graph.polylines[2].tags, tags([("natural", "water")]));
        assert!(graph.polylines[1].is_closed() && graph.polylines[2].is_closed());

        // Road nodes come first; node 3 is unreferenced and filtered.
        assert_eq!(graph.polylines[0].points, vec![PointId(128_000), PointId(128_001)]);
        assert!(graph.point(PointId(128_002)).is_none());

        let place = |value: &str| {
            graph
                .points
                .iter()
                .find(|p| p.tags.get("place").map(String::as_str) == Some(value))
        };
        assert_eq!(place("suburb").map(|p| p.position), Some(Coord { x: 0.0, y: 0.0 }));
        let city = place("city").expect("city centre");
        assert_eq!(city.position, Coord { x: 60.0, y: 60.0 });
        assert_eq!(city.tags.get("population").map(String::as_str), Some("900"));

        // Transit stop is the last point allocated.
        let last = graph.points.last().expect("points");
        assert_eq!(last.tags, tags([("highway", "bus_stop")]));

        assert!(graph.unresolved_references().is_empty());
        let referenced: HashSet<PointId> = graph
            .polylines
            .iter()
            .flat_map(|l| l.points.iter().copied())
            .collect();
        assert!(graph
            .points
            .iter()
            .all(|p| p.is_tagged() || referenced.contains(&p.id)));
        assert!(graph.points.iter().all(|p| p.geo.is_some()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = config();
        bad.contours.tolerance = -1.0;
        assert!(matches!(
            ExportSession::new(bad, ScaleProjection),
            Err(MapperError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_projects_into_bounds() {
        let session = ExportSession::from_config(config()).expect("session");
        let graph = session.run(&Pond, &StaticCatalog::default()).expect("export");
        let bounds = config().projection.bounds;
        for point in &graph.points {
            let geo = point.geo.expect("projected");
            assert!(geo.lon > bounds.min_lon && geo.lon < bounds.max_lon);
            assert!(geo.lat > bounds.min_lat && geo.lat < bounds.max_lat);
        }
        assert_eq!(graph.polylines.len(), 1);
    }

    #[test]
    fn test_catalog_failure_propagates() {
        struct Offline;

        impl EntityCatalog for Offline {
            fn road_nodes(&self) -> Result<Vec<RoadNode>> {
                Err(MapperError::Catalog("offline".into()))
            }
            fn road_segments(&self) -> Result<Vec<RoadSegment>> {
                Ok(Vec::new())
            }
            fn buildings(&self) -> Result<Vec<Building>> {
                Ok(Vec::new())
            }
            fn districts(&self) -> Result<Vec<District>> {
                Ok(Vec::new())
            }
            fn city(&self) -> Result<Option<CitySummary>> {
                Ok(None)
            }
            fn transit_stops(&self) -> Result<Vec<TransitStop>> {
                Ok(Vec::new())
            }
        }

        let session = ExportSession::new(config(), ScaleProjection).expect("session");
        assert!(matches!(session.run(&Pond, &Offline), Err(MapperError::Catalog(_))));
    }
}
