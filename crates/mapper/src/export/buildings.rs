use geo_types::Coord;

use crate::{
    error::Result,
    export::entities::Building,
    graph::GraphBuilder,
    types::tags,
};

/// World units per footprint cell.
pub const CELL_SIZE: f64 = 8.0;

/// Outcome of [`export_buildings`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildingStats {
    pub footprints: usize,
    pub landmarks: usize,
    /// Mean centre of the exported footprints
    pub centre: Option<Coord<f64>>,
}

/// Add a closed footprint per tagged building, plus an amenity landmark
/// where the building has one.
pub fn export_buildings(builder: &mut GraphBuilder, buildings: &[Building]) -> Result<BuildingStats> {
    let mut stats = BuildingStats::default();
    let mut centre_sum = Coord { x: 0.0, y: 0.0 };

    for building in buildings.iter().filter(|b| !b.tags.is_empty()) {
        let corners = builder.add_points(footprint(building))?;
        builder.add_closed_polyline(corners, building.tags.clone())?;
        stats.footprints += 1;
        centre_sum = centre_sum + building.position;

        if let Some(amenity) = building.amenity.as_deref().filter(|a| !a.is_empty()) {
            builder.add_landmark(building.position, tags([("amenity", amenity)]))?;
            stats.landmarks += 1;
        }
    }

    if stats.footprints > 0 {
        stats.centre = Some(centre_sum / stats.footprints as f64);
    }
    Ok(stats)
}

/// Rectangle corners in ring order.
pub fn footprint(building: &Building) -> [Coord<f64>; 4] {
    let (sin, cos) = building.angle.sin_cos();
    let across = Coord { x: cos, y: sin } * CELL_SIZE;
    let along = Coord { x: across.y, y: -across.x };
    let half_w = across * (f64::from(building.width) * 0.5);
    let half_l = along * (f64::from(building.length) * 0.5);
    let p = building.position;

    [
        p - half_w - half_l,
        p + half_w - half_l,
        p + half_w + half_l,
        p - half_w + half_l,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::{IdConfig, tests::ScaleProjection},
        types::Tags,
    };

    fn building(x: f64, y: f64, tags: Tags) -> Building {
        Building {
            id: 1,
            position: Coord { x, y },
            angle: 0.0,
            width: 2,
            length: 4,
            tags,
            amenity: None,
        }
    }

    fn builder() -> GraphBuilder {
        GraphBuilder::new(ScaleProjection, IdConfig::default())
    }

    #[test]
    fn test_axis_aligned_footprint() {
        let corners = footprint(&building(100.0, 50.0, Tags::new()));
        assert_eq!(
            corners,
            [
                Coord { x: 92.0, y: 66.0 },
                Coord { x: 108.0, y: 66.0 },
                Coord { x: 108.0, y: 34.0 },
                Coord { x: 92.0, y: 34.0 },
            ]
        );
    }

    #[test]
    fn test_rotated_footprint_keeps_dimensions() {
        let mut b = building(0.0, 0.0, Tags::new());
        b.angle = 0.7;
        let [c0, c1, c2, _] = footprint(&b);
        let side = |a: Coord<f64>, b: Coord<f64>| (a - b).x.hypot((a - b).y);
        assert!((side(c0, c1) - 16.0).abs() < 1e-9);
        assert!((side(c1, c2) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_footprint_is_closed_and_centres_accumulate() {
        let mut graph = builder();
        let mut school = building(0.0, 0.0, tags([("building", "yes")]));
        school.amenity = Some("school".into());
        let houses = [
            school,
            building(100.0, 0.0, tags([("building", "house")])),
            building(500.0, 500.0, Tags::new()),
        ];

        let stats = export_buildings(&mut graph, &houses).expect("buildings");
        assert_eq!(stats.footprints, 2);
        assert_eq!(stats.landmarks, 1);
        assert_eq!(stats.centre, Some(Coord { x: 50.0, y: 0.0 }));

        assert_eq!(graph.polylines().len(), 2);
        for ring in graph.polylines() {
            assert!(ring.is_closed());
            assert_eq!(ring.points.len(), 5);
        }
        let amenity = graph
            .points()
            .iter()
            .find(|p| p.tags.get("amenity").map(String::as_str) == Some("school"));
        assert!(amenity.is_some());
    }

    #[test]
    fn test_no_tagged_buildings_has_no_centre() {
        let mut graph = builder();
        let stats = export_buildings(&mut graph, &[building(1.0, 1.0, Tags::new())]).expect("ok");
        assert_eq!(stats, BuildingStats::default());
        assert!(graph.points().is_empty());
    }
}
