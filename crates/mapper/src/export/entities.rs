//! Plain world entities handed to the exporters.
//!
//! Every entity arrives already classified: its tags are final and the
//! exporters copy them verbatim.

use std::{fs, path::Path};

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MapperError, Result},
    traits::EntityCatalog,
    types::Tags,
};

/// Junction of the road network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadNode {
    /// Host index, referenced by [`RoadSegment::start_node`] and `end_node`
    pub id: u32,
    pub position: Coord<f64>,
}

/// Curved road piece between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Stable host id, reused as the polyline id
    pub id: u64,
    pub start_node: u32,
    pub end_node: u32,
    /// Tangent leaving the start node
    pub start_direction: Coord<f64>,
    /// Tangent leaving the end node, pointing back into the segment
    pub end_direction: Coord<f64>,
    /// Traffic runs from end to start
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    /// Footprint centre
    pub position: Coord<f64>,
    /// Rotation in radians
    pub angle: f64,
    /// Footprint size in 8-unit cells
    pub width: u32,
    pub length: u32,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub name: String,
    /// Where the district label sits
    pub position: Coord<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub name: String,
    pub population: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStop {
    pub position: Coord<f64>,
    #[serde(default)]
    pub tags: Tags,
}

/// In-memory catalog, typically loaded from a JSON dump of the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticCatalog {
    pub road_nodes: Vec<RoadNode>,
    pub road_segments: Vec<RoadSegment>,
    pub buildings: Vec<Building>,
    pub districts: Vec<District>,
    pub city: Option<CitySummary>,
    pub transit_stops: Vec<TransitStop>,
}

impl StaticCatalog {
    /// Load a catalog from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| MapperError::Catalog(format!("{}: {e}", path.display())))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl EntityCatalog for StaticCatalog {
    fn road_nodes(&self) -> Result<Vec<RoadNode>> {
        Ok(self.road_nodes.clone())
    }

    fn road_segments(&self) -> Result<Vec<RoadSegment>> {
        Ok(self.road_segments.clone())
    }

    fn buildings(&self) -> Result<Vec<Building>> {
        Ok(self.buildings.clone())
    }

    fn districts(&self) -> Result<Vec<District>> {
        Ok(self.districts.clone())
    }

    fn city(&self) -> Result<Option<CitySummary>> {
        Ok(self.city.clone())
    }

    fn transit_stops(&self) -> Result<Vec<TransitStop>> {
        Ok(self.transit_stops.clone())
    }
}
