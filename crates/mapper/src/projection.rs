//! Linear world-to-geographic projection over a bounding box.

use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MapperError, ProjectionError, Result},
    traits::GeoProjection,
    types::{GeoBounds, GeoCoord},
};

/// Settings for [`BoundingBoxProjection`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Side length of the square world area, centred on the origin
    pub world_extent: f64,
    /// Multiplier applied to the world extent before mapping it onto the
    /// bounds; larger values shrink features on the map
    pub scale: f64,
    pub bounds: GeoBounds,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            world_extent: 17_280.0,
            scale: 1.0,
            bounds: GeoBounds::default(),
        }
    }
}

/// Maps the square `[-span/2, span/2]²` (with `span = world_extent * scale`)
/// linearly onto the bounding box: world X to longitude, world Y to
/// latitude. Positions outside the square extrapolate.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxProjection {
    bounds: GeoBounds,
    span: f64,
}

impl BoundingBoxProjection {
    pub fn new(config: &ProjectionConfig) -> Result<Self> {
        let span = config.world_extent * config.scale;
        if !(span.is_finite() && span > 0.0) {
            return Err(MapperError::Config(format!(
                "projection span must be positive, got extent {} x scale {}",
                config.world_extent, config.scale
            )));
        }
        let b = config.bounds;
        if !(b.min_lon < b.max_lon && b.min_lat < b.max_lat) {
            return Err(MapperError::Config(format!("empty geographic bounds {b:?}")));
        }
        Ok(Self { bounds: b, span })
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }
}

impl GeoProjection for BoundingBoxProjection {
    fn project(&self, pos: Coord<f64>) -> std::result::Result<GeoCoord, ProjectionError> {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return Err(ProjectionError::NonFinite { x: pos.x, y: pos.y });
        }
        let u = pos.x / self.span + 0.5;
        let v = pos.y / self.span + 0.5;
        let b = &self.bounds;
        Ok(GeoCoord {
            lon: b.min_lon + u * (b.max_lon - b.min_lon),
            lat: b.min_lat + v * (b.max_lat - b.min_lat),
        })
    }
}
