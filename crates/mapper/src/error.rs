use thiserror::Error;

use crate::graph::{PointId, PolylineId};

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Grid shape mismatch: {rows} rows x {cols} columns but {values} values")]
    GridShape {
        rows: usize,
        cols: usize,
        values: usize,
    },

    #[error("Polyline references unknown point {0}")]
    DanglingPoint(PointId),

    #[error("Polyline needs at least two points, got {0}")]
    DegeneratePolyline(usize),

    #[error("Polyline id {0} is already in use")]
    DuplicatePolyline(PolylineId),

    #[error("Point {0} has no geographic position")]
    Unprojected(PointId),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("Terrain sampling failed at ({x}, {y}): {reason}")]
    Sampling { x: f64, y: f64, reason: String },

    #[error("Entity catalog error: {0}")]
    Catalog(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Failure reported by a [`GeoProjection`](crate::traits::GeoProjection).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("non-finite world position ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MapperError>;
