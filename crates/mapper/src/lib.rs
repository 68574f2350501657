//! # Map Graph Export Library
//!
//! Turns a sampled terrain and a catalog of already-tagged world entities
//! into a point/polyline graph with geographic coordinates.
//!
//! ## Core Features
//!
//! - **Contour tracing**: marching squares over a scalar grid, endpoint-indexed
//!   chain assembly, Douglas-Peucker or Visvalingam-Whyatt simplification
//! - **Trait-based Architecture**: swap extractors, assemblers, simplifiers,
//!   projections and data sources by implementing traits
//! - **Graph builder**: monotonic point and polyline ids, referential
//!   integrity, unused-point filtering
//! - **GeoJSON Support**: export the finished graph as a feature collection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapper::{ExportConfig, ExportSession, HeightRaster, StaticCatalog};
//!
//! let config = ExportConfig::from_file("export.toml")?;
//! let terrain = HeightRaster::from_json_file("terrain.json")?;
//! let catalog = StaticCatalog::from_json_file("catalog.json")?;
//!
//! let graph = ExportSession::from_config(config)?.run(&terrain, &catalog)?;
//! graph.save_geojson("city.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Contours Only
//!
//! ```rust,no_run
//! use mapper::{ContourPipeline, GridSample};
//!
//! let xs: Vec<f64> = (0..32).map(|i| i as f64).collect();
//! let grid = GridSample::from_fn(xs.clone(), xs, |r, c| {
//!     Ok(((r as f64 - 16.0).powi(2) + (c as f64 - 16.0).powi(2)).sqrt())
//! })?;
//!
//! let pipeline = ContourPipeline::builder()
//!     .with_simplification(0.5)
//!     .build();
//! let rings = pipeline.process(&grid, 8.0)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod io;
pub mod pipeline;
pub mod projection;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use algorithms::*;
pub use config::{ContourConfig, ExportConfig};
pub use error::{MapperError, ProjectionError, Result};
pub use export::{ExportSession, StaticCatalog};
pub use graph::{GraphBuilder, GraphPoint, GraphPolyline, IdConfig, MapGraph, PointId, PolylineId};
pub use io::HeightRaster;
pub use pipeline::{ContourPipeline, builder::ContourPipelineBuilder};
pub use projection::{BoundingBoxProjection, ProjectionConfig};
pub use traits::*;
pub use types::{Chain, ContourSet, GeoBounds, GeoCoord, GridSample, SegmentMap, Tags};
