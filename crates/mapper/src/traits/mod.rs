use geo_types::Coord;

use crate::{
    error::{ProjectionError, Result},
    export::entities::{Building, CitySummary, District, RoadNode, RoadSegment, TransitStop},
    types::{Chain, GeoCoord, GridSample, SegmentMap},
};

/// Trait for iso-level segment extraction
pub trait ContourExtractor: Send + Sync {
    /// Extract the segments where the field crosses `level`
    fn extract_segments(&self, grid: &GridSample, level: f64) -> Result<SegmentMap>;
}

/// Trait for stitching segments into chains
pub trait ChainAssembler: Send + Sync {
    /// Merge segments sharing endpoints into maximal open or closed chains
    fn assemble(&self, segments: &SegmentMap) -> Result<Vec<Chain>>;
}

/// Trait for chain simplification algorithms
pub trait ChainSimplifier: Send + Sync {
    /// Reduce the chain's point count; `None` means the chain degenerated
    fn simplify_chain(&self, chain: Chain, tolerance: f64) -> Option<Chain>;

    /// Simplify every chain independently, dropping degenerate results
    fn simplify_chains(&self, chains: Vec<Chain>, tolerance: f64) -> Vec<Chain> {
        chains
            .into_iter()
            .filter_map(|chain| self.simplify_chain(chain, tolerance))
            .collect()
    }
}

/// Height-field collaborator sampled at planar world positions
pub trait TerrainSampler {
    /// Ground height at `pos`
    fn sample_height(&self, pos: Coord<f64>) -> Result<f64>;

    /// Water surface height at `pos` (equal to the ground where it is dry)
    fn sample_water_level(&self, pos: Coord<f64>) -> Result<f64>;
}

/// World-to-geographic coordinate projection
pub trait GeoProjection: Send + Sync {
    fn project(&self, pos: Coord<f64>) -> std::result::Result<GeoCoord, ProjectionError>;
}

/// Source of already-tagged world entities
pub trait EntityCatalog {
    fn road_nodes(&self) -> Result<Vec<RoadNode>>;
    fn road_segments(&self) -> Result<Vec<RoadSegment>>;
    fn buildings(&self) -> Result<Vec<Building>>;
    fn districts(&self) -> Result<Vec<District>>;
    fn city(&self) -> Result<Option<CitySummary>>;
    fn transit_stops(&self) -> Result<Vec<TransitStop>>;
}
