pub mod builder;

use tracing::debug;

use crate::{
    error::Result,
    traits::{ChainAssembler, ChainSimplifier, ContourExtractor},
    types::{ContourSet, GridSample},
};

/// Extraction, assembly and simplification of contour chains
pub struct ContourPipeline {
    extractor: Box<dyn ContourExtractor>,
    assembler: Box<dyn ChainAssembler>,
    simplifier: Box<dyn ChainSimplifier>,
    tolerance: f64,
}

impl ContourPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::ContourPipelineBuilder {
        builder::ContourPipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        extractor: Box<dyn ContourExtractor>,
        assembler: Box<dyn ChainAssembler>,
        simplifier: Box<dyn ChainSimplifier>,
        tolerance: f64,
    ) -> Self {
        Self {
            extractor,
            assembler,
            simplifier,
            tolerance,
        }
    }

    /// Trace the chains of a single iso-level
    pub fn process(&self, grid: &GridSample, level: f64) -> Result<ContourSet> {
        let segments = self.extractor.extract_segments(grid, level)?;
        let chains = self.assembler.assemble(&segments)?;
        let assembled = chains.len();
        let chains = self.simplifier.simplify_chains(chains, self.tolerance);

        debug!(
            level,
            segments = segments.len(),
            assembled,
            kept = chains.len(),
            "traced contour level"
        );
        Ok(ContourSet { level, chains })
    }

    /// Trace every level independently, in the given order
    pub fn process_levels(&self, grid: &GridSample, levels: &[f64]) -> Result<Vec<ContourSet>> {
        levels.iter().map(|&level| self.process(grid, level)).collect()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
