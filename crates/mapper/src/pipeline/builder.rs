use crate::{
    algorithms::{
        DouglasPeuckerSimplifier, EndpointIndexAssembler, MarchingSquaresExtractor,
        NoopSimplifier, SimplificationMethod, VisvalingamWhyattSimplifier,
    },
    config::ContourConfig,
    pipeline::ContourPipeline,
    traits::{ChainAssembler, ChainSimplifier, ContourExtractor},
};

/// Tolerance used when none is configured, in world units
pub const DEFAULT_TOLERANCE: f64 = 8.0;

/// Builder for creating contour pipelines with a fluent API
pub struct ContourPipelineBuilder {
    extractor: Option<Box<dyn ContourExtractor>>,
    assembler: Option<Box<dyn ChainAssembler>>,
    simplifier: Option<Box<dyn ChainSimplifier>>,
    tolerance: f64,
}

impl ContourPipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            extractor: None,
            assembler: None,
            simplifier: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Builder preloaded with the method and tolerance of a contour config
    pub fn from_config(config: &ContourConfig) -> Self {
        Self::new().with_method(config.method, config.tolerance)
    }

    /// Set the segment extractor (replaces any existing one)
    pub fn set_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Set the chain assembler (replaces any existing one)
    pub fn set_assembler<A>(mut self, assembler: A) -> Self
    where
        A: ChainAssembler + 'static,
    {
        self.assembler = Some(Box::new(assembler));
        self
    }

    /// Set the chain simplifier and its tolerance
    pub fn set_simplifier<S>(mut self, simplifier: S, tolerance: f64) -> Self
    where
        S: ChainSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self.tolerance = tolerance;
        self
    }

    /// Use Douglas-Peucker simplification
    pub fn with_simplification(self, tolerance: f64) -> Self {
        self.set_simplifier(DouglasPeuckerSimplifier, tolerance)
    }

    /// Use Visvalingam-Whyatt simplification; `area` is the triangle threshold
    pub fn with_vw_simplification(self, area: f64) -> Self {
        self.set_simplifier(VisvalingamWhyattSimplifier, area)
    }

    /// Keep every assembled point
    pub fn without_simplification(self) -> Self {
        self.set_simplifier(NoopSimplifier, 0.0)
    }

    /// Select the simplifier by configured method
    pub fn with_method(mut self, method: SimplificationMethod, tolerance: f64) -> Self {
        self.simplifier = Some(method.simplifier());
        self.tolerance = tolerance;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> ContourPipeline {
        let extractor = self
            .extractor
            .unwrap_or_else(|| Box::new(MarchingSquaresExtractor));
        let assembler = self
            .assembler
            .unwrap_or_else(|| Box::new(EndpointIndexAssembler));
        let simplifier = self
            .simplifier
            .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier));

        ContourPipeline::new(extractor, assembler, simplifier, self.tolerance)
    }
}

impl Default for ContourPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use geo_types::Coord;

    use super::*;
    use crate::{
        error::Result,
        types::{Chain, GridSample, SegmentMap},
    };

    /// Emits one fixed segment regardless of input.
    struct FixedExtractor;

    impl ContourExtractor for FixedExtractor {
        fn extract_segments(&self, _grid: &GridSample, _level: f64) -> Result<SegmentMap> {
            Ok([(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 })]
                .into_iter()
                .collect())
        }
    }

    fn tiny_grid() -> GridSample {
        GridSample::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0; 4]).expect("valid grid")
    }

    #[test]
    fn test_defaults() {
        let pipeline = ContourPipelineBuilder::default().build();
        assert_eq!(pipeline.tolerance(), DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_custom_extractor_is_used() {
        let pipeline = ContourPipeline::builder()
            .set_extractor(FixedExtractor)
            .without_simplification()
            .build();
        let set = pipeline.process(&tiny_grid(), 0.5).expect("processed");
        let expected: Vec<Chain> = vec![vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }]];
        assert_eq!(set.chains, expected);
    }

    #[test]
    fn test_from_config_takes_tolerance() {
        let config = ContourConfig {
            method: SimplificationMethod::VisvalingamWhyatt,
            tolerance: 3.5,
            ..ContourConfig::default()
        };
        let pipeline = ContourPipelineBuilder::from_config(&config).build();
        assert_eq!(pipeline.tolerance(), 3.5);
    }
}
