use geo_types::LineString;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    traits::ChainSimplifier,
    types::{Chain, is_closed},
};

/// Douglas-Peucker simplifier using geo crate's implementation
///
/// The first and last point are never removed, so closed chains stay
/// closed. A removed point lies within `tolerance` of the kept segment
/// that replaced it.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl ChainSimplifier for DouglasPeuckerSimplifier {
    fn simplify_chain(&self, chain: Chain, tolerance: f64) -> Option<Chain> {
        use geo::Simplify;

        if chain.len() < 3 {
            return retain_if_valid(chain);
        }
        let simplified = LineString::new(chain).simplify(&tolerance);
        retain_if_valid(simplified.0)
    }
}

/// Visvalingam-Whyatt simplifier using geo crate's implementation
///
/// Here `tolerance` is an area: points whose effective triangle is smaller
/// are dropped.
#[derive(Debug, Clone, Default)]
pub struct VisvalingamWhyattSimplifier;

impl ChainSimplifier for VisvalingamWhyattSimplifier {
    fn simplify_chain(&self, chain: Chain, tolerance: f64) -> Option<Chain> {
        use geo::SimplifyVw;

        if chain.len() < 3 {
            return retain_if_valid(chain);
        }
        let simplified = LineString::new(chain).simplify_vw(&tolerance);
        retain_if_valid(simplified.0)
    }
}

/// Keeps chains untouched apart from the degenerate-chain filter.
#[derive(Debug, Clone, Default)]
pub struct NoopSimplifier;

impl ChainSimplifier for NoopSimplifier {
    fn simplify_chain(&self, chain: Chain, _tolerance: f64) -> Option<Chain> {
        retain_if_valid(chain)
    }
}

/// A chain needs two points, and a loop needs a point away from its start.
fn retain_if_valid(chain: Chain) -> Option<Chain> {
    let too_short = chain.len() < 2 || (is_closed(&chain) && chain.len() < 3);
    (!too_short).then_some(chain)
}

/// Simplification method selectable from configuration
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimplificationMethod {
    #[default]
    DouglasPeucker,
    VisvalingamWhyatt,
    Disabled,
}

impl SimplificationMethod {
    pub fn simplifier(self) -> Box<dyn ChainSimplifier> {
        match self {
            Self::DouglasPeucker => Box::new(DouglasPeuckerSimplifier),
            Self::VisvalingamWhyatt => Box::new(VisvalingamWhyattSimplifier),
            Self::Disabled => Box::new(NoopSimplifier),
        }
    }
}
