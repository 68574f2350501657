pub mod extraction;
pub mod assembly;
pub mod simplification;

pub use extraction::*;
pub use assembly::*;
pub use simplification::*;
