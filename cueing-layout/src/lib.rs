//! Stimulus layout generation for the contextual-cueing search task.
//!
//! Positions are percentages of the presentation area's shorter side. All
//! randomness comes from a caller-supplied [`rand::Rng`], so seeded runs are
//! reproducible.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod sampler;
pub mod sequence;
pub mod zone;

pub use catalog::{Catalog, LayoutSetBuilder, RandomAnchor};
pub use config::{GeometryConfig, ZonePolicy};
pub use error::LayoutError;
pub use export::{CSV_HEADER, DebugSnapshot, sequence_csv};
pub use generator::LayoutGenerator;
pub use sampler::{Sample, sample, sample_with};
pub use sequence::{Block, TrialSequence};
pub use zone::{Quadrant, Zone};
