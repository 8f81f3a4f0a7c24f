//! Procedural path-map generation split into coherent submodules.

pub mod checks;
pub mod connections;
pub mod lineage;
pub mod model;
pub mod rules;
pub mod sampling;
pub mod weights;

mod generator;
mod rng;

pub use checks::{MapViolation, audit};
pub use generator::{ENCOUNTER_ID_RANGE, MapGenerator};
pub use model::{Column, ExitNode, GeneratedMap, Node, NodeId, NodeType};
pub use weights::{TypeWeights, UsageCounters, WeightSnapshot};

use crate::config::{ConfigError, Configuration};

/// Validates `config` and generates one map from fresh randomness.
pub fn generate_map(config: &Configuration) -> Result<GeneratedMap, ConfigError> {
    config.validate()?;
    Ok(MapGenerator::new(*config).generate())
}
