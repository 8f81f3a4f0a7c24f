pub mod config;
pub mod mapgen;

pub use config::{ConfigError, ConfigLoadError, Configuration};
pub use mapgen::{
    Column, ExitNode, GeneratedMap, MapGenerator, Node, NodeId, NodeType, generate_map,
};
