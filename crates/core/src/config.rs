//! Map generation parameters, their defaults, and validation.
//!
//! A `Configuration` is plain data. `validate` must succeed before a
//! `MapGenerator` is built from it; the generator itself never re-checks.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_COLUMNS: u32 = 20;
pub const DEFAULT_MIN_NODES: u32 = 2;
pub const DEFAULT_MAX_NODES: u32 = 6;
pub const DEFAULT_MIN_CONNECTION: u32 = 1;
pub const DEFAULT_MAX_CONNECTION: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub columns: u32,
    pub min_nodes: u32,
    pub max_nodes: u32,
    pub min_connection: u32,
    pub max_connection: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            min_nodes: DEFAULT_MIN_NODES,
            max_nodes: DEFAULT_MAX_NODES,
            min_connection: DEFAULT_MIN_CONNECTION,
            max_connection: DEFAULT_MAX_CONNECTION,
        }
    }
}

/// The single constraint a configuration violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    TooFewColumns,
    TooFewNodes,
    TooFewConnections,
    NodeRangeInverted { min_nodes: u32, max_nodes: u32 },
    ConnectionRangeInverted { min_connection: u32, max_connection: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewColumns => write!(f, "number of columns must not be less than 1"),
            Self::TooFewNodes => write!(f, "minimum number of nodes must not be less than 1"),
            Self::TooFewConnections => {
                write!(f, "minimum number of connections per node must not be less than 1")
            }
            Self::NodeRangeInverted { min_nodes, max_nodes } => write!(
                f,
                "maximum number of nodes must not be less than the minimum number of nodes \
                 (min {min_nodes}, max {max_nodes})"
            ),
            Self::ConnectionRangeInverted { min_connection, max_connection } => write!(
                f,
                "maximum number of connections per node must not be less than the minimum \
                 number of connections per node (min {min_connection}, max {max_connection})"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Describes why a configuration file could not be read.
#[derive(Debug)]
pub enum ConfigLoadError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// The file is not valid TOML or has fields of the wrong type.
    Parse(String),
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "configuration I/O error: {e}"),
            Self::Parse(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(_) => None,
        }
    }
}

impl Configuration {
    /// Checks every constraint in a fixed order and reports the first one broken.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 1 {
            return Err(ConfigError::TooFewColumns);
        }
        if self.min_nodes < 1 {
            return Err(ConfigError::TooFewNodes);
        }
        if self.min_connection < 1 {
            return Err(ConfigError::TooFewConnections);
        }
        if self.max_nodes < self.min_nodes {
            return Err(ConfigError::NodeRangeInverted {
                min_nodes: self.min_nodes,
                max_nodes: self.max_nodes,
            });
        }
        if self.max_connection < self.min_connection {
            return Err(ConfigError::ConnectionRangeInverted {
                min_connection: self.min_connection,
                max_connection: self.max_connection,
            });
        }
        Ok(())
    }

    /// Adjacent columns must differ in size only when the node range leaves
    /// room for at least three distinct counts.
    pub fn nodes_must_differ(&self) -> bool {
        self.max_nodes.saturating_sub(self.min_nodes) > 1
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigLoadError> {
        toml::from_str(contents).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(ConfigLoadError::Io)?;
        Self::from_toml_str(&contents)
    }
}
