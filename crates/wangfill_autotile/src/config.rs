//! Resolver configuration
//!
//! Read from TOML; every field is optional:
//!
//! ```toml
//! seed = 1234
//! corner_rule = "majority"
//! match_policy = "most_specific"
//! boundary = 1
//! ```

use crate::surroundings::CornerRule;
use crate::wang::MatchPolicy;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from reading a resolver configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Global seed for whole-grid resolution
    pub seed: u64,
    pub corner_rule: CornerRule,
    pub match_policy: MatchPolicy,
    /// Replaces the grid's own boundary terrain when set (0 = wildcard)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<u8>,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading resolver config '{}'...", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_corner_rule(mut self, corner_rule: CornerRule) -> Self {
        self.corner_rule = corner_rule;
        self
    }

    pub fn with_match_policy(mut self, match_policy: MatchPolicy) -> Self {
        self.match_policy = match_policy;
        self
    }

    pub fn with_boundary(mut self, boundary: u8) -> Self {
        self.boundary = Some(boundary);
        self
    }
}
