//! Candidate strategies
//!
//! Strategy lists are JSON objects mapping a strategy name to the path of its
//! zapret config, e.g. `{ "fake-split": "/opt/zapret/presets/fake-split" }`.
//! Document order is the order strategies are tested in.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A named DPI-circumvention configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    /// Display name
    pub name: String,
    /// Config file copied over the live config when applied
    pub config_path: PathBuf,
}

impl Strategy {
    /// Create a strategy
    pub fn new(name: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            config_path: config_path.into(),
        }
    }
}

/// Ordered set of strategies under test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategySet {
    strategies: Vec<Strategy>,
}

impl StrategySet {
    /// Parse a JSON strategy object. `origin` is only used in errors.
    pub fn from_json(content: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let map: IndexMap<String, PathBuf> = serde_json::from_str(content)
            .map_err(|e| Error::fatal_input(origin.as_ref(), e.to_string()))?;

        if map.is_empty() {
            return Err(Error::fatal_input(origin, "strategy list is empty"));
        }

        Ok(map.into_iter().map(|(name, path)| Strategy::new(name, path)).collect())
    }

    /// Load a strategy list file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::fatal_input(path, e.to_string()))?;
        Self::from_json(&content, path)
    }

    /// Look a strategy up by name
    pub fn get(&self, name: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.name == name)
    }

    /// Number of strategies
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Iterate in test order
    pub fn iter(&self) -> std::slice::Iter<'_, Strategy> {
        self.strategies.iter()
    }
}

impl FromIterator<Strategy> for StrategySet {
    fn from_iter<I: IntoIterator<Item = Strategy>>(iter: I) -> Self {
        Self {
            strategies: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StrategySet {
    type Item = &'a Strategy;
    type IntoIter = std::slice::Iter<'a, Strategy>;

    fn into_iter(self) -> Self::IntoIter {
        self.strategies.iter()
    }
}
