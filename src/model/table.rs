use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the distinguished bias entry.
pub const INTERCEPT: &str = "Intercept";

/// Feature-name to weight mapping, including the `Intercept` entry.
///
/// Entries keep the order they were loaded in so a table re-serializes
/// exactly as it was read. Built once and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientTable {
    entries: IndexMap<String, f64>,
}

impl CoefficientTable {
    /// The table substituted when no usable artifact exists.
    pub fn fallback() -> Self {
        [(INTERCEPT.to_string(), 0.0), ("Fallback".to_string(), 1.0)]
            .into_iter()
            .collect()
    }

    /// Intercept weight, 0 when the table has none
    pub fn intercept(&self) -> f64 {
        self.entries.get(INTERCEPT).copied().unwrap_or(0.0)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    /// Weights other than the intercept
    pub fn weights(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(name, _)| *name != INTERCEPT)
    }
}

/// Later duplicates overwrite earlier weights but keep the first position.
impl FromIterator<(String, f64)> for CoefficientTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
