use crate::consts::MAX_TOTAL_LEN;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How far capacity is pushed when a setter needs more room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Capacity equals the new encoded length.
    #[default]
    Exact,
    /// Capacity at least doubles, bounded by the u32 length field.
    Amortized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub growth: GrowthPolicy,
    /// Capacity requested at creation; the minimal header size wins if larger.
    pub initial_capacity: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            growth: GrowthPolicy::Exact,
            initial_capacity: 0,
        }
    }
}

impl ContainerConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Capacity to request when the buffer must hold `needed` bytes and currently has `cap`.
    pub(crate) fn grow_to(&self, cap: usize, needed: usize) -> usize {
        match self.growth {
            GrowthPolicy::Exact => needed,
            // callers have already rejected needed > MAX_TOTAL_LEN
            GrowthPolicy::Amortized => needed.max(cap).saturating_mul(2).min(MAX_TOTAL_LEN),
        }
    }
}
