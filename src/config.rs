//! Engine configuration
//!
//! Thresholds and safety limits for resolution runs. Loaded from YAML and
//! overridable from the environment.
//!
//! Path resolution order for [`EngineConfig::from_env`]:
//! 1. `OWNERSHIP_CONFIG` environment variable (explicit file)
//! 2. `config/engine.yaml` relative to the working directory
//! 3. Built-in defaults
//!
//! Individual values may then be overridden with `OWNERSHIP_DISPLAY_THRESHOLD`,
//! `OWNERSHIP_MIN_BRANCH` and `OWNERSHIP_MAX_NODE_VISITS`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OwnershipError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/engine.yaml";

/// How traversal paths are grouped into one aggregated result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKey {
    /// One result per company id
    #[default]
    Id,
    /// One result per display name; distinct companies sharing a name collapse
    Name,
}

/// Thresholds and limits used by the query engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Display cutoff for subsidiary and equity views (percent)
    pub display_threshold_pct: f64,
    /// Branches whose cumulative ownership falls below this are not expanded
    pub min_branch_pct: f64,
    /// Minimum holding for an upward (owned-by) edge
    pub parent_floor_pct: f64,
    /// Minimum holding for a shareholder or parent to count as a related party
    pub stakeholder_threshold_pct: f64,
    /// Aggregated equity at which an indirect subsidiary counts as controlled
    pub indirect_control_pct: f64,
    /// Hard cap on queue expansions per traversal
    pub max_node_visits: usize,
    pub grouping: GroupingKey,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            display_threshold_pct: 15.0,
            min_branch_pct: 1.0,
            parent_floor_pct: 50.0,
            stakeholder_threshold_pct: 10.0,
            indirect_control_pct: 50.0,
            max_node_visits: 100_000,
            grouping: GroupingKey::Id,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading engine configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Resolve configuration from the environment (see module docs)
    pub fn from_env() -> Result<Self> {
        let mut config = if let Ok(path) = std::env::var("OWNERSHIP_CONFIG") {
            Self::from_file(path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        if let Some(v) = env_parse::<f64>("OWNERSHIP_DISPLAY_THRESHOLD") {
            config.display_threshold_pct = v;
        }
        if let Some(v) = env_parse::<f64>("OWNERSHIP_MIN_BRANCH") {
            config.min_branch_pct = v;
        }
        if let Some(v) = env_parse::<usize>("OWNERSHIP_MAX_NODE_VISITS") {
            config.max_node_visits = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject percentages outside [0, 100] and a zero visit cap
    pub fn validate(&self) -> Result<()> {
        let pcts = [
            ("display_threshold_pct", self.display_threshold_pct),
            ("min_branch_pct", self.min_branch_pct),
            ("parent_floor_pct", self.parent_floor_pct),
            ("stakeholder_threshold_pct", self.stakeholder_threshold_pct),
            ("indirect_control_pct", self.indirect_control_pct),
        ];
        for (name, value) in pcts {
            if !(0.0..=100.0).contains(&value) {
                return Err(OwnershipError::Config(format!(
                    "{} must be within [0, 100], got {}",
                    name, value
                )));
            }
        }
        if self.max_node_visits == 0 {
            return Err(OwnershipError::Config(
                "max_node_visits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_display_threshold(mut self, pct: f64) -> Self {
        self.display_threshold_pct = pct;
        self
    }

    pub fn with_max_node_visits(mut self, cap: usize) -> Self {
        self.max_node_visits = cap;
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingKey) -> Self {
        self.grouping = grouping;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
