// Data-driven pathfinding configuration.
//
// Every tunable parameter of the engine lives in `PathfindingConfig`, loaded
// from JSON: the visited-node budget, default range and accuracy, the extra
// penalties the flying, swimming and amphibious evaluators add on top of
// the agent's malus table, and the seed for start-candidate sampling. The
// config also carries a table of named `AgentProfile`s so callers (and the
// demo binary) can spawn agents by name.
//
// The heuristic fudge factor is deliberately not here; it is a constant of
// the search (see `pathfinder.rs`).
//
// See also: `agent.rs` for `AgentProfile` and its presets,
// `pathfinder.rs` for `Pathfinder::from_config` and `find_path_to`.
//
// **Determinism.** Two searches with equal configs, worlds and agents
// produce equal paths; nothing here reads the clock or OS entropy.

use crate::agent::AgentProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its valid range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// All tunable engine parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Base budget of nodes a search may close before giving up.
    pub max_visited_nodes: u32,
    /// Scales `max_visited_nodes` for searches that don't pass their own.
    pub search_depth_multiplier: f32,
    /// Maximum straight-line distance from the start a search expands to.
    pub default_max_range: f32,
    /// Manhattan distance at which a target counts as reached.
    pub default_accuracy: i32,
    /// Extra cost for a swimmer entering a dry air cell at the surface.
    pub swim_breach_penalty: f32,
    /// Extra cost for a flyer entering a cell with ground under it.
    pub fly_walkable_penalty: f32,
    /// Amphibious malus overrides, applied for the duration of a search.
    pub amphibious_walkable_malus: f32,
    pub amphibious_water_border_malus: f32,
    /// Water within this many blocks of sea level counts as shallow.
    pub amphibious_shallow_depth: i32,
    /// Random cells tried when a large flyer or swimmer has no valid start.
    pub start_candidate_samples: u32,
    pub rng_seed: u64,
    /// Named agent presets.
    pub agents: BTreeMap<String, AgentProfile>,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        let agents = BTreeMap::from([
            ("walker".to_string(), AgentProfile::walker()),
            ("villager".to_string(), AgentProfile::villager()),
            ("flyer".to_string(), AgentProfile::flyer()),
            ("swimmer".to_string(), AgentProfile::swimmer()),
            ("amphibian".to_string(), AgentProfile::amphibian()),
        ]);
        Self {
            max_visited_nodes: 400,
            search_depth_multiplier: 1.0,
            default_max_range: 32.0,
            default_accuracy: 1,
            swim_breach_penalty: 8.0,
            fly_walkable_penalty: 1.0,
            amphibious_walkable_malus: 6.0,
            amphibious_water_border_malus: 4.0,
            amphibious_shallow_depth: 10,
            start_candidate_samples: 10,
            rng_seed: 0x5eed_b10c,
            agents,
        }
    }
}

impl PathfindingConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!(
            "loaded pathfinding config from {} ({} agent profiles)",
            path.display(),
            config.agents.len()
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Visited-node budget for a search with the given multiplier.
    pub fn visited_budget(&self, multiplier: f32) -> u32 {
        visited_budget(self.max_visited_nodes, multiplier)
    }

    pub fn agent(&self, name: &str) -> Option<&AgentProfile> {
        self.agents.get(name)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.max_visited_nodes == 0 {
            return invalid("max_visited_nodes must be at least 1".into());
        }
        if !(self.search_depth_multiplier.is_finite() && self.search_depth_multiplier > 0.0) {
            return invalid(format!(
                "search_depth_multiplier must be positive, got {}",
                self.search_depth_multiplier
            ));
        }
        if !(self.default_max_range.is_finite() && self.default_max_range > 0.0) {
            return invalid(format!(
                "default_max_range must be positive, got {}",
                self.default_max_range
            ));
        }
        if self.default_accuracy < 0 {
            return invalid(format!(
                "default_accuracy must be non-negative, got {}",
                self.default_accuracy
            ));
        }
        let penalties = [
            ("swim_breach_penalty", self.swim_breach_penalty),
            ("fly_walkable_penalty", self.fly_walkable_penalty),
            ("amphibious_walkable_malus", self.amphibious_walkable_malus),
            (
                "amphibious_water_border_malus",
                self.amphibious_water_border_malus,
            ),
        ];
        for (name, value) in penalties {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{name} must be non-negative, got {value}"));
            }
        }
        if self.amphibious_shallow_depth < 0 {
            return invalid(format!(
                "amphibious_shallow_depth must be non-negative, got {}",
                self.amphibious_shallow_depth
            ));
        }
        if self.start_candidate_samples == 0 {
            return invalid("start_candidate_samples must be at least 1".into());
        }
        for (name, profile) in &self.agents {
            profile
                .validate()
                .map_err(|msg| ConfigError::Invalid(format!("agent '{name}': {msg}")))?;
        }
        Ok(())
    }
}

/// Nodes a search may visit: the base budget scaled by the search's depth
/// multiplier, truncated.
pub fn visited_budget(max_visited_nodes: u32, multiplier: f32) -> u32 {
    (max_visited_nodes as f32 * multiplier) as u32
}
