use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::fixed_math::FixedNum;
use super::steering::SteeringConfig;

/// Default location of the navigation config file.
pub const DEFAULT_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Navigation tuning loaded from RON.
///
/// Values are floats so the file stays human-readable; they are converted to
/// [`FixedNum`] once, through [`NavConfig::steering`], before any simulation
/// code sees them. Missing fields fall back to their defaults.
///
/// **IMPORTANT:** in multiplayer every client must load identical values before
/// the match starts, or steering results will diverge.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    // Steering
    pub arrival_threshold: f32,
    pub min_neighbor_distance: f32,
    pub personal_space: f32,
    pub separation_scale: f32,

    // Search diagnostics
    pub slow_search_expansions: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 0.01,
            min_neighbor_distance: 0.001,
            personal_space: 0.5,
            separation_scale: 0.5,
            slow_search_expansions: 10_000,
        }
    }
}

impl NavConfig {
    pub fn from_ron(source: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Read `path`, falling back to defaults (and logging why) on any failure.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded navigation config from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to load navigation config {}: {}", path, e);
                error!("Using default NavConfig");
                Self::default()
            }
        }
    }

    pub fn steering(&self) -> SteeringConfig {
        SteeringConfig {
            arrival_threshold: FixedNum::from_num(self.arrival_threshold),
            min_neighbor_distance: FixedNum::from_num(self.min_neighbor_distance),
            personal_space: FixedNum::from_num(self.personal_space),
            separation_scale: FixedNum::from_num(self.separation_scale),
        }
    }

    pub fn search(&self) -> SearchConfig {
        SearchConfig {
            slow_search_expansions: self.slow_search_expansions,
        }
    }
}

/// Diagnostics thresholds for A*. Searches are never cut short.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Expansion count above which a finished search is logged at `warn`.
    pub slow_search_expansions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        NavConfig::default().search()
    }
}
