//! Grid navigation: terrain-derived nav grid, A* with path smoothing, flow
//! fields for group moves, and local steering.
//!
//! Every entry point is a synchronous, single-threaded computation. Searches
//! and flow-field builds only borrow the [`NavGrid`]; the caller owns when the
//! grid is mutated and when results go stale.

pub mod fixed_math;

mod astar;
mod config;
mod flow_field;
mod grid;
mod movement;
mod smoothing;
mod steering;
mod terrain;
mod types;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use astar::{find_path, find_path_with_stats, PathSearch};
pub use config::{NavConfig, SearchConfig, DEFAULT_CONFIG_PATH};
pub use flow_field::{build_flow_field, FlowField};
pub use grid::{NavGrid, NEIGHBOR_OFFSETS};
pub use movement::{MovementClass, Passability};
pub use smoothing::{has_line_of_sight, smooth};
pub use steering::{
    separation_force, steer, steer_along_flow, steer_along_flow_with, steer_with, Neighbor,
    SteeringConfig,
};
pub use terrain::{TerrainCell, TerrainKind, TerrainMap, TerrainProfile};
pub use types::{Path, Point};

use bevy::prelude::*;

/// Loads [`NavConfig`] at startup and provides an empty [`NavGrid`] resource for
/// the map owner to rebuild once terrain is available.
pub struct NavigationPlugin {
    pub config_path: String,
}

impl Default for NavigationPlugin {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG_PATH.to_string(),
        }
    }
}

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        let config_path = self.config_path.clone();
        app.init_resource::<NavGrid>()
            .add_systems(Startup, move |mut commands: Commands| {
                load_nav_config(&mut commands, &config_path);
            });
    }
}

/// Load navigation config synchronously; steering must not run before it exists.
fn load_nav_config(commands: &mut Commands, path: &str) {
    commands.insert_resource(NavConfig::load_or_default(path));
}
