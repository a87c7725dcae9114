//! Headless navigation benchmark.
//!
//! Generates a seeded random battlefield, then times A* searches, path
//! smoothing, a flow-field build and a crowd of agents steering along it.

use bevy::log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kestrel::nav::fixed_math::{FixedNum, FixedVec2};
use kestrel::nav::{
    build_flow_field, find_path_with_stats, smooth, steer_along_flow_with, MovementClass, NavConfig,
    NavGrid, Neighbor, Point, TerrainCell, TerrainKind, TerrainMap, DEFAULT_CONFIG_PATH,
};

const SEED: u64 = 42;
const MAP_SIZE: usize = 256;
const SEARCHES: usize = 200;
const AGENTS: usize = 500;
const TICKS: usize = 60;
const TICK_RATE: f32 = 30.0;

fn setup_file_logging() -> String {
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {e}");
        }
    }

    // Keep only the newest 25 runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("kestrel_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kestrel=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("kestrel") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Scatter terrain patches, a road with a bridge over a river, and buildings.
fn generate_terrain(rng: &mut StdRng) -> TerrainMap {
    let mut terrain = TerrainMap::filled(MAP_SIZE, MAP_SIZE, TerrainKind::Grass);
    let patch_kinds = [
        TerrainKind::Forest,
        TerrainKind::Rock,
        TerrainKind::Sand,
        TerrainKind::Water,
        TerrainKind::Cliff,
    ];

    for _ in 0..120 {
        let kind = patch_kinds[rng.random_range(0..patch_kinds.len())];
        let cx = rng.random_range(0..MAP_SIZE) as i32;
        let cy = rng.random_range(0..MAP_SIZE) as i32;
        let radius = rng.random_range(2..10) as i32;
        for y in (cy - radius)..=(cy + radius) {
            for x in (cx - radius)..=(cx + radius) {
                if (x - cx).pow(2) + (y - cy).pow(2) <= radius * radius && x >= 0 && y >= 0 {
                    terrain.set(x as usize, y as usize, TerrainCell::new(kind));
                }
            }
        }
    }

    let river_x = MAP_SIZE / 3;
    let road_y = MAP_SIZE / 2;
    for y in 0..MAP_SIZE {
        for dx in 0..3 {
            terrain.set(river_x + dx, y, TerrainCell::new(TerrainKind::DeepWater));
        }
    }
    for x in 0..MAP_SIZE {
        let kind = if (river_x..river_x + 3).contains(&x) {
            TerrainKind::Bridge
        } else {
            TerrainKind::Road
        };
        terrain.set(x, road_y, TerrainCell::new(kind));
    }

    for _ in 0..200 {
        let x = rng.random_range(0..MAP_SIZE);
        let y = rng.random_range(0..MAP_SIZE);
        if let Some(cell) = terrain.get(x, y).copied() {
            terrain.set(x, y, TerrainCell { occupied: true, ..cell });
        }
    }

    terrain
}

fn random_passable(rng: &mut StdRng, grid: &NavGrid, class: MovementClass) -> Option<Point> {
    (0..100).find_map(|_| {
        let p = Point::new(
            rng.random_range(0..grid.width()) as i32,
            rng.random_range(0..grid.height()) as i32,
        );
        grid.passable_at(p, class.mask()).then_some(p)
    })
}

fn bench_searches(rng: &mut StdRng, grid: &NavGrid, config: &NavConfig) {
    let search_config = config.search();
    let mut found = 0usize;
    let mut expanded = 0usize;
    let mut raw_points = 0usize;
    let mut smooth_points = 0usize;
    let mut search_time = Duration::ZERO;
    let mut smooth_time = Duration::ZERO;

    for _ in 0..SEARCHES {
        let class = MovementClass::ALL[rng.random_range(0..MovementClass::ALL.len())];
        let (Some(start), Some(goal)) = (random_passable(rng, grid, class), random_passable(rng, grid, class)) else {
            continue;
        };

        let t = Instant::now();
        let result = find_path_with_stats(grid, start, goal, class.mask(), &search_config);
        search_time += t.elapsed();

        let Some(search) = result else {
            continue;
        };
        found += 1;
        expanded += search.expanded;
        raw_points += search.path.len();

        let t = Instant::now();
        let smoothed = smooth(grid, &search.path, class);
        smooth_time += t.elapsed();
        smooth_points += smoothed.len();
    }

    info!(
        "A*: {}/{} paths found, avg {:?}/search, {} expansions total",
        found, SEARCHES, search_time / SEARCHES as u32, expanded
    );
    if found > 0 {
        info!(
            "Smoothing: {} -> {} waypoints, avg {:?}/path",
            raw_points, smooth_points, smooth_time / found as u32
        );
    } else {
        warn!("No path found in {} searches, check terrain generation", SEARCHES);
    }
}

fn bench_crowd(rng: &mut StdRng, grid: &NavGrid, config: &NavConfig) {
    let class = MovementClass::Infantry;
    let goal = Point::new(MAP_SIZE as i32 / 2, MAP_SIZE as i32 / 2 + 4);

    let t = Instant::now();
    let field = build_flow_field(grid, goal, class);
    info!("Flow field to {:?} built in {:?}", goal, t.elapsed());

    let steering = config.steering();
    let max_speed = FixedNum::from_num(4.0);
    let radius = FixedNum::from_num(0.4);
    let dt = FixedNum::from_num(1.0 / TICK_RATE);

    let mut positions: Vec<FixedVec2> = (0..AGENTS)
        .filter_map(|_| random_passable(rng, grid, class).map(|p| p.center()))
        .collect();

    let t = Instant::now();
    for _ in 0..TICKS {
        let snapshot = positions.clone();
        for (i, pos) in positions.iter_mut().enumerate() {
            let neighbors: Vec<Neighbor> = snapshot
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && (**other - *pos).length_squared() < FixedNum::from_num(4))
                .map(|(_, other)| Neighbor::new(*other, radius))
                .collect();
            let velocity = steer_along_flow_with(&steering, *pos, max_speed, &field, &neighbors);
            *pos = *pos + velocity * dt;
        }
    }
    let elapsed = t.elapsed();

    let remaining_cost: FixedNum = positions
        .iter()
        .filter_map(|p| grid.world_to_cell(*p))
        .filter(|c| field.is_reachable(c.x, c.y))
        .map(|c| field.cost_to_goal(c.x, c.y))
        .fold(FixedNum::ZERO, |acc, c| acc + c);
    info!(
        "Steering: {} agents x {} ticks in {:?}, remaining summed cost-to-goal {}",
        positions.len(), TICKS, elapsed, remaining_cost
    );
}

fn main() {
    let log_file = setup_file_logging();
    info!("Kestrel navigation benchmark, logging to {}", log_file);

    let config = NavConfig::load_or_default(DEFAULT_CONFIG_PATH);
    let mut rng = StdRng::seed_from_u64(SEED);

    let t = Instant::now();
    let terrain = generate_terrain(&mut rng);
    let grid = NavGrid::build(&terrain);
    info!("Built {}x{} nav grid in {:?}", grid.width(), grid.height(), t.elapsed());

    bench_searches(&mut rng, &grid, &config);
    bench_crowd(&mut rng, &grid, &config);
}
