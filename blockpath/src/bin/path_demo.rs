// Demo: route every preset agent across a small sample terrain.
//
// Builds a 48×32 field of stone with a shallow river running north–south
// and a stone wall further east with a single wooden door in it, then
// searches a route for each named agent profile in the config and prints
// the outcome plus a top-down map of the route.
//
// Usage:
//   path_demo [OPTIONS]
//     --config <PATH>     Load a PathfindingConfig from JSON
//     --seed <N>          Override the start-candidate seed
//     --max-nodes <N>     Override the visited-node budget
//
// Set RUST_LOG=debug to see the search driver's own logging.

use std::collections::BTreeSet;
use std::path::PathBuf;

use blockpath::{
    BlockKind, BlockPos, BlockState, DoorMaterial, Path, Pathfinder, PathfindingConfig,
    VoxelWorld,
};

const SIZE_X: i32 = 48;
const SIZE_Z: i32 = 32;
/// Top of the stone; agents on land stand at GROUND + 1.
const GROUND: i32 = 4;
const RIVER_X: std::ops::RangeInclusive<i32> = 20..=23;
const WALL_X: i32 = 34;
const DOOR_Z: i32 = 16;
const MAX_RANGE: f32 = 64.0;

struct Options {
    config: Option<PathBuf>,
    seed: Option<u64>,
    max_nodes: Option<u32>,
}

/// Where a preset starts and where it is sent.
struct Trip {
    agent: &'static str,
    start: (f64, f64, f64),
    in_water: bool,
    goal: BlockPos,
}

fn trips() -> Vec<Trip> {
    let land = (GROUND + 1) as f64;
    vec![
        Trip {
            agent: "walker",
            start: (4.5, land, 16.5),
            in_water: false,
            goal: BlockPos::new(44, GROUND + 1, 16),
        },
        Trip {
            agent: "villager",
            start: (4.5, land, 16.5),
            in_water: false,
            goal: BlockPos::new(44, GROUND + 1, 16),
        },
        Trip {
            agent: "flyer",
            start: (4.5, land, 16.5),
            in_water: false,
            goal: BlockPos::new(44, GROUND + 1, 16),
        },
        Trip {
            agent: "swimmer",
            start: (21.5, GROUND as f64, 2.5),
            in_water: true,
            goal: BlockPos::new(21, GROUND, 28),
        },
        Trip {
            agent: "amphibian",
            start: (14.5, land, 8.5),
            in_water: false,
            goal: BlockPos::new(28, GROUND + 1, 24),
        },
    ]
}

fn main() {
    env_logger::init();
    let options = parse_args();

    let mut config = match &options.config {
        Some(path) => PathfindingConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        }),
        None => PathfindingConfig::default(),
    };
    if let Some(seed) = options.seed {
        config.rng_seed = seed;
    }
    if let Some(max_nodes) = options.max_nodes {
        config.max_visited_nodes = max_nodes;
    }
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let world = build_terrain();
    for trip in trips() {
        let Some(profile) = config.agent(trip.agent) else {
            println!("{}: no such profile in config, skipped", trip.agent);
            continue;
        };
        let (x, y, z) = trip.start;
        let mut agent = profile.spawn(x, y, z).with_in_water(trip.in_water);
        let mut finder = Pathfinder::from_config(&config, profile.locomotion);
        let targets = BTreeSet::from([trip.goal]);
        let path = finder.find_path(
            &world,
            &mut agent,
            &targets,
            MAX_RANGE,
            config.default_accuracy,
            config.search_depth_multiplier,
        );

        println!("== {} ({:?})", trip.agent, profile.locomotion);
        match path {
            Some(path) => {
                let outcome = if path.reached() { "reached" } else { "partial" };
                let visited = finder.last_stats().map_or(0, |s| s.visited);
                println!(
                    "{outcome}: {} nodes, {visited} visited, {} from goal",
                    path.node_count(),
                    path.dist_to_target()
                );
                print_map(&world, &path, trip.goal);
            }
            None => println!("no start position"),
        }
        println!();
    }
}

/// Stone field, a one-block-deep river, and a wall with a closed wooden
/// door.
fn build_terrain() -> VoxelWorld {
    let mut world = VoxelWorld::new(BlockPos::new(0, 0, 0), SIZE_X as u32, 24, SIZE_Z as u32)
        .with_sea_level(GROUND);
    world.fill(
        BlockPos::new(0, 0, 0),
        BlockPos::new(SIZE_X - 1, GROUND, SIZE_Z - 1),
        BlockState::SOLID,
    );
    world.fill(
        BlockPos::new(*RIVER_X.start(), GROUND, 0),
        BlockPos::new(*RIVER_X.end(), GROUND, SIZE_Z - 1),
        BlockState::WATER,
    );
    world.fill(
        BlockPos::new(WALL_X, GROUND + 1, 0),
        BlockPos::new(WALL_X, GROUND + 3, SIZE_Z - 1),
        BlockState::SOLID,
    );
    let door = BlockState::of(BlockKind::Door {
        material: DoorMaterial::Wood,
        open: false,
    });
    world.set(BlockPos::new(WALL_X, GROUND + 1, DOOR_Z), door);
    world.set(BlockPos::new(WALL_X, GROUND + 2, DOOR_Z), door);
    world
}

/// Top-down view: `#` wall, `D` door, `~` water, `*` route, `S` start,
/// `G` goal.
fn print_map(world: &VoxelWorld, path: &Path, goal: BlockPos) {
    let route: BTreeSet<(i32, i32)> = path.nodes().iter().map(|p| (p.x, p.z)).collect();
    let start = path.node_at(0).map(|p| (p.x, p.z));
    for z in 0..SIZE_Z {
        let row: String = (0..SIZE_X)
            .map(|x| {
                if Some((x, z)) == start {
                    'S'
                } else if (x, z) == (goal.x, goal.z) {
                    'G'
                } else if route.contains(&(x, z)) {
                    '*'
                } else {
                    let wall = world.get(BlockPos::new(x, GROUND + 1, z));
                    let floor = world.get(BlockPos::new(x, GROUND, z));
                    match wall.block {
                        BlockKind::Door { .. } => 'D',
                        BlockKind::Solid => '#',
                        _ if floor.is_water() => '~',
                        _ => '.',
                    }
                }
            })
            .collect();
        println!("{row}");
    }
}

/// Parse command-line arguments. Plain `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options {
        config: None,
        seed: None,
        max_nodes: None,
    };
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--seed" => {
                i += 1;
                options.seed =
                    Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--seed requires a valid number");
                        std::process::exit(1);
                    }));
            }
            "--max-nodes" => {
                i += 1;
                options.max_nodes =
                    Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--max-nodes requires a valid number");
                        std::process::exit(1);
                    }));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_usage() {
    println!("Usage: path_demo [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>     Load a PathfindingConfig from JSON");
    println!("  --seed <N>          Override the start-candidate seed");
    println!("  --max-nodes <N>     Override the visited-node budget");
    println!("  --help, -h          Show this help");
}
