// blockpath — A*-family pathfinding over block-structured 3D worlds.
//
// The engine finds routes for agents of different sizes and locomotion
// modes (walking, flying, swimming, amphibious) through a world made of
// unit cells. It classifies each cell into a `PathType`, prices it with the
// agent's malus table, and runs a multi-target A* with an inflated
// heuristic, a visited-node budget and a distance budget. The world itself
// is a collaborator behind the `BlockView` trait; `VoxelWorld` is a dense
// in-memory implementation for tests, demos and benches.
//
// Module overview:
// - `types.rs`:      BlockPos, Direction, Aabb.
// - `block.rs`:      BlockKind / Fluid / BlockState — what a cell contains.
// - `path_type.rs`:  PathType classifications and their default malus.
// - `classify.rs`:   Raw and refined single-cell classification.
// - `cache.rs`:      Fixed-size direct-mapped cache of raw classifications.
// - `world.rs`:      BlockView trait, collision probe, VoxelWorld.
// - `agent.rs`:      AgentProfile presets, Capabilities, live Agent + malus table.
// - `config.rs`:     PathfindingConfig — all tunables, loaded from JSON.
// - `node.rs`:       Node arena (NodePool, NodeId) and search targets.
// - `open_set.rs`:   Indexed binary heap with remove and change-cost.
// - `evaluator/`:    Locomotion models (ground, flying, swimming, amphibious).
// - `pathfinder.rs`: The search driver.
// - `path.rs`:       The resulting Path with its follower cursor.
// - `prng`:          Re-exported from `blockpath_prng` — seeded PRNG for
//                    start-candidate sampling.
//
// **Critical constraint: determinism.** A search is a pure function of the
// world, the agent, the targets and the config. Randomness comes only from
// the seeded PRNG, ordered collections are `BTreeMap`/`BTreeSet`, and the
// hash maps used inside a search are never iterated.

pub mod agent;
pub mod block;
pub mod cache;
pub mod classify;
pub mod config;
pub mod evaluator;
pub mod node;
pub mod open_set;
pub mod path;
pub mod path_type;
pub mod pathfinder;
pub use blockpath_prng as prng;
pub mod types;
pub mod world;

pub use agent::{Agent, AgentProfile, Capabilities, Locomotion};
pub use block::{BlockKind, BlockState, DoorMaterial, Fluid};
pub use config::{ConfigError, PathfindingConfig};
pub use path::Path;
pub use path_type::PathType;
pub use pathfinder::{Pathfinder, SearchStats};
pub use types::{Aabb, BlockPos, Direction};
pub use world::{BlockView, VoxelWorld};
