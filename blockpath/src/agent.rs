// Agent model — who is asking for a path.
//
// The engine treats an agent as a bounding box plus a bundle of movement
// capabilities plus a malus table (one cost penalty per `PathType`). All
// behavioral differences between agents (a villager that opens doors, a
// bird that avoids water, a fish that surfaces to breathe) are data in
// `AgentProfile`, not code branches; the evaluators read the profile's
// capabilities and the agent's malus table at search time.
//
// `AgentProfile` is the serializable description kept in the config.
// `Agent` is a live instance: a profile placed in the world at a concrete
// position, with a mutable malus table. The amphibious evaluator rewrites a
// few malus entries for the duration of a search and restores them in
// `done()`, which is why the table lives on the agent and not the profile.
//
// See also: `config.rs` for the named profile table, `path_type.rs` for the
// default malus values, `evaluator/mod.rs` for the prepare/done pairing.

use crate::path_type::PathType;
use crate::types::{Aabb, BlockPos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an agent moves, selecting the node evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locomotion {
    Ground,
    Flying,
    /// Water-bound movement. With `allow_breaching`, the agent may also
    /// enter air cells at the surface.
    Swimming { allow_breaching: bool },
    Amphibious,
}

/// Movement capabilities that shape the neighbor rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Height the agent can step up without jumping, in blocks.
    pub max_up_step: f32,
    /// Deepest drop the agent will accept, in blocks.
    pub max_fall_distance: i32,
    /// Can open closed wooden doors.
    pub can_open_doors: bool,
    /// Can move through door cells at all. Agents that cannot treat even
    /// open doors as walls.
    pub can_pass_doors: bool,
    /// Stays on the water surface instead of sinking.
    pub can_float: bool,
    pub can_walk_over_fences: bool,
    /// Amphibious agents only: pay extra for deep water instead of for
    /// water near the surface.
    pub prefers_shallow_swimming: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            max_up_step: 0.6,
            max_fall_distance: 3,
            can_open_doors: false,
            can_pass_doors: true,
            can_float: false,
            can_walk_over_fences: false,
            prefers_shallow_swimming: false,
        }
    }
}

/// Per-type cost penalties. Negative means forbidden.
#[derive(Clone, Debug, PartialEq)]
pub struct MalusTable {
    values: [f32; PathType::COUNT],
}

impl Default for MalusTable {
    fn default() -> Self {
        let mut values = [0.0; PathType::COUNT];
        for t in PathType::ALL {
            values[t.index()] = t.default_malus();
        }
        Self { values }
    }
}

impl MalusTable {
    pub fn get(&self, t: PathType) -> f32 {
        self.values[t.index()]
    }

    pub fn set(&mut self, t: PathType, malus: f32) {
        self.values[t.index()] = malus;
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Serializable description of a kind of agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Bounding-box footprint width (X and Z), in blocks.
    pub width: f64,
    pub height: f64,
    pub locomotion: Locomotion,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Replacements for the default malus of individual path types.
    #[serde(default)]
    pub malus_overrides: BTreeMap<PathType, f32>,
}

impl AgentProfile {
    /// A plain humanoid walker that cannot open doors.
    pub fn walker() -> Self {
        Self {
            width: 0.6,
            height: 1.95,
            locomotion: Locomotion::Ground,
            capabilities: Capabilities::default(),
            malus_overrides: BTreeMap::new(),
        }
    }

    /// A walker that opens wooden doors and floats in water.
    pub fn villager() -> Self {
        Self {
            capabilities: Capabilities {
                can_open_doors: true,
                can_float: true,
                ..Capabilities::default()
            },
            ..Self::walker()
        }
    }

    /// A small flyer that keeps away from water, fire and fences.
    pub fn flyer() -> Self {
        let malus_overrides = BTreeMap::from([
            (PathType::Water, -1.0),
            (PathType::WaterBorder, 16.0),
            (PathType::DangerFire, -1.0),
            (PathType::Cocoa, -1.0),
            (PathType::Fence, -1.0),
        ]);
        Self {
            width: 0.7,
            height: 0.6,
            locomotion: Locomotion::Flying,
            capabilities: Capabilities {
                can_float: true,
                ..Capabilities::default()
            },
            malus_overrides,
        }
    }

    /// A water-bound swimmer that may surface to breathe.
    pub fn swimmer() -> Self {
        Self {
            width: 0.9,
            height: 0.6,
            locomotion: Locomotion::Swimming {
                allow_breaching: true,
            },
            capabilities: Capabilities::default(),
            malus_overrides: BTreeMap::from([(PathType::Water, 0.0)]),
        }
    }

    /// A small creature at home both in water and on land.
    pub fn amphibian() -> Self {
        Self {
            width: 0.75,
            height: 0.42,
            locomotion: Locomotion::Amphibious,
            capabilities: Capabilities {
                max_up_step: 1.0,
                ..Capabilities::default()
            },
            malus_overrides: BTreeMap::new(),
        }
    }

    /// Check that the profile describes a physically sensible agent.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(format!("width must be positive, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(format!("height must be positive, got {}", self.height));
        }
        let caps = &self.capabilities;
        if !(caps.max_up_step.is_finite() && caps.max_up_step >= 0.0) {
            return Err(format!(
                "max_up_step must be non-negative, got {}",
                caps.max_up_step
            ));
        }
        if caps.max_fall_distance < 0 {
            return Err(format!(
                "max_fall_distance must be non-negative, got {}",
                caps.max_fall_distance
            ));
        }
        if let Some((t, malus)) = self.malus_overrides.iter().find(|(_, m)| !m.is_finite()) {
            return Err(format!("malus override for {t:?} is not finite: {malus}"));
        }
        Ok(())
    }

    /// Malus table with this profile's overrides applied.
    pub fn malus_table(&self) -> MalusTable {
        let mut table = MalusTable::default();
        for (&t, &malus) in &self.malus_overrides {
            table.set(t, malus);
        }
        table
    }

    /// Place an agent of this kind with its feet centered on `(x, y, z)`.
    pub fn spawn(&self, x: f64, y: f64, z: f64) -> Agent {
        Agent {
            bounding_box: Aabb::standing_at(x, y, z, self.width, self.height),
            on_ground: true,
            in_water: false,
            capabilities: self.capabilities.clone(),
            malus: self.malus_table(),
        }
    }
}

// ---------------------------------------------------------------------------
// Live agents
// ---------------------------------------------------------------------------

/// An agent placed in the world.
#[derive(Clone, Debug)]
pub struct Agent {
    pub bounding_box: Aabb,
    pub on_ground: bool,
    pub in_water: bool,
    pub capabilities: Capabilities,
    malus: MalusTable,
}

impl Agent {
    pub fn with_on_ground(mut self, on_ground: bool) -> Self {
        self.on_ground = on_ground;
        self
    }

    pub fn with_in_water(mut self, in_water: bool) -> Self {
        self.in_water = in_water;
        self
    }

    pub fn malus_for(&self, t: PathType) -> f32 {
        self.malus.get(t)
    }

    pub fn set_malus(&mut self, t: PathType, malus: f32) {
        self.malus.set(t, malus);
    }

    pub fn malus_table(&self) -> &MalusTable {
        &self.malus
    }

    pub fn replace_malus_table(&mut self, table: MalusTable) -> MalusTable {
        std::mem::replace(&mut self.malus, table)
    }

    /// Point at the center of the bounding box's base.
    pub fn position(&self) -> (f64, f64, f64) {
        let bb = &self.bounding_box;
        (
            (bb.min_x + bb.max_x) / 2.0,
            bb.min_y,
            (bb.min_z + bb.max_z) / 2.0,
        )
    }

    /// Cell containing `position()`.
    pub fn block_pos(&self) -> BlockPos {
        let (x, y, z) = self.position();
        BlockPos::containing(x, y, z)
    }

    pub fn bb_width(&self) -> f64 {
        self.bounding_box.x_size()
    }

    pub fn bb_height(&self) -> f64 {
        self.bounding_box.y_size()
    }

    /// Move the agent so its feet are centered on `(x, y, z)`.
    pub fn move_to(&mut self, x: f64, y: f64, z: f64) {
        let (cx, cy, cz) = self.position();
        self.bounding_box = self.bounding_box.translated(x - cx, y - cy, z - cz);
    }
}
