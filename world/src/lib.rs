#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Forbidden Rules.

mod mover;
mod navigation;
mod tiles;

use forbidden_rules_core::{
    Command, Event, PixelDelta, PixelPoint, PixelRect, DEFAULT_TILE_SIZE, HITBOX_SIZE,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub use mover::slide;
pub use navigation::{shortest_path, PathPlanner};
pub use tiles::{LevelConfig, MapError, TileMap};

/// Placement and size of the agents inhabiting a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    /// Edge length of the square hitbox shared by both agents.
    pub hitbox_size: i32,
    /// Upper-left pixel the pursuer spawns at.
    pub pursuer_spawn: PixelPoint,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hitbox_size: HITBOX_SIZE,
            pursuer_spawn: PixelPoint::new(DEFAULT_TILE_SIZE * 15, DEFAULT_TILE_SIZE * 3),
        }
    }
}

/// Complete description of a world to generate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldConfig {
    /// Level generation parameters.
    pub level: LevelConfig,
    /// Agent placement parameters.
    pub agents: AgentConfig,
}

/// Represents the authoritative Forbidden Rules world state.
#[derive(Clone, Debug)]
pub struct World {
    seed: Option<u64>,
    map: TileMap,
    player: Agent,
    pursuer: Agent,
    tick_index: u64,
}

impl World {
    /// Generates a new level and places both agents at their spawn points.
    ///
    /// The same seed always produces the same level. Without a seed one is
    /// drawn from the thread-local generator and logged so the level can be
    /// reproduced.
    pub fn new(config: &WorldConfig, seed: Option<u64>) -> Result<Self, MapError> {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        debug!(seed, "generating level");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = TileMap::generate(&config.level, &mut rng)?;
        let mut world = Self::from_map(map, &config.agents);
        world.seed = Some(seed);
        Ok(world)
    }

    /// Builds a world around an existing level.
    ///
    /// The player spawns on the upper-left pixel of the level's start tile.
    #[must_use]
    pub fn from_map(map: TileMap, agents: &AgentConfig) -> Self {
        let start = map.tile_rect(map.start()).origin();
        Self {
            seed: None,
            player: Agent::spawned_at(start, agents.hitbox_size),
            pursuer: Agent::spawned_at(agents.pursuer_spawn, agents.hitbox_size),
            map,
            tick_index: 0,
        }
    }

    fn move_player(&mut self, delta: PixelDelta, out_events: &mut Vec<Event>) {
        let from = self.player.hitbox.origin();
        slide(&mut self.player.hitbox, delta, &self.map);
        let to = self.player.hitbox.origin();

        if to == from {
            out_events.push(Event::PlayerStalled { at: to });
        } else {
            out_events.push(Event::PlayerMoved { from, to });
        }

        if let Some(tile) = self.map.try_pickup(&self.player.hitbox) {
            debug!(column = tile.column(), row = tile.row(), "item picked");
            out_events.push(Event::ItemPicked { tile });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::MovePlayer { delta } => world.move_player(delta, out_events),
        Command::StepPursuer { delta } => {
            slide(&mut world.pursuer.hitbox, delta, &world.map);
            out_events.push(Event::PursuerStepped {
                hitbox: world.pursuer.hitbox,
            });
        }
        Command::ResetRun => {
            world.map.reset_items();
            world.player.respawn();
            world.pursuer.respawn();
            debug!(tick = world.tick_index, "run reset");
            out_events.push(Event::RunReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use forbidden_rules_core::PixelRect;

    use super::{TileMap, World};

    /// Seed the level was generated from, if it was generated.
    #[must_use]
    pub fn seed(world: &World) -> Option<u64> {
        world.seed
    }

    /// Provides read-only access to the level.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.map
    }

    /// Current player hitbox.
    #[must_use]
    pub fn player_hitbox(world: &World) -> PixelRect {
        world.player.hitbox
    }

    /// Current pursuer hitbox.
    #[must_use]
    pub fn pursuer_hitbox(world: &World) -> PixelRect {
        world.pursuer.hitbox
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the player's center stands on a hazard tile.
    #[must_use]
    pub fn player_on_hazard(world: &World) -> bool {
        world.map.is_hazard(&world.player.hitbox)
    }

    /// Reports whether the player overlaps the exit tile.
    #[must_use]
    pub fn player_touches_exit(world: &World) -> bool {
        world.map.touches_exit(&world.player.hitbox)
    }

    /// Reports whether the pursuer's hitbox overlaps the player's.
    #[must_use]
    pub fn pursuer_contact(world: &World) -> bool {
        world.player.hitbox.intersects(&world.pursuer.hitbox)
    }
}

#[derive(Clone, Copy, Debug)]
struct Agent {
    spawn: PixelPoint,
    hitbox: PixelRect,
}

impl Agent {
    fn spawned_at(spawn: PixelPoint, size: i32) -> Self {
        Self {
            spawn,
            hitbox: PixelRect::square(spawn, size),
        }
    }

    fn respawn(&mut self) {
        self.hitbox = self.hitbox.at(self.spawn);
    }
}
