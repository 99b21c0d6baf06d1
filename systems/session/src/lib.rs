#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step orchestration of the world and its systems for one run.
//!
//! A [`Session`] owns the authoritative [`World`] together with the player,
//! pursuit and rules systems, and drives them through one tick at a time in a
//! fixed order so that identical seeds and inputs always replay identically.

use forbidden_rules_core::{Command, Event, PlayerInput, Rule, RunStatus, PLAYER_SPEED};
use forbidden_rules_system_player::PlayerControl;
use forbidden_rules_system_pursuit::{self as pursuit, Pursuit};
use forbidden_rules_system_rules::{self as rules, Observation, Rules};
use forbidden_rules_world::{self as world, query, MapError, World, WorldConfig};
use tracing::debug;

/// Complete configuration of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Level and agent placement parameters.
    pub world: WorldConfig,
    /// Pursuer movement and replanning parameters.
    pub pursuit: pursuit::Config,
    /// Lives and idle limit.
    pub rules: rules::Config,
    /// Pixels the player travels per tick.
    pub player_speed: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            pursuit: pursuit::Config::default(),
            rules: rules::Config::default(),
            player_speed: PLAYER_SPEED,
        }
    }
}

/// Outcome of a single call to [`Session::tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Run status after the tick.
    pub status: RunStatus,
    /// Rule broken during the tick, if any.
    pub broken: Option<Rule>,
    /// Every event the world emitted during the tick, in order.
    pub events: Vec<Event>,
}

/// A single run of the game: one level, one player, one pursuer.
#[derive(Debug)]
pub struct Session {
    world: World,
    player: PlayerControl,
    pursuit: Pursuit,
    rules: Rules,
}

impl Session {
    /// Generates a level from the seed and prepares every system.
    pub fn new(config: &Config, seed: Option<u64>) -> Result<Self, MapError> {
        let world = World::new(&config.world, seed)?;
        Ok(Self::with_world(world, config))
    }

    /// Prepares every system around an existing world.
    #[must_use]
    pub fn with_world(world: World, config: &Config) -> Self {
        Self {
            world,
            player: PlayerControl::new(config.player_speed),
            pursuit: Pursuit::new(config.pursuit),
            rules: Rules::new(config.rules),
        }
    }

    /// Advances the run by one fixed tick using the keys held during it.
    ///
    /// The player moves first, the pursuer then steps toward the player's new
    /// position, and the rules judge the resulting positions. A broken rule
    /// with lives left resets items and agents before the tick returns.
    /// Finished runs are left untouched.
    pub fn tick(&mut self, input: PlayerInput) -> TickReport {
        if self.rules.status().is_finished() {
            return TickReport {
                status: self.rules.status(),
                broken: None,
                events: Vec::new(),
            };
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut events);

        let mut commands = Vec::new();
        self.player.handle(&events, input, &mut commands);
        let mut player_events = self.execute(commands);

        let mut commands = Vec::new();
        self.pursuit.handle(
            &events,
            query::pursuer_hitbox(&self.world),
            query::player_hitbox(&self.world),
            query::tile_map(&self.world),
            &mut commands,
        );
        let mut pursuer_events = self.execute(commands);
        self.feed_back_to_pursuit(&pursuer_events);

        events.append(&mut player_events);
        events.append(&mut pursuer_events);

        let observation = self.observe();
        let mut commands = Vec::new();
        self.rules.handle(&events, observation, &mut commands);
        let mut reset_events = self.execute(commands);
        if !reset_events.is_empty() {
            debug!(tick = query::tick_index(&self.world), "run restarted");
            self.feed_back_to_pursuit(&reset_events);
        }
        events.append(&mut reset_events);

        TickReport {
            status: self.rules.status(),
            broken: self.rules.broken_rule(),
            events,
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the rules system.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Read-only access to the pursuit system.
    #[must_use]
    pub fn pursuit(&self) -> &Pursuit {
        &self.pursuit
    }

    /// Current run status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.rules.status()
    }

    fn execute(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }

    /// Pursuit only reacts to these events by updating its own state.
    fn feed_back_to_pursuit(&mut self, events: &[Event]) {
        let mut ignored = Vec::new();
        self.pursuit.handle(
            events,
            query::pursuer_hitbox(&self.world),
            query::player_hitbox(&self.world),
            query::tile_map(&self.world),
            &mut ignored,
        );
    }

    fn observe(&self) -> Observation {
        Observation {
            on_hazard: query::player_on_hazard(&self.world),
            caught: query::pursuer_contact(&self.world),
            at_exit: query::player_touches_exit(&self.world),
        }
    }
}
