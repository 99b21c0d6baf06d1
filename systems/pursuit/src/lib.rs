#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuer system that periodically replans a shortest path toward its target
//! and steps along it one waypoint at a time.

use std::collections::VecDeque;

use forbidden_rules_core::{
    Command, Event, PixelDelta, PixelRect, TileCoord, PURSUER_SPEED, REPATH_COOLDOWN_TICKS,
};
use forbidden_rules_world::{PathPlanner, TileMap};
use glam::Vec2;
use tracing::trace;

/// Configuration parameters required to construct the pursuit system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Pixels travelled per tick toward the next waypoint.
    pub speed: f32,
    /// Ticks a usable path is reused before breadth-first search runs again.
    pub repath_cooldown: u32,
    /// Per-axis pixel distance at which a waypoint counts as reached.
    pub arrival_tolerance: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: PURSUER_SPEED,
            repath_cooldown: REPATH_COOLDOWN_TICKS,
            arrival_tolerance: 1,
        }
    }
}

/// Pure system that chases a target across the tile grid.
///
/// On every `TimeAdvanced` event the held path is reused while the cooldown
/// runs and the path is still usable, otherwise it is recomputed from the
/// pursuer's tile to the target's tile. The system then proposes a step toward
/// the pixel center of the path's second tile. The resolved position reported
/// back through `PursuerStepped` decides whether that waypoint was reached.
#[derive(Debug)]
pub struct Pursuit {
    config: Config,
    planner: PathPlanner,
    path: VecDeque<TileCoord>,
    repath_cooldown: u32,
    repath_count: u64,
    waypoint: Option<TileCoord>,
}

impl Pursuit {
    /// Creates a new pursuit system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            planner: PathPlanner::new(),
            path: VecDeque::new(),
            repath_cooldown: 0,
            repath_count: 0,
            waypoint: None,
        }
    }

    /// Consumes world events and immutable views to emit pursuer step commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        pursuer: PixelRect,
        target: PixelRect,
        map: &TileMap,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.advance(pursuer, target, map, out),
                Event::PursuerStepped { hitbox } => self.arrive(*hitbox, map),
                Event::RunReset => self.forget(),
                _ => {}
            }
        }
    }

    /// Tiles of the held path, starting with the tile the pursuer occupied when it was planned.
    #[must_use]
    pub fn path(&self) -> &VecDeque<TileCoord> {
        &self.path
    }

    /// Tile the pursuer is currently heading for, if any.
    #[must_use]
    pub fn next_waypoint(&self) -> Option<TileCoord> {
        self.path.get(1).copied()
    }

    /// Ticks left before the held path is recomputed.
    #[must_use]
    pub fn repath_cooldown(&self) -> u32 {
        self.repath_cooldown
    }

    /// Number of breadth-first searches run so far.
    #[must_use]
    pub fn repath_count(&self) -> u64 {
        self.repath_count
    }

    fn advance(
        &mut self,
        pursuer: PixelRect,
        target: PixelRect,
        map: &TileMap,
        out: &mut Vec<Command>,
    ) {
        self.refresh_path(pursuer, target, map);
        self.waypoint = None;

        let Some(waypoint) = self.next_waypoint() else {
            return;
        };

        let center = pursuer.center();
        let goal = map.center_of(waypoint);
        let offset = Vec2::new((goal.x - center.x) as f32, (goal.y - center.y) as f32);
        let distance = offset.length().max(1.0);
        let step = offset * self.config.speed / distance;

        self.waypoint = Some(waypoint);
        out.push(Command::StepPursuer {
            delta: PixelDelta::new(step.x as i32, step.y as i32),
        });
    }

    fn refresh_path(&mut self, pursuer: PixelRect, target: PixelRect, map: &TileMap) {
        if self.repath_cooldown > 0 && self.path.len() >= 2 {
            self.repath_cooldown -= 1;
            return;
        }

        let from = map.tile_of(pursuer.center());
        let to = map.tile_of(target.center());
        self.path = self.planner.plan(map, from, to).into();
        self.repath_cooldown = self.config.repath_cooldown;
        self.repath_count = self.repath_count.saturating_add(1);
        trace!(
            from_column = from.column(),
            from_row = from.row(),
            to_column = to.column(),
            to_row = to.row(),
            length = self.path.len(),
            "pursuer repathed"
        );
    }

    fn arrive(&mut self, hitbox: PixelRect, map: &TileMap) {
        let Some(waypoint) = self.waypoint.take() else {
            return;
        };

        let center = hitbox.center();
        let goal = map.center_of(waypoint);
        let tolerance = self.config.arrival_tolerance;
        let reached =
            (center.x - goal.x).abs() <= tolerance && (center.y - goal.y).abs() <= tolerance;

        if reached && self.path.front().is_some_and(|head| *head != waypoint) {
            let _ = self.path.pop_front();
        }
    }

    fn forget(&mut self) {
        self.path.clear();
        self.repath_cooldown = 0;
        self.waypoint = None;
    }
}

impl Default for Pursuit {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
