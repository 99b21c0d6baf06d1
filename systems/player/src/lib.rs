#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player control system translating held keys into movement commands.

use forbidden_rules_core::{Command, Event, PixelDelta, PlayerInput, PLAYER_SPEED};

/// Pure system that turns the keys held during a tick into a player move.
///
/// Horizontal input takes priority: when left or right resolves to a non-zero
/// displacement the vertical keys are ignored, so the player never moves
/// diagonally. Opposing keys cancel out.
#[derive(Debug)]
pub struct PlayerControl {
    speed: i32,
}

impl PlayerControl {
    /// Creates a control system moving the player `speed` pixels per tick.
    #[must_use]
    pub fn new(speed: i32) -> Self {
        Self { speed }
    }

    /// Emits one `MovePlayer` command for every `TimeAdvanced` event.
    ///
    /// A move is emitted even when no key is held so the world can report
    /// the stall.
    pub fn handle(&self, events: &[Event], input: PlayerInput, out: &mut Vec<Command>) {
        for event in events {
            if matches!(event, Event::TimeAdvanced { .. }) {
                out.push(Command::MovePlayer {
                    delta: self.displacement(input),
                });
            }
        }
    }

    /// Displacement requested by the provided input.
    #[must_use]
    pub fn displacement(&self, input: PlayerInput) -> PixelDelta {
        let dx = (i32::from(input.right) - i32::from(input.left)) * self.speed;
        if dx != 0 {
            return PixelDelta::new(dx, 0);
        }
        let dy = (i32::from(input.down) - i32::from(input.up)) * self.speed;
        PixelDelta::new(0, dy)
    }
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self::new(PLAYER_SPEED)
    }
}
