#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Forbidden Rules engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable views of the
//! world and submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that systems react to deterministically within the same
//! tick.

use serde::{Deserialize, Serialize};

/// Edge length of a single square tile measured in pixels.
pub const DEFAULT_TILE_SIZE: i32 = 32;

/// Number of tile columns in a generated level.
pub const DEFAULT_COLUMNS: u32 = 20;

/// Number of tile rows in a generated level.
pub const DEFAULT_ROWS: u32 = 15;

/// Edge length of the square collision box shared by the player and the pursuer.
///
/// Slightly smaller than a tile so agents slide through single-tile corridors.
pub const HITBOX_SIZE: i32 = 30;

/// Pixels the player travels per tick along the active axis.
pub const PLAYER_SPEED: i32 = 2;

/// Pixels the pursuer travels per tick toward its next waypoint.
pub const PURSUER_SPEED: f32 = 2.0;

/// Ticks a planned pursuer path is reused before breadth-first search runs again.
pub const REPATH_COOLDOWN_TICKS: u32 = 12;

/// Consecutive motionless ticks the player may accumulate before breaking the idle rule.
pub const IDLE_LIMIT_TICKS: u32 = 120;

/// Lives granted at the start of a run.
pub const MAX_LIVES: u32 = 3;

/// Pixels trimmed from each side of an item tile when testing for pickup.
pub const ITEM_COLLISION_INSET: i32 = 2;

/// Location of a single tile expressed as column and row indices.
///
/// Indices are signed so that pixel positions left of or above the grid map to
/// representable (out-of-bounds) tiles instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two tiles share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: TileCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the neighbouring tile one step in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::North => Self::new(self.column, self.row - 1),
            Direction::East => Self::new(self.column + 1, self.row),
            Direction::South => Self::new(self.column, self.row + 1),
            Direction::West => Self::new(self.column - 1, self.row),
        }
    }
}

/// Point in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate, growing downwards.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a new pixel point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Signed per-axis displacement in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelDelta {
    /// Horizontal displacement.
    pub dx: i32,
    /// Vertical displacement.
    pub dy: i32,
}

impl PixelDelta {
    /// Displacement that leaves a rectangle in place.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Reports whether the displacement is zero on both axes.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Axis-aligned rectangle in pixel space, anchored at its upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl PixelRect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a square rectangle with its upper-left corner at `origin`.
    #[must_use]
    pub const fn square(origin: PixelPoint, size: i32) -> Self {
        Self::new(origin.x, origin.y, size, size)
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Center point, rounded towards the upper-left for odd extents.
    #[must_use]
    pub const fn center(&self) -> PixelPoint {
        PixelPoint::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Returns a copy moved by the provided displacement.
    #[must_use]
    pub const fn translated(&self, delta: PixelDelta) -> Self {
        Self::new(
            self.x + delta.dx,
            self.y + delta.dy,
            self.width,
            self.height,
        )
    }

    /// Returns a copy whose upper-left corner sits at `origin`.
    #[must_use]
    pub const fn at(&self, origin: PixelPoint) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Reports whether the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Reports whether two rectangles overlap.
    ///
    /// Rectangles that merely share an edge do not intersect, and an empty
    /// rectangle intersects nothing.
    #[must_use]
    pub const fn intersects(&self, other: &PixelRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Semantic type of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground.
    Floor,
    /// Solid tile that blocks agents and pathfinding.
    Wall,
    /// Tile that carried a collectible when the level was generated.
    Item,
    /// Lava; standing on it breaks the first rule.
    Hazard,
    /// Finish tile that wins the run.
    Exit,
}

/// Cardinal directions on the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

/// Directional keys held during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerInput {
    /// Leftward key held.
    pub left: bool,
    /// Rightward key held.
    pub right: bool,
    /// Upward key held.
    pub up: bool,
    /// Downward key held.
    pub down: bool,
}

impl PlayerInput {
    /// Input with no keys held.
    pub const IDLE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
    };

    /// Input holding exactly the key for the provided direction.
    #[must_use]
    pub const fn towards(direction: Direction) -> Self {
        match direction {
            Direction::North => Self {
                up: true,
                ..Self::IDLE
            },
            Direction::East => Self {
                right: true,
                ..Self::IDLE
            },
            Direction::South => Self {
                down: true,
                ..Self::IDLE
            },
            Direction::West => Self {
                left: true,
                ..Self::IDLE
            },
        }
    }
}

/// The three forbidden acts tracked during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Standing on a hazard tile.
    Hazard,
    /// Being touched by the pursuer.
    Caught,
    /// Standing still for longer than the idle limit.
    Idle,
}

impl Rule {
    /// Ordinal shown to players.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Hazard => 1,
            Self::Caught => 2,
            Self::Idle => 3,
        }
    }

    /// Human readable explanation of the violation.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Hazard => "Stepped on a lava tile.",
            Self::Caught => "Caught by the Sentinel.",
            Self::Idle => "Stayed still for too long.",
        }
    }
}

/// Lifecycle of a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// The run accepts input.
    #[default]
    Playing,
    /// The player reached the exit.
    Won,
    /// The player ran out of lives.
    GameOver,
}

impl RunStatus {
    /// Reports whether the run has concluded.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by one fixed tick.
    Tick,
    /// Moves the player hitbox, sliding along walls, and attempts an item pickup.
    MovePlayer {
        /// Requested displacement; at most one axis is non-zero.
        delta: PixelDelta,
    },
    /// Moves the pursuer hitbox, sliding along walls.
    StepPursuer {
        /// Requested displacement toward the next waypoint.
        delta: PixelDelta,
    },
    /// Restores items and returns both agents to their spawn points.
    ResetRun,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just began.
        tick: u64,
    },
    /// Confirms that the player hitbox changed position.
    PlayerMoved {
        /// Upper-left corner before the move.
        from: PixelPoint,
        /// Upper-left corner after the move.
        to: PixelPoint,
    },
    /// Reports that a player move resulted in no displacement.
    PlayerStalled {
        /// Upper-left corner of the unmoved hitbox.
        at: PixelPoint,
    },
    /// Confirms that the player collected an item.
    ItemPicked {
        /// Tile the item was removed from.
        tile: TileCoord,
    },
    /// Reports the pursuer hitbox after a step was resolved against walls.
    PursuerStepped {
        /// Resolved pursuer hitbox.
        hitbox: PixelRect,
    },
    /// Announces that items and agent positions were restored.
    RunReset,
}
