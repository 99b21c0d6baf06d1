//! Breadth-first shortest path search used by the pursuer.

use std::collections::VecDeque;

use forbidden_rules_core::{Direction, TileCoord};

use crate::TileMap;

/// Order in which neighbours are expanded. Fixes tie-breaking between equally
/// short paths.
const EXPANSION_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

/// Reusable breadth-first search over the passable tiles of a [`TileMap`].
///
/// The planner keeps its visited and parent buffers between calls so repeated
/// searches over the same level do not reallocate. Every search still expands
/// from scratch; no state from a previous path is reused.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    parents: Vec<Option<TileCoord>>,
    visited: Vec<bool>,
    queue: VecDeque<TileCoord>,
}

impl PathPlanner {
    /// Creates a planner with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a shortest 4-connected path from `start` to `goal`, both inclusive.
    ///
    /// Returns an empty path when either endpoint is impassable or the goal
    /// cannot be reached, and `[start]` when the endpoints coincide.
    pub fn plan(&mut self, map: &TileMap, start: TileCoord, goal: TileCoord) -> Vec<TileCoord> {
        if !map.is_passable(start) || !map.is_passable(goal) {
            return Vec::new();
        }
        let (Some(start_index), Some(goal_index)) = (map.index_of(start), map.index_of(goal))
        else {
            return Vec::new();
        };

        self.prepare(map.cell_count());
        self.visited[start_index] = true;
        self.queue.push_back(start);

        while let Some(cell) = self.queue.pop_front() {
            if cell == goal {
                break;
            }

            for neighbor in EXPANSION_ORDER.map(|direction| cell.step(direction)) {
                if !map.is_passable(neighbor) {
                    continue;
                }
                let Some(index) = map.index_of(neighbor) else {
                    continue;
                };
                if self.visited[index] {
                    continue;
                }

                self.visited[index] = true;
                self.parents[index] = Some(cell);
                self.queue.push_back(neighbor);
            }
        }

        if !self.visited[goal_index] {
            return Vec::new();
        }

        let mut path = vec![goal];
        let mut current = goal_index;
        while let Some(parent) = self.parents[current] {
            path.push(parent);
            match map.index_of(parent) {
                Some(index) => current = index,
                None => break,
            }
        }
        path.reverse();
        path
    }

    fn prepare(&mut self, cell_count: usize) {
        if self.visited.len() != cell_count {
            self.visited = vec![false; cell_count];
            self.parents = vec![None; cell_count];
        } else {
            self.visited.fill(false);
            self.parents.fill(None);
        }
        self.queue.clear();
    }
}

/// Convenience wrapper running a single search with a fresh [`PathPlanner`].
#[must_use]
pub fn shortest_path(map: &TileMap, start: TileCoord, goal: TileCoord) -> Vec<TileCoord> {
    PathPlanner::new().plan(map, start, goal)
}
