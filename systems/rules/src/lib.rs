#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule tracking system that scores the run, charges lives and decides its outcome.

use forbidden_rules_core::{Command, Event, Rule, RunStatus, IDLE_LIMIT_TICKS, MAX_LIVES};
use tracing::info;

/// Configuration parameters required to construct the rules system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Lives the player starts the run with.
    pub max_lives: u32,
    /// Consecutive motionless ticks tolerated before the idle rule breaks.
    pub idle_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lives: MAX_LIVES,
            idle_limit: IDLE_LIMIT_TICKS,
        }
    }
}

/// Facts about the world sampled after both agents moved this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Observation {
    /// The player's center stands on a hazard tile.
    pub on_hazard: bool,
    /// The pursuer's hitbox overlaps the player's.
    pub caught: bool,
    /// The player's hitbox overlaps the exit tile.
    pub at_exit: bool,
}

/// A single rule violation recorded during the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Tick on which the rule broke.
    pub tick: u64,
    /// The rule that broke.
    pub rule: Rule,
    /// Lives left after the penalty.
    pub lives_left: u32,
}

/// Pure system enforcing the three forbidden rules.
#[derive(Debug)]
pub struct Rules {
    config: Config,
    score: u32,
    lives: u32,
    idle_ticks: u32,
    status: RunStatus,
    broken: Option<Rule>,
    violations: Vec<Violation>,
}

impl Rules {
    /// Creates a rules system with a full set of lives and an empty score.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            score: 0,
            lives: config.max_lives,
            idle_ticks: 0,
            status: RunStatus::Playing,
            broken: None,
            violations: Vec::new(),
        }
    }

    /// Consumes the events of one tick together with the post-movement observation.
    ///
    /// Pickups and player movement are tallied first. If the batch contains a
    /// `TimeAdvanced` event the rules are then evaluated once: hazard, caught
    /// and idle in that order, where a later violation supersedes an earlier
    /// one. A violation costs a life and either requests a `ResetRun` or ends
    /// the run. Only a tick without violations can be won by touching the exit.
    pub fn handle(&mut self, events: &[Event], observation: Observation, out: &mut Vec<Command>) {
        self.broken = None;
        if self.status.is_finished() {
            return;
        }

        let mut tick = None;
        for event in events {
            match event {
                Event::TimeAdvanced { tick: index } => tick = Some(*index),
                Event::ItemPicked { .. } => self.score = self.score.saturating_add(1),
                Event::PlayerMoved { .. } => self.idle_ticks = 0,
                Event::PlayerStalled { .. } => {
                    self.idle_ticks = self.idle_ticks.saturating_add(1);
                }
                _ => {}
            }
        }

        let Some(tick) = tick else {
            return;
        };

        match self.violated(observation) {
            Some(rule) => self.penalize(tick, rule, out),
            None if observation.at_exit => {
                self.status = RunStatus::Won;
                info!(tick, score = self.score, "exit reached");
            }
            None => {}
        }
    }

    /// Items collected so far. Survives lost lives.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Consecutive ticks the player has not moved.
    #[must_use]
    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    /// Current lifecycle state of the run.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Rule broken during the most recent evaluation, if any.
    #[must_use]
    pub fn broken_rule(&self) -> Option<Rule> {
        self.broken
    }

    /// Every violation recorded since the run began, oldest first.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    fn violated(&self, observation: Observation) -> Option<Rule> {
        let mut broken = None;
        if observation.on_hazard {
            broken = Some(Rule::Hazard);
        }
        if observation.caught {
            broken = Some(Rule::Caught);
        }
        if self.idle_ticks > self.config.idle_limit {
            broken = Some(Rule::Idle);
        }
        broken
    }

    fn penalize(&mut self, tick: u64, rule: Rule, out: &mut Vec<Command>) {
        self.lives = self.lives.saturating_sub(1);
        self.broken = Some(rule);
        self.violations.push(Violation {
            tick,
            rule,
            lives_left: self.lives,
        });
        info!(
            tick,
            rule = rule.number(),
            lives = self.lives,
            "{}",
            rule.description()
        );

        if self.lives > 0 {
            self.idle_ticks = 0;
            out.push(Command::ResetRun);
        } else {
            self.status = RunStatus::GameOver;
            info!(tick, score = self.score, "game over");
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forbidden_rules_core::{PixelPoint, TileCoord};

    fn tick(index: u64) -> Event {
        Event::TimeAdvanced { tick: index }
    }

    fn moved() -> Event {
        Event::PlayerMoved {
            from: PixelPoint::new(0, 0),
            to: PixelPoint::new(2, 0),
        }
    }

    fn stalled() -> Event {
        Event::PlayerStalled {
            at: PixelPoint::new(0, 0),
        }
    }

    #[test]
    fn pickups_raise_the_score() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        rules.handle(
            &[
                tick(1),
                moved(),
                Event::ItemPicked {
                    tile: TileCoord::new(3, 1),
                },
            ],
            Observation::default(),
            &mut out,
        );
        assert_eq!(rules.score(), 1);
        assert!(out.is_empty());
        assert_eq!(rules.status(), RunStatus::Playing);
    }

    #[test]
    fn idle_rule_breaks_after_the_limit() {
        let mut rules = Rules::new(Config {
            max_lives: 3,
            idle_limit: 3,
        });
        let mut out = Vec::new();

        for index in 1..=3 {
            rules.handle(&[tick(index), stalled()], Observation::default(), &mut out);
        }
        assert_eq!(rules.idle_ticks(), 3);
        assert!(out.is_empty());

        rules.handle(&[tick(4), stalled()], Observation::default(), &mut out);
        assert_eq!(rules.broken_rule(), Some(Rule::Idle));
        assert_eq!(out, vec![Command::ResetRun]);
        assert_eq!(rules.lives(), 2);
        assert_eq!(rules.idle_ticks(), 0);
    }

    #[test]
    fn movement_clears_the_idle_counter() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        rules.handle(&[tick(1), stalled()], Observation::default(), &mut out);
        rules.handle(&[tick(2), stalled()], Observation::default(), &mut out);
        assert_eq!(rules.idle_ticks(), 2);
        rules.handle(&[tick(3), moved()], Observation::default(), &mut out);
        assert_eq!(rules.idle_ticks(), 0);
    }

    #[test]
    fn later_rule_supersedes_earlier_one_in_a_tick() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        rules.handle(
            &[tick(1), moved()],
            Observation {
                on_hazard: true,
                caught: true,
                at_exit: false,
            },
            &mut out,
        );
        assert_eq!(rules.broken_rule(), Some(Rule::Caught));
        assert_eq!(rules.lives(), 2);
        assert_eq!(out, vec![Command::ResetRun]);
    }

    #[test]
    fn violation_beats_reaching_the_exit() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        rules.handle(
            &[tick(1), moved()],
            Observation {
                on_hazard: true,
                caught: false,
                at_exit: true,
            },
            &mut out,
        );
        assert_eq!(rules.status(), RunStatus::Playing);
        assert_eq!(rules.broken_rule(), Some(Rule::Hazard));
    }

    #[test]
    fn exit_wins_and_freezes_the_run() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        let exit = Observation {
            at_exit: true,
            ..Observation::default()
        };
        rules.handle(&[tick(1), moved()], exit, &mut out);
        assert_eq!(rules.status(), RunStatus::Won);

        rules.handle(
            &[tick(2), moved()],
            Observation {
                on_hazard: true,
                ..Observation::default()
            },
            &mut out,
        );
        assert_eq!(rules.status(), RunStatus::Won);
        assert_eq!(rules.lives(), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn last_life_ends_the_run_without_reset() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        let caught = Observation {
            caught: true,
            ..Observation::default()
        };
        for index in 1..=3 {
            rules.handle(&[tick(index), moved()], caught, &mut out);
        }

        assert_eq!(rules.status(), RunStatus::GameOver);
        assert_eq!(rules.lives(), 0);
        assert_eq!(out, vec![Command::ResetRun, Command::ResetRun]);
        assert_eq!(
            rules.violations().iter().map(|v| v.lives_left).collect::<Vec<_>>(),
            vec![2, 1, 0]
        );
    }

    #[test]
    fn score_survives_lost_lives() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        rules.handle(
            &[
                tick(1),
                moved(),
                Event::ItemPicked {
                    tile: TileCoord::new(3, 1),
                },
            ],
            Observation {
                on_hazard: true,
                ..Observation::default()
            },
            &mut out,
        );
        assert_eq!(rules.score(), 1);
        assert_eq!(rules.lives(), 2);
    }

    #[test]
    fn batches_without_time_are_not_evaluated() {
        let mut rules = Rules::default();
        let mut out = Vec::new();
        rules.handle(
            &[moved()],
            Observation {
                caught: true,
                ..Observation::default()
            },
            &mut out,
        );
        assert_eq!(rules.lives(), 3);
        assert!(rules.violations().is_empty());
    }
}
