//! Scripted keyboard input for headless play-throughs.

use std::{fmt, str::FromStr};

use forbidden_rules_core::{Direction, PlayerInput};
use thiserror::Error;

/// A sequence of held keys, each kept down for a number of ticks.
///
/// The textual form is a whitespace separated list of steps such as
/// `R40 D20 L5 W10`: a letter selecting the key (`L`, `R`, `U`, `D`, or `W`
/// to wait with no key held) followed by a positive tick count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InputScript {
    steps: Vec<ScriptStep>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScriptStep {
    input: PlayerInput,
    ticks: u32,
}

/// Errors that can occur while parsing an input script.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The step does not start with one of the recognised key letters.
    #[error("step '{0}' must start with one of L, R, U, D or W")]
    UnknownKey(String),
    /// The step names a key but no tick count.
    #[error("step '{0}' is missing a tick count")]
    MissingCount(String),
    /// The tick count is not a positive integer.
    #[error("step '{0}' has an invalid tick count")]
    InvalidCount(String),
}

impl InputScript {
    /// Parses the textual script representation.
    pub(crate) fn parse(source: &str) -> Result<Self, ScriptError> {
        let steps = source
            .split_whitespace()
            .map(parse_step)
            .collect::<Result<_, _>>()?;
        Ok(Self { steps })
    }

    /// Total number of ticks the script covers.
    #[must_use]
    pub(crate) fn tick_count(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.ticks)).sum()
    }

    /// Per-tick inputs in playback order.
    pub(crate) fn inputs(&self) -> impl Iterator<Item = PlayerInput> + '_ {
        self.steps
            .iter()
            .flat_map(|step| std::iter::repeat(step.input).take(step.ticks as usize))
    }
}

impl FromStr for InputScript {
    type Err = ScriptError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl fmt::Display for InputScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", key_letter(step.input), step.ticks)?;
        }
        Ok(())
    }
}

fn parse_step(token: &str) -> Result<ScriptStep, ScriptError> {
    let mut chars = token.chars();
    let input = match chars.next().map(|key| key.to_ascii_uppercase()) {
        Some('L') => PlayerInput::towards(Direction::West),
        Some('R') => PlayerInput::towards(Direction::East),
        Some('U') => PlayerInput::towards(Direction::North),
        Some('D') => PlayerInput::towards(Direction::South),
        Some('W') => PlayerInput::IDLE,
        _ => return Err(ScriptError::UnknownKey(token.to_owned())),
    };

    let count = chars.as_str();
    if count.is_empty() {
        return Err(ScriptError::MissingCount(token.to_owned()));
    }
    let ticks = count
        .parse::<u32>()
        .ok()
        .filter(|ticks| *ticks > 0)
        .ok_or_else(|| ScriptError::InvalidCount(token.to_owned()))?;

    Ok(ScriptStep { input, ticks })
}

fn key_letter(input: PlayerInput) -> char {
    if input.left {
        'L'
    } else if input.right {
        'R'
    } else if input.up {
        'U'
    } else if input.down {
        'D'
    } else {
        'W'
    }
}
