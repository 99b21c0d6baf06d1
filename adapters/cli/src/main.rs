#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Three Forbidden Rules run headlessly.

mod render;
mod scores;
mod script;

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::Parser;
use forbidden_rules_core::{PlayerInput, Rule, RunStatus};
use forbidden_rules_session::{Config, Session};
use forbidden_rules_world::query;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{scores::ScoreTable, script::InputScript};

/// Command-line arguments accepted by the binary.
#[derive(Debug, Parser)]
#[command(name = "forbidden-rules", about = "Headless runner for Three Forbidden Rules")]
struct Args {
    /// Seed for level generation; a random seed is drawn and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of ticks to simulate; defaults to the length of the script.
    ///
    /// Ticks beyond the end of the script are played with no key held.
    #[arg(long)]
    ticks: Option<u64>,
    /// Held keys, e.g. "R40 D20 L5 W10" (L/R/U/D or W to wait, then a tick count).
    #[arg(long, default_value = "")]
    script: InputScript,
    /// Name recorded in the high-score table.
    #[arg(long, default_value = "Player")]
    name: String,
    /// JSON high-score file updated when the run finishes.
    #[arg(long)]
    scores: Option<PathBuf>,
    /// Print the run summary as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Print the level with both agents after the run.
    #[arg(long)]
    show_map: bool,
}

/// Machine readable outcome of a run.
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: Option<u64>,
    ticks: u64,
    status: RunStatus,
    score: u32,
    lives: u32,
    violations: Vec<ViolationSummary>,
}

#[derive(Debug, Serialize)]
struct ViolationSummary {
    tick: u64,
    rule: Rule,
    number: u8,
    description: &'static str,
}

/// Entry point for the Three Forbidden Rules command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut session = Session::new(&Config::default(), args.seed)
        .context("failed to generate the level")?;
    info!(
        seed = query::seed(session.world()),
        script = %args.script,
        "Three Forbidden Rules"
    );

    let tick_budget = args.ticks.unwrap_or_else(|| args.script.tick_count());
    let ticks = play(&mut session, &args.script, tick_budget);
    let summary = summarize(&session, ticks);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode run summary")?
        );
    } else {
        print_summary(&summary);
    }

    if args.show_map {
        println!("{}", render::ascii_map(session.world()));
    }

    if let Some(path) = &args.scores {
        if summary.status.is_finished() {
            let mut table = ScoreTable::load(path);
            table.record(&args.name, summary.score, unix_timestamp());
            table
                .save(path)
                .with_context(|| format!("failed to update {}", path.display()))?;
            if !args.json {
                print_scores(&table);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Plays the script, padding with idle ticks, until the budget is spent or the run ends.
fn play(session: &mut Session, script: &InputScript, tick_budget: u64) -> u64 {
    let inputs = script
        .inputs()
        .chain(std::iter::repeat(PlayerInput::IDLE));
    let mut played = 0;
    for input in inputs {
        if played == tick_budget {
            break;
        }
        played += 1;
        if session.tick(input).status.is_finished() {
            break;
        }
    }
    played
}

fn summarize(session: &Session, ticks: u64) -> RunSummary {
    let rules = session.rules();
    RunSummary {
        seed: query::seed(session.world()),
        ticks,
        status: rules.status(),
        score: rules.score(),
        lives: rules.lives(),
        violations: rules
            .violations()
            .iter()
            .map(|violation| ViolationSummary {
                tick: violation.tick,
                rule: violation.rule,
                number: violation.rule.number(),
                description: violation.rule.description(),
            })
            .collect(),
    }
}

fn print_summary(summary: &RunSummary) {
    for violation in &summary.violations {
        println!(
            "tick {:>5}: rule {} broken. {}",
            violation.tick, violation.number, violation.description
        );
    }
    let outcome = match summary.status {
        RunStatus::Playing => "still running",
        RunStatus::Won => "reached the exit",
        RunStatus::GameOver => "game over",
    };
    println!(
        "{outcome} after {} ticks with score {} and {} lives left",
        summary.ticks, summary.score, summary.lives
    );
}

fn print_scores(table: &ScoreTable) {
    println!("high scores:");
    for (rank, entry) in table.entries().iter().enumerate() {
        println!("{:>2}. {:<20} {:>4}", rank + 1, entry.name, entry.score);
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
