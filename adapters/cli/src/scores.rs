//! Persistent high-score table stored as JSON.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Number of entries retained in the table.
pub(crate) const MAX_ENTRIES: usize = 5;
/// Longest player name stored, in characters.
pub(crate) const MAX_NAME_CHARS: usize = 20;

/// A single finished run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScoreEntry {
    /// Player name, truncated to [`MAX_NAME_CHARS`].
    pub(crate) name: String,
    /// Items collected during the run.
    pub(crate) score: u32,
    /// Unix timestamp in seconds at which the run finished.
    pub(crate) ts: u64,
}

/// Best runs ordered by descending score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ScoreTable {
    entries: Vec<ScoreEntry>,
}

/// Errors that can occur while writing the score table.
#[derive(Debug, Error)]
pub(crate) enum ScoreError {
    /// The table could not be serialised.
    #[error("could not encode score table: {0}")]
    Encode(#[from] serde_json::Error),
    /// The file could not be written.
    #[error("could not write score table: {0}")]
    Write(#[from] io::Error),
}

impl ScoreTable {
    /// Reads the table from disk.
    ///
    /// A missing file yields an empty table. An unreadable or malformed file
    /// is logged and also yields an empty table.
    pub(crate) fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(error) => {
                warn!(path = %path.display(), %error, "could not read score table");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&contents) {
            Ok(table) => table,
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring malformed score table");
                Self::default()
            }
        }
    }

    /// Writes the table to disk as pretty-printed JSON.
    pub(crate) fn save(&self, path: &Path) -> Result<(), ScoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Inserts a finished run and keeps only the best [`MAX_ENTRIES`].
    ///
    /// Runs with equal scores keep their insertion order, so an older entry
    /// outranks a newer one with the same score.
    pub(crate) fn record(&mut self, name: &str, score: u32, ts: u64) {
        self.entries.push(ScoreEntry {
            name: name.chars().take(MAX_NAME_CHARS).collect(),
            score,
            ts,
        });
        self.entries.sort_by(|left, right| right.score.cmp(&left.score));
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Entries from best to worst.
    #[must_use]
    pub(crate) fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }
}
