use std::{
    cmp::Ordering,
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackfall_engine::{GameMode, GameResult, Metric, MetricKind};

/// Entries kept per leaderboard.
pub(crate) const MAX_ENTRIES_PER_BOARD: usize = 10;

/// One finished session in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordEntry {
    pub mode: GameMode,
    pub is_ai: bool,
    pub date: DateTime<Utc>,
    pub metric: Metric,
}

impl RecordEntry {
    pub(crate) fn from_result(result: &GameResult, is_ai: bool, date: DateTime<Utc>) -> Self {
        Self {
            mode: result.mode,
            is_ai,
            date,
            metric: result.metric,
        }
    }

    fn board_key(&self) -> (String, bool) {
        (self.mode.to_string(), self.is_ai)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordFile {
    entries: Vec<RecordEntry>,
}

/// Leaderboards persisted as a pretty-printed JSON file.
///
/// There is one board per `(mode, is_ai)` pair, each holding at most
/// [`MAX_ENTRIES_PER_BOARD`] entries. Score and line boards are sorted
/// best-first descending, time boards ascending; equal metrics keep the
/// older entry first.
#[derive(Debug)]
pub(crate) struct RecordStore {
    path: PathBuf,
    entries: Vec<RecordEntry>,
}

impl RecordStore {
    /// Loads the store at `path`. A missing file is an empty store; a file
    /// that does not parse is an error.
    pub(crate) fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        let entries = if path.exists() {
            let file: RecordFile = crate::util::read_json_file(&path)
                .with_context(|| format!("Failed to load records from {}", path.display()))?;
            file.entries
        } else {
            Vec::new()
        };
        let mut store = Self { path, entries };
        store.normalize();
        Ok(store)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Adds an entry and returns its 0-based rank, or `None` if it did not
    /// make its board.
    pub(crate) fn insert(&mut self, entry: RecordEntry) -> Option<usize> {
        self.entries.push(entry.clone());
        self.normalize();
        self.board(entry.mode, entry.is_ai)
            .position(|candidate| *candidate == entry)
    }

    /// Entries of one board, best first.
    pub(crate) fn board(
        &self,
        mode: GameMode,
        is_ai: bool,
    ) -> impl Iterator<Item = &RecordEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.mode == mode && entry.is_ai == is_ai)
    }

    /// Every `(mode, is_ai)` pair with at least one entry.
    pub(crate) fn boards(&self) -> Vec<(GameMode, bool)> {
        let mut boards: Vec<(GameMode, bool)> = self
            .entries
            .iter()
            .map(|entry| (entry.mode, entry.is_ai))
            .collect();
        boards.dedup();
        boards
    }

    pub(crate) fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create file: {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        let data = RecordFile {
            entries: self.entries.clone(),
        };
        serde_json::to_writer_pretty(&mut writer, &data)
            .with_context(|| format!("Failed to write JSON to {}", self.path.display()))?;
        writeln!(writer)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to flush output to {}", self.path.display()))?;
        log::debug!("saved {} records to {}", self.entries.len(), self.path.display());
        Ok(())
    }

    /// Sorts boards together, best first, and truncates each one.
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| {
            a.board_key()
                .cmp(&b.board_key())
                .then_with(|| compare_metrics(a.metric, b.metric))
                .then_with(|| a.date.cmp(&b.date))
        });
        let mut current_board = None;
        let mut kept = 0;
        self.entries.retain(|entry| {
            let key = entry.board_key();
            if current_board.as_ref() != Some(&key) {
                current_board = Some(key);
                kept = 0;
            }
            kept += 1;
            kept <= MAX_ENTRIES_PER_BOARD
        });
    }
}

/// Orders two metrics of the same board, better first.
fn compare_metrics(a: Metric, b: Metric) -> Ordering {
    match a.kind() {
        MetricKind::Score | MetricKind::Lines => b.value().cmp(&a.value()),
        MetricKind::Time => a.value().cmp(&b.value()),
    }
}
