//! History persistence lifecycle
//!
//! Run-scoped state made explicit: a `HistoryStore` is loaded once at run
//! start, read by the analyzers, mutated exactly once when the run completes,
//! and flushed with an all-or-nothing write. No process-wide singleton.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, warn};

use crate::history::model::{HistoryEntry, RunMeta, RunSummary, TestHistory};
use crate::model::{TestResult, TestStatus};

/// Errors from the persistence boundary. Everything upstream of the
/// destination write is best-effort and logged instead.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for history persistence operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Owns the suite's persisted history for the lifetime of one run.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    max_history_runs: usize,
    history: TestHistory,
}

impl HistoryStore {
    /// Load the history at `path`. A missing file yields an empty history
    /// (warning), unparseable content likewise (error log); analysis then
    /// proceeds without a baseline rather than failing the run.
    pub fn load(path: impl Into<PathBuf>, max_history_runs: usize) -> Self {
        let path = path.into();
        let history = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(history) => history,
                Err(err) => {
                    error!(
                        "history at {} is unparseable, starting empty: {}",
                        path.display(),
                        err
                    );
                    TestHistory::default()
                }
            },
            Err(err) => {
                warn!(
                    "no readable history at {}, starting empty: {}",
                    path.display(),
                    err
                );
                TestHistory::default()
            }
        };
        Self {
            path,
            max_history_runs,
            history,
        }
    }

    /// Wrap an already-resident history (embedding callers, tests).
    pub fn with_history(
        path: impl Into<PathBuf>,
        max_history_runs: usize,
        history: TestHistory,
    ) -> Self {
        Self {
            path: path.into(),
            max_history_runs,
            history,
        }
    }

    pub fn history(&self) -> &TestHistory {
        &self.history
    }

    pub fn max_history_runs(&self) -> usize {
        self.max_history_runs
    }

    /// History slice for one test; empty when the test has never run.
    pub fn entries_for(&self, test_id: &str) -> &[HistoryEntry] {
        self.history
            .tests
            .get(test_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fold one finished run into the history: one entry per result stamped
    /// with the run timestamp, plus the run's metadata and summary, then
    /// re-apply ordering and retention.
    pub fn record_run(&mut self, meta: RunMeta, results: &[TestResult], summary: RunSummary) {
        for result in results {
            let entry = HistoryEntry {
                passed: result.status == TestStatus::Passed,
                duration_ms: result.duration_ms,
                timestamp: meta.timestamp,
                retry: (result.retry > 0).then_some(result.retry),
                skipped: (result.status == TestStatus::Skipped).then_some(true),
            };
            self.history
                .tests
                .entry(result.test_id.clone())
                .or_default()
                .push(entry);
        }
        self.history.runs.push(meta);
        self.history.summaries.push(summary);
        self.history.sort();
        self.history.apply_retention(self.max_history_runs);
    }

    /// Persist the current history, all-or-nothing.
    pub fn save(&self) -> Result<()> {
        write_history(&self.path, &self.history)
    }
}

/// Write `history` to `path` atomically: serialize the full document, write a
/// sibling temp file, then rename over the destination. A failure on any step
/// leaves previously committed history untouched.
pub(crate) fn write_history(path: &Path, history: &TestHistory) -> Result<()> {
    let payload = serde_json::to_vec_pretty(history)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, &payload)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("history"));
    name.push(".tmp");
    path.with_file_name(name)
}
