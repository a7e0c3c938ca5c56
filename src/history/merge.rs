//! Multi-source history reconciliation
//!
//! Combines sharded report histories into one retention-capped document, an
//! offline batch step run before report generation. Per-source failures are
//! tolerated (skip and continue); the destination is written exactly once,
//! after the full structure is assembled.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{error, warn};

use crate::history::model::TestHistory;
use crate::history::store::{write_history, Result};

/// Default retention cap, re-applied on every merge or update.
pub const DEFAULT_MAX_HISTORY_RUNS: usize = 10;

/// Merge `sources` into one reconciled history and write it to `destination`.
///
/// Runs and summaries are de-duplicated by run id, first-seen-wins in source
/// order; per-test entry sequences carry no identity key and are unioned
/// as-is. Each collection is then stable-sorted ascending by timestamp and
/// capped to the `max_history_runs` most recent entries. Zero surviving
/// sources still produce an empty, well-formed document.
pub fn merge_histories<P: AsRef<Path>>(
    sources: &[P],
    destination: &Path,
    max_history_runs: usize,
) -> Result<TestHistory> {
    let mut merged = TestHistory::default();
    let mut seen_runs = HashSet::new();
    let mut seen_summaries = HashSet::new();

    for source in sources {
        let Some(history) = read_source(source.as_ref()) else {
            continue;
        };
        for run in history.runs {
            if seen_runs.insert(run.run_id.clone()) {
                merged.runs.push(run);
            }
        }
        for (test_id, entries) in history.tests {
            merged.tests.entry(test_id).or_default().extend(entries);
        }
        for summary in history.summaries {
            if seen_summaries.insert(summary.run_id.clone()) {
                merged.summaries.push(summary);
            }
        }
    }

    merged.sort();
    merged.apply_retention(max_history_runs);
    write_history(destination, &merged)?;
    Ok(merged)
}

/// Read one shard, tolerating absence and corruption.
fn read_source(path: &Path) -> Option<TestHistory> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                "skipping missing history source {}: {}",
                path.display(),
                err
            );
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(history) => Some(history),
        Err(err) => {
            error!(
                "skipping unparseable history source {}: {}",
                path.display(),
                err
            );
            None
        }
    }
}
