//! Persisted run-history data model
//!
//! One JSON document with three independently-capped collections: run
//! metadata, per-test entry sequences, and per-run summaries. All three are
//! kept ascending by timestamp and bounded after every merge or update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a single test in a single historical run. Immutable once
/// recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub passed: bool,
    /// Duration of the final attempt in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
}

impl HistoryEntry {
    pub fn is_skipped(&self) -> bool {
        self.skipped.unwrap_or(false)
    }

    pub fn retry_count(&self) -> u32 {
        self.retry.unwrap_or(0)
    }
}

/// Identity and wall-clock of one recorded run. `run_id` is unique within
/// `TestHistory::runs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-run aggregate counters. Every field is always present; consumers never
/// see a shape-varying summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    /// Failed and timed-out tests
    pub failed: usize,
    pub skipped: usize,
    pub flaky: usize,
    pub slow: usize,
    /// Summed test durations in milliseconds
    pub duration: f64,
    /// Rounded percentage of passed over passed + failed
    pub pass_rate: u32,
}

/// Rolling multi-run history for a suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestHistory {
    #[serde(default)]
    pub runs: Vec<RunMeta>,
    #[serde(default)]
    pub tests: BTreeMap<String, Vec<HistoryEntry>>,
    #[serde(default)]
    pub summaries: Vec<RunSummary>,
}

impl TestHistory {
    /// Re-establish the ordering invariant: ascending by timestamp, with
    /// input order preserved for entries sharing a stamp (stable sort).
    pub fn sort(&mut self) {
        self.runs.sort_by_key(|run| run.timestamp);
        for entries in self.tests.values_mut() {
            entries.sort_by_key(|entry| entry.timestamp);
        }
        self.summaries.sort_by_key(|summary| summary.timestamp);
    }

    /// Cap every collection to the `max_runs` most recent entries. Assumes
    /// the ordering invariant holds.
    pub fn apply_retention(&mut self, max_runs: usize) {
        cap(&mut self.runs, max_runs);
        for entries in self.tests.values_mut() {
            cap(entries, max_runs);
        }
        cap(&mut self.summaries, max_runs);
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.tests.is_empty() && self.summaries.is_empty()
    }
}

/// Keep only the trailing `max` items.
fn cap<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        items.drain(..items.len() - max);
    }
}
