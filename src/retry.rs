//! Retry ladder interpretation
//!
//! Reads the current run's retry count together with historical retry
//! frequency, so a test that keeps limping through on retries is flagged
//! even when its latest run happened to pass cleanly.

use serde::{Deserialize, Serialize};

use crate::history::HistoryEntry;
use crate::model::{TestResult, TestStatus};

/// Retries in a single run that draw attention on their own.
pub const DEFAULT_ATTENTION_THRESHOLD: u32 = 3;

/// The retry ladder of one run, plus the chronic-instability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryInfo {
    pub total_retries: u32,
    /// Retry index that finally passed, -1 if the test never passed on retry
    pub passed_on_retry: i32,
    pub failed_retries: u32,
    /// One flag per attempt; true marks the attempt that passed
    pub retry_pattern: Vec<bool>,
    pub needs_attention: bool,
}

/// Annotate `test` with its retry ladder for this run.
pub fn analyze(test: &mut TestResult, history: &[HistoryEntry], threshold: u32) {
    let total_retries = test.retry;
    let (passed_on_retry, failed_retries) = match test.status {
        TestStatus::Passed => (
            if total_retries > 0 {
                total_retries as i32
            } else {
                -1
            },
            0,
        ),
        TestStatus::Failed | TestStatus::TimedOut => (-1, total_retries),
        TestStatus::Skipped => (-1, 0),
    };

    let mut retry_pattern = vec![false; total_retries as usize + 1];
    if test.status == TestStatus::Passed {
        if let Some(last) = retry_pattern.last_mut() {
            *last = true;
        }
    }

    // Chronic instability: a strict majority of recorded runs needed at
    // least one retry.
    let retried = history
        .iter()
        .filter(|entry| entry.retry_count() > 0)
        .count();
    let chronically_retried = retried * 2 > history.len();

    test.retry_info = Some(RetryInfo {
        total_retries,
        passed_on_retry,
        failed_retries,
        retry_pattern,
        needs_attention: total_retries >= threshold || chronically_retried,
    });
}

/// Human-readable ladder summary for report rows.
pub fn retry_summary(test: &TestResult) -> String {
    match &test.retry_info {
        Some(info) if info.total_retries == 0 => "No retries".to_string(),
        Some(info) if info.passed_on_retry >= 0 => format!(
            "Passed on retry {}/{}",
            info.passed_on_retry + 1,
            info.total_retries + 1
        ),
        Some(info) => format!("Failed after {} attempts", info.total_retries + 1),
        None => "No retries".to_string(),
    }
}

/// Fraction of tests that needed at least one retry; 0 for an empty set.
pub fn retry_rate(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let retried = results.iter().filter(|test| test.retry > 0).count();
    retried as f64 / results.len() as f64
}

/// Tests whose retry ladder flagged them.
pub fn problematic_tests(results: &[TestResult]) -> Vec<&TestResult> {
    results
        .iter()
        .filter(|test| {
            test.retry_info
                .as_ref()
                .is_some_and(|info| info.needs_attention)
        })
        .collect()
}
