//! Flakiness scoring from historical pass/fail records

use crate::history::HistoryEntry;
use crate::model::TestResult;

/// Score at or above which every consumer treats a test as flaky.
pub const FLAKY_THRESHOLD: f64 = 0.3;

/// Derive the share of non-skipped historical entries that failed.
///
/// A test with no usable history gets no score at all: downstream consumers
/// must treat it as unknown, never as flaky.
pub fn analyze(test: &mut TestResult, history: &[HistoryEntry]) {
    let mut usable = 0usize;
    let mut failed = 0usize;
    for entry in history {
        if entry.is_skipped() {
            continue;
        }
        usable += 1;
        if !entry.passed {
            failed += 1;
        }
    }
    test.flakiness_score = if usable == 0 {
        None
    } else {
        Some(failed as f64 / usable as f64)
    };
}

/// Whether the recorded score crosses the flaky convention.
pub fn is_flaky(test: &TestResult) -> bool {
    test.flakiness_score
        .is_some_and(|score| score >= FLAKY_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestStatus;
    use chrono::{TimeZone, Utc};

    fn entry(passed: bool, skipped: bool) -> HistoryEntry {
        HistoryEntry {
            passed,
            duration_ms: 100.0,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            retry: None,
            skipped: skipped.then_some(true),
        }
    }

    fn test_record() -> TestResult {
        TestResult::new("t1", "loads", "app.spec.ts", TestStatus::Passed, 100.0, 0)
    }

    #[test]
    fn test_no_history_leaves_score_absent() {
        let mut test = test_record();
        analyze(&mut test, &[]);
        assert_eq!(test.flakiness_score, None);
        assert!(!is_flaky(&test));
    }

    #[test]
    fn test_skipped_only_history_leaves_score_absent() {
        let mut test = test_record();
        analyze(&mut test, &[entry(false, true), entry(false, true)]);
        assert_eq!(test.flakiness_score, None);
    }

    #[test]
    fn test_score_is_failure_proportion() {
        let mut test = test_record();
        analyze(
            &mut test,
            &[
                entry(true, false),
                entry(false, false),
                entry(true, false),
                entry(false, false),
            ],
        );
        assert_eq!(test.flakiness_score, Some(0.5));
        assert!(is_flaky(&test));
    }

    #[test]
    fn test_skipped_entries_excluded_from_proportion() {
        let mut test = test_record();
        analyze(
            &mut test,
            &[entry(false, true), entry(true, false), entry(false, false)],
        );
        // 1 failure over 2 usable entries
        assert_eq!(test.flakiness_score, Some(0.5));
    }

    #[test]
    fn test_flaky_threshold_boundary() {
        let mut test = test_record();
        test.flakiness_score = Some(FLAKY_THRESHOLD);
        assert!(is_flaky(&test));
        test.flakiness_score = Some(FLAKY_THRESHOLD - 0.01);
        assert!(!is_flaky(&test));
    }

    #[test]
    fn test_all_passing_history_scores_zero() {
        let mut test = test_record();
        analyze(&mut test, &[entry(true, false), entry(true, false)]);
        assert_eq!(test.flakiness_score, Some(0.0));
        assert!(!is_flaky(&test));
    }
}
