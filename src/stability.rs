//! Composite stability scoring and suite-level aggregation
//!
//! Fuses the flakiness, performance, and retry signals into one 0-100 score
//! with a letter grade, then rolls the annotated result set up into
//! suite-wide statistics.

use std::fmt;

use serde::{Deserialize, Serialize};
use trueno::Vector;

use crate::flakiness;
use crate::model::{TestResult, TestStatus};
use crate::performance::{PerformanceTrend, Severity};

/// Composite score below which a test needs attention.
pub const DEFAULT_ATTENTION_THRESHOLD: u8 = 70;

const FLAKINESS_WEIGHT: f64 = 0.4;
const PERFORMANCE_WEIGHT: f64 = 0.3;
const RELIABILITY_WEIGHT: f64 = 0.3;

/// Letter grade bands over the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_overall(overall: u8) -> Self {
        match overall {
            90.. => Self::A,
            80..=89 => Self::B,
            70..=79 => Self::C,
            60..=69 => Self::D,
            _ => Self::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Composite verdict for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityScore {
    pub overall: u8,
    pub flakiness: f64,
    pub performance: f64,
    pub reliability: f64,
    pub grade: Grade,
    pub needs_attention: bool,
}

/// Suite-wide aggregate statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteStats {
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
    /// Mean composite score across scored tests
    pub average_stability: f64,
}

/// Fuse the three per-test signals into the composite score.
///
/// Total over any well-formed record: an absent flakiness score means a
/// first observation (full marks), absent metrics mean no drift signal, and
/// an absent retry ladder falls back to the raw retry counter.
pub fn score_test(test: &mut TestResult, threshold: u8) {
    let flakiness = 100.0 * (1.0 - test.flakiness_score.unwrap_or(0.0));

    let performance = match &test.performance_metrics {
        Some(metrics) if metrics.is_improvement => 100.0,
        Some(metrics) if metrics.is_regression => match metrics.severity {
            Severity::Low => 75.0,
            Severity::Medium => 50.0,
            Severity::High => 25.0,
        },
        _ => 90.0,
    };

    let reliability = match test.status {
        TestStatus::Skipped => 75.0,
        TestStatus::Passed => {
            let retries = test
                .retry_info
                .as_ref()
                .map_or(test.retry, |info| info.total_retries);
            (100.0 - 15.0 * f64::from(retries)).max(0.0)
        }
        TestStatus::Failed | TestStatus::TimedOut => {
            let failed = test
                .retry_info
                .as_ref()
                .map_or(test.retry, |info| info.failed_retries);
            (100.0 - 30.0 * f64::from(failed)).max(0.0)
        }
    };

    let overall = (flakiness * FLAKINESS_WEIGHT
        + performance * PERFORMANCE_WEIGHT
        + reliability * RELIABILITY_WEIGHT)
        .round() as u8;

    test.stability_score = Some(StabilityScore {
        overall,
        flakiness,
        performance,
        reliability,
        grade: Grade::from_overall(overall),
        needs_attention: overall < threshold,
    });
}

/// Roll the annotated result set up into suite statistics. Total over any
/// (possibly empty) set; degenerate denominators yield zeros.
pub fn suite_stats(results: &[TestResult]) -> SuiteStats {
    let mut stats = SuiteStats {
        total: results.len(),
        ..SuiteStats::default()
    };

    for test in results {
        match test.status {
            TestStatus::Passed => stats.passed += 1,
            TestStatus::Failed | TestStatus::TimedOut => stats.failed += 1,
            TestStatus::Skipped => stats.skipped += 1,
        }
        if flakiness::is_flaky(test) {
            stats.flaky += 1;
        }
        if test
            .performance_trend
            .as_ref()
            .is_some_and(PerformanceTrend::is_slow)
        {
            stats.slow += 1;
        }
    }

    let durations: Vec<f32> = results.iter().map(|test| test.duration_ms as f32).collect();
    if !durations.is_empty() {
        stats.duration = f64::from(Vector::from_slice(&durations).sum().unwrap_or(0.0));
    }

    let attempted = stats.passed + stats.failed;
    if attempted > 0 {
        stats.pass_rate = (stats.passed as f64 / attempted as f64 * 100.0).round() as u32;
    }

    let scored: Vec<f32> = results
        .iter()
        .filter_map(|test| test.stability_score.as_ref())
        .map(|score| f32::from(score.overall))
        .collect();
    if !scored.is_empty() {
        stats.average_stability = f64::from(Vector::from_slice(&scored).mean().unwrap_or(0.0));
    }

    stats
}

/// One-line verdict for report rows and notifications.
pub fn summary_line(score: &StabilityScore) -> String {
    let status = if score.needs_attention {
        "⚠️ Needs Attention"
    } else {
        "✅ Stable"
    };
    format!("Grade {} ({}/100) - {}", score.grade, score.overall, status)
}

/// Tests whose composite score flagged them.
pub fn problematic_tests(results: &[TestResult]) -> Vec<&TestResult> {
    results
        .iter()
        .filter(|test| {
            test.stability_score
                .as_ref()
                .is_some_and(|score| score.needs_attention)
        })
        .collect()
}
