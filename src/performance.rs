//! Performance drift detection against the historical baseline
//!
//! Compares the current duration to the mean of prior non-skipped runs and
//! classifies the trend. Thresholds are relative to the baseline; the
//! magnitude-adaptive variant loosens the bound for short tests, where
//! relative jitter dominates, and tightens it for long ones, where absolute
//! drift at scale is meaningful.

use std::fmt;

use serde::{Deserialize, Serialize};
use trueno::Vector;

use crate::history::HistoryEntry;
use crate::model::{TestResult, TestStatus};

/// Default relative threshold: drift within ±20% of baseline is stable.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Severity of a drift, banded by magnitude of the relative change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// `|percent change|`: below 25 low, 25 to 50 medium, 50 and up high.
    pub fn from_percent_change(percent_change: f64) -> Self {
        let magnitude = percent_change.abs();
        if magnitude < 25.0 {
            Self::Low
        } else if magnitude < 50.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Classified direction of the current duration relative to baseline.
///
/// Serialized as its display string (`"Stable"`, `"50% slower"`, ...), the
/// form rendering and notification layers consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PerformanceTrend {
    /// Test did not run this time.
    Skipped,
    /// No usable history to compare against.
    Baseline,
    Stable,
    /// Slower than baseline by the carried percentage.
    Slower(f64),
    /// Faster than baseline by the carried percentage.
    Faster(f64),
}

impl PerformanceTrend {
    pub fn is_slow(&self) -> bool {
        matches!(self, Self::Slower(_))
    }

    pub fn is_faster(&self) -> bool {
        matches!(self, Self::Faster(_))
    }
}

impl fmt::Display for PerformanceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("Skipped"),
            Self::Baseline => f.write_str("Baseline"),
            Self::Stable => f.write_str("Stable"),
            Self::Slower(pct) => write!(f, "{pct:.0}% slower"),
            Self::Faster(pct) => write!(f, "{pct:.0}% faster"),
        }
    }
}

impl From<PerformanceTrend> for String {
    fn from(trend: PerformanceTrend) -> Self {
        trend.to_string()
    }
}

impl TryFrom<String> for PerformanceTrend {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Skipped" => return Ok(Self::Skipped),
            "Baseline" => return Ok(Self::Baseline),
            "Stable" => return Ok(Self::Stable),
            _ => {}
        }
        if let Some(pct) = value.strip_suffix("% slower") {
            if let Ok(pct) = pct.trim().parse() {
                return Ok(Self::Slower(pct));
            }
        }
        if let Some(pct) = value.strip_suffix("% faster") {
            if let Ok(pct) = pct.trim().parse() {
                return Ok(Self::Faster(pct));
            }
        }
        Err(format!("unrecognized performance trend: {value:?}"))
    }
}

/// Coarse bucket for consumers that only care about direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Slow,
    Fast,
    Stable,
}

/// Map an optional trend to its coarse bucket, defaulting to stable.
pub fn trend_status(trend: Option<&PerformanceTrend>) -> TrendStatus {
    match trend {
        Some(t) if t.is_slow() => TrendStatus::Slow,
        Some(t) if t.is_faster() => TrendStatus::Fast,
        _ => TrendStatus::Stable,
    }
}

/// Full comparison record behind a classified trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub average_duration: f64,
    pub current_duration: f64,
    pub percent_change: f64,
    pub absolute_change: f64,
    /// Relative threshold the classification used
    pub threshold: f64,
    pub is_regression: bool,
    pub is_improvement: bool,
    pub severity: Severity,
}

/// Mean duration over non-skipped history entries, if any ran.
pub fn baseline_average(history: &[HistoryEntry]) -> Option<f64> {
    let durations: Vec<f32> = history
        .iter()
        .filter(|entry| !entry.is_skipped())
        .map(|entry| entry.duration_ms as f32)
        .collect();
    if durations.is_empty() {
        return None;
    }
    Some(f64::from(
        Vector::from_slice(&durations).mean().unwrap_or(0.0),
    ))
}

/// Magnitude-adaptive alternative to the fixed threshold, keyed on the
/// baseline average a caller already computed.
pub fn smart_threshold(average_duration: f64) -> f64 {
    if average_duration < 100.0 {
        0.5
    } else if average_duration < 1_000.0 {
        0.3
    } else if average_duration < 10_000.0 {
        0.2
    } else {
        0.15
    }
}

/// Annotate `test` with its duration trend against the historical baseline.
///
/// Skipped tests and tests without a usable (non-skipped, non-zero) baseline
/// get a bare trend and no metrics; everything else gets the full
/// `PerformanceMetrics` record alongside the classified trend.
pub fn analyze(test: &mut TestResult, history: &[HistoryEntry], threshold: f64) {
    if test.status == TestStatus::Skipped {
        test.performance_trend = Some(PerformanceTrend::Skipped);
        return;
    }

    // A 0ms baseline offers nothing to compare against; treat it like no
    // baseline rather than dividing by it.
    let Some(average) = baseline_average(history).filter(|avg| *avg > 0.0) else {
        test.performance_trend = Some(PerformanceTrend::Baseline);
        return;
    };

    let percent_change = (test.duration_ms - average) / average * 100.0;
    let bound = threshold * 100.0;
    let (trend, is_regression, is_improvement) = if percent_change > bound {
        (PerformanceTrend::Slower(percent_change), true, false)
    } else if percent_change < -bound {
        (PerformanceTrend::Faster(-percent_change), false, true)
    } else {
        (PerformanceTrend::Stable, false, false)
    };

    test.average_duration = Some(average);
    test.performance_metrics = Some(PerformanceMetrics {
        average_duration: average,
        current_duration: test.duration_ms,
        percent_change,
        absolute_change: test.duration_ms - average,
        threshold,
        is_regression,
        is_improvement,
        severity: Severity::from_percent_change(percent_change),
    });
    test.performance_trend = Some(trend);
}
