//! Per-test execution records
//!
//! The base fields arrive from the run orchestrator, once per test. The
//! annotation fields are owned by the analyzers and stay absent until a run
//! is analyzed; serialization omits them so un-analyzed records round-trip
//! unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::performance::{PerformanceMetrics, PerformanceTrend};
use crate::retry::RetryInfo;
use crate::stability::StabilityScore;

/// Terminal status of a test's final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
}

impl TestStatus {
    /// Failed and timed-out runs count as failing everywhere downstream.
    pub fn is_failing(self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut)
    }
}

/// One test's record for the current run, plus the analysis written onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: String,
    pub title: String,
    pub file: String,
    pub status: TestStatus,
    /// Duration of the final attempt in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: f64,
    /// Retry attempts consumed before the final outcome
    #[serde(default)]
    pub retry: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flakiness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_trend: Option<PerformanceTrend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_info: Option<RetryInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability_score: Option<StabilityScore>,
}

impl TestResult {
    /// A fresh, un-analyzed record as the orchestrator hands it over.
    pub fn new(
        test_id: impl Into<String>,
        title: impl Into<String>,
        file: impl Into<String>,
        status: TestStatus,
        duration_ms: f64,
        retry: u32,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            title: title.into(),
            file: file.into(),
            status,
            duration_ms,
            retry,
            flakiness_score: None,
            average_duration: None,
            performance_trend: None,
            performance_metrics: None,
            retry_info: None,
            stability_score: None,
        }
    }
}

/// One run's worth of results as handed to the CLI boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub tests: Vec<TestResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failing_covers_timeouts() {
        assert!(TestStatus::Failed.is_failing());
        assert!(TestStatus::TimedOut.is_failing());
        assert!(!TestStatus::Passed.is_failing());
        assert!(!TestStatus::Skipped.is_failing());
    }

    #[test]
    fn test_status_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&TestStatus::TimedOut).unwrap(),
            "\"timedOut\""
        );
    }

    #[test]
    fn test_unanalyzed_record_omits_annotations() {
        let test = TestResult::new("t1", "loads", "app.spec.ts", TestStatus::Passed, 120.0, 0);
        let json = serde_json::to_value(&test).unwrap();
        assert_eq!(json["testId"], "t1");
        assert_eq!(json["duration"], 120.0);
        assert!(json.get("flakinessScore").is_none());
        assert!(json.get("stabilityScore").is_none());
    }

    #[test]
    fn test_record_roundtrips_without_retry_field() {
        let raw = r#"{"testId":"t1","title":"loads","file":"app.spec.ts","status":"passed","duration":50}"#;
        let test: TestResult = serde_json::from_str(raw).unwrap();
        assert_eq!(test.retry, 0);
        assert_eq!(test.status, TestStatus::Passed);
    }
}
