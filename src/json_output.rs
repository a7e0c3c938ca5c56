//! JSON report envelope for downstream renderers and notifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cluster::FailureCluster;
use crate::model::TestResult;
use crate::stability::SuiteStats;

/// Format discriminator consumers key on.
pub const REPORT_FORMAT: &str = "flakehound-report-v1";

/// Root JSON report structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    /// Producing crate version
    pub version: String,
    /// Format name
    pub format: String,
    pub generated_at: DateTime<Utc>,
    /// Annotated per-test records
    pub tests: Vec<TestResult>,
    /// Suite roll-up
    pub summary: SuiteStats,
    /// Failure groups (if a clusterer was installed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<FailureCluster>>,
}

impl JsonReport {
    pub fn new(generated_at: DateTime<Utc>, tests: Vec<TestResult>, summary: SuiteStats) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: REPORT_FORMAT.to_string(),
            generated_at,
            tests,
            summary,
            clusters: None,
        }
    }

    pub fn with_clusters(mut self, clusters: Vec<FailureCluster>) -> Self {
        self.clusters = Some(clusters);
        self
    }
}
