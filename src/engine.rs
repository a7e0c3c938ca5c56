//! Run orchestration: history in, annotated results and stats out
//!
//! The engine owns the analysis order. Per test: flakiness, then performance
//! (fixed or magnitude-adaptive threshold), then the retry ladder, then the
//! composite score. Tests are handled one at a time in arrival order; each
//! invocation reads only that test's history slice and writes only that
//! test's record.

use chrono::{DateTime, Utc};

use crate::cluster::{FailureCluster, FailureClusterer};
use crate::config::AnalysisConfig;
use crate::history::{HistoryError, HistoryStore, RunMeta, RunSummary};
use crate::model::TestResult;
use crate::stability::SuiteStats;
use crate::{flakiness, performance, retry, stability};

pub struct StabilityEngine {
    config: AnalysisConfig,
    store: HistoryStore,
    clusterer: Option<Box<dyn FailureClusterer>>,
}

impl StabilityEngine {
    pub fn new(store: HistoryStore, config: AnalysisConfig) -> Self {
        Self {
            config,
            store,
            clusterer: None,
        }
    }

    /// Install a grouping strategy for `cluster_failures`.
    pub fn with_clusterer(mut self, clusterer: Box<dyn FailureClusterer>) -> Self {
        self.clusterer = Some(clusterer);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Annotate one test from its history slice.
    pub fn annotate(&self, test: &mut TestResult) {
        let history = self.store.entries_for(&test.test_id);

        flakiness::analyze(test, history);

        let threshold = if self.config.adaptive_threshold {
            performance::baseline_average(history)
                .map_or(self.config.performance_threshold, performance::smart_threshold)
        } else {
            self.config.performance_threshold
        };
        performance::analyze(test, history, threshold);

        retry::analyze(test, history, self.config.retry_attention_threshold);
        stability::score_test(test, self.config.stability_attention_threshold);
    }

    /// Fold the finished run into history, persist it atomically, and return
    /// the suite-level statistics.
    pub fn complete_run(
        &mut self,
        run_id: &str,
        timestamp: DateTime<Utc>,
        results: &[TestResult],
    ) -> Result<SuiteStats, HistoryError> {
        let stats = stability::suite_stats(results);
        let summary = RunSummary {
            run_id: run_id.to_string(),
            timestamp,
            total: stats.total,
            passed: stats.passed,
            failed: stats.failed,
            skipped: stats.skipped,
            flaky: stats.flaky,
            slow: stats.slow,
            duration: stats.duration,
            pass_rate: stats.pass_rate,
        };
        let meta = RunMeta {
            run_id: run_id.to_string(),
            timestamp,
        };
        self.store.record_run(meta, results, summary);
        self.store.save()?;
        Ok(stats)
    }

    /// Delegate grouping to the installed clusterer; empty without one.
    pub fn cluster_failures(&self, results: &[TestResult]) -> Vec<FailureCluster> {
        self.clusterer
            .as_ref()
            .map(|clusterer| clusterer.cluster_failures(results))
            .unwrap_or_default()
    }
}
