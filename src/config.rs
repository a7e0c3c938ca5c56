//! Analysis thresholds
//!
//! Every tunable the engine consults lives here, with the defaults the
//! analyzers document. Presets widen or tighten all bounds together.

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_MAX_HISTORY_RUNS;
use crate::{performance, retry, stability};

/// Thresholds for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Relative duration drift tolerated before a trend is called
    pub performance_threshold: f64,

    /// Derive the drift bound from baseline magnitude instead of the fixed
    /// value (see `performance::smart_threshold`)
    pub adaptive_threshold: bool,

    /// Retries in a single run that draw attention on their own
    pub retry_attention_threshold: u32,

    /// Composite score below which a test needs attention
    pub stability_attention_threshold: u8,

    /// Retention cap for every history collection
    pub max_history_runs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            performance_threshold: performance::DEFAULT_THRESHOLD,
            adaptive_threshold: false,
            retry_attention_threshold: retry::DEFAULT_ATTENTION_THRESHOLD,
            stability_attention_threshold: stability::DEFAULT_ATTENTION_THRESHOLD,
            max_history_runs: DEFAULT_MAX_HISTORY_RUNS,
        }
    }
}

impl AnalysisConfig {
    /// Tighter bounds: flag drifts and retries earlier, keep more history.
    pub fn strict() -> Self {
        Self {
            performance_threshold: 0.1,
            adaptive_threshold: true,
            retry_attention_threshold: 2,
            stability_attention_threshold: 80,
            max_history_runs: 20,
        }
    }

    /// Looser bounds for suites with known-noisy timing.
    pub fn permissive() -> Self {
        Self {
            performance_threshold: 0.35,
            adaptive_threshold: false,
            retry_attention_threshold: 5,
            stability_attention_threshold: 60,
            max_history_runs: DEFAULT_MAX_HISTORY_RUNS,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.performance_threshold > 0.0 && self.performance_threshold <= 1.0) {
            return Err(format!(
                "performance_threshold must be in (0, 1], got {}",
                self.performance_threshold
            ));
        }

        if self.retry_attention_threshold == 0 {
            return Err("retry_attention_threshold must be >= 1".to_string());
        }

        if self.stability_attention_threshold > 100 {
            return Err(format!(
                "stability_attention_threshold must be <= 100, got {}",
                self.stability_attention_threshold
            ));
        }

        if self.max_history_runs == 0 {
            return Err("max_history_runs must be >= 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.performance_threshold, 0.2);
        assert!(!config.adaptive_threshold);
        assert_eq!(config.retry_attention_threshold, 3);
        assert_eq!(config.stability_attention_threshold, 70);
        assert_eq!(config.max_history_runs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = AnalysisConfig::strict();
        assert_eq!(config.performance_threshold, 0.1);
        assert!(config.adaptive_threshold);
        assert_eq!(config.retry_attention_threshold, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = AnalysisConfig::permissive();
        assert_eq!(config.performance_threshold, 0.35);
        assert_eq!(config.retry_attention_threshold, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_performance_threshold() {
        let config = AnalysisConfig {
            performance_threshold: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_retry_threshold() {
        let config = AnalysisConfig {
            retry_attention_threshold: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_max_history_runs() {
        let config = AnalysisConfig {
            max_history_runs: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
