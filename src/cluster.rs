//! Failure clustering boundary
//!
//! Grouping failed tests by shared signature is a separate concern with its
//! own algorithms, ported independently of this engine. Implementations
//! receive the full annotated result set and return their groups; nothing
//! here constrains how they group.

use serde::{Deserialize, Serialize};

use crate::model::TestResult;

/// One group of related failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureCluster {
    /// Shared signature the implementation grouped on
    pub signature: String,
    pub test_ids: Vec<String>,
    pub count: usize,
}

/// Pluggable grouping strategy over a run's results.
pub trait FailureClusterer {
    fn cluster_failures(&self, results: &[TestResult]) -> Vec<FailureCluster>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TestStatus;
    use std::collections::BTreeMap;

    /// Minimal strategy for exercising the trait object seam: group failing
    /// tests by source file.
    struct ByFile;

    impl FailureClusterer for ByFile {
        fn cluster_failures(&self, results: &[TestResult]) -> Vec<FailureCluster> {
            let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for test in results {
                if test.status.is_failing() {
                    groups
                        .entry(test.file.clone())
                        .or_default()
                        .push(test.test_id.clone());
                }
            }
            groups
                .into_iter()
                .map(|(signature, test_ids)| FailureCluster {
                    signature,
                    count: test_ids.len(),
                    test_ids,
                })
                .collect()
        }
    }

    #[test]
    fn test_clusterer_receives_full_result_set() {
        let results = vec![
            TestResult::new("t1", "a", "auth.spec.ts", TestStatus::Failed, 10.0, 0),
            TestResult::new("t2", "b", "auth.spec.ts", TestStatus::TimedOut, 10.0, 0),
            TestResult::new("t3", "c", "cart.spec.ts", TestStatus::Passed, 10.0, 0),
        ];
        let clusterer: Box<dyn FailureClusterer> = Box::new(ByFile);
        let clusters = clusterer.cluster_failures(&results);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].signature, "auth.spec.ts");
        assert_eq!(clusters[0].count, 2);
        assert_eq!(clusters[0].test_ids, vec!["t1", "t2"]);
    }
}
