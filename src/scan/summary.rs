use serde::Serialize;

use super::model::{CheckResult, CheckStatus};

/// Counts of results by status
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub pass_count: usize,
    pub fail_count: usize,
    pub warning_count: usize,
    pub total: usize,
}

pub fn summarize(results: &[CheckResult]) -> ScanSummary {
    results
        .iter()
        .fold(ScanSummary::default(), |mut summary, result| {
            match result.status {
                CheckStatus::Pass => summary.pass_count += 1,
                CheckStatus::Fail => summary.fail_count += 1,
                CheckStatus::Warning => summary.warning_count += 1,
            }
            summary.total += 1;
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(summarize(&[]), ScanSummary::default());
    }

    #[test]
    fn test_counts_by_status() {
        let results = vec![
            CheckResult::pass("a", ""),
            CheckResult::fail("b", ""),
            CheckResult::warning("c", ""),
            CheckResult::pass("d", ""),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.pass_count, 2);
        assert_eq!(summary.fail_count, 1);
        assert_eq!(summary.warning_count, 1);
        assert_eq!(
            summary.pass_count + summary.fail_count + summary.warning_count,
            summary.total
        );
    }
}
