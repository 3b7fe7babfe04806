//! Final report of a completed run

use super::plan::ProjectPlan;
use crate::environment::{FailureReason, InstallResult};
use std::path::PathBuf;

/// Everything a successful (possibly partial) run produced.
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub plan: ProjectPlan,
    /// Files rendered from templates
    pub files: Vec<PathBuf>,
    /// One result per distinct requested package, in request order
    pub results: Vec<InstallResult>,
    /// Manifest files rewritten from the results
    pub manifests: Vec<PathBuf>,
}

impl ScaffoldReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &InstallResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &InstallResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// True when every requested package installed
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }

    /// One-line count, e.g. `2 of 3 packages installed, 1 failed`
    pub fn summary(&self) -> String {
        let total = self.results.len();
        let ok = self.succeeded().count();
        match total - ok {
            0 => format!("{} of {} packages installed", ok, total),
            failed => format!("{} of {} packages installed, {} failed", ok, total, failed),
        }
    }

    /// `name: reason` for each failed package
    pub fn failure_lines(&self) -> Vec<String> {
        self.failed()
            .map(|r| {
                let reason = r.failure_reason().unwrap_or(FailureReason::Unknown);
                format!("{}: {}", r.spec(), reason.label())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PackageSpec;

    fn report(results: Vec<InstallResult>) -> ScaffoldReport {
        ScaffoldReport {
            plan: ProjectPlan::new("demo", PathBuf::from("/work"), false).unwrap(),
            files: Vec::new(),
            results,
            manifests: Vec::new(),
        }
    }

    #[test]
    fn test_partial_summary() {
        let report = report(vec![
            InstallResult::succeeded(PackageSpec::latest("pytest"), "8.2.0", 1),
            InstallResult::failed(
                PackageSpec::pinned("not-a-real-pkg-xyz", "1.0"),
                FailureReason::NotFound,
                1,
            ),
        ]);
        assert!(!report.is_complete());
        assert_eq!(report.summary(), "1 of 2 packages installed, 1 failed");
        assert_eq!(report.failure_lines(), vec!["not-a-real-pkg-xyz==1.0: not_found"]);
    }

    #[test]
    fn test_empty_request_is_complete() {
        let report = report(Vec::new());
        assert!(report.is_complete());
        assert_eq!(report.summary(), "0 of 0 packages installed");
    }
}
