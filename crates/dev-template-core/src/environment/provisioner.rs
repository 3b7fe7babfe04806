//! Environment creation and best-effort package installation

use super::backend::EnvironmentBackend;
use super::outcome::InstallResult;
use super::package::PackageSpec;
use super::retry::RetryConfig;
use crate::error::EnvironmentError;
use crate::observer::ScaffoldObserver;
use crate::pipeline::ProjectPlan;
use std::collections::HashSet;
use std::path::Path;

/// Creates the isolated environment for a plan and installs packages into it.
pub struct EnvironmentProvisioner<B> {
    backend: B,
    retry: RetryConfig,
}

impl<B: EnvironmentBackend> EnvironmentProvisioner<B> {
    /// Create a provisioner with the default retry policy
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create the environment at `plan.env_path()`.
    ///
    /// Refuses to touch an existing path.
    pub async fn create_environment(&self, plan: &ProjectPlan) -> Result<(), EnvironmentError> {
        let env_path = plan.env_path();
        if env_path.exists() {
            return Err(EnvironmentError::AlreadyExists(env_path.to_path_buf()));
        }
        self.backend.create(env_path).await?;
        log::info!("Created environment at {}", env_path.display());
        Ok(())
    }

    /// Install every spec, one at a time, in order.
    ///
    /// A failure never stops the remaining installs. Specs naming a package
    /// that already appeared earlier in the list are skipped.
    pub async fn install_all(
        &self,
        plan: &ProjectPlan,
        specs: &[PackageSpec],
        observer: &dyn ScaffoldObserver,
    ) -> Vec<InstallResult> {
        let specs = dedup_specs(specs);
        let total = specs.len();
        let mut results = Vec::with_capacity(total);

        for (index, spec) in specs.into_iter().enumerate() {
            observer.package_started(&spec, index, total);
            let result = self.install_one(plan.env_path(), spec, observer).await;
            observer.package_finished(&result);
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        log::info!(
            "Installed {} of {} packages ({} failed)",
            total - failed,
            total,
            failed
        );
        results
    }

    async fn install_one(
        &self,
        env_path: &Path,
        spec: PackageSpec,
        observer: &dyn ScaffoldObserver,
    ) -> InstallResult {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.backend.install(env_path, &spec).await {
                Ok(version) => {
                    log::info!("Installed {} ({}) on attempt {}", spec.name, version, attempt);
                    return InstallResult::succeeded(spec, version, attempt);
                }
                Err(failure) => {
                    log::debug!("Install of {} failed: {}", spec, failure.detail);

                    // Only transient failures are worth another attempt
                    if !failure.reason.is_retryable() || attempt >= max_attempts {
                        log::warn!(
                            "Giving up on {} after {} attempt(s): {}",
                            spec,
                            attempt,
                            failure.reason
                        );
                        return InstallResult::failed(spec, failure.reason, attempt);
                    }

                    let delay = self.retry.delay_for_attempt(attempt - 1);
                    observer.package_retrying(&spec, attempt, max_attempts, failure.reason, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Keep the first spec for each normalized package name
fn dedup_specs(specs: &[PackageSpec]) -> Vec<PackageSpec> {
    let mut seen = HashSet::new();
    specs
        .iter()
        .filter(|spec| {
            let fresh = seen.insert(spec.normalized_name());
            if !fresh {
                log::warn!("Skipping duplicate package specifier '{}'", spec);
            }
            fresh
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::outcome::{FailureReason, InstallFailure};
    use crate::observer::NoObserver;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    /// Backend whose install outcomes are scripted per package name
    #[derive(Default)]
    struct FakeBackend {
        outcomes: RefCell<HashMap<String, VecDeque<Result<String, FailureReason>>>>,
        calls: RefCell<Vec<String>>,
        create_fails: bool,
    }

    impl FakeBackend {
        fn script(self, name: &str, outcomes: Vec<Result<&str, FailureReason>>) -> Self {
            self.outcomes.borrow_mut().insert(
                name.to_string(),
                outcomes
                    .into_iter()
                    .map(|o| o.map(str::to_string))
                    .collect(),
            );
            self
        }

        fn calls_for(&self, name: &str) -> usize {
            self.calls.borrow().iter().filter(|c| *c == name).count()
        }
    }

    impl EnvironmentBackend for FakeBackend {
        async fn create(&self, _env_path: &Path) -> Result<(), EnvironmentError> {
            if self.create_fails {
                return Err(EnvironmentError::ToolFailed {
                    code: 1,
                    stderr: "ensurepip is not available".to_string(),
                });
            }
            Ok(())
        }

        async fn install(
            &self,
            _env_path: &Path,
            spec: &PackageSpec,
        ) -> Result<String, InstallFailure> {
            self.calls.borrow_mut().push(spec.name.clone());
            let next = self
                .outcomes
                .borrow_mut()
                .get_mut(&spec.name)
                .and_then(VecDeque::pop_front);
            match next {
                Some(Ok(version)) => Ok(version),
                Some(Err(reason)) => Err(InstallFailure::new(reason, "scripted")),
                None => Err(InstallFailure::new(FailureReason::NotFound, "unscripted")),
            }
        }
    }

    fn plan() -> ProjectPlan {
        ProjectPlan::new("demo", std::env::temp_dir().join("dev-template-no-such-dir"), false)
            .unwrap()
    }

    #[tokio::test]
    async fn test_partial_success_keeps_going() {
        let backend = FakeBackend::default()
            .script("pytest", vec![Ok("8.2.0")])
            .script("not-a-real-pkg-xyz", vec![Err(FailureReason::NotFound)])
            .script("black", vec![Ok("24.1.0")]);
        let provisioner =
            EnvironmentProvisioner::new(backend).with_retry(RetryConfig::immediate(3));

        let specs = vec![
            PackageSpec::latest("pytest"),
            PackageSpec::pinned("not-a-real-pkg-xyz", "1.0"),
            PackageSpec::latest("black"),
        ];
        let results = provisioner.install_all(&plan(), &specs, &NoObserver).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert_eq!(results[1].failure_reason(), Some(FailureReason::NotFound));
        assert!(results[2].is_success());
        assert_eq!(results[2].resolved_version(), Some("24.1.0"));
    }

    #[tokio::test]
    async fn test_network_errors_are_retried() {
        let backend = FakeBackend::default().script(
            "requests",
            vec![
                Err(FailureReason::NetworkError),
                Err(FailureReason::NetworkError),
                Ok("2.32.0"),
            ],
        );
        let provisioner =
            EnvironmentProvisioner::new(backend).with_retry(RetryConfig::immediate(3));

        let results = provisioner
            .install_all(&plan(), &[PackageSpec::latest("requests")], &NoObserver)
            .await;

        assert!(results[0].is_success());
        assert_eq!(results[0].attempts(), 3);
        assert_eq!(provisioner.backend().calls_for("requests"), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let backend = FakeBackend::default().script(
            "flaky",
            vec![
                Err(FailureReason::NetworkError),
                Err(FailureReason::NetworkError),
                Err(FailureReason::NetworkError),
                Ok("1.0"),
            ],
        );
        let provisioner =
            EnvironmentProvisioner::new(backend).with_retry(RetryConfig::immediate(3));

        let results = provisioner
            .install_all(&plan(), &[PackageSpec::latest("flaky")], &NoObserver)
            .await;

        assert_eq!(results[0].failure_reason(), Some(FailureReason::NetworkError));
        assert_eq!(provisioner.backend().calls_for("flaky"), 3);
    }

    #[tokio::test]
    async fn test_terminal_failures_are_not_retried() {
        let backend = FakeBackend::default()
            .script("nope", vec![Err(FailureReason::NotFound), Ok("1.0")])
            .script("old", vec![Err(FailureReason::VersionConflict), Ok("1.0")])
            .script("odd", vec![Err(FailureReason::Unknown), Ok("1.0")]);
        let provisioner =
            EnvironmentProvisioner::new(backend).with_retry(RetryConfig::immediate(3));

        let specs = vec![
            PackageSpec::latest("nope"),
            PackageSpec::latest("old"),
            PackageSpec::latest("odd"),
        ];
        let results = provisioner.install_all(&plan(), &specs, &NoObserver).await;

        assert!(results.iter().all(|r| !r.is_success()));
        assert!(results.iter().all(|r| r.attempts() == 1));
        assert_eq!(provisioner.backend().calls_for("nope"), 1);
        assert_eq!(provisioner.backend().calls_for("old"), 1);
        assert_eq!(provisioner.backend().calls_for("odd"), 1);
    }

    #[tokio::test]
    async fn test_duplicates_install_once() {
        let backend = FakeBackend::default().script("pytest", vec![Ok("8.2.0")]);
        let provisioner = EnvironmentProvisioner::new(backend);

        let specs = vec![
            PackageSpec::latest("pytest"),
            PackageSpec::pinned("PyTest", "7.0.0"),
        ];
        let results = provisioner.install_all(&plan(), &specs, &NoObserver).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].spec().name, "pytest");
    }

    #[tokio::test]
    async fn test_create_refuses_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("demo_venv")).unwrap();
        let plan = ProjectPlan::new("demo", dir.path().to_path_buf(), false).unwrap();

        let provisioner = EnvironmentProvisioner::new(FakeBackend::default());
        let err = provisioner.create_environment(&plan).await.unwrap_err();
        assert!(matches!(err, EnvironmentError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_create_reports_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let plan = ProjectPlan::new("demo", dir.path().to_path_buf(), false).unwrap();
        let backend = FakeBackend {
            create_fails: true,
            ..Default::default()
        };

        let provisioner = EnvironmentProvisioner::new(backend);
        let err = provisioner.create_environment(&plan).await.unwrap_err();
        assert!(matches!(err, EnvironmentError::ToolFailed { code: 1, .. }));
    }
}
