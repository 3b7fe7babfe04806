//! Progress notifications from a scaffolding run

use crate::environment::{FailureReason, InstallResult, PackageSpec};
use crate::pipeline::Stage;
use std::time::Duration;

/// Receives progress while the pipeline runs. Every method defaults to a no-op.
pub trait ScaffoldObserver {
    /// Called before the transition into `stage` starts
    fn stage_started(&self, _stage: Stage) {}

    /// Called once the transition into `stage` succeeded
    fn stage_finished(&self, _stage: Stage) {}

    /// Called before the first attempt at a package
    fn package_started(&self, _spec: &PackageSpec, _index: usize, _total: usize) {}

    /// Called when a transient failure is about to be retried
    ///
    /// `attempt` is the 1-indexed attempt that just failed.
    fn package_retrying(
        &self,
        _spec: &PackageSpec,
        _attempt: u32,
        _max_attempts: u32,
        _reason: FailureReason,
        _delay: Duration,
    ) {
    }

    /// Called with the final outcome for a package
    fn package_finished(&self, _result: &InstallResult) {}
}

/// Observer that ignores every notification.
pub struct NoObserver;

impl ScaffoldObserver for NoObserver {}
