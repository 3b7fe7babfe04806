//! Pipeline stages and their failure cleanup policy

use std::fmt;

/// Pipeline states, in the order a run passes through them.
///
/// Each variant names the state reached once its entry transition succeeds,
/// so `Stage::TemplatesCopied` failing means "copying templates failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Init,
    ConfigValidated,
    DirsCreated,
    TemplatesCopied,
    EnvCreated,
    PackagesInstalled,
    ManifestsWritten,
    Done,
}

/// What to undo when the transition into a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Nothing has touched the filesystem yet
    Nothing,
    /// Remove the project tree this run created
    RemoveProjectTree,
    /// Leave every file in place so the user can finish by hand
    KeepFiles,
}

impl Stage {
    /// Every stage in pipeline order
    pub const ALL: [Stage; 8] = [
        Stage::Init,
        Stage::ConfigValidated,
        Stage::DirsCreated,
        Stage::TemplatesCopied,
        Stage::EnvCreated,
        Stage::PackagesInstalled,
        Stage::ManifestsWritten,
        Stage::Done,
    ];

    /// The stage that follows this one, if any
    pub fn next(self) -> Option<Stage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// Cleanup hook for a failed transition into this stage.
    ///
    /// Before any user-visible files exist a failure rolls the project tree
    /// back; once templates are on disk nothing is removed.
    pub fn failure_cleanup(self) -> Cleanup {
        match self {
            Stage::Init | Stage::ConfigValidated => Cleanup::Nothing,
            Stage::DirsCreated | Stage::TemplatesCopied => Cleanup::RemoveProjectTree,
            Stage::EnvCreated
            | Stage::PackagesInstalled
            | Stage::ManifestsWritten
            | Stage::Done => Cleanup::KeepFiles,
        }
    }

    /// Present-tense description of the transition into this stage
    pub fn activity(self) -> &'static str {
        match self {
            Stage::Init => "starting",
            Stage::ConfigValidated => "validating configuration",
            Stage::DirsCreated => "creating project directories",
            Stage::TemplatesCopied => "copying templates",
            Stage::EnvCreated => "creating the virtual environment",
            Stage::PackagesInstalled => "installing packages",
            Stage::ManifestsWritten => "writing dependency manifests",
            Stage::Done => "finishing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.activity())
    }
}
