// src/scheduler/package_state.rs

/// Flags the scheduler keeps for one in-scope package.
///
/// Invariants maintained by [`BuildScheduler`](super::BuildScheduler):
/// - `build_requested` and `build_running` are never both set;
/// - `build_dirty` is only set while `build_running` is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageState {
    /// Sources and build output are known to be out of sync.
    pub dirty: bool,
    /// A `BuildRequested` went out and no `BuildStarted` has come back yet.
    pub build_requested: bool,
    /// A build is in flight.
    pub build_running: bool,
    /// Sources changed while the in-flight build was running, so its result
    /// will be stale.
    pub build_dirty: bool,
    /// The last completed build exited non-zero.
    pub failed: bool,
}

impl PackageState {
    /// Safe for dependents to build against.
    pub fn is_clean(&self) -> bool {
        !self.dirty && !self.failed
    }

    /// Dirty and not already on its way through the executor.
    pub fn is_candidate(&self) -> bool {
        self.dirty && !self.build_requested && !self.build_running
    }

    /// Whether a build for this package is requested or running.
    pub fn in_flight(&self) -> bool {
        self.build_requested || self.build_running
    }

    pub fn status(&self) -> PackageStatus {
        if self.build_running {
            PackageStatus::Running
        } else if self.build_requested {
            PackageStatus::Requested
        } else if self.dirty {
            PackageStatus::Dirty
        } else if self.failed {
            PackageStatus::Failed
        } else {
            PackageStatus::Clean
        }
    }
}

/// Coarse, read-only summary of a [`PackageState`] for logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Clean,
    Dirty,
    Requested,
    Running,
    /// Last build failed and nothing changed since.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_packages_are_not_clean() {
        let state = PackageState {
            failed: true,
            ..PackageState::default()
        };
        assert!(!state.is_clean());
        assert_eq!(state.status(), PackageStatus::Failed);
    }

    #[test]
    fn running_takes_precedence_in_status() {
        let state = PackageState {
            dirty: true,
            build_running: true,
            build_dirty: true,
            ..PackageState::default()
        };
        assert_eq!(state.status(), PackageStatus::Running);
        assert!(!state.is_candidate());
        assert!(state.in_flight());
    }
}
