//! Worker supervision state.

use std::fmt;

/// Lifecycle phase of the supervised worker.
///
/// Transitions: `Stopped → Starting → Running → Crashed → Starting → ...`. A shutdown request
/// moves any phase to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerPhase {
    #[default]
    Stopped,
    Starting,
    Running,
    Crashed,
}

impl WorkerPhase {
    /// A worker exists (or is being created) in these phases, so another must not be spawned.
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerPhase::Starting | WorkerPhase::Running)
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkerPhase::Stopped => "stopped",
            WorkerPhase::Starting => "starting",
            WorkerPhase::Running => "running",
            WorkerPhase::Crashed => "crashed",
        })
    }
}

/// Consistent view of the watchdog, published as a whole on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchdogSnapshot {
    pub phase: WorkerPhase,
    pub pid: Option<u32>,
    /// Exit code of the most recently observed worker exit. `None` if the worker was
    /// killed by a signal or has never exited.
    pub last_exit_code: Option<i32>,
    /// Number of times a worker has been respawned after a crash.
    pub restarts: u32,
}

impl WatchdogSnapshot {
    /// Liveness predicate shared by `/health` and the status page.
    pub fn is_healthy(&self) -> bool {
        self.phase == WorkerPhase::Running
    }
}
