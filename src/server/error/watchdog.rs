use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchdogError {
    /// The worker command could not be started.
    #[error("Failed to spawn worker '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The OS did not report a pid for a freshly spawned worker.
    #[error("Spawned worker '{0}' has no process id")]
    MissingPid(String),

    /// Polling the exit status of the worker failed.
    #[error("Failed to poll worker {pid}: {source}")]
    Poll {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}
