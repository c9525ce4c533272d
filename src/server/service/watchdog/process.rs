//! Worker process handle with captured output.

use std::{
    collections::VecDeque,
    process::{ExitStatus, Stdio},
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::{Child, Command},
    task::JoinHandle,
};

use crate::server::{config::WorkerCommand, error::watchdog::WatchdogError};

/// Lines of stdout/stderr kept per stream for crash reports.
pub const OUTPUT_TAIL_LINES: usize = 50;

/// How long to wait for the output readers to drain after the worker exits.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

type Tail = Arc<Mutex<VecDeque<String>>>;

/// Output captured from an exited worker.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

/// A running worker.
///
/// Both output pipes are drained continuously by background tasks: every line is forwarded
/// to the log under the `worker` target and the last `OUTPUT_TAIL_LINES` lines of each
/// stream are retained for postmortem logging.
pub struct WorkerProcess {
    child: Child,
    pid: u32,
    stdout_tail: Tail,
    stderr_tail: Tail,
    readers: Vec<JoinHandle<()>>,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl WorkerProcess {
    /// Spawns the worker with piped output.
    ///
    /// # Returns
    /// - `Ok(WorkerProcess)` - Worker started
    /// - `Err(WatchdogError::SpawnFailed)` - Program could not be executed
    /// - `Err(WatchdogError::MissingPid)` - Worker exited before its pid could be read
    pub fn spawn(command: &WorkerCommand) -> Result<Self, WatchdogError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| WatchdogError::SpawnFailed {
                command: command.to_string(),
                source,
            })?;

        let pid = child
            .id()
            .ok_or_else(|| WatchdogError::MissingPid(command.to_string()))?;

        let stdout_tail = Tail::default();
        let stderr_tail = Tail::default();
        let mut readers = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(
                stdout,
                Stream::Stdout,
                stdout_tail.clone(),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(
                stderr,
                Stream::Stderr,
                stderr_tail.clone(),
            )));
        }

        Ok(Self {
            child,
            pid,
            stdout_tail,
            stderr_tail,
            readers,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Polls the exit status without blocking.
    ///
    /// # Returns
    /// - `Ok(None)` - Worker still running
    /// - `Ok(Some(ExitStatus))` - Worker has exited
    /// - `Err(WatchdogError::Poll)` - Status could not be queried
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, WatchdogError> {
        self.child
            .try_wait()
            .map_err(|source| WatchdogError::Poll {
                pid: self.pid,
                source,
            })
    }

    /// Waits for the output readers to reach end of stream, then returns the retained tails.
    ///
    /// Bounded by a short timeout in case a grandchild process still holds the pipes open.
    pub async fn captured_output(&mut self) -> CapturedOutput {
        for reader in self.readers.drain(..) {
            if tokio::time::timeout(DRAIN_TIMEOUT, reader).await.is_err() {
                tracing::debug!("Worker {} output did not close in time", self.pid);
            }
        }

        CapturedOutput {
            stdout: snapshot(&self.stdout_tail),
            stderr: snapshot(&self.stderr_tail),
        }
    }

    /// Kills the worker and reaps it.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to kill worker {}: {}", self.pid, e);
        }
        for reader in self.readers.drain(..) {
            reader.abort();
        }
    }
}

async fn forward_lines<R>(pipe: R, stream: Stream, tail: Tail)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(pipe).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                match stream {
                    Stream::Stdout => tracing::info!(target: "worker", "{}", line),
                    Stream::Stderr => tracing::warn!(target: "worker", "{}", line),
                }

                let mut tail = tail.lock().unwrap_or_else(|e| e.into_inner());
                if tail.len() == OUTPUT_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Stopped reading worker output: {}", e);
                break;
            }
        }
    }
}

fn snapshot(tail: &Tail) -> Vec<String> {
    tail.lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .cloned()
        .collect()
}
