//! Worker process watchdog.
//!
//! The watchdog owns the worker process and is the only writer of its state. Every
//! transition is published as a whole `WatchdogSnapshot` through a `watch` channel, so
//! readers such as the health endpoint always observe a consistent pid / phase / exit code
//! triple and never block the monitoring loop.
//!
//! ```text
//! Stopped ──spawn──▶ Starting ──▶ Running ──exit observed──▶ Crashed
//!                        ▲                                       │
//!                        └──────────── after backoff ────────────┘
//! ```

pub mod process;

use std::time::Duration;

use tokio::sync::watch;

use crate::server::{
    config::WorkerCommand,
    error::watchdog::WatchdogError,
    model::watchdog::{WatchdogSnapshot, WorkerPhase},
};

use self::process::WorkerProcess;

pub struct Watchdog {
    command: WorkerCommand,
    poll_interval: Duration,
    backoff: Duration,
    state: watch::Sender<WatchdogSnapshot>,
    worker: Option<WorkerProcess>,
}

impl Watchdog {
    /// Creates a watchdog in the `Stopped` phase. Nothing is spawned until `run`.
    ///
    /// # Arguments
    /// - `command`: Worker program and arguments
    /// - `poll_interval`: Period between liveness polls of a running worker
    /// - `backoff`: Delay between an observed crash and the next spawn
    pub fn new(command: WorkerCommand, poll_interval: Duration, backoff: Duration) -> Self {
        let (state, _) = watch::channel(WatchdogSnapshot::default());

        Self {
            command,
            poll_interval,
            backoff,
            state,
            worker: None,
        }
    }

    /// Returns a receiver for state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<WatchdogSnapshot> {
        self.state.subscribe()
    }

    /// Runs the monitoring loop until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// Individual iterations never end the loop; their errors are logged and the loop
    /// carries on. On shutdown the worker is killed and the phase returns to `Stopped`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Watchdog supervising '{}' (poll every {:?}, restart backoff {:?})",
            self.command,
            self.poll_interval,
            self.backoff
        );

        while !*shutdown.borrow() {
            let wait = self.step().await;

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.stop_worker().await;
        tracing::info!("Watchdog stopped");
    }

    /// Performs one iteration and returns how long to wait before the next.
    async fn step(&mut self) -> Duration {
        let phase = self.state.borrow().phase;

        match phase {
            WorkerPhase::Stopped | WorkerPhase::Starting | WorkerPhase::Crashed => {
                match self.start_worker() {
                    Ok(()) => self.poll_interval,
                    Err(e) => {
                        tracing::error!("{}", e);
                        self.publish(|state| {
                            state.phase = WorkerPhase::Crashed;
                            state.pid = None;
                        });
                        self.backoff
                    }
                }
            }
            WorkerPhase::Running => match self.poll_worker().await {
                Ok(true) => self.backoff,
                Ok(false) => self.poll_interval,
                Err(e) => {
                    tracing::error!("{}", e);
                    self.poll_interval
                }
            },
        }
    }

    /// Spawns a worker unless one is already active.
    fn start_worker(&mut self) -> Result<(), WatchdogError> {
        let previous = self.state.borrow().phase;
        if previous.is_active() && self.worker.is_some() {
            tracing::debug!("Worker already {}, not spawning another", previous);
            return Ok(());
        }

        let is_restart = previous == WorkerPhase::Crashed;
        self.publish(|state| {
            state.phase = WorkerPhase::Starting;
            if is_restart {
                state.restarts += 1;
            }
        });

        let worker = WorkerProcess::spawn(&self.command)?;
        let pid = worker.pid();
        self.worker = Some(worker);

        self.publish(|state| {
            state.phase = WorkerPhase::Running;
            state.pid = Some(pid);
        });
        tracing::info!("Worker started with pid {}", pid);

        Ok(())
    }

    /// Checks whether the worker has exited.
    ///
    /// # Returns
    /// - `Ok(true)` - Worker exited; state moved to `Crashed` and its output was logged
    /// - `Ok(false)` - Worker still running
    /// - `Err(WatchdogError::Poll)` - Exit status could not be queried
    async fn poll_worker(&mut self) -> Result<bool, WatchdogError> {
        let Some(worker) = self.worker.as_mut() else {
            // Running without a handle cannot happen through `start_worker`; recover by
            // treating it as a crash so the next step respawns.
            self.publish(|state| state.phase = WorkerPhase::Crashed);
            return Ok(true);
        };

        let Some(status) = worker.try_wait()? else {
            return Ok(false);
        };

        let pid = worker.pid();
        let output = worker.captured_output().await;
        self.worker = None;

        let exit_code = status.code();
        self.publish(|state| {
            state.phase = WorkerPhase::Crashed;
            state.pid = None;
            state.last_exit_code = exit_code;
        });

        match exit_code {
            Some(code) => tracing::error!(
                "Worker {} exited with code {}, restarting in {:?}",
                pid,
                code,
                self.backoff
            ),
            None => tracing::error!(
                "Worker {} was terminated by a signal, restarting in {:?}",
                pid,
                self.backoff
            ),
        }
        if !output.stdout.is_empty() {
            tracing::warn!("Worker {} stdout before exit:\n{}", pid, output.stdout.join("\n"));
        }
        if !output.stderr.is_empty() {
            tracing::error!("Worker {} stderr before exit:\n{}", pid, output.stderr.join("\n"));
        }

        Ok(true)
    }

    async fn stop_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            tracing::info!("Stopping worker {}", worker.pid());
            worker.kill().await;
        }

        self.publish(|state| {
            state.phase = WorkerPhase::Stopped;
            state.pid = None;
        });
    }

    fn publish(&self, update: impl FnOnce(&mut WatchdogSnapshot)) {
        self.state.send_modify(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> WorkerCommand {
        WorkerCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<WatchdogSnapshot>,
        predicate: impl FnMut(&WatchdogSnapshot) -> bool,
    ) -> WatchdogSnapshot {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("watchdog did not reach the expected state in time")
            .expect("watchdog state channel closed")
            .clone()
    }

    /// Tests the crash and restart cycle.
    ///
    /// Verifies that a worker exiting with code 1 moves the state from Running to Crashed
    /// with the exit code recorded and the snapshot reported unhealthy, and that a new
    /// worker is spawned after the backoff.
    ///
    /// Expected: Running → Crashed (exit 1, unhealthy) → Running with restarts = 1
    #[tokio::test]
    async fn restarts_crashed_worker() {
        let watchdog = Watchdog::new(
            shell("sleep 0.2; exit 1"),
            Duration::from_millis(20),
            Duration::from_millis(300),
        );
        let mut rx = watchdog.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(watchdog.run(shutdown_rx));

        let running = wait_for(&mut rx, |s| s.phase == WorkerPhase::Running).await;
        assert!(running.is_healthy());
        assert!(running.pid.is_some());

        let crashed = wait_for(&mut rx, |s| s.phase == WorkerPhase::Crashed).await;
        assert_eq!(crashed.last_exit_code, Some(1));
        assert_eq!(crashed.pid, None);
        assert!(!crashed.is_healthy());

        let restarted =
            wait_for(&mut rx, |s| s.phase == WorkerPhase::Running && s.restarts == 1).await;
        assert!(restarted.pid.is_some());

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    /// Tests shutdown of a supervised long-running worker.
    ///
    /// Expected: loop exits, worker killed, phase Stopped without pid
    #[tokio::test]
    async fn shutdown_stops_worker() {
        let watchdog = Watchdog::new(
            shell("sleep 30"),
            Duration::from_millis(20),
            Duration::from_millis(20),
        );
        let mut rx = watchdog.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(watchdog.run(shutdown_rx));

        wait_for(&mut rx, |s| s.phase == WorkerPhase::Running).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let state = rx.borrow().clone();
        assert_eq!(state.phase, WorkerPhase::Stopped);
        assert_eq!(state.pid, None);
        assert_eq!(state.restarts, 0);
    }

    /// Tests the single-instance guard.
    ///
    /// Expected: a second start while running keeps the original worker
    #[tokio::test]
    async fn does_not_spawn_second_worker() {
        let mut watchdog = Watchdog::new(
            shell("sleep 30"),
            Duration::from_secs(30),
            Duration::from_secs(10),
        );
        let rx = watchdog.subscribe();

        watchdog.start_worker().unwrap();
        let first_pid = rx.borrow().pid;
        watchdog.start_worker().unwrap();

        assert_eq!(rx.borrow().pid, first_pid);
        assert_eq!(rx.borrow().phase, WorkerPhase::Running);

        watchdog.stop_worker().await;
    }

    /// Tests a worker command that cannot be executed.
    ///
    /// Verifies that spawn failures are absorbed by the loop and retried after the backoff
    /// instead of ending supervision.
    ///
    /// Expected: phase Crashed while the loop keeps running; shutdown still completes
    #[tokio::test]
    async fn spawn_failure_keeps_loop_alive() {
        let watchdog = Watchdog::new(
            WorkerCommand {
                program: "guard-shin-no-such-program".to_string(),
                args: Vec::new(),
            },
            Duration::from_millis(20),
            Duration::from_millis(20),
        );
        let mut rx = watchdog.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(watchdog.run(shutdown_rx));

        wait_for(&mut rx, |s| s.phase == WorkerPhase::Crashed && s.restarts >= 2).await;
        assert!(!handle.is_finished());

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    /// Tests state before the first spawn.
    ///
    /// Expected: Stopped and unhealthy
    #[test]
    fn initial_state_is_unhealthy() {
        let watchdog = Watchdog::new(shell("true"), Duration::from_secs(1), Duration::from_secs(1));
        let state = watchdog.subscribe().borrow().clone();

        assert_eq!(state.phase, WorkerPhase::Stopped);
        assert!(!state.is_healthy());
    }
}
