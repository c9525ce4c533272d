//! Process entry points for the supervisor and worker modes.

use std::sync::Arc;

use tokio::{net::TcpListener, sync::watch};
use tracing_subscriber::EnvFilter;

use crate::server::{
    bot::{self, gateway::SerenityGateway},
    config::{SupervisorConfig, WorkerConfig},
    data::{entitlement::EntitlementStore, update_event::UpdateEventStore},
    error::AppError,
    router,
    scheduler::premium_sweep,
    service::{gateway::GuildGateway, reconciler::EntitlementReconciler, watchdog::Watchdog},
    state::{SupervisorState, WorkerState},
};

const DEFAULT_LOG_FILTER: &str = "info,serenity=warn";

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `info` with serenity's chatter
/// reduced to warnings.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}

/// Runs the supervisor: the worker watchdog plus the health server.
///
/// Returns once a termination signal has been received, the health server has drained and
/// the worker has been stopped.
///
/// # Returns
/// - `Ok(())` - Clean shutdown
/// - `Err(AppError::ConfigErr)` - Missing or invalid configuration; nothing was started
/// - `Err(AppError::IoErr)` - Health server port could not be bound
pub async fn run_supervisor() -> Result<(), AppError> {
    let config = SupervisorConfig::from_env()?;

    let watchdog = Watchdog::new(config.worker.clone(), config.poll_interval, config.backoff);
    let state = SupervisorState::new(watchdog.subscribe());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    spawn_signal_listener(shutdown_tx.clone());

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Health server listening on port {}", config.port);

    let watchdog_task = tokio::spawn(watchdog.run(shutdown_rx.clone()));

    let served = axum::serve(listener, router::health_router(state))
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await;

    // The server can only stop on its own because of an error; stop the worker either way.
    shutdown_tx.send_replace(true);
    if let Err(e) = watchdog_task.await {
        tracing::error!("Watchdog task failed: {}", e);
    }

    served?;
    tracing::info!("Supervisor stopped");

    Ok(())
}

/// Runs the worker: Discord bot, premium sweep scheduler and webhook server.
///
/// The worker stops when a termination signal arrives, when a restart is requested via the
/// update webhook, or when the bot's gateway connection ends. In-flight reconciliation is
/// allowed to finish before the process exits.
pub async fn run_worker() -> Result<(), AppError> {
    let config = WorkerConfig::from_env()?;

    let store = EntitlementStore::new(&config.premium_file);
    let updates = UpdateEventStore::new(&config.updates_file);

    let client = bot::start::init_bot(&config, store.clone()).await?;
    let shard_manager = client.shard_manager.clone();
    let gateway: Arc<dyn GuildGateway> = Arc::new(SerenityGateway::new(
        client.http.clone(),
        client.cache.clone(),
    ));

    let reconciler = Arc::new(EntitlementReconciler::new(
        store,
        updates,
        gateway.clone(),
        config.notification_timeout,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    spawn_signal_listener(shutdown_tx.clone());

    // Start Discord bot in a separate task; losing the gateway ends the worker so the
    // supervisor can start a fresh one.
    let bot_shutdown = shutdown_tx.clone();
    let bot_task = tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(client).await {
            tracing::error!("Discord bot error: {}", e);
        }
        bot_shutdown.send_replace(true);
    });

    let mut scheduler = premium_sweep::start_scheduler(reconciler.clone()).await?;

    let state = WorkerState {
        reconciler: reconciler.clone(),
        gateway,
        stripe_webhook_secret: config.stripe_webhook_secret.as_deref().map(Arc::from),
        update_webhook_secret: config.update_webhook_secret.as_deref().map(Arc::from),
        register_commands: config.register_commands,
        shutdown: shutdown_tx.clone(),
    };
    if state.stripe_webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set, payment webhook disabled");
    }
    if state.update_webhook_secret.is_none() {
        tracing::warn!("UPDATE_WEBHOOK_SECRET not set, update webhook disabled");
    }

    let listener = TcpListener::bind(("0.0.0.0", config.webhook_port)).await?;
    tracing::info!("Webhook server listening on port {}", config.webhook_port);

    let served = axum::serve(listener, router::webhook_router(state))
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await;
    shutdown_tx.send_replace(true);

    tracing::info!("Shutting down worker");
    if let Err(e) = scheduler.shutdown().await {
        tracing::error!("Failed to stop premium sweep scheduler: {}", e);
    }
    reconciler.wait_idle().await;
    shard_manager.shutdown_all().await;
    if let Err(e) = bot_task.await {
        tracing::error!("Discord bot task failed: {}", e);
    }

    served?;
    tracing::info!("Worker stopped");

    Ok(())
}

/// Flips `shutdown` to `true` on SIGINT or SIGTERM.
fn spawn_signal_listener(shutdown: Arc<watch::Sender<bool>>) {
    tokio::spawn(async move {
        termination_signal().await;
        shutdown.send_replace(true);
    });
}

async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                    _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
                }
                return;
            }
            Err(e) => tracing::warn!("Failed to register SIGTERM handler: {}", e),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received SIGINT"),
        Err(e) => {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves once `shutdown` is `true` or its sender is gone.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
