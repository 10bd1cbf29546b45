//! # Event Loop
//!
//! Owns the shutdown signal and the single task that applies bus events.
//!
//! ```text
//! transport callbacks ──publish──→ EventBus ──recv──→ event loop task
//!                                                    (SyncCoordinator::run or
//!                                                     AuthorityReconciler::run)
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use shared_bus::{EventFilter, EventSubscriber};

use crate::container::{Endpoint, SyncContainer};

/// Runtime for one sync process.
pub struct SyncRuntime {
    /// Subsystem container.
    container: Arc<SyncContainer>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Spawned event loop tasks.
    tasks: Vec<JoinHandle<()>>,
}

impl SyncRuntime {
    /// Wrap a built container.
    pub fn new(container: SyncContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    /// The container this runtime drives.
    pub fn container(&self) -> &Arc<SyncContainer> {
        &self.container
    }

    /// Catch up on state that arrived while the process was not running,
    /// then spawn the event loop.
    ///
    /// The bus subscription is taken before this returns, so events
    /// published afterwards are never missed.
    pub async fn start(&mut self) {
        info!(role = %self.container.config.role, "[runtime] Starting sync runtime");

        let shutdown = self.shutdown_rx.clone();

        let task = match &self.container.endpoint {
            Endpoint::Satellite(coordinator) => {
                let subscription = self.container.event_bus.subscribe(EventFilter::satellite());
                coordinator.start();
                let coordinator = Arc::clone(coordinator);
                tokio::spawn(async move { coordinator.run(subscription, shutdown).await })
            }
            Endpoint::Authority(reconciler) => {
                let subscription = self.container.event_bus.subscribe(EventFilter::authority());
                let report = reconciler.drain_deferred_actions();
                info!(
                    applied = report.applied,
                    failed = report.failed,
                    "[runtime] Startup drain finished"
                );
                if let Err(e) = reconciler.publish_snapshot().await {
                    warn!(error = %e, "[runtime] Startup snapshot publish failed");
                }
                let reconciler = Arc::clone(reconciler);
                tokio::spawn(async move { reconciler.run(subscription, shutdown).await })
            }
        };
        self.tasks.push(task);
    }

    /// Signal shutdown and wait for the event loop to finish.
    pub async fn shutdown(self) {
        info!("[runtime] Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[runtime] Failed to send shutdown signal: {}", e);
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("[runtime] Event loop task failed: {}", e);
            }
        }

        info!("[runtime] Shutdown complete");
    }
}
