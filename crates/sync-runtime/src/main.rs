//! # maintsync-node
//!
//! Satellite process entry point.
//!
//! - `wearable`: restore the cache, run the event loop until Ctrl+C.
//! - `widget`: one-shot read of the shared store, log what a glance would show.
//!
//! The authority role needs a canonical data store from its host application
//! and is only available through `SyncContainer::authority`.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use ms_03_transport_channel::LoopbackTransport;
use shared_bus::EventPublisher;
use sync_runtime::{NodeRole, RuntimeConfig, SyncContainer, SyncRuntime};
use sync_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;

    if let Err(e) = init_telemetry(&TelemetryConfig::for_role(config.role.as_str())) {
        eprintln!("logging disabled: {e}");
    }

    config.validate().context("Invalid configuration")?;

    info!("===========================================");
    info!("  maintsync-node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Role: {}", config.role);
    info!("  Data Dir: {:?}", config.data_dir);
    info!("===========================================");

    match config.role {
        NodeRole::Authority => bail!(
            "the authority role is hosted by the primary app (SyncContainer::authority); \
             set MS_PROCESS_ROLE to wearable or widget"
        ),
        NodeRole::Widget => run_widget(config),
        NodeRole::Wearable => run_wearable(config).await,
    }
}

/// Glance: read what the shared store holds right now.
fn run_widget(config: RuntimeConfig) -> Result<()> {
    // A widget never talks to the paired device; it hands off via the ledger.
    let (transport, _peer) = LoopbackTransport::pair(false);
    let container = SyncContainer::new(config, Arc::new(transport))
        .context("Failed to open shared store")?;
    let coordinator = container
        .coordinator()
        .context("widget container has no coordinator")?;

    coordinator.start();
    let status = coordinator.sync_status();

    match coordinator.cache().current() {
        Some(snapshot) => {
            info!(
                vehicle = %snapshot.display_name,
                mileage = snapshot.display_mileage(),
                unit = snapshot.distance_unit.abbreviation(),
                attention = snapshot.attention_needed().len(),
                "[runtime] Glance"
            );
        }
        None => info!("[runtime] No vehicle data yet"),
    }
    if status.is_stale {
        warn!(last_synced_at = ?status.last_synced_at, "[runtime] Cached data is stale");
    }
    info!(pending_actions = status.pending_actions, "[runtime] Sync status");
    Ok(())
}

/// Wearable: keep the cache current until Ctrl+C.
async fn run_wearable(config: RuntimeConfig) -> Result<()> {
    // No platform pairing layer here; the loopback link stays down and
    // mutations wait in its durable queue.
    let (transport, _peer) = LoopbackTransport::pair(false);
    let container = SyncContainer::new(config, Arc::new(transport.clone()))
        .context("Failed to open shared store")?;
    transport.attach_bus(container.event_bus.clone() as Arc<dyn EventPublisher>);

    let mut runtime = SyncRuntime::new(container);
    runtime.start().await;

    if let Some(coordinator) = runtime.container().coordinator() {
        let status = coordinator.sync_status();
        info!(
            cached = status.last_synced_at.is_some(),
            stale = status.is_stale,
            reachable = status.is_peer_reachable,
            "[runtime] Wearable ready"
        );
    }

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
