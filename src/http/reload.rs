//! Hot-reload coordination.
//!
//! # Data Flow
//! ```text
//! watcher → validated GatewayConfig (unbounded channel)
//!     → apply(): build candidate RoutingGeneration off to the side
//!         ├─ ok  → atomic swap of the active generation
//!         └─ err → log and keep the active generation
//! ```
//!
//! # Design Decisions
//! - Requests never wait on a reload: they read whichever generation is
//!   active when they start and finish against it
//! - A failed build leaves the gateway serving the last good generation
//! - The loop ends when the update channel closes or shutdown fires

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};

use crate::config::schema::GatewayConfig;
use crate::http::generation::RoutingGeneration;
use crate::observability::metrics;

/// Applies validated config updates to the active generation.
pub struct ReloadCoordinator {
    active: Arc<ArcSwap<RoutingGeneration>>,
}

impl ReloadCoordinator {
    pub fn new(active: Arc<ArcSwap<RoutingGeneration>>) -> Self {
        Self { active }
    }

    /// Consume config updates until the channel closes or shutdown fires.
    pub async fn run(
        self,
        mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                maybe_config = updates.recv() => {
                    match maybe_config {
                        Some(config) => self.apply(config),
                        None => {
                            tracing::debug!("Config update channel closed, reload loop exiting");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Reload loop received shutdown signal");
                    break;
                }
            }
        }
    }

    /// Build and activate a new generation, or keep the current one.
    fn apply(&self, config: GatewayConfig) {
        match RoutingGeneration::build(&config.services) {
            Ok(generation) => {
                let services = generation.proxies.len();
                let routes = generation.table.len();
                self.active.store(Arc::new(generation));
                metrics::record_reload(true);
                tracing::info!(services, routes, "New routing generation activated");
            }
            Err(e) => {
                metrics::record_reload(false);
                tracing::error!(
                    error = %e,
                    "Rejected new configuration, keeping active generation"
                );
            }
        }
    }
}
