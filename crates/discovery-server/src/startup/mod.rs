//! Component wiring and background task startup

mod logging;
mod shutdown;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use discovery_common::DiscoveryConfig;
use discovery_naming::{DynamicStore, ReplicatedDynamicStore};
use discovery_store::{
    DistributedStore, ExpirationMonitor, InMemoryStore, RemoteStore, ReplicatedStore,
};

pub use logging::{LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{ShutdownSignal, wait_for_termination};

/// The store stack of one registry replica
pub struct DiscoveryServer {
    config: DiscoveryConfig,
    local: Arc<InMemoryStore>,
    distributed: Arc<ReplicatedStore>,
    dynamic: Arc<ReplicatedDynamicStore>,
    shutdown: ShutdownSignal,
}

impl DiscoveryServer {
    /// Single replica with no peers
    pub fn standalone(config: DiscoveryConfig) -> Self {
        let local = Arc::new(InMemoryStore::new(&config));
        let distributed = Arc::new(ReplicatedStore::standalone(local.clone()));
        Self::assemble(config, local, distributed)
    }

    /// Replica that propagates writes, and relays replacements it receives, to `remote`
    pub fn replicated(config: DiscoveryConfig, remote: Arc<dyn RemoteStore>) -> Self {
        let local = Arc::new(InMemoryStore::new(&config));
        let distributed = Arc::new(ReplicatedStore::relayed(local.clone(), remote));
        Self::assemble(config, local, distributed)
    }

    fn assemble(
        config: DiscoveryConfig,
        local: Arc<InMemoryStore>,
        distributed: Arc<ReplicatedStore>,
    ) -> Self {
        let dynamic = Arc::new(ReplicatedDynamicStore::new(distributed.clone(), &config));
        Self {
            config,
            local,
            distributed,
            dynamic,
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// The local store; this is what the inbound side of a transport writes to
    pub fn local_store(&self) -> Arc<InMemoryStore> {
        self.local.clone()
    }

    pub fn distributed_store(&self) -> Arc<dyn DistributedStore> {
        self.distributed.clone()
    }

    pub fn dynamic_store(&self) -> Arc<dyn DynamicStore> {
        self.dynamic.clone()
    }

    /// Spawn background tasks. Returns the expiration monitor's handle when enabled.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if !self.config.expiration_enabled {
            info!("Expiration monitor disabled; max age is advisory");
            return None;
        }

        let monitor = ExpirationMonitor::new(self.local.clone(), self.config.expiration_interval);
        let shutdown = self.shutdown.subscribe();
        Some(tokio::spawn(async move { monitor.start(shutdown).await }))
    }

    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }
}
