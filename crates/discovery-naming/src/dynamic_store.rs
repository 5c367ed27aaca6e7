//! Dynamic announcement store
//!
//! Each node's announcement is stored as one entry keyed by the node id, whose
//! value is the JSON list of that node's services. Reads rebuild the global
//! service set from every live entry on the local replica.

use std::{collections::HashSet, sync::Arc, time::Duration};

use tracing::{debug, warn};

use discovery_common::{DiscoveryConfig, Result};
use discovery_store::DistributedStore;

use crate::{
    codec::{decode_services, encode_services},
    model::{DynamicAnnouncement, NodeId, Service},
};

/// Announcement registry capability set
pub trait DynamicStore: Send + Sync {
    /// Replace `node_id`'s announcement. Returns whether the local replica changed.
    fn put(&self, node_id: NodeId, announcement: &DynamicAnnouncement) -> Result<bool>;

    /// Withdraw `node_id`'s announcement. Returns whether the local replica removed it.
    fn delete(&self, node_id: NodeId) -> Result<bool>;

    /// Every announced service, duplicates collapsed
    fn get_all(&self) -> HashSet<Service>;

    /// Services whose type is exactly `service_type`
    fn get_by_type(&self, service_type: &str) -> HashSet<Service> {
        self.get_all()
            .into_iter()
            .filter(|service| service.matches_type(service_type))
            .collect()
    }

    /// Services whose type is exactly `service_type` and pool exactly `pool`
    fn get_by_type_and_pool(&self, service_type: &str, pool: &str) -> HashSet<Service> {
        self.get_all()
            .into_iter()
            .filter(|service| service.matches_type(service_type) && service.matches_pool(pool))
            .collect()
    }
}

/// [`DynamicStore`] that writes through a [`DistributedStore`]
pub struct ReplicatedDynamicStore {
    store: Arc<dyn DistributedStore>,
    max_age: Duration,
}

impl ReplicatedDynamicStore {
    pub fn new(store: Arc<dyn DistributedStore>, config: &DiscoveryConfig) -> Self {
        Self {
            store,
            max_age: config.max_age,
        }
    }
}

impl DynamicStore for ReplicatedDynamicStore {
    fn put(&self, node_id: NodeId, announcement: &DynamicAnnouncement) -> Result<bool> {
        let services = announcement.to_services(node_id);
        let value = encode_services(&services)?;

        let changed = self.store.put(node_id.to_key(), value, self.max_age)?;
        debug!(
            "Stored announcement for node {}: services={}, changed={}",
            node_id,
            services.len(),
            changed
        );
        Ok(changed)
    }

    fn delete(&self, node_id: NodeId) -> Result<bool> {
        let removed = self.store.delete(node_id.to_key())?;
        debug!("Deleted announcement for node {}: removed={}", node_id, removed);
        Ok(removed)
    }

    fn get_all(&self) -> HashSet<Service> {
        let mut services = HashSet::new();
        for entry in self.store.get_all() {
            match decode_services(entry.value()) {
                Ok(decoded) => services.extend(decoded),
                Err(e) => warn!(
                    "Skipping undecodable announcement for key {}: {}",
                    String::from_utf8_lossy(entry.key()),
                    e
                ),
            }
        }
        services
    }
}
