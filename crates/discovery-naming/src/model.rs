//! Service discovery data models
//!
//! This module defines the announcement and service types:
//! - Node identity
//! - What a node announces
//! - The fully-qualified service records queries return

use std::{collections::BTreeMap, fmt};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an announcing node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Store key for this node: the hyphenated UUID in UTF-8
    pub fn to_key(&self) -> Bytes {
        Bytes::from(self.0.hyphenated().to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A service as returned by discovery queries
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub node_id: NodeId,
    #[serde(rename = "type")]
    pub service_type: String,
    pub pool: String,
    pub location: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Service {
    pub fn matches_type(&self, service_type: &str) -> bool {
        self.service_type == service_type
    }

    pub fn matches_pool(&self, pool: &str) -> bool {
        self.pool == pool
    }
}

/// One service declared inside a node's announcement
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicServiceAnnouncement {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DynamicServiceAnnouncement {
    pub fn new(service_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_type: service_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Qualify this declaration with the announcing node's identity and placement
    pub fn to_service(&self, node_id: NodeId, location: &str, pool: &str) -> Service {
        Service {
            id: self.id,
            node_id,
            service_type: self.service_type.clone(),
            pool: pool.to_string(),
            location: location.to_string(),
            properties: self.properties.clone(),
        }
    }
}

/// Everything a node announces in one registration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicAnnouncement {
    pub pool: String,
    pub location: String,
    #[serde(default)]
    pub service_announcements: Vec<DynamicServiceAnnouncement>,
}

impl DynamicAnnouncement {
    pub fn new(pool: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            pool: pool.into(),
            location: location.into(),
            service_announcements: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: DynamicServiceAnnouncement) -> Self {
        self.service_announcements.push(service);
        self
    }

    /// Expand every declaration into a fully-qualified [`Service`]
    pub fn to_services(&self, node_id: NodeId) -> Vec<Service> {
        self.service_announcements
            .iter()
            .map(|announcement| announcement.to_service(node_id, &self.location, &self.pool))
            .collect()
    }
}
