//! JSON payload codec for a node's service list

use bytes::Bytes;

use discovery_common::Result;

use crate::model::Service;

pub fn encode_services(services: &[Service]) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(services)?))
}

pub fn decode_services(payload: &[u8]) -> Result<Vec<Service>> {
    Ok(serde_json::from_slice(payload)?)
}
