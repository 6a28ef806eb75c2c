//! Job payload codecs
//!
//! Job bodies are raw bytes on the wire. Structured values go through a
//! codec picked when the client is built: JSON for bodies other consumers
//! can read, bincode for compact Rust-to-Rust queues.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Serialization format for structured job payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadCodec {
    Json,
    Bincode,
}

impl PayloadCodec {
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes> {
        let encoded = match self {
            PayloadCodec::Json => {
                serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))?
            }
            PayloadCodec::Bincode => {
                bincode::serialize(value).map_err(|e| Error::Encode(e.to_string()))?
            }
        };
        Ok(Bytes::from(encoded))
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self {
            PayloadCodec::Json => {
                serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))
            }
            PayloadCodec::Bincode => {
                bincode::deserialize(bytes).map_err(|e| Error::Decode(e.to_string()))
            }
        }
    }
}
