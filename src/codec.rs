//! Value codecs for records stored in the cache.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Wire format of cached values. Every process sharing a namespace must
/// agree on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// JSON via `serde_json`. Readable by non-Rust consumers of the cache.
    #[default]
    Json,
    /// Compact binary via `bitcode`.
    Bitcode,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode codec error: {0}")]
    Bitcode(#[from] bitcode::Error),
}

impl ValueFormat {
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            ValueFormat::Json => Ok(serde_json::to_vec(value)?),
            ValueFormat::Bitcode => Ok(bitcode::serialize(value)?),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            ValueFormat::Json => Ok(serde_json::from_slice(bytes)?),
            ValueFormat::Bitcode => Ok(bitcode::deserialize(bytes)?),
        }
    }
}
