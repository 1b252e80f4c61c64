use thiserror::Error;

use crate::cache::CacheError;
use crate::codec::CodecError;
use crate::key::KeyError;

/// Error type for record store operations.
///
/// A missing record is not an error; lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A plate could not be encoded, or a stored key could not be decoded.
    #[error(transparent)]
    Encoding(#[from] KeyError),
    /// The backing cache could not be reached or failed the operation.
    #[error(transparent)]
    CacheUnavailable(#[from] CacheError),
    /// A record holds a value that cannot be stored and read back.
    #[error("invalid record for plate `{plate}`: {reason}")]
    InvalidRecord { plate: String, reason: String },
    /// A record could not be converted to or from its cached bytes.
    #[error("record codec failed for key `{key}`: {source}")]
    Codec {
        key: String,
        #[source]
        source: CodecError,
    },
}
