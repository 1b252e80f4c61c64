//! Store keys - reversible encoding of number plates into cache-safe keys.
//!
//! Plates are human-readable and may contain spaces, slashes and other
//! characters that break URL path segments or map keys. A plate is turned
//! into a key with `application/x-www-form-urlencoded` byte serialization:
//! ASCII alphanumerics and `*-._` are kept, a space becomes `+`, and every
//! other byte of the UTF-8 form becomes `%XX`.
//!
//! ```ignore
//! let key = carmart::key::encode("FML 23-25")?;
//! assert_eq!(key, "FML+23-25");
//! assert_eq!(carmart::key::decode(&key)?, "FML 23-25");
//! ```

use std::fmt;

use thiserror::Error;
use url::form_urlencoded;

/// Error raised when a plate cannot be encoded or a key cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("number plate is empty")]
    EmptyPlate,
    #[error("number plate {plate:?} contains illegal character {character:?}")]
    IllegalCharacter { plate: String, character: char },
    #[error("malformed store key {0:?}")]
    MalformedKey(String),
}

/// An encoded number plate, safe for use as a cache key or URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(String);

impl StoreKey {
    /// Derive the key for a plate.
    pub fn from_plate(plate: &str) -> Result<Self, KeyError> {
        encode(plate).map(StoreKey)
    }

    /// Accept a raw key read back from the cache. Only canonical keys
    /// (exactly what [`encode`] produces) are accepted.
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        decode(&raw)?;
        Ok(StoreKey(raw))
    }

    /// Recover the original plate.
    pub fn plate(&self) -> Result<String, KeyError> {
        decode(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encode a plate into its key form.
///
/// A legal plate is non-empty and free of control characters.
pub fn encode(plate: &str) -> Result<String, KeyError> {
    validate_plate(plate)?;
    Ok(form_urlencoded::byte_serialize(plate.as_bytes()).collect())
}

/// Decode a key back into the plate it was derived from.
///
/// Fails with [`KeyError::MalformedKey`] for anything `encode` could not
/// have produced: stray reserved characters, lowercase or truncated escapes,
/// escapes that do not form valid UTF-8.
pub fn decode(key: &str) -> Result<String, KeyError> {
    let malformed = || KeyError::MalformedKey(key.to_string());

    let mut pairs = form_urlencoded::parse(key.as_bytes());
    let plate = match (pairs.next(), pairs.next()) {
        (Some((name, value)), None) if value.is_empty() => name.into_owned(),
        _ => return Err(malformed()),
    };

    match encode(&plate) {
        Ok(canonical) if canonical == key => Ok(plate),
        _ => Err(malformed()),
    }
}

fn validate_plate(plate: &str) -> Result<(), KeyError> {
    if plate.is_empty() {
        return Err(KeyError::EmptyPlate);
    }
    if let Some(character) = plate.chars().find(|c| c.is_control()) {
        return Err(KeyError::IllegalCharacter {
            plate: plate.to_string(),
            character,
        });
    }
    Ok(())
}
