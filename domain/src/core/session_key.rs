//! Session key value object

use serde::{Deserialize, Serialize};

/// Opaque identifier that partitions independent sessions (Value Object)
///
/// Supplied by the caller, typically an already-authenticated identity.
/// The relay never interprets it beyond equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Try to create a session key, returning None if blank
    pub fn try_new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == key.len() {
            Some(Self(key))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_trims() {
        let key = SessionKey::try_new("  alice@example.com ").unwrap();
        assert_eq!(key.as_str(), "alice@example.com");
    }

    #[test]
    fn test_try_new_rejects_blank() {
        assert!(SessionKey::try_new("").is_none());
        assert!(SessionKey::try_new("   ").is_none());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let key = SessionKey::try_new("bob").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"bob\"");
    }
}
