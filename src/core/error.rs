// ============================================================================
// spark-query-sync - Errors
// Every failure is local to one key and reported, never thrown at the caller
// ============================================================================

use thiserror::Error;

/// A flattened key that cannot be split back into its path unambiguously.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Empty key cannot be split")]
    Empty,

    #[error("Ambiguous key '{key}': splits as {segments:?}")]
    Ambiguous { key: String, segments: Vec<String> },

    #[error("Array index {index} in key '{key}' exceeds the limit of {limit}")]
    IndexTooLarge {
        key: String,
        index: usize,
        limit: usize,
    },
}

impl KeyError {
    /// The offending key, if there is one
    pub fn key(&self) -> Option<&str> {
        match self {
            KeyError::Empty => None,
            KeyError::Ambiguous { key, .. } | KeyError::IndexTooLarge { key, .. } => Some(key),
        }
    }
}

/// Errors raised while binding a value to the query string.
///
/// The bindings log these at `warn` and carry on; the lower-level helpers
/// return them so callers can decide for themselves.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unsupported binding: {reason}")]
    Usage { reason: String },

    #[error("Query value for '{key}' is not valid JSON for this field: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value for '{key}' could not be encoded as JSON: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl SyncError {
    pub(crate) fn usage(reason: impl Into<String>) -> Self {
        SyncError::Usage {
            reason: reason.into(),
        }
    }

    /// The query key this error concerns, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            SyncError::Usage { .. } => None,
            SyncError::Decode { key, .. } | SyncError::Encode { key, .. } => Some(key),
            SyncError::Key(err) => err.key(),
        }
    }

    /// Check if this error came from a bad query value
    pub fn is_decode(&self) -> bool {
        matches!(self, SyncError::Decode { .. })
    }

    /// Check if this error came from an unsupported call
    pub fn is_usage(&self) -> bool {
        matches!(self, SyncError::Usage { .. })
    }

    /// Log the error as a non-fatal warning.
    pub(crate) fn report(&self) {
        tracing::warn!(key = self.key().unwrap_or(""), error = %self, "query sync skipped");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_carries_key() {
        let source = serde_json::from_str::<i32>("not-json").unwrap_err();
        let err = SyncError::Decode {
            key: "count".into(),
            source,
        };
        assert!(err.is_decode());
        assert!(!err.is_usage());
        assert_eq!(err.key(), Some("count"));
        assert!(err.to_string().contains("'count'"));
    }

    #[test]
    fn key_error_is_transparent() {
        let err: SyncError = KeyError::Ambiguous {
            key: "userID".into(),
            segments: vec!["user".into()],
        }
        .into();
        assert_eq!(err.key(), Some("userID"));
        assert!(err.to_string().starts_with("Ambiguous key 'userID'"));
    }

    #[test]
    fn usage_error_has_no_key() {
        let err = SyncError::usage("slot bound without a key");
        assert!(err.is_usage());
        assert_eq!(err.key(), None);
        assert_eq!(err.to_string(), "Unsupported binding: slot bound without a key");
    }
}
