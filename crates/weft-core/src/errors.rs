//! Unified error system for the weft workspace
//!
//! A single error enum keeps failure handling uniform across crates. The
//! `Unauthorized` message text is load-bearing: dependent tooling matches
//! it verbatim, so it must not change.

use serde::{Deserialize, Serialize};

/// Unified error type for all weft operations
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum WeftError {
    /// Signer lacks the capability required by the target log
    #[error("Could not append entry, key \"{key}\" is not allowed to write to the log")]
    Unauthorized {
        /// Identifier of the rejected signer
        key: String,
    },

    /// A persisted manifest could not be resolved from the object store
    #[error("Manifest resolution failed: {message}")]
    ManifestResolution {
        /// What could not be resolved
        message: String,
    },

    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Cryptographic operation failed
    #[error("Crypto error: {message}")]
    Crypto {
        /// Error message describing the cryptographic failure
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl WeftError {
    /// Create the unauthorized-append error for a rejected signer
    pub fn unauthorized_append(key: impl Into<String>) -> Self {
        Self::Unauthorized { key: key.into() }
    }

    /// Create a manifest resolution error
    pub fn manifest_resolution(message: impl Into<String>) -> Self {
        Self::ManifestResolution {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<serde_json::Error> for WeftError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(e.to_string())
    }
}

/// Result type used across the weft workspace
pub type Result<T> = std::result::Result<T, WeftError>;
