//! Synchronous append gate

use serde::{Deserialize, Serialize};

use weft_crypto::Identity;

/// Outcome of evaluating a signer against a gate
///
/// A denial carries a stable, human-readable reason naming the signer and
/// the capability it lacks, so the log can surface a consistent diagnostic
/// without re-reading the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision {
    /// The signer may append to the gated log
    Allow,
    /// The signer may not append; the string says why
    Deny(String),
}

impl AccessDecision {
    /// An allowing decision
    pub fn allow() -> Self {
        Self::Allow
    }

    /// A denying decision carrying its reason
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny(reason.into())
    }

    /// Whether the append may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The reason, when this decision is a denial
    pub fn denial_reason(&self) -> Option<&str> {
        match self {
            Self::Deny(reason) => Some(reason),
            Self::Allow => None,
        }
    }
}

/// Synchronous predicate consulted before any entry is accepted
///
/// Implementations must not block or perform I/O: the gate is evaluated on
/// the append path and reads an already-materialized snapshot.
pub trait AccessGate: Send + Sync {
    /// Evaluate whether `identity` may append to the gated log
    fn evaluate(&self, identity: &Identity) -> AccessDecision;
}

/// Gate that admits every signer, for ungoverned logs
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl AccessGate for OpenGate {
    fn evaluate(&self, _identity: &Identity) -> AccessDecision {
        AccessDecision::Allow
    }
}
