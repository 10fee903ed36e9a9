//! Snapshot-backed access gates

use parking_lot::RwLock;
use std::sync::Arc;

use weft_crypto::Identity;
use weft_log::{AccessDecision, AccessGate};

use crate::capability::{Capability, CapabilitySet};

/// Shared, swappable capability snapshot
///
/// Readers take a cheap `Arc` clone of the current snapshot; recomputation
/// replaces the whole `Arc`, so a reader never observes a half-applied set.
#[derive(Debug, Default)]
pub struct SharedSnapshot {
    inner: RwLock<Arc<CapabilitySet>>,
}

impl SharedSnapshot {
    /// Create a snapshot holder with an initial set
    pub fn new(set: CapabilitySet) -> Self {
        Self {
            inner: RwLock::new(Arc::new(set)),
        }
    }

    /// The current snapshot
    pub fn load(&self) -> Arc<CapabilitySet> {
        self.inner.read().clone()
    }

    /// Replace the snapshot wholesale
    pub fn store(&self, set: Arc<CapabilitySet>) {
        *self.inner.write() = set;
    }
}

/// Gate admitting signers that hold one required capability
///
/// Evaluation is a synchronous read of the shared snapshot: no I/O, no
/// blocking, safe to call on every append path.
pub struct CapabilityGate {
    snapshot: Arc<SharedSnapshot>,
    required: Capability,
}

impl CapabilityGate {
    /// Create a gate requiring `required` from the shared snapshot
    pub fn new(snapshot: Arc<SharedSnapshot>, required: Capability) -> Self {
        Self { snapshot, required }
    }

    /// The capability this gate requires
    pub fn required(&self) -> Capability {
        self.required
    }
}

impl AccessGate for CapabilityGate {
    fn evaluate(&self, identity: &Identity) -> AccessDecision {
        let set = self.snapshot.load();
        if set.contains(self.required, identity.key()) {
            AccessDecision::allow()
        } else {
            AccessDecision::deny(format!(
                "key \"{}\" does not hold the {} capability",
                identity.id, self.required
            ))
        }
    }
}
