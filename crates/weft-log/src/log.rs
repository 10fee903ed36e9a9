//! The gated, replicated log
//!
//! State is a grow-only DAG of verified entries plus a pending pool for
//! entries whose causal predecessors have not arrived yet. All mutation
//! happens under one lock; object-store writes happen outside it.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use weft_core::{EntryId, LogAddress, Result, WeftError};
use weft_crypto::{IdentityAuthority, Keypair};
use weft_store::{put_block, ObjectStore};

use crate::entry::Entry;
use crate::gate::AccessGate;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notifications emitted by a log
#[derive(Debug, Clone)]
pub enum LogEvent {
    /// A local append was accepted
    Appended {
        /// Identifier of the new entry
        id: EntryId,
    },
    /// A replication round applied entries received from a peer
    Replicated {
        /// Number of entries applied in this round
        applied: usize,
    },
}

struct LogState<T> {
    entries: BTreeMap<EntryId, Entry<T>>,
    heads: BTreeSet<EntryId>,
    /// Verified entries parked until their predecessors arrive
    pending: BTreeMap<EntryId, Entry<T>>,
}

impl<T> LogState<T> {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            heads: BTreeSet::new(),
            pending: BTreeMap::new(),
        }
    }

    fn knows_parents(&self, entry: &Entry<T>) -> bool {
        entry
            .parents
            .iter()
            .all(|parent| self.entries.contains_key(parent))
    }

    fn apply(&mut self, entry: Entry<T>) {
        for parent in &entry.parents {
            self.heads.remove(parent);
        }
        self.heads.insert(entry.id);
        self.entries.insert(entry.id, entry);
    }
}

/// A gated, replicated append-only log
///
/// `T` is the entry payload. The log persists entry blocks to its object
/// store, checks its [`AccessGate`] on every append path, and emits
/// [`LogEvent`]s to broadcast subscribers.
pub struct Log<T> {
    address: LogAddress,
    store: Arc<dyn ObjectStore>,
    gate: Arc<dyn AccessGate>,
    authority: Arc<dyn IdentityAuthority>,
    state: RwLock<LogState<T>>,
    events: broadcast::Sender<LogEvent>,
}

impl<T> Log<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    /// Create an empty log bound to an address, store, gate, and authority
    pub fn new(
        address: LogAddress,
        store: Arc<dyn ObjectStore>,
        gate: Arc<dyn AccessGate>,
        authority: Arc<dyn IdentityAuthority>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            address,
            store,
            gate,
            authority,
            state: RwLock::new(LogState::new()),
            events,
        }
    }

    /// The address this log is bound to
    pub fn address(&self) -> &LogAddress {
        &self.address
    }

    /// Subscribe to log notifications
    pub fn events(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }

    /// Number of applied entries
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the log holds no applied entries
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Current head entry identifiers
    pub fn heads(&self) -> BTreeSet<EntryId> {
        self.state.read().heads.clone()
    }

    /// Whether an entry has been applied
    pub fn contains(&self, id: &EntryId) -> bool {
        self.state.read().entries.contains_key(id)
    }

    /// Number of entries parked for missing predecessors
    pub fn pending_len(&self) -> usize {
        self.state.read().pending.len()
    }

    /// Append a locally created entry
    ///
    /// The gate is evaluated synchronously before anything else; on denial
    /// the log is left exactly as it was. On success the entry is linked to
    /// the current heads, persisted, applied, and announced.
    pub async fn append(&self, payload: T, signer: &Keypair) -> Result<EntryId> {
        if let Some(reason) = self.gate.evaluate(signer.identity()).denial_reason() {
            warn!(
                log = %self.address,
                key = %signer.identity().id,
                reason = reason,
                "append rejected"
            );
            return Err(WeftError::unauthorized_append(signer.identity().id.clone()));
        }

        let parents = self.state.read().heads.clone();
        let entry = Entry::create(payload, parents, signer)?;
        let id = entry.id;
        put_block(self.store.as_ref(), &entry).await?;

        self.state.write().apply(entry);
        let _ = self.events.send(LogEvent::Appended { id });
        Ok(id)
    }

    /// Merge entries received from a peer
    ///
    /// Each entry is verified (content id, signature, gate) before it can
    /// touch the log. Entries whose predecessors are missing are parked and
    /// applied once the predecessors arrive; unauthorized or tampered
    /// entries are skipped. Returns the number of entries applied.
    pub async fn join(&self, entries: Vec<Entry<T>>) -> Result<usize> {
        let mut verified = Vec::new();
        for entry in entries {
            if self.contains(&entry.id) || self.is_pending(&entry.id) {
                continue;
            }
            match entry.id_matches_content() {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        log = %self.address,
                        entry = %entry.id,
                        "rejected replicated entry: content does not match id"
                    );
                    continue;
                }
                Err(e) => {
                    warn!(log = %self.address, error = %e, "rejected unreadable replicated entry");
                    continue;
                }
            }
            let bytes = match entry.signed_bytes() {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(log = %self.address, error = %e, "rejected unreadable replicated entry");
                    continue;
                }
            };
            if let Err(e) = self.authority.verify(&entry.identity, &bytes, &entry.signature) {
                warn!(
                    log = %self.address,
                    entry = %entry.id,
                    key = %entry.identity.id,
                    error = %e,
                    "rejected replicated entry: signature verification failed"
                );
                continue;
            }
            if let Some(reason) = self.gate.evaluate(&entry.identity).denial_reason() {
                // Advisory-local: this peer refuses the entry, peers that
                // accepted it before observing a revocation keep it.
                warn!(
                    log = %self.address,
                    entry = %entry.id,
                    key = %entry.identity.id,
                    reason = reason,
                    "rejected replicated entry"
                );
                continue;
            }
            verified.push(entry);
        }

        // Content-addressed blocks are safe to persist before application,
        // parked entries included.
        for entry in &verified {
            put_block(self.store.as_ref(), entry).await?;
        }

        let applied = {
            let mut state = self.state.write();
            let mut applied = 0usize;
            for entry in verified {
                if state.entries.contains_key(&entry.id) {
                    continue;
                }
                if state.knows_parents(&entry) {
                    state.apply(entry);
                    applied += 1;
                } else {
                    debug!(
                        log = %self.address,
                        entry = %entry.id,
                        "deferring entry until causal predecessors arrive"
                    );
                    state.pending.insert(entry.id, entry);
                }
            }
            // A newly applied entry may unblock parked ones, repeatedly.
            loop {
                let ready: Vec<EntryId> = state
                    .pending
                    .values()
                    .filter(|entry| {
                        entry
                            .parents
                            .iter()
                            .all(|parent| state.entries.contains_key(parent))
                    })
                    .map(|entry| entry.id)
                    .collect();
                if ready.is_empty() {
                    break;
                }
                for id in ready {
                    if let Some(entry) = state.pending.remove(&id) {
                        state.apply(entry);
                        applied += 1;
                    }
                }
            }
            applied
        };

        if applied > 0 {
            let _ = self.events.send(LogEvent::Replicated { applied });
        }
        Ok(applied)
    }

    /// Entries in canonical causal order
    ///
    /// Topological order over the parent DAG; concurrent entries are ordered
    /// by ascending entry id. Every peer holding the same entries produces
    /// the same sequence.
    pub fn traverse(&self) -> Vec<Entry<T>> {
        let state = self.state.read();
        let mut children: BTreeMap<EntryId, Vec<EntryId>> = BTreeMap::new();
        let mut indegree: BTreeMap<EntryId, usize> = BTreeMap::new();
        for entry in state.entries.values() {
            indegree.insert(entry.id, entry.parents.len());
            for parent in &entry.parents {
                children.entry(*parent).or_default().push(entry.id);
            }
        }

        let mut ready: BTreeSet<EntryId> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut ordered = Vec::with_capacity(state.entries.len());
        while let Some(id) = ready.iter().next().copied() {
            ready.remove(&id);
            if let Some(entry) = state.entries.get(&id) {
                ordered.push(entry.clone());
            }
            if let Some(kids) = children.get(&id) {
                for kid in kids {
                    if let Some(degree) = indegree.get_mut(kid) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(*kid);
                        }
                    }
                }
            }
        }
        ordered
    }

    /// Payloads in canonical causal order
    pub fn payloads(&self) -> Vec<T> {
        self.traverse().into_iter().map(|entry| entry.payload).collect()
    }

    /// Applied entries in an order safe to feed to a peer's `join`
    pub fn export(&self) -> Vec<Entry<T>> {
        self.traverse()
    }

    fn is_pending(&self, id: &EntryId) -> bool {
        self.state.read().pending.contains_key(id)
    }
}
