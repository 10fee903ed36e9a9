//! The log-backed access controller
//!
//! One controller instance owns one governance log and one derived
//! capability snapshot. All read-modify-replay sequences are serialized on
//! the controller's state lock; gate evaluation never takes it.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use weft_core::{Cid, IdentityKey, LogAddress, Result, WeftError};
use weft_crypto::{Identity, IdentityAuthority, Keypair};
use weft_log::{AccessDecision, AccessGate, Entry, Log, LogEvent};
use weft_store::{get_block, put_block, ObjectStore};

use crate::capability::{Capability, CapabilityOp, CapabilitySet};
use crate::gate::{CapabilityGate, SharedSnapshot};
use crate::manifest::{ControllerManifest, GovernanceManifest, CONTROLLER_TYPE};
use crate::replay::replay;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notifications emitted by an access controller
///
/// Delivery is at-least-once and carries no payload: observers re-read the
/// capability snapshot rather than receiving a diff, and must tolerate
/// redundant notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The capability snapshot was recomputed and differs from its predecessor
    Updated,
}

/// Initial capability configuration recognized at controller creation
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Identity keys granted `write` in addition to the implicit creator seed
    pub write: Vec<IdentityKey>,
}

/// Interface the governed log and embedders program against
///
/// Object-safe so controller implementations stay pluggable behind the
/// registry.
#[async_trait]
pub trait AccessController: Send + Sync {
    /// The manifest type tag of this controller
    fn controller_type(&self) -> &'static str;

    /// Cid of the persisted controller manifest
    fn manifest_cid(&self) -> Cid;

    /// Address of the governance log
    fn address(&self) -> &LogAddress;

    /// The current capability snapshot
    fn capabilities(&self) -> Arc<CapabilitySet>;

    /// Synchronously decide whether `identity` may append under `required`
    fn can_append(&self, identity: &Identity, required: Capability) -> AccessDecision;

    /// Gate requiring `write`, for wiring into the governed log
    fn write_gate(&self) -> Arc<dyn AccessGate>;

    /// Subscribe to `updated` notifications
    fn subscribe(&self) -> broadcast::Receiver<ControllerEvent>;

    /// Grant `capability` to `subject`
    ///
    /// Fails with the unauthorized-append error if the local identity does
    /// not hold `admin` at evaluation time.
    async fn grant(&self, capability: Capability, subject: IdentityKey) -> Result<()>;

    /// Revoke `capability` from `subject`
    ///
    /// Same authorization precondition as [`AccessController::grant`].
    /// Revoking the only remaining `admin` permanently freezes the
    /// governance log: no identity can append further changes afterwards.
    async fn revoke(&self, capability: Capability, subject: IdentityKey) -> Result<()>;

    /// Governance entries in canonical order, for replication to a peer
    fn export_changes(&self) -> Vec<Entry<CapabilityOp>>;

    /// Merge governance entries received from a peer
    async fn ingest_changes(&self, entries: Vec<Entry<CapabilityOp>>) -> Result<usize>;
}

/// Access controller backed by a replicated governance log
///
/// The governance log is gated by the `admin` capability it itself manages;
/// the bootstrap rule is the implicit creator seed carried by the
/// governance manifest.
pub struct LogAccessController {
    governance: Arc<Log<CapabilityOp>>,
    snapshot: Arc<SharedSnapshot>,
    creator: IdentityKey,
    keypair: Keypair,
    address: LogAddress,
    manifest_cid: Cid,
    /// Serializes grant/revoke/recompute sequences
    state_lock: Mutex<()>,
    events: broadcast::Sender<ControllerEvent>,
}

impl LogAccessController {
    /// Create a controller, persisting its manifests
    ///
    /// Seeds the snapshot with the creator holding both capabilities,
    /// records the initial write list as creator-signed grant entries, and
    /// returns a ready controller.
    pub async fn create(
        store: Arc<dyn ObjectStore>,
        authority: Arc<dyn IdentityAuthority>,
        keypair: Keypair,
        name: &str,
        options: &ControllerOptions,
    ) -> Result<Arc<Self>> {
        let creator = keypair.public_key().clone();
        let governance_manifest = GovernanceManifest {
            name: format!("{}/{}", name, weft_core::GOVERNANCE_SUFFIX),
            creator: creator.clone(),
        };
        let root = put_block(store.as_ref(), &governance_manifest).await?;
        let address = LogAddress::governance(root, name);

        let manifest = ControllerManifest::orbitdb(address.clone());
        let manifest_cid = put_block(store.as_ref(), &manifest).await?;

        let controller = Self::assemble(
            store,
            authority,
            keypair,
            creator,
            address,
            manifest_cid,
        );

        for subject in &options.write {
            if subject == &controller.creator {
                continue;
            }
            controller.grant(Capability::Write, subject.clone()).await?;
        }
        controller.spawn_listener();
        debug!(controller = %controller.address, "access controller created");
        Ok(controller)
    }

    /// Load a controller from a persisted manifest
    ///
    /// Resolution failure of either manifest is fatal: the governed log
    /// cannot be opened without its controller. The initial replay runs
    /// before the controller is returned.
    pub async fn load(
        store: Arc<dyn ObjectStore>,
        authority: Arc<dyn IdentityAuthority>,
        keypair: Keypair,
        manifest_cid: Cid,
    ) -> Result<Arc<Self>> {
        let manifest: ControllerManifest = get_block(store.as_ref(), &manifest_cid)
            .await?
            .ok_or_else(|| {
                WeftError::manifest_resolution(format!(
                    "controller manifest {} not found",
                    manifest_cid
                ))
            })?;
        if manifest.controller_type != CONTROLLER_TYPE {
            return Err(WeftError::manifest_resolution(format!(
                "unsupported controller type: {}",
                manifest.controller_type
            )));
        }
        let address = manifest.params.address;
        let governance_manifest: GovernanceManifest =
            get_block(store.as_ref(), address.root())
                .await?
                .ok_or_else(|| {
                    WeftError::manifest_resolution(format!(
                        "governance log manifest {} not found",
                        address.root()
                    ))
                })?;

        let controller = Self::assemble(
            store,
            authority,
            keypair,
            governance_manifest.creator,
            address,
            manifest_cid,
        );
        {
            let _guard = controller.state_lock.lock().await;
            controller.recompute();
        }
        controller.spawn_listener();
        debug!(controller = %controller.address, "access controller loaded");
        Ok(controller)
    }

    fn assemble(
        store: Arc<dyn ObjectStore>,
        authority: Arc<dyn IdentityAuthority>,
        keypair: Keypair,
        creator: IdentityKey,
        address: LogAddress,
        manifest_cid: Cid,
    ) -> Arc<Self> {
        let snapshot = Arc::new(SharedSnapshot::new(CapabilitySet::seed(&creator)));
        let admin_gate: Arc<dyn AccessGate> =
            Arc::new(CapabilityGate::new(snapshot.clone(), Capability::Admin));
        let governance = Arc::new(Log::new(address.clone(), store, admin_gate, authority));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            governance,
            snapshot,
            creator,
            keypair,
            address,
            manifest_cid,
            state_lock: Mutex::new(()),
            events,
        })
    }

    /// Replay the governance log and swap the snapshot if it changed
    ///
    /// Must be called with the state lock held. Returns whether the
    /// snapshot was replaced.
    fn recompute(&self) -> bool {
        let entries = self.governance.traverse();
        let next = replay(&self.creator, entries.iter().map(|entry| &entry.payload));
        if *self.snapshot.load() == next {
            return false;
        }
        debug!(controller = %self.address, "capability snapshot recomputed");
        self.snapshot.store(Arc::new(next));
        let _ = self.events.send(ControllerEvent::Updated);
        true
    }

    fn spawn_listener(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut events = self.governance.events();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(LogEvent::Replicated { .. }) => {
                        let Some(controller) = weak.upgrade() else { break };
                        let _guard = controller.state_lock.lock().await;
                        controller.recompute();
                    }
                    // Local appends recompute inline in grant/revoke.
                    Ok(LogEvent::Appended { .. }) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        let Some(controller) = weak.upgrade() else { break };
                        warn!(
                            controller = %controller.address,
                            skipped,
                            "listener lagged behind governance events; recomputing"
                        );
                        let _guard = controller.state_lock.lock().await;
                        controller.recompute();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

#[async_trait]
impl AccessController for LogAccessController {
    fn controller_type(&self) -> &'static str {
        CONTROLLER_TYPE
    }

    fn manifest_cid(&self) -> Cid {
        self.manifest_cid
    }

    fn address(&self) -> &LogAddress {
        &self.address
    }

    fn capabilities(&self) -> Arc<CapabilitySet> {
        self.snapshot.load()
    }

    fn can_append(&self, identity: &Identity, required: Capability) -> AccessDecision {
        CapabilityGate::new(self.snapshot.clone(), required).evaluate(identity)
    }

    fn write_gate(&self) -> Arc<dyn AccessGate> {
        Arc::new(CapabilityGate::new(self.snapshot.clone(), Capability::Write))
    }

    fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    async fn grant(&self, capability: Capability, subject: IdentityKey) -> Result<()> {
        let _guard = self.state_lock.lock().await;
        self.governance
            .append(CapabilityOp::grant(capability, subject.clone()), &self.keypair)
            .await?;
        debug!(
            controller = %self.address,
            capability = %capability,
            subject = %subject,
            "capability granted"
        );
        self.recompute();
        Ok(())
    }

    async fn revoke(&self, capability: Capability, subject: IdentityKey) -> Result<()> {
        let _guard = self.state_lock.lock().await;
        self.governance
            .append(
                CapabilityOp::revoke(capability, subject.clone()),
                &self.keypair,
            )
            .await?;
        debug!(
            controller = %self.address,
            capability = %capability,
            subject = %subject,
            "capability revoked"
        );
        self.recompute();
        if self.snapshot.load().is_frozen() {
            warn!(
                controller = %self.address,
                "last admin revoked; governance log is permanently frozen"
            );
        }
        Ok(())
    }

    fn export_changes(&self) -> Vec<Entry<CapabilityOp>> {
        self.governance.export()
    }

    async fn ingest_changes(&self, entries: Vec<Entry<CapabilityOp>>) -> Result<usize> {
        let applied = self.governance.join(entries).await?;
        if applied > 0 {
            // Reflected before the call returns, like a local append; the
            // listener's recompute for the same round is then a no-op.
            let _guard = self.state_lock.lock().await;
            self.recompute();
        }
        Ok(applied)
    }
}
