//! Integration tests: controller lifecycle, governance, and convergence
//!
//! Covers the seed invariant, admin-gated governance, the updated
//! notification on replicated capability changes, the frozen-governance
//! edge case, and manifest resolution failures.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio::time::timeout;

use weft_access::{
    AccessController, AccessControllerRegistry, Capability, ControllerContext, ControllerEvent,
    ControllerOptions, LogAccessController,
};
use weft_core::{Cid, IdentityKey, WeftError};
use weft_crypto::{KeyAuthority, Keypair};
use weft_store::MemoryStore;

fn context(store: &MemoryStore, keypair: &Keypair) -> ControllerContext {
    ControllerContext::new(
        Arc::new(store.clone()),
        Arc::new(KeyAuthority),
        keypair.clone(),
    )
}

async fn create_controller(
    store: &MemoryStore,
    keypair: &Keypair,
    options: &ControllerOptions,
) -> Arc<LogAccessController> {
    LogAccessController::create(
        Arc::new(store.clone()),
        Arc::new(KeyAuthority),
        keypair.clone(),
        "AABB",
        options,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_seed_invariant_with_initial_write_list() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let w1 = KeyAuthority.issue();
    let w2 = KeyAuthority.issue();

    let options = ControllerOptions {
        write: vec![w1.public_key().clone(), w2.public_key().clone()],
    };
    let controller = create_controller(&store, &creator, &options).await;

    let set = controller.capabilities();
    assert_eq!(
        set.holders(Capability::Admin),
        BTreeSet::from([creator.public_key().clone()])
    );
    assert_eq!(
        set.holders(Capability::Write),
        BTreeSet::from([
            creator.public_key().clone(),
            w1.public_key().clone(),
            w2.public_key().clone(),
        ])
    );
}

#[tokio::test]
async fn test_governance_address_ends_in_access_segment() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;

    assert!(controller.address().is_governance());
    assert!(controller.address().to_string().ends_with("/AABB/_access"));
}

#[tokio::test]
async fn test_local_grant_is_visible_before_return() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let friend = KeyAuthority.issue();
    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;

    assert!(!controller
        .can_append(friend.identity(), Capability::Write)
        .is_allowed());

    controller
        .grant(Capability::Write, friend.public_key().clone())
        .await
        .unwrap();

    assert!(controller
        .can_append(friend.identity(), Capability::Write)
        .is_allowed());
    assert!(!controller
        .can_append(friend.identity(), Capability::Admin)
        .is_allowed());
}

#[tokio::test]
async fn test_non_admin_cannot_grant_or_revoke() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let outsider = KeyAuthority.issue();

    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;

    // The outsider opens the same controller from the shared store.
    let loaded = LogAccessController::load(
        Arc::new(store.clone()),
        Arc::new(KeyAuthority),
        outsider.clone(),
        controller.manifest_cid(),
    )
    .await
    .unwrap();

    let err = loaded
        .grant(Capability::Write, outsider.public_key().clone())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Could not append entry, key \"{}\" is not allowed to write to the log",
            outsider.identity().id
        )
    );

    let err = loaded
        .revoke(Capability::Write, creator.public_key().clone())
        .await
        .unwrap_err();
    assert_matches!(err, WeftError::Unauthorized { .. });

    // Nothing was appended on the denied path.
    assert!(loaded.export_changes().is_empty());
}

#[tokio::test]
async fn test_updated_fires_after_replicated_grant() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let peer = KeyAuthority.issue();

    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;
    let remote = LogAccessController::load(
        Arc::new(store.clone()),
        Arc::new(KeyAuthority),
        peer.clone(),
        controller.manifest_cid(),
    )
    .await
    .unwrap();

    let mut updates = remote.subscribe();

    controller
        .grant(Capability::Write, peer.public_key().clone())
        .await
        .unwrap();
    assert!(!remote
        .can_append(peer.identity(), Capability::Write)
        .is_allowed());

    remote
        .ingest_changes(controller.export_changes())
        .await
        .unwrap();

    let event = timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("updated notification timed out")
        .unwrap();
    assert_eq!(event, ControllerEvent::Updated);
    assert!(remote
        .can_append(peer.identity(), Capability::Write)
        .is_allowed());
}

#[tokio::test]
async fn test_revoke_converges_on_remote_peer() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let peer = KeyAuthority.issue();

    let options = ControllerOptions {
        write: vec![peer.public_key().clone()],
    };
    let controller = create_controller(&store, &creator, &options).await;
    let remote = LogAccessController::load(
        Arc::new(store.clone()),
        Arc::new(KeyAuthority),
        peer.clone(),
        controller.manifest_cid(),
    )
    .await
    .unwrap();

    let mut updates = remote.subscribe();
    remote
        .ingest_changes(controller.export_changes())
        .await
        .unwrap();
    timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("updated notification timed out")
        .unwrap();
    assert!(remote
        .can_append(peer.identity(), Capability::Write)
        .is_allowed());

    controller
        .revoke(Capability::Write, peer.public_key().clone())
        .await
        .unwrap();
    remote
        .ingest_changes(controller.export_changes())
        .await
        .unwrap();
    timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("updated notification timed out")
        .unwrap();

    assert!(!remote
        .can_append(peer.identity(), Capability::Write)
        .is_allowed());
}

#[tokio::test]
async fn test_revoking_last_admin_freezes_governance() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;

    controller
        .revoke(Capability::Admin, creator.public_key().clone())
        .await
        .unwrap();
    assert!(controller.capabilities().is_frozen());

    // The freeze is permanent: even the creator can no longer govern.
    let err = controller
        .grant(Capability::Admin, creator.public_key().clone())
        .await
        .unwrap_err();
    assert_matches!(err, WeftError::Unauthorized { .. });
}

#[tokio::test]
async fn test_load_fails_on_missing_manifest() {
    let store = MemoryStore::new();
    let keypair = KeyAuthority.issue();

    let err = LogAccessController::load(
        Arc::new(store.clone()),
        Arc::new(KeyAuthority),
        keypair,
        Cid::for_bytes(b"never persisted"),
    )
    .await
    .unwrap_err();
    assert_matches!(err, WeftError::ManifestResolution { .. });
}

#[tokio::test]
async fn test_registry_loads_by_manifest_type() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let peer = KeyAuthority.issue();

    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;

    let registry = AccessControllerRegistry::with_defaults();
    let loaded = registry
        .load(&context(&store, &peer), controller.manifest_cid())
        .await
        .unwrap();
    assert_eq!(loaded.controller_type(), "orbitdb");
    assert_eq!(loaded.address(), controller.address());

    let err = registry
        .load(&context(&store, &peer), Cid::for_bytes(b"missing"))
        .await
        .unwrap_err();
    assert_matches!(err, WeftError::ManifestResolution { .. });
}

#[tokio::test]
async fn test_snapshot_is_copy_on_write() {
    let store = MemoryStore::new();
    let creator = KeyAuthority.issue();
    let friend = KeyAuthority.issue();
    let controller = create_controller(&store, &creator, &ControllerOptions::default()).await;

    let before = controller.capabilities();
    controller
        .grant(Capability::Write, friend.public_key().clone())
        .await
        .unwrap();
    let after = controller.capabilities();

    // The old snapshot is untouched; readers holding it saw a consistent set.
    assert!(!before.contains(Capability::Write, friend.public_key()));
    assert!(after.contains(Capability::Write, friend.public_key()));

    let subject = IdentityKey::new("unrelated");
    assert!(!after.contains(Capability::Admin, &subject));
}
