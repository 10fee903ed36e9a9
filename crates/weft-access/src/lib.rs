//! # Weft Access - Capability-Based Access Control
//!
//! **Purpose**: Decide who may append to a replicated log, and let that set
//! of identities change without a central authority.
//!
//! - **Governance Log**: a private `Log<CapabilityOp>` records grants and
//!   revocations; it is gated by the `admin` capability it itself manages
//! - **Replay**: a pure, deterministic fold of the governance log into a
//!   [`CapabilitySet`] snapshot
//! - **Gates**: synchronous snapshot reads wired into the governed log and
//!   the governance log
//! - **Lifecycle**: controllers are created or loaded through persisted,
//!   write-once manifests and an explicit type registry
//! - **Events**: every snapshot recomputation that changes the set emits an
//!   `updated` notification to local subscribers
//!
//! Peers converge eventually: a local grant is visible locally before the
//! call returns, and on a remote peer only after its next replication and
//! replay cycle.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod controller;
pub mod gate;
pub mod manifest;
pub mod registry;
pub mod replay;

pub use capability::{Capability, CapabilityOp, CapabilityOpKind, CapabilitySet};
pub use controller::{
    AccessController, ControllerEvent, ControllerOptions, LogAccessController,
};
pub use gate::{CapabilityGate, SharedSnapshot};
pub use manifest::{
    manifest_path, parse_manifest_path, ControllerManifest, ControllerParams,
    GovernanceManifest, CONTROLLER_TYPE,
};
pub use registry::{AccessControllerRegistry, ControllerContext, ControllerFactory, OrbitDbFactory};
pub use replay::replay;
