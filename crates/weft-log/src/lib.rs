//! # Weft Log - Replicated Append-Only Log Primitive
//!
//! **Purpose**: The hash-linked log that both the governed data log and the
//! access controller's governance log are instances of.
//!
//! - **Entries**: signed, content-addressed, linked to their causal
//!   predecessors; the log is a grow-only DAG
//! - **Gating**: every append attempt, local or replicated, passes the
//!   synchronous [`AccessGate`] before any state changes
//! - **Replication**: `join` merges entries received from peers, verifying
//!   signatures and deferring entries whose predecessors are missing
//! - **Determinism**: `traverse` yields the canonical causal order
//!   (topological, ties broken by entry id), identical on every peer that
//!   holds the same entries
//!
//! Transport and peer discovery live outside this crate; embedders move
//! `Vec<Entry<T>>` batches between logs however they like.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entry;
pub mod gate;
pub mod log;

pub use entry::Entry;
pub use gate::{AccessDecision, AccessGate, OpenGate};
pub use log::{Log, LogEvent};
