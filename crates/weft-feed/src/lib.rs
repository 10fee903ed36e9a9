//! # Weft Feed - The Governed Log
//!
//! **Purpose**: An application-visible append-only feed whose write access
//! is governed by a [`weft_access`] controller.
//!
//! - **Lifecycle**: `create` persists the feed manifest and its controller
//!   manifests; `open` resolves them back through the controller registry
//! - **Gating**: every `add` and every replicated entry passes the
//!   controller's write gate
//! - **Replication**: `replicate_from` moves governance changes first, then
//!   data entries, so capability changes precede the entries they authorize
//!
//! The feed stores opaque string payloads; richer payloads belong to the
//! embedder.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod feed;
pub mod manifest;

pub use feed::{Feed, FeedOptions};
pub use manifest::{FeedManifest, FEED_TYPE};
