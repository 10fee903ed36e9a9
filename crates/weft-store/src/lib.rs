//! # Weft Store - Content-Addressed Object Store
//!
//! **Purpose**: The object-store boundary the log and access layers persist
//! through.
//!
//! - **Content Addressing**: blocks are JSON-shaped values keyed by the
//!   blake3 digest of their canonical bytes
//! - **Write-Once**: a block is immutable once stored; re-putting identical
//!   content is a no-op that yields the same identifier
//! - **Memory Backend**: the in-process implementation used by tests and
//!   single-process embedders
//!
//! Networked backends implement [`ObjectStore`] outside this workspace;
//! nothing here assumes more than `put`/`get`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{get_block, put_block, ObjectStore};
