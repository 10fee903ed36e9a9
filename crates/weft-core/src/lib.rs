//! # Weft Core - Foundation Types
//!
//! **Purpose**: Define the foundation types shared by every weft crate.
//!
//! - **Content Hashing**: 32-byte blake3 digests for content addressing
//! - **Identifiers**: newtypes for object blocks, log entries, and principals
//! - **Addresses**: path-shaped log addresses with the governance suffix rule
//! - **Errors**: the unified error system used across the workspace
//!
//! This crate is pure domain logic: no I/O, no async, no crypto beyond
//! hashing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod errors;
pub mod hash;
pub mod identifiers;

pub use address::{LogAddress, ADDRESS_PREFIX, GOVERNANCE_SUFFIX};
pub use errors::{Result, WeftError};
pub use hash::Hash32;
pub use identifiers::{Cid, EntryId, IdentityKey};
