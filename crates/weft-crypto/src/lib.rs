//! # Weft Crypto - Identities and Signatures
//!
//! **Purpose**: Ed25519 signing and verification for log entries, and the
//! identity model the access-control layer names principals by.
//!
//! - **Signatures**: thin wrappers over `ed25519-dalek`
//! - **Identities**: `{id, public_key}` principals issued by an authority
//! - **Authority**: the external service that issues identities and
//!   verifies entry signatures; logs consume it as a trait object
//!
//! Key custody and identity issuance policy are out of scope: embedders may
//! supply their own [`IdentityAuthority`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod identity;
pub mod signature;

pub use identity::{Identity, IdentityAuthority, KeyAuthority, Keypair};
pub use signature::{
    sign, verify, verifying_key_from_identity_key, Ed25519Signature, Ed25519SigningKey,
    Ed25519VerifyingKey,
};
