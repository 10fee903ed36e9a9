//! Controller type registry
//!
//! The registry is an explicit object passed to whatever opens governed
//! logs; there is no global registration. A manifest's `type` tag selects
//! the factory that can create or load the matching controller.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use weft_core::{Cid, Result, WeftError};
use weft_crypto::{IdentityAuthority, Keypair};
use weft_store::{get_block, ObjectStore};

use crate::controller::{AccessController, ControllerOptions, LogAccessController};
use crate::manifest::ControllerManifest;

/// Dependencies handed to controller factories
#[derive(Clone)]
pub struct ControllerContext {
    /// Object store manifests and governance entries persist to
    pub store: Arc<dyn ObjectStore>,
    /// Authority verifying entry signatures
    pub authority: Arc<dyn IdentityAuthority>,
    /// Local identity controllers sign governance entries with
    pub keypair: Keypair,
}

impl ControllerContext {
    /// Bundle the dependencies a controller needs
    pub fn new(
        store: Arc<dyn ObjectStore>,
        authority: Arc<dyn IdentityAuthority>,
        keypair: Keypair,
    ) -> Self {
        Self {
            store,
            authority,
            keypair,
        }
    }
}

/// Constructor and loader for one controller type
#[async_trait]
pub trait ControllerFactory: Send + Sync {
    /// The manifest `type` tag this factory handles
    fn controller_type(&self) -> &'static str;

    /// Create a new controller for a log with the given name
    async fn create(
        &self,
        ctx: &ControllerContext,
        name: &str,
        options: &ControllerOptions,
    ) -> Result<Arc<dyn AccessController>>;

    /// Load a controller from its persisted manifest
    async fn load(
        &self,
        ctx: &ControllerContext,
        manifest_cid: Cid,
    ) -> Result<Arc<dyn AccessController>>;
}

/// Factory for the built-in log-backed controller
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitDbFactory;

#[async_trait]
impl ControllerFactory for OrbitDbFactory {
    fn controller_type(&self) -> &'static str {
        crate::manifest::CONTROLLER_TYPE
    }

    async fn create(
        &self,
        ctx: &ControllerContext,
        name: &str,
        options: &ControllerOptions,
    ) -> Result<Arc<dyn AccessController>> {
        let controller = LogAccessController::create(
            ctx.store.clone(),
            ctx.authority.clone(),
            ctx.keypair.clone(),
            name,
            options,
        )
        .await?;
        let controller: Arc<dyn AccessController> = controller;
        Ok(controller)
    }

    async fn load(
        &self,
        ctx: &ControllerContext,
        manifest_cid: Cid,
    ) -> Result<Arc<dyn AccessController>> {
        let controller = LogAccessController::load(
            ctx.store.clone(),
            ctx.authority.clone(),
            ctx.keypair.clone(),
            manifest_cid,
        )
        .await?;
        let controller: Arc<dyn AccessController> = controller;
        Ok(controller)
    }
}

/// Explicit mapping from controller type tags to factories
#[derive(Default)]
pub struct AccessControllerRegistry {
    factories: BTreeMap<String, Arc<dyn ControllerFactory>>,
}

impl AccessControllerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in controller type registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OrbitDbFactory));
        registry
    }

    /// Register a factory under its type tag, replacing any previous one
    pub fn register(&mut self, factory: Arc<dyn ControllerFactory>) {
        self.factories
            .insert(factory.controller_type().to_string(), factory);
    }

    /// Look up the factory for a type tag
    pub fn resolve(&self, controller_type: &str) -> Result<Arc<dyn ControllerFactory>> {
        self.factories.get(controller_type).cloned().ok_or_else(|| {
            WeftError::not_found(format!(
                "no access controller registered for type {}",
                controller_type
            ))
        })
    }

    /// Load a controller by reading its manifest's type tag
    pub async fn load(
        &self,
        ctx: &ControllerContext,
        manifest_cid: Cid,
    ) -> Result<Arc<dyn AccessController>> {
        let manifest: ControllerManifest = get_block(ctx.store.as_ref(), &manifest_cid)
            .await?
            .ok_or_else(|| {
                WeftError::manifest_resolution(format!(
                    "controller manifest {} not found",
                    manifest_cid
                ))
            })?;
        let factory = self.resolve(&manifest.controller_type)?;
        factory.load(ctx, manifest_cid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_register_orbitdb() {
        let registry = AccessControllerRegistry::with_defaults();
        assert!(registry.resolve("orbitdb").is_ok());
        assert!(registry.resolve("ipfs").is_err());
    }
}
