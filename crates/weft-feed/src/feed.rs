//! The governed feed

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use weft_access::{
    manifest_path, parse_manifest_path, AccessController, AccessControllerRegistry,
    ControllerContext, ControllerOptions, CONTROLLER_TYPE,
};
use weft_core::{EntryId, IdentityKey, LogAddress, Result, WeftError};
use weft_log::{Entry, Log, LogEvent};
use weft_store::{get_block, put_block};

use crate::manifest::{FeedManifest, FEED_TYPE};

/// Initial configuration recognized at feed creation
#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    /// Identity keys granted `write` in addition to the implicit creator
    pub write: Vec<IdentityKey>,
}

/// An append-only feed of string payloads, gated by an access controller
///
/// Local appends are checked synchronously against the controller's current
/// capability snapshot; replicated entries are checked the same way on
/// arrival. Capability changes converge through the controller's own
/// governance log, not through this feed.
pub struct Feed {
    log: Arc<Log<String>>,
    controller: Arc<dyn AccessController>,
    address: LogAddress,
    ctx: ControllerContext,
}

impl Feed {
    /// Create a feed, its controller, and their persisted manifests
    pub async fn create(
        ctx: &ControllerContext,
        registry: &AccessControllerRegistry,
        name: &str,
        options: &FeedOptions,
    ) -> Result<Self> {
        let factory = registry.resolve(CONTROLLER_TYPE)?;
        let controller = factory
            .create(
                ctx,
                name,
                &ControllerOptions {
                    write: options.write.clone(),
                },
            )
            .await?;

        let manifest = FeedManifest {
            name: name.to_string(),
            log_type: FEED_TYPE.to_string(),
            access_controller: manifest_path(&controller.manifest_cid()),
        };
        let root = put_block(ctx.store.as_ref(), &manifest).await?;
        let address = LogAddress::new(root, name);
        debug!(feed = %address, "feed created");

        Ok(Self::assemble(ctx.clone(), controller, address))
    }

    /// Open a feed previously created by some peer
    ///
    /// Resolves the feed manifest behind the address, then loads the
    /// controller it references through the registry. Either resolution
    /// failing means the feed cannot be opened.
    pub async fn open(
        ctx: &ControllerContext,
        registry: &AccessControllerRegistry,
        address: &LogAddress,
    ) -> Result<Self> {
        let manifest: FeedManifest = get_block(ctx.store.as_ref(), address.root())
            .await?
            .ok_or_else(|| {
                WeftError::manifest_resolution(format!(
                    "feed manifest {} not found",
                    address.root()
                ))
            })?;
        if manifest.log_type != FEED_TYPE {
            return Err(WeftError::invalid(format!(
                "unsupported log type: {}",
                manifest.log_type
            )));
        }
        let controller_cid = parse_manifest_path(&manifest.access_controller)?;
        let controller = registry.load(ctx, controller_cid).await?;
        debug!(feed = %address, "feed opened");

        Ok(Self::assemble(ctx.clone(), controller, address.clone()))
    }

    fn assemble(
        ctx: ControllerContext,
        controller: Arc<dyn AccessController>,
        address: LogAddress,
    ) -> Self {
        let log = Arc::new(Log::new(
            address.clone(),
            ctx.store.clone(),
            controller.write_gate(),
            ctx.authority.clone(),
        ));
        Self {
            log,
            controller,
            address,
            ctx,
        }
    }

    /// The feed's address
    pub fn address(&self) -> &LogAddress {
        &self.address
    }

    /// The access controller governing this feed
    pub fn access(&self) -> &Arc<dyn AccessController> {
        &self.controller
    }

    /// Append a payload as the local identity
    pub async fn add(&self, value: impl Into<String>) -> Result<EntryId> {
        self.log.append(value.into(), &self.ctx.keypair).await
    }

    /// Payloads in canonical causal order
    pub fn iter(&self) -> Vec<String> {
        self.log.payloads()
    }

    /// Number of entries in the feed
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether the feed holds no entries
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Subscribe to the data log's notifications
    pub fn events(&self) -> broadcast::Receiver<LogEvent> {
        self.log.events()
    }

    /// Data entries in an order safe to feed to a peer's `join`
    pub fn export(&self) -> Vec<Entry<String>> {
        self.log.export()
    }

    /// Merge data entries received from a peer
    pub async fn join(&self, entries: Vec<Entry<String>>) -> Result<usize> {
        self.log.join(entries).await
    }

    /// Pull everything the other in-process peer has
    ///
    /// Governance changes move first so capability changes precede the
    /// data entries they authorize.
    pub async fn replicate_from(&self, other: &Feed) -> Result<()> {
        self.controller
            .ingest_changes(other.access().export_changes())
            .await?;
        self.log.join(other.export()).await?;
        Ok(())
    }
}
