use crate::config::InventoryConfig;
use crate::error::InventoryError;
use crate::handler::{CollectCtx, Scope};
use crate::model::Node;
use crate::registry::CategoryRegistry;
use crate::source::RecordSource;

/// Entry point for building reports from a record source.
///
/// Only bootstraps the top of the tree; each handler recurses into its own
/// registered children. Every call starts a fresh pass, so the same device
/// may appear in two separate reports but never twice in one.
pub struct TreeAssembler<'a> {
    registry: &'a CategoryRegistry,
    source: &'a dyn RecordSource,
    config: &'a InventoryConfig,
}

impl<'a> TreeAssembler<'a> {
    #[must_use]
    pub fn new(
        registry: &'a CategoryRegistry,
        source: &'a dyn RecordSource,
        config: &'a InventoryConfig,
    ) -> Self {
        Self {
            registry,
            source,
            config,
        }
    }

    /// Build the report rooted at `root`.
    ///
    /// # Errors
    /// Any failure of the root category itself is fatal, as are
    /// [`InventoryError::UnknownCategory`] and [`InventoryError::EmptyRoot`].
    /// Failures below the root are logged and leave that subtree empty.
    pub fn assemble(&self, root: &str, include_children: bool) -> Result<Node, InventoryError> {
        let handler = self.registry.factory(root)?(Scope::All);
        let mut ctx = CollectCtx::new(self.source, self.registry, self.config);

        tracing::debug!(category = root, include_children, "Assembling report");
        let nodes = handler.collect(&mut ctx, include_children)?;
        let extra = nodes.len().saturating_sub(1);
        let Some(node) = nodes.into_iter().next() else {
            return Err(InventoryError::EmptyRoot(root.to_owned()));
        };
        if extra > 0 {
            tracing::debug!(category = root, ignored = extra, "Root produced extra nodes");
        }
        tracing::debug!(category = root, nodes = node.count(), "Report assembled");
        Ok(node)
    }

    /// Nodes of a single category without their children.
    ///
    /// # Errors
    /// Unlike nested categories during [`TreeAssembler::assemble`], failures
    /// here are returned to the caller.
    pub fn collect(&self, category: &str) -> Result<Vec<Node>, InventoryError> {
        let handler = self.registry.factory(category)?(Scope::All);
        let mut ctx = CollectCtx::new(self.source, self.registry, self.config);
        handler.collect(&mut ctx, false)
    }
}
