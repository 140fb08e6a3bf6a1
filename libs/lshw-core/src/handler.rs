use std::collections::HashSet;

use crate::config::InventoryConfig;
use crate::error::InventoryError;
use crate::model::Node;
use crate::registry::CategoryRegistry;
use crate::source::{AssociationRecord, Entity, Query, Record, RecordSource};

/// Which records a handler instance should describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// Every record of the category.
    #[default]
    All,
    /// Only records related to this device identifier. Each handler decides
    /// which attribute the identifier is matched against.
    Device(String),
}

impl Scope {
    #[must_use]
    pub fn device(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Device(id) => Some(id),
        }
    }
}

/// One hardware category: knows its attributes and how to build nodes.
pub trait CategoryHandler {
    /// Registry name of the category.
    fn category(&self) -> &'static str;

    /// Build this category's nodes, recursing into registered child
    /// categories when `include_children` is set. Always returns a list, even
    /// for categories with a single physical instance.
    ///
    /// # Errors
    /// Record-source failures surface as [`InventoryError::DataAccess`].
    fn collect(&self, ctx: &mut CollectCtx<'_>, include_children: bool)
    -> Result<Vec<Node>, InventoryError>;
}

/// State threaded through one assembly pass.
///
/// Owns the set of leaf devices already placed in the tree so that a device
/// reachable through several parent categories is attached only once.
pub struct CollectCtx<'a> {
    source: &'a dyn RecordSource,
    registry: &'a CategoryRegistry,
    config: &'a InventoryConfig,
    placed: HashSet<String>,
}

impl<'a> CollectCtx<'a> {
    #[must_use]
    pub fn new(
        source: &'a dyn RecordSource,
        registry: &'a CategoryRegistry,
        config: &'a InventoryConfig,
    ) -> Self {
        Self {
            source,
            registry,
            config,
            placed: HashSet::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &'a InventoryConfig {
        self.config
    }

    #[must_use]
    pub fn registry(&self) -> &'a CategoryRegistry {
        self.registry
    }

    /// Validate and run `query` on behalf of `category`.
    ///
    /// # Errors
    /// [`InventoryError::InvalidField`] if validation fails, otherwise
    /// [`InventoryError::DataAccess`] when the source fails.
    pub fn query(&self, category: &str, query: &Query) -> Result<Vec<Record>, InventoryError> {
        query.validate()?;
        tracing::debug!(category, query = %query, "Querying record source");
        self.source
            .query(query)
            .map_err(|source| InventoryError::DataAccess {
                category: category.to_owned(),
                entity: query.entity().to_string(),
                source,
            })
    }

    /// # Errors
    /// [`InventoryError::DataAccess`] when the source fails.
    pub fn associations(
        &self,
        category: &str,
        entity: Entity,
    ) -> Result<Vec<AssociationRecord>, InventoryError> {
        tracing::debug!(category, %entity, "Querying associations");
        self.source
            .query_associations(entity)
            .map_err(|source| InventoryError::DataAccess {
                category: category.to_owned(),
                entity: entity.to_string(),
                source,
            })
    }

    /// Collect one non-root category.
    ///
    /// Recoverable failures are logged and turned into an empty list. Nodes
    /// whose device was already placed earlier in this pass are dropped.
    ///
    /// # Errors
    /// Unknown categories and non-recoverable errors propagate.
    pub fn collect_category(
        &mut self,
        name: &str,
        scope: Scope,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let handler = self.registry.factory(name)?(scope);
        match handler.collect(self, include_children) {
            Ok(nodes) => Ok(self.place(nodes)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(category = name, error = %err, "Skipping category subtree");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Collect every registered child category of `parent`, in registration
    /// order, concatenating their nodes.
    ///
    /// # Errors
    /// See [`CollectCtx::collect_category`].
    pub fn collect_children(
        &mut self,
        parent: &str,
        scope: &Scope,
        include_children: bool,
    ) -> Result<Vec<Node>, InventoryError> {
        let registry = self.registry;
        let mut nodes = Vec::new();
        for child in registry.children_of(parent) {
            nodes.extend(self.collect_category(child, scope.clone(), include_children)?);
        }
        Ok(nodes)
    }

    /// True if the device behind `node` is already in the tree.
    #[must_use]
    pub fn is_placed(&self, node: &Node) -> bool {
        node.placement_key()
            .is_some_and(|key| self.placed.contains(&key))
    }

    fn place(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
            .into_iter()
            .filter(|node| match node.placement_key() {
                Some(key) if !self.placed.insert(key.clone()) => {
                    tracing::debug!(
                        category = %node.category,
                        id = %node.id,
                        key = %key,
                        "Device already placed"
                    );
                    false
                }
                _ => true,
            })
            .collect()
    }
}
