//! Category registry: handler factories and the parent/child graph.
//!
//! The registry is built once with [`RegistryBuilder`] and is read-only
//! afterwards. Cycles are rejected at registration time; dangling parents are
//! rejected when the builder is finished.

use std::collections::{HashMap, HashSet};

use crate::error::InventoryError;
use crate::handler::{CategoryHandler, Scope};

/// Constructor for a category handler bound to a scope.
pub type HandlerFactory = fn(Scope) -> Box<dyn CategoryHandler>;

#[derive(Default)]
pub struct RegistryBuilder {
    order: Vec<&'static str>,
    factories: HashMap<&'static str, HandlerFactory>,
    parents: HashMap<&'static str, Vec<&'static str>>,
    children: HashMap<&'static str, Vec<&'static str>>,
}

impl RegistryBuilder {
    /// Register `name` under each of `parents`, appending it to their child
    /// lists in call order.
    ///
    /// Registering the same name again replaces its factory and adds any new
    /// parents; a repeated name/parent pair is a no-op.
    ///
    /// # Errors
    /// Returns [`InventoryError::CyclicRegistration`] if any parent is `name`
    /// itself or one of its descendants. Nothing is recorded in that case.
    pub fn register(
        &mut self,
        name: &'static str,
        factory: HandlerFactory,
        parents: &[&'static str],
    ) -> Result<&mut Self, InventoryError> {
        for parent in parents {
            if let Some(cycle) = self.path_between(name, parent) {
                return Err(InventoryError::CyclicRegistration {
                    cycle: std::iter::once(*parent)
                        .chain(cycle)
                        .map(str::to_owned)
                        .collect(),
                });
            }
        }

        if self.factories.insert(name, factory).is_none() {
            self.order.push(name);
        }
        for parent in parents {
            let declared = self.parents.entry(name).or_default();
            if declared.contains(parent) {
                continue;
            }
            declared.push(*parent);
            self.children.entry(*parent).or_default().push(name);
        }
        tracing::debug!(category = name, ?parents, "Registered hardware category");
        Ok(self)
    }

    /// Path `from -> ... -> to` along child edges, if `to` is reachable.
    fn path_between(&self, from: &'static str, to: &str) -> Option<Vec<&'static str>> {
        let mut stack = vec![vec![from]];
        let mut seen = HashSet::new();
        while let Some(path) = stack.pop() {
            let &last = path.last()?;
            if last == to {
                return Some(path);
            }
            if !seen.insert(last) {
                continue;
            }
            for child in self.children.get(last).into_iter().flatten() {
                let mut next = path.clone();
                next.push(*child);
                stack.push(next);
            }
        }
        None
    }

    /// Freeze the registry.
    ///
    /// # Errors
    /// Returns [`InventoryError::UnregisteredParent`] when a category names a
    /// parent that was never registered itself.
    pub fn build(self) -> Result<CategoryRegistry, InventoryError> {
        for name in &self.order {
            for parent in self.parents.get(name).into_iter().flatten() {
                if !self.factories.contains_key(parent) {
                    return Err(InventoryError::UnregisteredParent {
                        category: (*name).to_owned(),
                        parent: (*parent).to_owned(),
                    });
                }
            }
        }
        Ok(CategoryRegistry {
            order: self.order,
            factories: self.factories,
            children: self.children,
        })
    }
}

/// Read-only view of the registered categories.
pub struct CategoryRegistry {
    order: Vec<&'static str>,
    factories: HashMap<&'static str, HandlerFactory>,
    children: HashMap<&'static str, Vec<&'static str>>,
}

impl std::fmt::Debug for CategoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryRegistry")
            .field("categories", &self.order)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl CategoryRegistry {
    /// Registry with every built-in hardware category.
    ///
    /// # Errors
    /// Propagates registration errors; the built-in table is expected to be
    /// consistent, so an error here is a programming mistake.
    pub fn builtin() -> Result<Self, InventoryError> {
        let mut builder = RegistryBuilder::default();
        crate::handlers::register_builtin(&mut builder)?;
        builder.build()
    }

    /// # Errors
    /// Returns [`InventoryError::UnknownCategory`] if `name` was never registered.
    pub fn factory(&self, name: &str) -> Result<HandlerFactory, InventoryError> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| InventoryError::UnknownCategory(name.to_owned()))
    }

    /// Child categories of `name` in registration order, empty if none.
    #[must_use]
    pub fn children_of(&self, name: &str) -> &[&'static str] {
        self.children.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Factories of the child categories of `name`, in registration order.
    #[must_use]
    pub fn child_factories(&self, name: &str) -> Vec<(&'static str, HandlerFactory)> {
        self.children_of(name)
            .iter()
            .filter_map(|child| self.factories.get(child).map(|f| (*child, *f)))
            .collect()
    }

    /// Registered category names in registration order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
