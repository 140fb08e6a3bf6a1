#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Hardware Inventory Engine
//!
//! Turns flat hardware records from a system-management source into one
//! nested report:
//! - a registry of hardware categories and their parent/child relations
//! - category handlers mapping raw attribute maps to [`Node`] values
//! - a resolver rebuilding controller chains from association rows
//! - a tree assembler that places each physical device exactly once
//!
//! The record source itself is a collaborator behind [`RecordSource`];
//! [`SnapshotSource`] serves recorded or hand-built data.

pub mod assembler;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod source;

mod handlers;

pub use assembler::TreeAssembler;
pub use config::{InventoryConfig, NetworkFilter, UsbConfig};
pub use error::{DataAccessError, InventoryError};
pub use handler::{CategoryHandler, CollectCtx, Scope};
pub use model::{ERROR_SENTINEL, Node, UNKNOWN_SENTINEL};
pub use registry::{CategoryRegistry, HandlerFactory, RegistryBuilder};
pub use source::{AssociationRecord, Entity, Predicate, Query, Record, RecordSource, SnapshotSource};
