//! Record-source contract consumed by the engine.
//!
//! The engine never talks to a management service directly. Everything it
//! knows arrives through [`RecordSource`] as flat attribute maps and flat
//! antecedent/dependent association pairs.

mod entity;
mod query;
mod snapshot;

pub use entity::Entity;
pub use query::{Predicate, Query};
pub use snapshot::SnapshotSource;

use serde::Deserialize;

use crate::error::DataAccessError;

/// One flat attribute map as returned by the source.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Raw association row: both ends are object paths such as
/// `\\HOST\root\cimv2:Win32_IDEController.DeviceID="PCI\\VEN_8086"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssociationRecord {
    #[serde(alias = "Antecedent")]
    pub antecedent: String,
    #[serde(alias = "Dependent")]
    pub dependent: String,
}

impl AssociationRecord {
    #[must_use]
    pub fn new(antecedent: impl Into<String>, dependent: impl Into<String>) -> Self {
        Self {
            antecedent: antecedent.into(),
            dependent: dependent.into(),
        }
    }
}

/// Supplier of hardware records.
///
/// Implementations own timeouts and connection handling; every failure comes
/// back as a [`DataAccessError`] and is never retried by the engine. Calls are
/// issued sequentially from a single thread.
pub trait RecordSource {
    /// Run a validated query and return the matching records in source order.
    ///
    /// # Errors
    /// Returns a [`DataAccessError`] when the source cannot answer.
    fn query(&self, query: &Query) -> Result<Vec<Record>, DataAccessError>;

    /// Return every association row of an association entity.
    ///
    /// # Errors
    /// Returns a [`DataAccessError`] when the source cannot answer.
    fn query_associations(&self, entity: Entity) -> Result<Vec<AssociationRecord>, DataAccessError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn query(&self, query: &Query) -> Result<Vec<Record>, DataAccessError> {
        (**self).query(query)
    }

    fn query_associations(&self, entity: Entity) -> Result<Vec<AssociationRecord>, DataAccessError> {
        (**self).query_associations(entity)
    }
}
