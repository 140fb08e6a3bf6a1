//! In-memory [`RecordSource`] used by tests, fixtures and offline replays.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;

use super::{AssociationRecord, Entity, Query, Record, RecordSource};
use crate::error::{DataAccessError, InventoryError};

/// Failure description as it appears in a snapshot file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum InjectedFailure {
    PermissionDenied { message: String },
    Timeout { millis: u64 },
    Malformed { message: String },
    Unavailable { message: String },
}

impl From<InjectedFailure> for DataAccessError {
    fn from(failure: InjectedFailure) -> Self {
        match failure {
            InjectedFailure::PermissionDenied { message } => Self::PermissionDenied(message),
            InjectedFailure::Timeout { millis } => Self::Timeout(Duration::from_millis(millis)),
            InjectedFailure::Malformed { message } => Self::Malformed(message),
            InjectedFailure::Unavailable { message } => Self::Unavailable(message),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SnapshotFile {
    records: BTreeMap<String, Vec<Record>>,
    associations: BTreeMap<String, Vec<AssociationRecord>>,
    failures: BTreeMap<String, InjectedFailure>,
}

/// Records held in memory, keyed by entity.
///
/// Predicates are evaluated case-insensitively and only the requested
/// attributes are returned, so handlers see the same shape a live source
/// would hand back. Every executed query is logged and can be inspected
/// through [`SnapshotSource::queries`].
#[derive(Debug, Default)]
pub struct SnapshotSource {
    records: HashMap<Entity, Vec<Record>>,
    associations: HashMap<Entity, Vec<AssociationRecord>>,
    failures: HashMap<Entity, DataAccessError>,
    log: Mutex<Vec<String>>,
}

impl SnapshotSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records for `entity`, keeping insertion order.
    #[must_use]
    pub fn with_records(mut self, entity: Entity, records: impl IntoIterator<Item = Record>) -> Self {
        self.records.entry(entity).or_default().extend(records);
        self
    }

    #[must_use]
    pub fn with_associations(
        mut self,
        entity: Entity,
        rows: impl IntoIterator<Item = AssociationRecord>,
    ) -> Self {
        self.associations.entry(entity).or_default().extend(rows);
        self
    }

    /// Make every query against `entity` fail with `error`.
    #[must_use]
    pub fn fail(mut self, entity: Entity, error: DataAccessError) -> Self {
        self.failures.insert(entity, error);
        self
    }

    /// Load a snapshot document.
    ///
    /// # Errors
    /// Returns [`InventoryError::Snapshot`] for malformed JSON and
    /// [`InventoryError::UnauthorizedEntity`] for an entity outside the
    /// allow-list.
    pub fn from_json(text: &str) -> Result<Self, InventoryError> {
        let file: SnapshotFile = serde_json::from_str(text)?;
        let mut source = Self::new();
        for (name, records) in file.records {
            source = source.with_records(name.parse()?, records);
        }
        for (name, rows) in file.associations {
            source = source.with_associations(name.parse()?, rows);
        }
        for (name, failure) in file.failures {
            source = source.fail(name.parse()?, failure.into());
        }
        tracing::debug!(
            entities = source.records.len(),
            associations = source.associations.len(),
            failures = source.failures.len(),
            "Loaded record snapshot"
        );
        Ok(source)
    }

    /// Rendered text of every query executed so far, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn check(&self, entity: Entity) -> Result<(), DataAccessError> {
        self.failures.get(&entity).map_or(Ok(()), |err| Err(err.clone()))
    }
}

fn project(record: &Record, fields: &[&'static str]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    fields
        .iter()
        .filter_map(|field| {
            record
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field))
                .map(|(_, value)| ((*field).to_owned(), value.clone()))
        })
        .collect()
}

impl RecordSource for SnapshotSource {
    fn query(&self, query: &Query) -> Result<Vec<Record>, DataAccessError> {
        self.log.lock().push(query.to_string());
        self.check(query.entity())?;

        let rows = self
            .records
            .get(&query.entity())
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(rows
            .iter()
            .filter(|record| query.predicate().is_none_or(|p| p.matches(record)))
            .map(|record| project(record, query.field_names()))
            .collect())
    }

    fn query_associations(&self, entity: Entity) -> Result<Vec<AssociationRecord>, DataAccessError> {
        self.log
            .lock()
            .push(format!("SELECT Antecedent,Dependent FROM {entity}"));
        self.check(entity)?;
        Ok(self.associations.get(&entity).cloned().unwrap_or_default())
    }
}
