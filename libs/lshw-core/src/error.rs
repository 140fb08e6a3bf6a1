use std::time::Duration;

/// Failure reported by a [`RecordSource`](crate::source::RecordSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataAccessError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

/// Errors for registry construction and hardware tree assembly
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("unknown hardware category '{0}'")]
    UnknownCategory(String),

    #[error("category '{category}' declares unregistered parent '{parent}'")]
    UnregisteredParent { category: String, parent: String },

    #[error("cyclic category registration: {}", cycle.join(" -> "))]
    CyclicRegistration { cycle: Vec<String> },

    #[error("failed to read {entity} for category '{category}': {source}")]
    DataAccess {
        category: String,
        entity: String,
        #[source]
        source: DataAccessError,
    },

    #[error("root category '{0}' produced no nodes")]
    EmptyRoot(String),

    #[error("unauthorized entity: {0}")]
    UnauthorizedEntity(String),

    #[error("invalid attribute name '{0}'")]
    InvalidField(String),

    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl InventoryError {
    /// Record-source failures may be absorbed below the root; everything
    /// else is a programming or startup error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataAccess { .. })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn only_data_access_is_recoverable() {
        let data = InventoryError::DataAccess {
            category: "disk".to_owned(),
            entity: "Win32_DiskDrive".to_owned(),
            source: DataAccessError::Timeout(Duration::from_secs(5)),
        };
        assert!(data.is_recoverable());
        assert!(!InventoryError::EmptyRoot("system".to_owned()).is_recoverable());
        assert!(!InventoryError::UnknownCategory("gpu".to_owned()).is_recoverable());
    }

    #[test]
    fn messages_carry_context() {
        let err = InventoryError::DataAccess {
            category: "disk".to_owned(),
            entity: "Win32_DiskDrive".to_owned(),
            source: DataAccessError::PermissionDenied("access is denied".to_owned()),
        };
        let msg = err.to_string();
        assert!(msg.contains("disk"));
        assert!(msg.contains("Win32_DiskDrive"));
        assert!(msg.contains("access is denied"));

        let cycle = InventoryError::CyclicRegistration {
            cycle: vec!["a".to_owned(), "b".to_owned(), "a".to_owned()],
        };
        assert_eq!(cycle.to_string(), "cyclic category registration: a -> b -> a");
    }
}
