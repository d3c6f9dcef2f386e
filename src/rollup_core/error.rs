//! Per-site run failures

use super::store_backend::StoreError;
use super::types::SiteId;

#[derive(Debug)]
pub enum RollupError {
    /// Could not load the site's checkpoint
    Checkpoint { site: SiteId, source: StoreError },
    /// Event store query failed
    Read { site: SiteId, source: StoreError },
    /// Deleting the window's old rows failed
    Delete { site: SiteId, source: StoreError },
    /// Inserting replacement rows failed after the delete succeeded
    Insert { site: SiteId, source: StoreError },
}

impl RollupError {
    pub fn site(&self) -> SiteId {
        match self {
            RollupError::Checkpoint { site, .. }
            | RollupError::Read { site, .. }
            | RollupError::Delete { site, .. }
            | RollupError::Insert { site, .. } => *site,
        }
    }

    pub fn store_error(&self) -> &StoreError {
        match self {
            RollupError::Checkpoint { source, .. }
            | RollupError::Read { source, .. }
            | RollupError::Delete { source, .. }
            | RollupError::Insert { source, .. } => source,
        }
    }

    /// Whether the next scheduled tick can be expected to succeed
    ///
    /// Constraint violations mean the aggregator produced duplicate keys;
    /// retrying the same data reproduces them.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.store_error(), StoreError::Constraint(_))
    }
}

impl std::fmt::Display for RollupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollupError::Checkpoint { site, source } => {
                write!(f, "site {}: load checkpoint: {}", site, source)
            }
            RollupError::Read { site, source } => write!(f, "site {}: fetch data: {}", site, source),
            RollupError::Delete { site, source } => write!(f, "site {}: delete: {}", site, source),
            RollupError::Insert { site, source } => write!(f, "site {}: insert: {}", site, source),
        }
    }
}

impl std::error::Error for RollupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.store_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let err = RollupError::Read { site: 1, source: StoreError::Lock };
        assert!(err.is_retryable());
        assert_eq!(err.site(), 1);
        assert_eq!(err.to_string(), "site 1: fetch data: Connection lock poisoned");

        let err = RollupError::Insert {
            site: 2,
            source: StoreError::Constraint("UNIQUE constraint failed".into()),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("site 2: insert:"));
    }
}
