//! Error handling for the ownership graph
//!
//! Most failure modes of a resolution run are *not* errors: an unknown root
//! resolves to an empty result, a malformed record is skipped, and a cycle is
//! cut by the path guard. What remains is surfaced through [`OwnershipError`].

use thiserror::Error;

use ownership_types::CompanyId;

/// Main error type for the ownership graph
#[derive(Error, Debug)]
pub enum OwnershipError {
    /// Traversal exceeded the configured node-visit cap. The partial result is
    /// discarded rather than returned as if complete.
    #[error("Traversal from company {root} exceeded the node-visit cap ({visited} visits, cap {cap})")]
    ResourceExhausted {
        root: CompanyId,
        visited: usize,
        cap: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl OwnershipError {
    /// True when the error is the visit-cap safety valve
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, OwnershipError::ResourceExhausted { .. })
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, OwnershipError>;
