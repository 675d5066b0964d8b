//! Core error types

use thiserror::Error;

/// Result type for podsizer-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while sizing a workload document
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// No calculator is registered for the requested kind
    #[error("no calculator registered for {group}/{version}, Kind={kind}")]
    UnknownKind {
        group: String,
        version: String,
        kind: String,
    },

    /// A field resolved to a value of the wrong structural type
    #[error("{path}: expected {expected}, found {found}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// A sub-document exists but does not conform to the expected shape
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A quantity string does not follow the Kubernetes quantity grammar
    #[error("invalid quantity {value:?}: {reason}")]
    InvalidQuantity { value: String, reason: String },
}
