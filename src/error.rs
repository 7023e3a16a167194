//! Crate-wide error type.
//!
//! All fallible operations of the simulator, the triplet sampler/scorer and the
//! persistence layer return [LineageError]. Errors are raised eagerly at the
//! start of an operation, so no partial results are ever returned.

use crate::parser::ParsingError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LineageError>;

// =#========================================================================#=
// LINEAGE ERROR
// =#========================================================================#=
/// Errors raised by simulation, scoring and tree persistence.
#[derive(Debug, Error)]
pub enum LineageError {
    /// Invalid simulation, model or scoring parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No LCA-depth bucket of the reference tree holds enough triples,
    /// or every sampled trial was excluded.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A sampled triple references a leaf absent from one of the trees.
    #[error("leaf '{sample}' is missing from the {tree} tree")]
    MissingLeaf {
        /// Sample identifier of the missing leaf
        sample: String,
        /// Which tree lacks it (e.g. "reconstructed")
        tree: String,
    },

    /// A tree violates structural invariants (e.g. after loading it).
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// Newick input could not be parsed.
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    /// Reading or writing a file failed.
    #[error("IO error - {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error - {0}")]
    Json(#[from] serde_json::Error),
}

impl LineageError {
    /// Shorthand for [LineageError::Configuration].
    pub fn config(msg: impl Into<String>) -> Self {
        LineageError::Configuration(msg.into())
    }

    /// Shorthand for [LineageError::MissingLeaf].
    pub(crate) fn missing_leaf(sample: &str, tree: &str) -> Self {
        LineageError::MissingLeaf {
            sample: sample.to_string(),
            tree: tree.to_string(),
        }
    }
}
