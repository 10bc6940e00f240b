//! Crate-level error type.

use crate::fieldpath::PathError;
use crate::model::ModelError;
use crate::mutate::MutationError;
use crate::schema::SchemaError;
use crate::typed::ValidationErrors;
use thiserror::Error;

/// Error is the union of the per-module errors, for callers that chain
/// operations across modules.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot diff {original} against {modified}: types differ")]
    TypeMismatch { original: String, modified: String },
}

/// Result alias used by the cross-module entry points.
pub type Result<T> = std::result::Result<T, Error>;
