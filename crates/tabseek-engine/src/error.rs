//! Error types for the engine crate.
//!
//! Evaluating a query never fails. Errors only arise when a [`QueryModel`]
//! is decoded from text.
//!
//! [`QueryModel`]: crate::QueryModel

use thiserror::Error;

/// Errors that can occur when decoding a query model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model text is not valid JSON or does not have the model's shape.
    #[error("invalid query model JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The model text is not valid YAML or does not have the model's shape.
    #[error("invalid query model YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for model decoding.
pub type Result<T> = std::result::Result<T, ModelError>;
