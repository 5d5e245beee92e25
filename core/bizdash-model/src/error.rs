//! Error types for decoding and validating records.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised at the decode/validate boundary.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The wire row did not have the expected shape.
    #[error("malformed {family} row: {source}")]
    Malformed {
        family: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The row decoded but breaks a record invariant.
    #[error("invalid {family}.{field}: {reason}")]
    Invalid {
        family: &'static str,
        field: &'static str,
        reason: String,
    },

    /// A list payload was not a JSON array.
    #[error("expected a list of {family} rows")]
    NotAList { family: &'static str },

    /// One row of a list failed to decode.
    #[error("{family} row {index}: {source}")]
    Row {
        family: &'static str,
        index: usize,
        #[source]
        source: Box<ModelError>,
    },
}

impl ModelError {
    pub(crate) fn invalid(
        family: &'static str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            family,
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn require_non_blank(
    family: &'static str,
    field: &'static str,
    value: &str,
) -> ModelResult<()> {
    if value.trim().is_empty() {
        return Err(ModelError::invalid(family, field, "must not be blank"));
    }
    Ok(())
}
