//! Error types for column definition and value generation.

use thiserror::Error;

/// Errors raised while defining columns or generating values.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A value definition that cannot be rendered for its column type.
    #[error("Invalid value definition '{definition}' for column '{column}': {reason}")]
    ColumnDefinition {
        column: String,
        definition: String,
        reason: String,
    },

    /// A distribution was asked to map between inverted ranges.
    #[error("{bound} minimum is greater than {bound} maximum: {min} > {max}")]
    InvalidRange {
        bound: &'static str,
        min: i64,
        max: i64,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Invalid column type: {0}")]
    UnknownType(String),

    #[error("Undefined distribution function name: {0}")]
    UnknownDistribution(String),

    #[error("Failed to read table definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse table definition YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    pub(crate) fn column_definition(
        column: &str,
        definition: &str,
        reason: impl Into<String>,
    ) -> Self {
        GeneratorError::ColumnDefinition {
            column: column.to_string(),
            definition: definition.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;
