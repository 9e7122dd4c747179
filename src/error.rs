use crate::domain::{identifiers::IdentifierError, types::FieldName};
use thiserror::Error;

/// OICP core error types
///
/// Protocol failures are never errors: they come back as negative
/// acknowledgements or results. Only identifier parsing, fail-fast argument
/// validation and configuration loading return `Err`.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidFormat(#[from] IdentifierError),

    #[error("Invalid argument: {field}")]
    ArgumentInvalid { field: FieldName },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn argument_invalid(field: impl Into<String>) -> Self {
        Self::ArgumentInvalid {
            field: FieldName::try_new(field.into()).unwrap_or_else(|_| FieldName::unknown()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
