use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required field is missing or a value breaks a length limit
    #[error("{0}")]
    Validation(String),

    #[error("Command with ID {0} not found.")]
    NotFound(i32),

    /// Import payload is not JSON or not a list
    #[error("{0}")]
    Format(String),

    /// Persisting an import batch failed; nothing from the batch was kept
    #[error("Error importing file: {0}")]
    Import(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}
