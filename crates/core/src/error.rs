/// Conditions the engine raises to its caller.
///
/// Content problems never show up here; they are reported as
/// [`ValidationResult`](crate::report::ValidationResult)s. A `CoreError`
/// means the caller broke the input contract or supplied a bad rule table.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}
