// models/src/errors.rs

pub use thiserror::Error;

/// A single field-level schema violation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or empty after sanitizing.
    #[error("{0} is required")]
    Required(&'static str),
    /// A numeric field held something that is not a finite number.
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    /// The SSN did not match `DDD-DD-DDDD`.
    #[error("{0} is not a valid SSN format! Use XXX-XX-XXXX")]
    InvalidSsn(String),
    /// An identifier could not be parsed.
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
}

/// Every violation found while checking one record. Displays as the
/// comma-joined list of messages, which is what API clients get back.
#[derive(Debug, Clone, Default, Error, PartialEq, Eq)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// A type alias for a `Result` that returns `ValidationErrors` on failure.
pub type ValidationResult<T> = Result<T, ValidationErrors>;
