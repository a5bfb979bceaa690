use thiserror::Error;

use shared_database::DatabaseError;

/// Why a console field was rejected. The display text is what the clerk sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} exceeds CHAR limit ({actual} > {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invalid {field}: '{value}' (expected one of {allowed})")]
    NotInDomain {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field} must be INTEGER, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} can't be less than {min}")]
    BelowMinimum { field: &'static str, min: i64 },

    #[error("{field} must be a date in MM/DD/YYYY format, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} must be a time slot in HH:MM-HH:MM format, got '{value}'")]
    InvalidTimeSlot { field: &'static str, value: String },

    #[error("{field} can't be before {other}")]
    OutOfOrder {
        field: &'static str,
        other: &'static str,
    },

    #[error("Invalid {field}: {value} does not exist")]
    UnknownReference { field: &'static str, value: i32 },

    #[error("{field} is not valid UTF-8 text")]
    NotUtf8 { field: &'static str },
}

impl ValidationError {
    /// Shape errors: the text could not be read as the expected kind of value.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ValidationError::NotAnInteger { .. }
                | ValidationError::InvalidDate { .. }
                | ValidationError::InvalidTimeSlot { .. }
                | ValidationError::NotInDomain { .. }
                | ValidationError::NotUtf8 { .. }
        )
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TooLong { field, .. }
            | ValidationError::NotInDomain { field, .. }
            | ValidationError::NotAnInteger { field, .. }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::InvalidDate { field, .. }
            | ValidationError::InvalidTimeSlot { field, .. }
            | ValidationError::OutOfOrder { field, .. }
            | ValidationError::UnknownReference { field, .. }
            | ValidationError::NotUtf8 { field } => field,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unable to connect to database: {0}")]
    Connection(String),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("{0}")]
    Parse(ValidationError),

    #[error("Query failed to execute: {0}")]
    QueryExecution(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// A lost connection or a broken console stream ends the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Connection(_) | AppError::Io(_))
    }

    /// Logs the error and renders the line shown on the console.
    pub fn console_message(&self) -> String {
        match self {
            AppError::Connection(_) | AppError::Io(_) => tracing::error!("{}", self),
            AppError::QueryExecution(_) => tracing::warn!("{}", self),
            _ => tracing::debug!("{}", self),
        }

        format!("ERROR: {}", self)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        if err.is_parse_error() {
            AppError::Parse(err)
        } else {
            AppError::Validation(err)
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Connection(msg) => AppError::Connection(msg),
            other => AppError::QueryExecution(other.to_string()),
        }
    }
}
