use std::fmt;

use shared_database::DatabaseError;
use shared_models::{AppError, ValidationError};
use shared_utils::validation::{
    check_length, parse_choice, parse_non_negative, ADDRESS_MAX_CHARS, NAME_MAX_CHARS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const CODES: [&'static str; 2] = ["M", "F"];

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match parse_choice("gender", value, &Self::CODES)? {
            "M" => Ok(Gender::Male),
            _ => Ok(Gender::Female),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The four fields a booking uses to recognise a returning patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIdentity {
    pub name: String,
    pub gender: Gender,
    pub age: i32,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub identity: PatientIdentity,
    pub appointment_count: i32,
}

impl NewPatient {
    pub fn first_visit(identity: PatientIdentity) -> Self {
        Self {
            identity,
            appointment_count: 0,
        }
    }
}

pub fn validate_name(value: &str) -> Result<String, ValidationError> {
    check_length("Name", value, NAME_MAX_CHARS)
}

pub fn validate_address(value: &str) -> Result<String, ValidationError> {
    check_length("Address", value, ADDRESS_MAX_CHARS)
}

pub fn validate_age(value: &str) -> Result<i32, ValidationError> {
    parse_non_negative("age", value)
}

pub fn validate_appointment_count(value: &str) -> Result<i32, ValidationError> {
    parse_non_negative("number of appointments", value)
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(i32),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(id) => AppError::NotFound(format!("patient {}", id)),
            PatientError::Database(e) => AppError::from(e),
        }
    }
}
