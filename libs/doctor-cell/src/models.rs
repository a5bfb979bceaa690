use shared_database::DatabaseError;
use shared_models::{AppError, ValidationError};
use shared_utils::validation::{
    check_length, parse_integer, NAME_MAX_CHARS, SPECIALTY_MAX_CHARS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub department_id: i32,
}

pub fn validate_name(value: &str) -> Result<String, ValidationError> {
    check_length("Name", value, NAME_MAX_CHARS)
}

pub fn validate_specialty(value: &str) -> Result<String, ValidationError> {
    check_length("Specialty", value, SPECIALTY_MAX_CHARS)
}

pub fn validate_department_id(value: &str) -> Result<i32, ValidationError> {
    parse_integer("department", value)
}

pub fn validate_doctor_id(value: &str) -> Result<i32, ValidationError> {
    parse_integer("doctor", value)
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Invalid department: {0}")]
    UnknownDepartment(i32),

    #[error("Invalid doctor: {0}")]
    NotFound(i32),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::UnknownDepartment(id) => AppError::from(ValidationError::UnknownReference {
                field: "department",
                value: id,
            }),
            DoctorError::NotFound(id) => AppError::from(ValidationError::UnknownReference {
                field: "doctor",
                value: id,
            }),
            DoctorError::Database(e) => AppError::from(e),
        }
    }
}
