use chrono::NaiveDate;

use appointment_cell::AppointmentStatus;
use shared_database::DatabaseError;
use shared_models::{AppError, ValidationError};

/// Report 5: AC/AV appointments of one doctor in an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorAppointmentsQuery {
    pub doctor_id: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Report 6: AV appointments of a department on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentAvailabilityQuery {
    pub department_name: String,
    pub date: NaiveDate,
}

/// Report 8: distinct patients per doctor for appointments in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientCountQuery {
    pub status: AppointmentStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Database(e) => AppError::from(e),
            ReportError::Io(e) => AppError::Io(e),
        }
    }
}
