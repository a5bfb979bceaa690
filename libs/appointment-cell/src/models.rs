use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use patient_cell::{PatientError, PatientIdentity};
use shared_database::DatabaseError;
use shared_models::{AppError, ValidationError};
use shared_utils::validation::{parse_choice, parse_date, parse_integer, parse_time_slot};

// ==============================================================================
// APPOINTMENT STATUS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    /// AV: open for booking.
    Available,
    /// AC: booked once.
    Active,
    /// WL: booked again while active.
    Waitlisted,
    /// PA: already processed, never rebooked.
    Processed,
}

impl AppointmentStatus {
    pub const CODES: [&'static str; 4] = ["PA", "AC", "AV", "WL"];

    /// Console input: case-insensitive, trimmed.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let code = parse_choice("status", value, &Self::CODES)?;
        Self::from_code(code).ok_or_else(|| ValidationError::NotInDomain {
            field: "status",
            value: value.to_string(),
            allowed: Self::CODES.join("/"),
        })
    }

    /// Stored value. CHAR columns come back blank-padded.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "AV" => Some(AppointmentStatus::Available),
            "AC" => Some(AppointmentStatus::Active),
            "WL" => Some(AppointmentStatus::Waitlisted),
            "PA" => Some(AppointmentStatus::Processed),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppointmentStatus::Available => "AV",
            AppointmentStatus::Active => "AC",
            AppointmentStatus::Waitlisted => "WL",
            AppointmentStatus::Processed => "PA",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==============================================================================
// TIME SLOT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let (start, end) = parse_time_slot("timeslot", value)?;
        Ok(Self { start, end })
    }
}

/// Renders as stored: `HH:MM-HH:MM`.
impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

// ==============================================================================
// APPOINTMENTS AND BOOKINGS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAppointmentRequest {
    pub patient: PatientIdentity,
    pub doctor_id: i32,
    pub appointment_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingOutcome {
    pub appointment_id: i32,
    pub previous_status: AppointmentStatus,
    pub new_status: Option<AppointmentStatus>,
    /// None when the appointment was not bookable and nothing was written.
    pub patient_id: Option<i32>,
    pub patient_created: bool,
}

impl BookingOutcome {
    pub fn recorded(&self) -> bool {
        self.patient_id.is_some()
    }

    /// `Appointment status: AV -> AC`, or just the status when it stays put.
    pub fn status_line(&self) -> String {
        match self.new_status {
            Some(next) => format!("Appointment status: {} -> {}", self.previous_status, next),
            None => format!("Appointment status: {}", self.previous_status),
        }
    }
}

pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_date("date", value)
}

pub fn validate_appointment_id(value: &str) -> Result<i32, ValidationError> {
    parse_integer("appointment", value)
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Invalid appointment: {0}")]
    NotFound(i32),

    #[error("Invalid doctor: {0}")]
    DoctorNotFound(i32),

    #[error("Unknown appointment status '{0}'")]
    UnknownStatus(String),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(id) => AppError::from(ValidationError::UnknownReference {
                field: "appointment",
                value: id,
            }),
            AppointmentError::DoctorNotFound(id) => AppError::from(ValidationError::UnknownReference {
                field: "doctor",
                value: id,
            }),
            AppointmentError::UnknownStatus(_) | AppointmentError::InvalidStatusTransition { .. } => {
                AppError::QueryExecution(err.to_string())
            }
            AppointmentError::Patient(e) => AppError::from(e),
            AppointmentError::Database(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(AppointmentStatus::parse("av").unwrap(), AppointmentStatus::Available);
        assert_eq!(AppointmentStatus::parse(" WL ").unwrap(), AppointmentStatus::Waitlisted);
        assert!(AppointmentStatus::parse("XX").is_err());
    }

    #[test]
    fn test_status_from_padded_code() {
        assert_eq!(AppointmentStatus::from_code("PA "), Some(AppointmentStatus::Processed));
        assert_eq!(AppointmentStatus::from_code("pa"), None);
    }

    #[test]
    fn test_time_slot_round_trips_text() {
        let slot = TimeSlot::parse("08:00-09:30").unwrap();
        assert_eq!(slot.to_string(), "08:00-09:30");
        assert!(TimeSlot::parse("8:00-9:30").is_err());
        assert!(TimeSlot::parse("25:00-26:00").is_err());
    }

    #[test]
    fn test_status_line() {
        let mut outcome = BookingOutcome {
            appointment_id: 1,
            previous_status: AppointmentStatus::Available,
            new_status: Some(AppointmentStatus::Active),
            patient_id: Some(4),
            patient_created: false,
        };
        assert_eq!(outcome.status_line(), "Appointment status: AV -> AC");

        outcome.previous_status = AppointmentStatus::Processed;
        outcome.new_status = None;
        assert_eq!(outcome.status_line(), "Appointment status: PA");
    }
}
