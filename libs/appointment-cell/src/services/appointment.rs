use std::sync::Arc;

use tracing::{info, instrument};

use shared_database::{Database, DatabaseError, Statement};

use crate::models::{AppointmentError, AppointmentStatus, NewAppointment};

pub struct AppointmentService {
    db: Arc<dyn Database>,
}

impl AppointmentService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, appointment), fields(status = %appointment.status))]
    pub async fn add_appointment(&self, appointment: &NewAppointment) -> Result<i32, AppointmentError> {
        let result = self.db.query(&insert_appointment_statement(appointment)).await?;
        let appointment_id = result.first_int()?.ok_or_else(|| {
            DatabaseError::UnexpectedShape("insert returned no appointment id".into())
        })?;

        info!("Appointment {} added", appointment_id);
        Ok(appointment_id)
    }
}

pub fn insert_appointment_statement(appointment: &NewAppointment) -> Statement {
    Statement::new(
        "INSERT INTO Appointment (appnt_ID, adate, time_slot, status) \
         SELECT COUNT(*), $1::date, $2::text, $3::text FROM Appointment \
         RETURNING appnt_ID",
    )
    .bind(appointment.date)
    .bind(appointment.time_slot.to_string())
    .bind(appointment.status.code())
}

/// Locks the row until the surrounding transaction ends.
pub fn locked_status_statement(appointment_id: i32) -> Statement {
    Statement::new("SELECT status::text FROM Appointment WHERE appnt_ID = $1::integer FOR UPDATE")
        .bind(appointment_id)
}

pub fn update_status_statement(appointment_id: i32, status: AppointmentStatus) -> Statement {
    Statement::new("UPDATE Appointment SET status = $1::text WHERE appnt_ID = $2::integer")
        .bind(status.code())
        .bind(appointment_id)
}

pub(crate) fn parse_stored_status(code: &str) -> Result<AppointmentStatus, AppointmentError> {
    AppointmentStatus::from_code(code).ok_or_else(|| AppointmentError::UnknownStatus(code.to_string()))
}
