// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use patient_cell::PatientService;
use shared_database::{Database, Statement};

use crate::models::{AppointmentError, BookAppointmentRequest, BookingOutcome};
use crate::services::appointment::{locked_status_statement, parse_stored_status, update_status_statement};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    db: Arc<dyn Database>,
    patient_service: PatientService,
    lifecycle_service: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            patient_service: PatientService::new(Arc::clone(&db)),
            lifecycle_service: AppointmentLifecycleService::new(),
            db,
        }
    }

    /// Books `request.appointment_id` for the patient with `request.doctor_id`.
    ///
    /// Runs as one transaction: the appointment row is locked, the patient is
    /// found or created, the status moves forward, a search record and an
    /// assignment are inserted and the patient's counter goes up by one.
    /// A processed (PA) appointment rolls back with nothing written and is
    /// reported through `BookingOutcome::recorded`.
    #[instrument(skip(self, request), fields(appointment_id = request.appointment_id, doctor_id = request.doctor_id))]
    pub async fn book_appointment(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<BookingOutcome, AppointmentError> {
        self.db.begin().await?;

        match self.book_in_transaction(request).await {
            Ok(outcome) if outcome.recorded() => {
                self.db.commit().await?;
                info!(
                    "Appointment {} booked for patient {:?}",
                    outcome.appointment_id, outcome.patient_id
                );
                Ok(outcome)
            }
            Ok(outcome) => {
                self.db.rollback().await?;
                debug!("Appointment {} is not bookable, nothing written", outcome.appointment_id);
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = self.db.rollback().await {
                    warn!("Rollback after failed booking also failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn book_in_transaction(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<BookingOutcome, AppointmentError> {
        let appointment_id = request.appointment_id;

        let result = self.db.query(&locked_status_statement(appointment_id)).await?;
        let previous_status = match result.first_value() {
            Some(code) => parse_stored_status(code)?,
            None => return Err(AppointmentError::NotFound(appointment_id)),
        };

        let new_status = self.lifecycle_service.transition_on_booking(previous_status);

        if !self.lifecycle_service.accepts_bookings(previous_status) {
            return Ok(BookingOutcome {
                appointment_id,
                previous_status,
                new_status,
                patient_id: None,
                patient_created: false,
            });
        }

        let (patient_id, patient_created) =
            self.patient_service.find_or_create(&request.patient).await?;

        if let Some(next) = new_status {
            self.lifecycle_service
                .validate_status_transition(previous_status, next)?;
            self.db
                .execute(&update_status_statement(appointment_id, next))
                .await?;
        }

        let searched = self
            .db
            .execute(&insert_search_statement(patient_id, appointment_id, request.doctor_id))
            .await?;
        if searched == 0 {
            return Err(AppointmentError::DoctorNotFound(request.doctor_id));
        }

        self.db
            .execute(&insert_assignment_statement(appointment_id, request.doctor_id))
            .await?;

        self.patient_service
            .increment_appointment_count(patient_id)
            .await?;

        Ok(BookingOutcome {
            appointment_id,
            previous_status,
            new_status,
            patient_id: Some(patient_id),
            patient_created,
        })
    }
}

/// Hospital id comes from the doctor's department; no row is inserted when
/// the doctor does not exist.
pub fn insert_search_statement(patient_id: i32, appointment_id: i32, doctor_id: i32) -> Statement {
    Statement::new(
        "INSERT INTO searches (hid, pid, aid) \
         SELECT DE.hid, $1::integer, $2::integer \
         FROM Doctor D JOIN Department DE ON DE.dept_ID = D.did \
         WHERE D.doctor_ID = $3::integer",
    )
    .bind(patient_id)
    .bind(appointment_id)
    .bind(doctor_id)
}

pub fn insert_assignment_statement(appointment_id: i32, doctor_id: i32) -> Statement {
    Statement::new("INSERT INTO has_appointment (appt_id, doctor_id) VALUES ($1::integer, $2::integer)")
        .bind(appointment_id)
        .bind(doctor_id)
}
