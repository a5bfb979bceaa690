use std::sync::Arc;

use tracing::info;

use doctor_cell::{validate_doctor_id, DoctorService};
use patient_cell::{validate_address, validate_age, validate_name, Gender, PatientIdentity};
use shared_database::Database;
use shared_models::AppError;
use shared_utils::Console;

use crate::models::{
    validate_appointment_id, validate_date, AppointmentStatus, BookAppointmentRequest,
    NewAppointment, TimeSlot,
};
use crate::services::{AppointmentBookingService, AppointmentService};

/// Menu entry "Add Appointment".
pub async fn add_appointment(db: Arc<dyn Database>, console: &mut Console) -> Result<(), AppError> {
    let date = console.read_field("\tEnter date: ", validate_date)?;
    let time_slot = console.read_field("\tEnter timeslot: ", TimeSlot::parse)?;
    let status = console.read_field("\tEnter status: ", AppointmentStatus::parse)?;

    let appointment = NewAppointment {
        date,
        time_slot,
        status,
    };

    let appointment_id = AppointmentService::new(db).add_appointment(&appointment).await?;
    info!("Added appointment {}", appointment_id);

    Ok(())
}

/// Menu entry "Make an Appointment". The doctor is checked as soon as it is
/// entered; everything else is decided inside the booking transaction.
pub async fn make_appointment(db: Arc<dyn Database>, console: &mut Console) -> Result<(), AppError> {
    let name = console.read_field("\tEnter patient name: ", validate_name)?;
    let gender = console.read_field("\tEnter patient gender: ", Gender::parse)?;
    let age = console.read_field("\tEnter patient age: ", validate_age)?;
    let address = console.read_field("\tEnter patient address: ", validate_address)?;

    let doctor_id = console.read_field("\tEnter doctor: ", validate_doctor_id)?;
    DoctorService::new(Arc::clone(&db)).require_doctor(doctor_id).await?;

    let appointment_id = console.read_field("\tEnter appointment: ", validate_appointment_id)?;

    let request = BookAppointmentRequest {
        patient: PatientIdentity {
            name,
            gender,
            age,
            address,
        },
        doctor_id,
        appointment_id,
    };

    let outcome = AppointmentBookingService::new(db)
        .book_appointment(&request)
        .await?;
    console.println(&outcome.status_line())?;

    Ok(())
}
