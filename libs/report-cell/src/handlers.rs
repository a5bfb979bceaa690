use std::sync::Arc;

use appointment_cell::AppointmentStatus;
use shared_database::Database;
use shared_models::AppError;
use shared_utils::validation::{ensure_ordered, parse_date, parse_non_negative};
use shared_utils::Console;

use crate::models::{DepartmentAvailabilityQuery, DoctorAppointmentsQuery, PatientCountQuery};
use crate::services::{queries, ReportRunner};

// Listing flows re-prompt on every rejected value instead of aborting.

/// Menu entry 5.
pub async fn list_appointments_of_doctor(
    db: Arc<dyn Database>,
    console: &mut Console,
) -> Result<(), AppError> {
    let doctor_id = console.prompt_until("Enter doctor ID:\n", |s| parse_non_negative("doctor ID", s))?;
    let start = console.prompt_until("Enter starting date(MM/DD/YYYY):\n", |s| {
        parse_date("starting date", s)
    })?;
    let end = console.prompt_until("Enter ending date(MM/DD/YYYY):\n", |s| {
        let end = parse_date("ending date", s)?;
        ensure_ordered("ending date", "starting date", start, end)?;
        Ok(end)
    })?;

    let query = DoctorAppointmentsQuery {
        doctor_id,
        start,
        end,
    };
    ReportRunner::new(db)
        .run(&queries::appointments_of_doctor(&query), console)
        .await?;

    Ok(())
}

/// Menu entry 6.
pub async fn list_available_appointments_of_department(
    db: Arc<dyn Database>,
    console: &mut Console,
) -> Result<(), AppError> {
    let department_name = console.read_line("Enter department name:\n")?;
    let date = console.prompt_until("Enter date(MM/DD/YYYY):\n", |s| parse_date("date", s))?;

    let query = DepartmentAvailabilityQuery {
        department_name,
        date,
    };
    ReportRunner::new(db)
        .run(&queries::available_appointments_of_department(&query), console)
        .await?;

    Ok(())
}

/// Menu entry 7. Takes no input.
pub async fn list_status_counts_per_doctor(
    db: Arc<dyn Database>,
    console: &mut Console,
) -> Result<(), AppError> {
    ReportRunner::new(db)
        .run(&queries::status_counts_per_doctor(), console)
        .await?;

    Ok(())
}

/// Menu entry 8.
pub async fn find_patient_count_by_status(
    db: Arc<dyn Database>,
    console: &mut Console,
) -> Result<(), AppError> {
    let status = console.prompt_until("Enter status(PA, AC, AV, WL):\n", AppointmentStatus::parse)?;

    ReportRunner::new(db)
        .run(&queries::patient_count_by_status(&PatientCountQuery { status }), console)
        .await?;

    Ok(())
}
