use std::sync::Arc;

use tracing::info;

use shared_database::Database;
use shared_models::AppError;
use shared_utils::Console;

use crate::models::{
    validate_address, validate_age, validate_appointment_count, validate_name, Gender, NewPatient,
    PatientIdentity,
};
use crate::services::PatientService;

/// Menu entry "Add Patient". Any rejected field aborts before a statement is sent.
pub async fn add_patient(db: Arc<dyn Database>, console: &mut Console) -> Result<(), AppError> {
    let name = console.read_field("\tEnter name (MAX: 128 CHAR): ", validate_name)?;
    let gender = console.read_field("\tEnter gender (M/F): ", Gender::parse)?;
    let age = console.read_field("\tEnter age: ", validate_age)?;
    let address = console.read_field("\tEnter address (MAX: 256 CHAR): ", validate_address)?;
    let appointment_count =
        console.read_field("\tEnter number of appointments: ", validate_appointment_count)?;

    let patient = NewPatient {
        identity: PatientIdentity {
            name,
            gender,
            age,
            address,
        },
        appointment_count,
    };

    let patient_id = PatientService::new(db).add_patient(&patient).await?;
    info!("Added patient {}", patient_id);

    Ok(())
}
