use std::sync::Arc;

use tracing::info;

use shared_database::Database;
use shared_models::AppError;
use shared_utils::Console;

use crate::models::{validate_department_id, validate_name, validate_specialty, NewDoctor};
use crate::services::DoctorService;

/// Menu entry "Add Doctor". Field errors abort before anything is sent.
pub async fn add_doctor(db: Arc<dyn Database>, console: &mut Console) -> Result<(), AppError> {
    let name = console.read_field("\tEnter name (MAX: 128 CHAR): ", validate_name)?;
    let specialty = console.read_field("\tEnter specialty (MAX: 24 CHAR): ", validate_specialty)?;
    let department_id = console.read_field("\tEnter did: ", validate_department_id)?;

    let doctor = NewDoctor {
        name,
        specialty,
        department_id,
    };

    let doctor_id = DoctorService::new(db).add_doctor(&doctor).await?;
    info!("Added doctor {}", doctor_id);

    Ok(())
}
