use std::sync::Arc;

use tracing::{debug, info, instrument};

use shared_database::{Database, DatabaseError, Statement};

use crate::models::{DoctorError, NewDoctor};

pub struct DoctorService {
    db: Arc<dyn Database>,
}

impl DoctorService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Create a new doctor in an existing department, returning its id.
    #[instrument(skip(self, doctor), fields(department_id = doctor.department_id))]
    pub async fn add_doctor(&self, doctor: &NewDoctor) -> Result<i32, DoctorError> {
        if !self.department_exists(doctor.department_id).await? {
            return Err(DoctorError::UnknownDepartment(doctor.department_id));
        }

        let result = self.db.query(&insert_doctor_statement(doctor)).await?;
        let doctor_id = result
            .first_int()?
            .ok_or_else(|| DatabaseError::UnexpectedShape("insert returned no doctor id".into()))?;

        info!("Doctor {} added", doctor_id);
        Ok(doctor_id)
    }

    pub async fn department_exists(&self, department_id: i32) -> Result<bool, DoctorError> {
        let result = self
            .db
            .query(
                &Statement::new("SELECT dept_ID FROM Department WHERE dept_ID = $1::integer")
                    .bind(department_id),
            )
            .await?;

        Ok(!result.is_empty())
    }

    pub async fn doctor_exists(&self, doctor_id: i32) -> Result<bool, DoctorError> {
        let result = self
            .db
            .query(
                &Statement::new("SELECT doctor_ID FROM Doctor WHERE doctor_ID = $1::integer")
                    .bind(doctor_id),
            )
            .await?;

        debug!("Doctor {} exists: {}", doctor_id, !result.is_empty());
        Ok(!result.is_empty())
    }

    pub async fn require_doctor(&self, doctor_id: i32) -> Result<(), DoctorError> {
        if self.doctor_exists(doctor_id).await? {
            Ok(())
        } else {
            Err(DoctorError::NotFound(doctor_id))
        }
    }
}

/// Id is the pre-insert row count, computed by the same statement that inserts.
pub fn insert_doctor_statement(doctor: &NewDoctor) -> Statement {
    Statement::new(
        "INSERT INTO Doctor (doctor_ID, name, specialty, did) \
         SELECT COUNT(*), $1::text, $2::text, $3::integer FROM Doctor \
         RETURNING doctor_ID",
    )
    .bind(doctor.name.as_str())
    .bind(doctor.specialty.as_str())
    .bind(doctor.department_id)
}
