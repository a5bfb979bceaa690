use std::sync::Arc;

use tracing::{debug, info, instrument};

use shared_database::{Database, DatabaseError, Statement};

use crate::models::{NewPatient, PatientError, PatientIdentity};

pub struct PatientService {
    db: Arc<dyn Database>,
}

impl PatientService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Inserts the patient and returns the id it was given.
    #[instrument(skip(self, patient))]
    pub async fn add_patient(&self, patient: &NewPatient) -> Result<i32, PatientError> {
        let result = self.db.query(&insert_patient_statement(patient)).await?;
        let patient_id = result
            .first_int()?
            .ok_or_else(|| DatabaseError::UnexpectedShape("insert returned no patient id".into()))?;

        info!("Patient {} added", patient_id);
        Ok(patient_id)
    }

    /// Exact match on name, gender, age and address.
    pub async fn find_by_identity(
        &self,
        identity: &PatientIdentity,
    ) -> Result<Option<i32>, PatientError> {
        let result = self.db.query(&find_patient_statement(identity)).await?;
        let patient_id = result.first_int()?;

        debug!("Patient lookup matched {:?}", patient_id);
        Ok(patient_id)
    }

    /// Returns the matching patient, creating one with no appointments when absent.
    /// The flag tells whether a row was created.
    pub async fn find_or_create(
        &self,
        identity: &PatientIdentity,
    ) -> Result<(i32, bool), PatientError> {
        if let Some(patient_id) = self.find_by_identity(identity).await? {
            return Ok((patient_id, false));
        }

        let patient_id = self
            .add_patient(&NewPatient::first_visit(identity.clone()))
            .await?;
        Ok((patient_id, true))
    }

    pub async fn increment_appointment_count(&self, patient_id: i32) -> Result<(), PatientError> {
        let affected = self
            .db
            .execute(&increment_appointment_count_statement(patient_id))
            .await?;

        if affected == 0 {
            return Err(PatientError::NotFound(patient_id));
        }
        Ok(())
    }
}

/// Id is the pre-insert row count, computed by the same statement that inserts.
pub fn insert_patient_statement(patient: &NewPatient) -> Statement {
    Statement::new(
        "INSERT INTO Patient (patient_ID, name, gtype, age, address, number_of_appts) \
         SELECT COUNT(*), $1::text, $2::text, $3::integer, $4::text, $5::integer FROM Patient \
         RETURNING patient_ID",
    )
    .bind(patient.identity.name.as_str())
    .bind(patient.identity.gender.code())
    .bind(patient.identity.age)
    .bind(patient.identity.address.as_str())
    .bind(patient.appointment_count)
}

pub fn find_patient_statement(identity: &PatientIdentity) -> Statement {
    Statement::new(
        "SELECT patient_ID FROM Patient \
         WHERE name = $1::text AND gtype = $2::text AND age = $3::integer AND address = $4::text \
         ORDER BY patient_ID LIMIT 1",
    )
    .bind(identity.name.as_str())
    .bind(identity.gender.code())
    .bind(identity.age)
    .bind(identity.address.as_str())
}

pub fn increment_appointment_count_statement(patient_id: i32) -> Statement {
    Statement::new(
        "UPDATE Patient SET number_of_appts = number_of_appts + 1 WHERE patient_ID = $1::integer",
    )
    .bind(patient_id)
}
