use shared_database::Statement;

use crate::models::{DepartmentAvailabilityQuery, DoctorAppointmentsQuery, PatientCountQuery};

pub fn appointments_of_doctor(query: &DoctorAppointmentsQuery) -> Statement {
    Statement::new(
        "SELECT D.name, D.doctor_ID, A.appnt_ID, A.adate, A.time_slot, A.status \
         FROM Appointment A \
         JOIN has_appointment HA ON HA.appt_id = A.appnt_ID \
         JOIN Doctor D ON D.doctor_ID = HA.doctor_id \
         WHERE D.doctor_ID = $1::integer \
           AND A.status IN ('AC', 'AV') \
           AND A.adate >= $2::date AND A.adate <= $3::date \
         ORDER BY A.adate, A.time_slot, A.appnt_ID",
    )
    .bind(query.doctor_id)
    .bind(query.start)
    .bind(query.end)
}

pub fn available_appointments_of_department(query: &DepartmentAvailabilityQuery) -> Statement {
    Statement::new(
        "SELECT A.appnt_ID, A.adate, A.time_slot, A.status \
         FROM Appointment A \
         JOIN has_appointment HA ON HA.appt_id = A.appnt_ID \
         JOIN Doctor D ON D.doctor_ID = HA.doctor_id \
         JOIN Department DE ON DE.dept_ID = D.did \
         WHERE A.status = 'AV' AND DE.name = $1::text AND A.adate = $2::date \
         ORDER BY A.time_slot, A.appnt_ID",
    )
    .bind(query.department_name.as_str())
    .bind(query.date)
}

pub fn status_counts_per_doctor() -> Statement {
    Statement::new(
        "SELECT D.doctor_ID, D.name, A.status, COUNT(*) \
         FROM Appointment A \
         JOIN has_appointment HA ON HA.appt_id = A.appnt_ID \
         JOIN Doctor D ON D.doctor_ID = HA.doctor_id \
         GROUP BY D.doctor_ID, D.name, A.status \
         ORDER BY COUNT(*) DESC",
    )
}

/// A patient who searched the same appointment twice counts once.
pub fn patient_count_by_status(query: &PatientCountQuery) -> Statement {
    Statement::new(
        "SELECT D.doctor_ID, D.name, COUNT(DISTINCT P.patient_ID) \
         FROM Appointment A \
         JOIN has_appointment HA ON HA.appt_id = A.appnt_ID \
         JOIN Doctor D ON D.doctor_ID = HA.doctor_id \
         JOIN searches S ON S.aid = A.appnt_ID \
         JOIN Patient P ON P.patient_ID = S.pid \
         WHERE A.status = $1::text \
         GROUP BY D.doctor_ID, D.name \
         ORDER BY D.doctor_ID",
    )
    .bind(query.status.code())
}
