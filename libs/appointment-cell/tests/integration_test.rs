use std::sync::Arc;

use assert_matches::assert_matches;

use appointment_cell::{AppointmentBookingService, AppointmentError, AppointmentStatus, BookAppointmentRequest};
use patient_cell::{Gender, PatientIdentity};
use shared_database::{DatabaseError, MockDatabase, QueryResult, SqlValue};
use shared_utils::test_utils::{empty, rows, RecordedCall, ScriptedDatabase};

fn request(appointment_id: i32) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient: PatientIdentity {
            name: "Jane Doe".to_string(),
            gender: Gender::Female,
            age: 34,
            address: "12 Main St".to_string(),
        },
        doctor_id: 2,
        appointment_id,
    }
}

#[tokio::test]
async fn test_booking_reuses_existing_patient() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["status"], &[&["AV"]]))
            .respond(rows(&["patient_id"], &[&["4"]])),
    );
    let service = AppointmentBookingService::new(db.clone());

    let outcome = service.book_appointment(&request(5)).await.unwrap();

    assert_eq!(outcome.patient_id, Some(4));
    assert!(!outcome.patient_created);
    assert_eq!(outcome.new_status, Some(AppointmentStatus::Active));
    assert!(!db
        .writes()
        .iter()
        .any(|stmt| stmt.sql().starts_with("INSERT INTO Patient")));
}

#[tokio::test]
async fn test_booking_creates_missing_patient_with_zero_appointments() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["status"], &[&["AC"]]))
            .respond(empty(&["patient_id"]))
            .respond(rows(&["patient_id"], &[&["9"]])),
    );
    let service = AppointmentBookingService::new(db.clone());

    let outcome = service.book_appointment(&request(5)).await.unwrap();

    assert_eq!(outcome.patient_id, Some(9));
    assert!(outcome.patient_created);
    assert_eq!(outcome.new_status, Some(AppointmentStatus::Waitlisted));

    let inserts: Vec<_> = db
        .writes()
        .into_iter()
        .filter(|stmt| stmt.sql().starts_with("INSERT INTO Patient"))
        .collect();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].params()[4], SqlValue::Int(0));

    let increments: Vec<_> = db
        .executed()
        .into_iter()
        .filter(|stmt| stmt.sql().contains("number_of_appts + 1"))
        .collect();
    assert_eq!(increments.len(), 1);
    assert_eq!(increments[0].params(), &[SqlValue::Int(9)]);
}

#[tokio::test]
async fn test_waitlisted_booking_keeps_status() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["status"], &[&["WL"]]))
            .respond(rows(&["patient_id"], &[&["4"]])),
    );
    let service = AppointmentBookingService::new(db.clone());

    let outcome = service.book_appointment(&request(5)).await.unwrap();

    assert!(outcome.recorded());
    assert_eq!(outcome.new_status, None);
    assert!(!db
        .executed()
        .iter()
        .any(|stmt| stmt.sql().starts_with("UPDATE Appointment")));
    assert_eq!(db.executed().len(), 3);
}

#[tokio::test]
async fn test_booking_locks_appointment_row() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["status"], &[&["AV"]]))
            .respond(rows(&["patient_id"], &[&["4"]])),
    );
    let service = AppointmentBookingService::new(db.clone());

    service.book_appointment(&request(5)).await.unwrap();

    assert_eq!(db.calls().first(), Some(&RecordedCall::Begin));
    assert!(db.queried()[0].sql().ends_with("FOR UPDATE"));
}

#[tokio::test]
async fn test_unknown_appointment_rolls_back() {
    let db = Arc::new(ScriptedDatabase::new().respond(empty(&["status"])));
    let service = AppointmentBookingService::new(db.clone());

    let result = service.book_appointment(&request(77)).await;

    assert_matches!(result, Err(AppointmentError::NotFound(77)));
    assert!(db.writes().is_empty());
    assert_eq!(db.calls().last(), Some(&RecordedCall::Rollback));
}

#[tokio::test]
async fn test_missing_doctor_department_rolls_back() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["status"], &[&["AV"]]))
            .respond(rows(&["patient_id"], &[&["4"]]))
            .affect_rows("INSERT INTO searches", 0),
    );
    let service = AppointmentBookingService::new(db.clone());

    let result = service.book_appointment(&request(5)).await;

    assert_matches!(result, Err(AppointmentError::DoctorNotFound(2)));
    assert!(!db
        .executed()
        .iter()
        .any(|stmt| stmt.sql().starts_with("INSERT INTO has_appointment")));
    assert!(!db.calls().contains(&RecordedCall::Commit));
    assert_eq!(db.calls().last(), Some(&RecordedCall::Rollback));
}

#[tokio::test]
async fn test_assignment_failure_rolls_back() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["status"], &[&["AV"]]))
            .respond(rows(&["patient_id"], &[&["4"]]))
            .fail_execute(
                "INSERT INTO has_appointment",
                DatabaseError::Query("duplicate key value violates unique constraint".to_string()),
            ),
    );
    let service = AppointmentBookingService::new(db.clone());

    let result = service.book_appointment(&request(5)).await;

    assert_matches!(result, Err(AppointmentError::Database(DatabaseError::Query(_))));
    assert!(!db
        .executed()
        .iter()
        .any(|stmt| stmt.sql().contains("number_of_appts + 1")));
    assert_eq!(db.calls().last(), Some(&RecordedCall::Rollback));
}

#[tokio::test]
async fn test_processed_appointment_writes_nothing() {
    let mut mock = MockDatabase::new();
    mock.expect_begin().times(1).returning(|| Ok(()));
    mock.expect_query().times(1).returning(|_| {
        Ok(QueryResult::new(vec!["status".to_string()], vec![vec!["PA".to_string()]]))
    });
    mock.expect_execute().never();
    mock.expect_commit().never();
    mock.expect_rollback().times(1).returning(|| Ok(()));

    let service = AppointmentBookingService::new(Arc::new(mock));
    let outcome = service.book_appointment(&request(5)).await.unwrap();

    assert!(!outcome.recorded());
    assert_eq!(outcome.previous_status, AppointmentStatus::Processed);
    assert_eq!(outcome.new_status, None);
}
