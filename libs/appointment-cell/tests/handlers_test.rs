use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::handlers::{add_appointment, make_appointment};
use shared_database::SqlValue;
use shared_models::{AppError, ValidationError};
use shared_utils::test_utils::{empty, rows, scripted_console, RecordedCall, ScriptedDatabase};

const PATIENT_INPUT: &str = "Jane Doe\nf\n34\n12 Main St\n";

#[tokio::test]
async fn test_add_appointment_inserts_validated_fields() {
    let db = Arc::new(ScriptedDatabase::new().respond(rows(&["appnt_id"], &[&["0"]])));
    let (mut console, _) = scripted_console("03/09/2024\n08:00-09:00\nav\n");

    add_appointment(db.clone(), &mut console).await.unwrap();

    let writes = db.writes();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].sql().starts_with("INSERT INTO Appointment (appnt_ID, adate, time_slot, status)"));
    assert_eq!(
        writes[0].params(),
        &[
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()),
            SqlValue::Text("08:00-09:00".to_string()),
            SqlValue::Text("AV".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_add_appointment_rejects_bad_date() {
    let db = Arc::new(ScriptedDatabase::new());
    let (mut console, output) = scripted_console("2024-03-09\n08:00-09:00\nAV\n");

    let result = add_appointment(db.clone(), &mut console).await;

    assert_matches!(result, Err(AppError::Parse(ValidationError::InvalidDate { .. })));
    assert!(db.calls().is_empty());
    assert!(!output.contents().contains("Enter timeslot"));
}

#[tokio::test]
async fn test_add_appointment_rejects_bad_time_slot() {
    let db = Arc::new(ScriptedDatabase::new());
    let (mut console, _) = scripted_console("03/09/2024\nmorning\nAV\n");

    let result = add_appointment(db.clone(), &mut console).await;

    assert_matches!(result, Err(AppError::Parse(ValidationError::InvalidTimeSlot { .. })));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_add_appointment_rejects_unknown_status() {
    let db = Arc::new(ScriptedDatabase::new());
    let (mut console, _) = scripted_console("03/09/2024\n08:00-09:00\nXX\n");

    let result = add_appointment(db.clone(), &mut console).await;

    assert_matches!(result, Err(AppError::Parse(ValidationError::NotInDomain { field: "status", .. })));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_make_appointment_on_available_slot() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["doctor_id"], &[&["2"]]))
            .respond(rows(&["status"], &[&["AV"]]))
            .respond(rows(&["patient_id"], &[&["4"]])),
    );
    let (mut console, output) = scripted_console(&format!("{}2\n5\n", PATIENT_INPUT));

    make_appointment(db.clone(), &mut console).await.unwrap();

    assert!(output.contents().contains("Appointment status: AV -> AC\n"));

    let writes = db.writes();
    assert_eq!(writes.len(), 4);
    assert!(writes[0].sql().starts_with("UPDATE Appointment SET status"));
    assert_eq!(writes[0].params(), &[SqlValue::Text("AC".to_string()), SqlValue::Int(5)]);
    assert!(writes[1].sql().starts_with("INSERT INTO searches"));
    assert_eq!(writes[1].params(), &[SqlValue::Int(4), SqlValue::Int(5), SqlValue::Int(2)]);
    assert!(writes[2].sql().starts_with("INSERT INTO has_appointment"));
    assert_eq!(writes[2].params(), &[SqlValue::Int(5), SqlValue::Int(2)]);
    assert!(writes[3].sql().contains("number_of_appts = number_of_appts + 1"));
    assert_eq!(writes[3].params(), &[SqlValue::Int(4)]);

    let calls = db.calls();
    assert_eq!(calls.iter().filter(|c| **c == RecordedCall::Begin).count(), 1);
    assert_eq!(calls.last(), Some(&RecordedCall::Commit));
}

#[tokio::test]
async fn test_make_appointment_rejects_unknown_doctor_before_asking_appointment() {
    let db = Arc::new(ScriptedDatabase::new().respond(empty(&["doctor_id"])));
    let (mut console, output) = scripted_console(&format!("{}99\n5\n", PATIENT_INPUT));

    let result = make_appointment(db.clone(), &mut console).await;

    assert_matches!(
        result,
        Err(AppError::Validation(ValidationError::UnknownReference { field: "doctor", value: 99 }))
    );
    assert!(!output.contents().contains("Enter appointment"));
    assert!(db.writes().is_empty());
    assert!(!db.calls().contains(&RecordedCall::Begin));
}

#[tokio::test]
async fn test_make_appointment_on_processed_slot_prints_status_only() {
    let db = Arc::new(
        ScriptedDatabase::new()
            .respond(rows(&["doctor_id"], &[&["2"]]))
            .respond(rows(&["status"], &[&["PA"]])),
    );
    let (mut console, output) = scripted_console(&format!("{}2\n5\n", PATIENT_INPUT));

    make_appointment(db.clone(), &mut console).await.unwrap();

    assert!(output.contents().contains("Appointment status: PA\n"));
    assert!(db.writes().is_empty());
    assert_eq!(db.calls().last(), Some(&RecordedCall::Rollback));
}

#[tokio::test]
async fn test_make_appointment_rejects_negative_age() {
    let db = Arc::new(ScriptedDatabase::new());
    let (mut console, _) = scripted_console("Jane Doe\nF\n-3\n12 Main St\n2\n5\n");

    let result = make_appointment(db.clone(), &mut console).await;

    assert_matches!(result, Err(AppError::Validation(ValidationError::BelowMinimum { .. })));
    assert!(db.calls().is_empty());
}
