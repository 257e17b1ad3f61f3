use super::*;
use crate::tests_support::{record, FakeEmployeeApi};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).expect("date")
}

fn fill_ada(session: &mut FormSession) {
    for (field, value) in [
        (DraftField::EmployeeId, "EMP010"),
        (DraftField::Name, "Ada Lovelace"),
        (DraftField::PhoneNumber, "555-0100"),
        (DraftField::Position, "Engineer"),
        (DraftField::DateOfJoining, "2024-02-01"),
        (DraftField::Salary, "6000"),
    ] {
        session.set_field(field, value).expect("set field");
    }
}

#[test]
fn create_mode_seeds_today_and_empty_fields() {
    let mut session = FormSession::new();
    session.open_create(today());

    let draft = session.draft().expect("open");
    assert_eq!(draft.mode(), FormMode::Create);
    assert_eq!(draft.date_of_joining, "2024-02-01");
    assert!(draft.employee_id.is_empty());
    assert!(draft.salary.is_empty());
}

#[test]
fn edit_mode_seeds_from_record_with_salary_as_text() {
    let mut existing = record(4, "EMP004", "Grace Hopper");
    existing.salary = 7250.5;
    existing.email = None;

    let mut session = FormSession::new();
    session.open_edit(&existing);

    let draft = session.draft().expect("open");
    assert_eq!(draft.mode(), FormMode::Edit(existing.id));
    assert_eq!(draft.salary, "7250.5");
    assert_eq!(draft.email, "");
    assert_eq!(draft.date_of_joining, "2023-01-15");
    assert_eq!(draft.editing(), Some(&existing));
}

#[test]
fn set_field_on_closed_form_is_rejected() {
    let mut session = FormSession::new();
    let err = session
        .set_field(DraftField::Name, "nobody")
        .expect_err("closed");
    assert_eq!(err.code(), shared::error::ErrorCode::Validation);
}

#[test]
fn field_names_round_trip_through_from_str() {
    for field in DraftField::ALL {
        assert_eq!(field.key().parse::<DraftField>().expect("known"), field);
    }
    assert!("nickname".parse::<DraftField>().is_err());
}

#[tokio::test]
async fn blank_required_field_never_reaches_the_api() {
    for blank in DraftField::ALL.into_iter().filter(|f| f.is_required()) {
        let api = FakeEmployeeApi::seeded();
        let mut session = FormSession::new();
        session.open_create(today());
        fill_ada(&mut session);
        session.set_field(blank, "   ").expect("blank");

        let err = session.submit(&api).await.expect_err("must fail");
        assert!(
            err.fields().iter().any(|f| f.field == blank.key()),
            "expected {blank} in {err}"
        );
        assert_eq!(api.calls().await.total(), 0);
        assert!(session.is_open());
    }
}

#[tokio::test]
async fn malformed_salary_and_date_are_local_validation_errors() {
    let api = FakeEmployeeApi::seeded();
    let mut session = FormSession::new();
    session.open_create(today());
    fill_ada(&mut session);
    session.set_field(DraftField::Salary, "six thousand").expect("set");
    session
        .set_field(DraftField::DateOfJoining, "01/02/2024")
        .expect("set");

    let err = session.submit(&api).await.expect_err("must fail");
    let fields: Vec<_> = err.fields().iter().map(|f| f.field).collect();
    assert_eq!(fields, vec!["date_of_joining", "salary"]);
    assert_eq!(api.calls().await.total(), 0);
}

#[tokio::test]
async fn create_submits_numeric_salary_and_closes() {
    let api = FakeEmployeeApi::seeded();
    let mut session = FormSession::new();
    session.open_create(today());
    fill_ada(&mut session);
    session
        .set_field(DraftField::Email, "  ")
        .expect("blank email");

    let outcome = session.submit(&api).await.expect("submit");
    let created = match outcome {
        SubmitOutcome::Created(record) => record,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(created.salary, 6000.0);
    assert_eq!(created.email, None);
    assert_eq!(created.id, RecordId(3));
    assert_eq!(*session.state(), FormState::Closed);
    assert_eq!(api.calls().await.create, 1);
}

#[tokio::test]
async fn edit_submits_update_for_the_edited_id() {
    let api = FakeEmployeeApi::seeded();
    let existing = api.records().await[1].clone();

    let mut session = FormSession::new();
    session.open_edit(&existing);
    session
        .set_field(DraftField::Position, "Lead Designer")
        .expect("set");

    let outcome = session.submit(&api).await.expect("submit");
    assert!(matches!(&outcome, SubmitOutcome::Updated(r) if r.id == existing.id));
    assert_eq!(outcome.record().position, "Lead Designer");
    assert_eq!(api.calls().await.update, 1);
    assert!(!session.is_open());
}

#[tokio::test]
async fn remote_failure_keeps_the_draft_open() {
    let api = FakeEmployeeApi::seeded();
    api.fail_next_mutation(SyncError::validation("employee_id already exists"))
        .await;

    let mut session = FormSession::new();
    session.open_create(today());
    fill_ada(&mut session);

    let err = session.submit(&api).await.expect_err("server rejects");
    assert_eq!(err.to_string(), "employee_id already exists");
    assert_eq!(
        session.draft().map(|d| d.employee_id.as_str()),
        Some("EMP010")
    );
}

#[tokio::test]
async fn submit_on_closed_form_fails_without_network() {
    let api = FakeEmployeeApi::seeded();
    let mut session = FormSession::new();
    assert!(session.submit(&api).await.is_err());
    assert_eq!(api.calls().await.total(), 0);
}

#[test]
fn cancel_discards_draft() {
    let mut session = FormSession::new();
    session.open_create(today());
    session.set_field(DraftField::Name, "Temp").expect("set");
    session.cancel();
    assert_eq!(session.draft(), None);

    session.cancel();
    assert!(!session.is_open());
}

#[test]
fn completing_a_stale_submission_leaves_the_new_draft_open() {
    let mut session = FormSession::new();
    session.open_create(today());
    fill_ada(&mut session);
    let submission = session.prepare().expect("valid draft");
    assert_eq!(submission.mode, FormMode::Create);

    session.cancel();
    session.open_create(today());
    assert!(!session.complete(&submission));
    assert!(session.is_open());

    let current = session.prepare();
    assert!(current.is_err(), "blank reopened draft does not validate");
    fill_ada(&mut session);
    let current = session.prepare().expect("valid draft");
    assert!(session.complete(&current));
    assert!(!session.is_open());
}
