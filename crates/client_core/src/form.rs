use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use shared::{
    domain::{EmployeeRecord, RecordId},
    error::FieldError,
    protocol::EmployeePayload,
};
use tracing::{debug, info};

use crate::{api::EmployeeApi, error::SyncError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    EmployeeId,
    Name,
    Email,
    PhoneNumber,
    Position,
    DateOfJoining,
    Salary,
}

impl DraftField {
    pub const ALL: [DraftField; 7] = [
        DraftField::EmployeeId,
        DraftField::Name,
        DraftField::Email,
        DraftField::PhoneNumber,
        DraftField::Position,
        DraftField::DateOfJoining,
        DraftField::Salary,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DraftField::EmployeeId => "employee_id",
            DraftField::Name => "name",
            DraftField::Email => "email",
            DraftField::PhoneNumber => "phone_number",
            DraftField::Position => "position",
            DraftField::DateOfJoining => "date_of_joining",
            DraftField::Salary => "salary",
        }
    }

    pub fn is_required(self) -> bool {
        self != DraftField::Email
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DraftField {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| SyncError::validation(format!("unknown field '{s}'")))
    }
}

/// Editable copy of an employee. Every field is kept as raw text until submit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub position: String,
    pub date_of_joining: String,
    pub salary: String,
    editing: Option<EmployeeRecord>,
}

impl Draft {
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            date_of_joining: today.format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    pub fn from_record(record: &EmployeeRecord) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            name: record.name.clone(),
            email: record.email.clone().unwrap_or_default(),
            phone_number: record.phone_number.clone(),
            position: record.position.clone(),
            date_of_joining: record.date_of_joining.format(DATE_FORMAT).to_string(),
            salary: record.salary.to_string(),
            editing: Some(record.clone()),
        }
    }

    pub fn editing(&self) -> Option<&EmployeeRecord> {
        self.editing.as_ref()
    }

    pub fn mode(&self) -> FormMode {
        match &self.editing {
            Some(record) => FormMode::Edit(record.id),
            None => FormMode::Create,
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::EmployeeId => &self.employee_id,
            DraftField::Name => &self.name,
            DraftField::Email => &self.email,
            DraftField::PhoneNumber => &self.phone_number,
            DraftField::Position => &self.position,
            DraftField::DateOfJoining => &self.date_of_joining,
            DraftField::Salary => &self.salary,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let slot = match field {
            DraftField::EmployeeId => &mut self.employee_id,
            DraftField::Name => &mut self.name,
            DraftField::Email => &mut self.email,
            DraftField::PhoneNumber => &mut self.phone_number,
            DraftField::Position => &mut self.position,
            DraftField::DateOfJoining => &mut self.date_of_joining,
            DraftField::Salary => &mut self.salary,
        };
        *slot = value.into();
    }

    pub fn validate(&self) -> Result<EmployeePayload, SyncError> {
        let mut errors = Vec::new();
        for field in DraftField::ALL {
            if field.is_required() && self.get(field).trim().is_empty() {
                errors.push(FieldError::required(field.key()));
            }
        }

        let date_of_joining = match self.date_of_joining.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new(
                        DraftField::DateOfJoining.key(),
                        "must be a date in YYYY-MM-DD form",
                    ));
                    None
                }
            },
        };

        let salary = match self.salary.trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
                _ => {
                    errors.push(FieldError::new(
                        DraftField::Salary.key(),
                        "must be a non-negative number",
                    ));
                    None
                }
            },
        };

        let (Some(date_of_joining), Some(salary), true) =
            (date_of_joining, salary, errors.is_empty())
        else {
            return Err(SyncError::invalid_fields(errors));
        };

        let email = self.email.trim();
        Ok(EmployeePayload {
            employee_id: self.employee_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            phone_number: self.phone_number.trim().to_string(),
            position: self.position.trim().to_string(),
            date_of_joining,
            salary,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Open(Draft),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(EmployeeRecord),
    Updated(EmployeeRecord),
}

impl SubmitOutcome {
    pub fn record(&self) -> &EmployeeRecord {
        match self {
            SubmitOutcome::Created(record) | SubmitOutcome::Updated(record) => record,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: FormMode,
    pub payload: EmployeePayload,
    opened: u64,
}

impl Submission {
    pub async fn send(&self, api: &dyn EmployeeApi) -> Result<SubmitOutcome, SyncError> {
        let outcome = match self.mode {
            FormMode::Create => SubmitOutcome::Created(api.create(&self.payload).await?),
            FormMode::Edit(id) => SubmitOutcome::Updated(api.update(id, &self.payload).await?),
        };
        info!(record_id = outcome.record().id.0, "form: submitted");
        Ok(outcome)
    }
}

#[derive(Debug, Default)]
pub struct FormSession {
    state: FormState,
    // Bumped on every open and cancel.
    opened: u64,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open(_))
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            FormState::Open(draft) => Some(draft),
            FormState::Closed => None,
        }
    }

    pub fn open_create(&mut self, today: NaiveDate) {
        debug!("form: open for create");
        self.opened += 1;
        self.state = FormState::Open(Draft::blank(today));
    }

    pub fn open_edit(&mut self, record: &EmployeeRecord) {
        debug!(record_id = record.id.0, "form: open for edit");
        self.opened += 1;
        self.state = FormState::Open(Draft::from_record(record));
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), SyncError> {
        match &mut self.state {
            FormState::Open(draft) => {
                draft.set(field, value);
                Ok(())
            }
            FormState::Closed => Err(SyncError::validation("no form is open")),
        }
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            debug!("form: cancelled");
        }
        self.opened += 1;
        self.state = FormState::Closed;
    }

    pub fn prepare(&self) -> Result<Submission, SyncError> {
        let draft = self
            .draft()
            .ok_or_else(|| SyncError::validation("no form is open"))?;
        Ok(Submission {
            mode: draft.mode(),
            payload: draft.validate()?,
            opened: self.opened,
        })
    }

    /// Closes the form after the server accepted `submission`, unless the
    /// draft it came from was cancelled or replaced in the meantime. Returns
    /// whether the form was closed.
    pub fn complete(&mut self, submission: &Submission) -> bool {
        if submission.opened != self.opened || !self.is_open() {
            return false;
        }
        self.state = FormState::Closed;
        true
    }

    /// Validates locally, then creates or updates depending on the mode. The
    /// session closes only when the server accepted the draft; on any error the
    /// draft stays open for correction.
    pub async fn submit(&mut self, api: &dyn EmployeeApi) -> Result<SubmitOutcome, SyncError> {
        let submission = self.prepare()?;
        let outcome = submission.send(api).await?;
        self.complete(&submission);
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
