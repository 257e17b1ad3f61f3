use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body sent on `POST /api/employees` and `PUT /api/employees/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayload {
    pub employee_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub position: String,
    pub date_of_joining: NaiveDate,
    pub salary: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Parses an error body, returning `None` when the server sent anything other
    /// than a JSON object with a non-blank `error` string.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .filter(|body| !body.error.trim().is_empty())
    }
}
