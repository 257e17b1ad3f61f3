use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// Server-assigned primary key. Clients never mint one.
id_newtype!(RecordId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: RecordId,
    pub employee_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(alias = "phone")]
    pub phone_number: String,
    pub position: String,
    pub date_of_joining: NaiveDate,
    pub salary: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub records: Vec<EmployeeRecord>,
    pub status: CollectionStatus,
    pub error_message: Option<String>,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            status: CollectionStatus::Loading,
            error_message: None,
        }
    }
}

impl CollectionState {
    pub fn find(&self, id: RecordId) -> Option<&EmployeeRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.status == CollectionStatus::Loading
    }
}
