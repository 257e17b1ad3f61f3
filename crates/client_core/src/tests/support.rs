//! In-memory `EmployeeApi` used by the unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::{EmployeeRecord, RecordId},
    protocol::EmployeePayload,
};
use tokio::sync::{oneshot, Mutex};

use crate::{api::EmployeeApi, error::SyncError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_all: u32,
    pub create: u32,
    pub update: u32,
    pub remove: u32,
}

impl CallCounts {
    pub fn total(&self) -> u32 {
        self.fetch_all + self.create + self.update + self.remove
    }
}

#[derive(Default)]
struct FakeState {
    records: Vec<EmployeeRecord>,
    next_id: i64,
    calls: CallCounts,
    fetch_failures: VecDeque<SyncError>,
    mutation_failures: VecDeque<SyncError>,
    fetch_gates: VecDeque<oneshot::Receiver<Result<(), SyncError>>>,
    mutation_gates: VecDeque<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct FakeEmployeeApi {
    state: Mutex<FakeState>,
}

pub fn record(id: i64, employee_id: &str, name: &str) -> EmployeeRecord {
    EmployeeRecord {
        id: RecordId(id),
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_ascii_lowercase().replace(' ', "."))),
        phone_number: "12345678".to_string(),
        position: "Developer".to_string(),
        date_of_joining: NaiveDate::from_ymd_opt(2023, 1, 15).expect("date"),
        salary: 5000.0,
    }
}

impl FakeEmployeeApi {
    pub fn with_records(records: Vec<EmployeeRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(FakeState {
                records,
                next_id,
                ..FakeState::default()
            }),
        }
    }

    pub fn seeded() -> Self {
        Self::with_records(vec![
            record(1, "EMP001", "John Doe"),
            record(2, "EMP002", "Jane Smith"),
        ])
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    pub async fn records(&self) -> Vec<EmployeeRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn fail_next_fetch(&self, err: SyncError) {
        self.state.lock().await.fetch_failures.push_back(err);
    }

    pub async fn fail_next_mutation(&self, err: SyncError) {
        self.state.lock().await.mutation_failures.push_back(err);
    }

    /// The next `fetch_all` snapshots the records immediately, then waits for the
    /// returned sender. Sending `Err` makes that fetch fail instead.
    pub async fn hold_next_fetch(&self) -> oneshot::Sender<Result<(), SyncError>> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.fetch_gates.push_back(rx);
        tx
    }

    /// The next create/update/remove waits for the returned sender before
    /// touching the records.
    pub async fn hold_next_mutation(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.mutation_gates.push_back(rx);
        tx
    }

    async fn begin_mutation(&self, count: impl FnOnce(&mut CallCounts)) {
        let gate = {
            let mut guard = self.state.lock().await;
            count(&mut guard.calls);
            guard.mutation_gates.pop_front()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    fn apply(id: RecordId, payload: &EmployeePayload) -> EmployeeRecord {
        EmployeeRecord {
            id,
            employee_id: payload.employee_id.clone(),
            name: payload.name.clone(),
            email: payload.email.clone(),
            phone_number: payload.phone_number.clone(),
            position: payload.position.clone(),
            date_of_joining: payload.date_of_joining,
            salary: payload.salary,
        }
    }
}

#[async_trait]
impl EmployeeApi for FakeEmployeeApi {
    async fn fetch_all(&self) -> Result<Vec<EmployeeRecord>, SyncError> {
        let (snapshot, gate) = {
            let mut guard = self.state.lock().await;
            guard.calls.fetch_all += 1;
            if let Some(err) = guard.fetch_failures.pop_front() {
                return Err(err);
            }
            (guard.records.clone(), guard.fetch_gates.pop_front())
        };
        if let Some(gate) = gate {
            if let Ok(Err(err)) = gate.await {
                return Err(err);
            }
        }
        Ok(snapshot)
    }

    async fn create(&self, payload: &EmployeePayload) -> Result<EmployeeRecord, SyncError> {
        self.begin_mutation(|calls| calls.create += 1).await;
        let mut guard = self.state.lock().await;
        if let Some(err) = guard.mutation_failures.pop_front() {
            return Err(err);
        }
        let id = RecordId(guard.next_id);
        guard.next_id += 1;
        let created = Self::apply(id, payload);
        guard.records.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: RecordId,
        payload: &EmployeePayload,
    ) -> Result<EmployeeRecord, SyncError> {
        self.begin_mutation(|calls| calls.update += 1).await;
        let mut guard = self.state.lock().await;
        if let Some(err) = guard.mutation_failures.pop_front() {
            return Err(err);
        }
        let slot = guard
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SyncError::NotFound(format!("employee {id} not found")))?;
        *slot = Self::apply(id, payload);
        Ok(slot.clone())
    }

    async fn remove(&self, id: RecordId) -> Result<(), SyncError> {
        self.begin_mutation(|calls| calls.remove += 1).await;
        let mut guard = self.state.lock().await;
        if let Some(err) = guard.mutation_failures.pop_front() {
            return Err(err);
        }
        let before = guard.records.len();
        guard.records.retain(|r| r.id != id);
        if guard.records.len() == before {
            return Err(SyncError::NotFound(format!("employee {id} not found")));
        }
        Ok(())
    }
}
