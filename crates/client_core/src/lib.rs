use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use shared::domain::{CollectionState, RecordId};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod api;
pub mod error;
pub mod events;
pub mod form;
pub mod notify;
pub mod store;

pub use api::{EmployeeApi, HttpEmployeeApi, DEFAULT_REQUEST_TIMEOUT};
pub use error::SyncError;
pub use events::DirectoryEvent;
pub use form::{Draft, DraftField, FormMode, FormSession, FormState, Submission, SubmitOutcome};
pub use notify::{Notification, NotificationChannel, NotificationKind, DEFAULT_DISMISS_AFTER};
pub use store::{DirectoryStore, LoadOutcome};

pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct DirectoryOptions {
    pub dismiss_after: Duration,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        Self {
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }
}

pub struct Directory {
    api: Arc<dyn EmployeeApi>,
    store: DirectoryStore,
    form: Mutex<FormSession>,
    notifications: NotificationChannel,
    events: broadcast::Sender<DirectoryEvent>,
}

impl Directory {
    pub fn new(api: Arc<dyn EmployeeApi>) -> Arc<Self> {
        Self::new_with_options(api, DirectoryOptions::default())
    }

    pub fn new_with_options(api: Arc<dyn EmployeeApi>, options: DirectoryOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            store: DirectoryStore::new(Arc::clone(&api)),
            api,
            form: Mutex::new(FormSession::new()),
            notifications: NotificationChannel::new(options.dismiss_after, events.clone()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    pub async fn load(&self) -> Result<LoadOutcome, SyncError> {
        let result = self.store.load().await;
        if let Ok(LoadOutcome::Superseded) = result {
            return result;
        }
        let _ = self
            .events
            .send(DirectoryEvent::CollectionChanged(self.store.snapshot().await));
        result
    }

    pub async fn collection(&self) -> CollectionState {
        self.store.snapshot().await
    }

    pub async fn open_create_form(&self) {
        self.open_create_form_on(Local::now().date_naive()).await;
    }

    pub async fn open_create_form_on(&self, today: NaiveDate) {
        self.form.lock().await.open_create(today);
        let _ = self.events.send(DirectoryEvent::FormOpened(FormMode::Create));
    }

    pub async fn open_edit_form(&self, id: RecordId) -> Result<(), SyncError> {
        let record = self
            .store
            .snapshot()
            .await
            .find(id)
            .cloned()
            .ok_or_else(|| SyncError::NotFound(format!("employee {id} is not in the directory")))?;
        self.form.lock().await.open_edit(&record);
        let _ = self.events.send(DirectoryEvent::FormOpened(FormMode::Edit(id)));
        Ok(())
    }

    pub async fn edit_field(&self, field: DraftField, value: impl Into<String>) -> Result<(), SyncError> {
        self.form.lock().await.set_field(field, value)
    }

    pub async fn draft(&self) -> Option<Draft> {
        self.form.lock().await.draft().cloned()
    }

    pub async fn submit_form(&self) -> Result<SubmitOutcome, SyncError> {
        let prepared = self.form.lock().await.prepare();
        let result = match prepared {
            Ok(submission) => submission
                .send(self.api.as_ref())
                .await
                .map(|outcome| (submission, outcome)),
            Err(err) => Err(err),
        };

        match result {
            Ok((submission, outcome)) => {
                if self.form.lock().await.complete(&submission) {
                    let _ = self.events.send(DirectoryEvent::FormClosed);
                }
                let _ = self.load().await;
                let text = match &outcome {
                    SubmitOutcome::Created(record) => format!("Employee {} added", record.name),
                    SubmitOutcome::Updated(record) => format!("Employee {} updated", record.name),
                };
                self.notifications.show(text, NotificationKind::Success).await;
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "directory: submit failed");
                self.notifications
                    .show(err.user_message(), NotificationKind::Error)
                    .await;
                Err(err)
            }
        }
    }

    pub async fn cancel_form(&self) {
        let mut form = self.form.lock().await;
        if form.is_open() {
            form.cancel();
            let _ = self.events.send(DirectoryEvent::FormClosed);
        }
    }

    /// Asks `confirm` first; declining touches nothing. Once confirmed, the
    /// collection is reloaded and a notification shown whatever the outcome.
    pub async fn delete_employee(
        &self,
        id: RecordId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, SyncError> {
        let prompt = match self.store.snapshot().await.find(id) {
            Some(record) => format!(
                "Delete employee {} ({})? This cannot be undone.",
                record.name, record.employee_id
            ),
            None => format!("Delete employee #{id}? This cannot be undone."),
        };
        if !confirm.confirm(&prompt) {
            info!(record_id = id.0, "directory: delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        let result = self.api.remove(id).await;
        let _ = self.load().await;

        match result {
            Ok(()) => {
                self.notifications
                    .show("Employee deleted", NotificationKind::Success)
                    .await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!(record_id = id.0, error = %err, "directory: delete failed");
                self.notifications
                    .show(err.user_message(), NotificationKind::Error)
                    .await;
                Err(err)
            }
        }
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.notifications.current().await
    }

    pub async fn dismiss_notification(&self) {
        self.notifications.dismiss().await;
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod tests_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
