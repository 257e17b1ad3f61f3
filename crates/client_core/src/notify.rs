use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::debug;

use crate::events::DirectoryEvent;

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub visible: bool,
    pub text: String,
    pub kind: NotificationKind,
}

struct ChannelState {
    current: Option<Notification>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Holds at most one visible message. Showing a new one replaces the old one
/// and restarts the auto-dismiss timer.
#[derive(Clone)]
pub struct NotificationChannel {
    state: Arc<Mutex<ChannelState>>,
    dismiss_after: Duration,
    events: broadcast::Sender<DirectoryEvent>,
}

impl NotificationChannel {
    pub fn new(dismiss_after: Duration, events: broadcast::Sender<DirectoryEvent>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChannelState {
                current: None,
                generation: 0,
                timer: None,
            })),
            dismiss_after,
            events,
        }
    }

    pub async fn show(&self, text: impl Into<String>, kind: NotificationKind) {
        let notification = Notification {
            visible: true,
            text: text.into(),
            kind,
        };

        let mut guard = self.state.lock().await;
        if let Some(timer) = guard.timer.take() {
            timer.abort();
        }
        guard.generation += 1;
        guard.current = Some(notification.clone());

        let generation = guard.generation;
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let dismiss_after = self.dismiss_after;
        guard.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            let mut guard = state.lock().await;
            if guard.generation != generation {
                return;
            }
            guard.current = None;
            guard.timer = None;
            debug!(generation, "notification: auto-dismissed");
            let _ = events.send(DirectoryEvent::NotificationDismissed);
        }));
        drop(guard);

        debug!(?kind, text = %notification.text, "notification: shown");
        let _ = self.events.send(DirectoryEvent::NotificationShown(notification));
    }

    pub async fn dismiss(&self) {
        let mut guard = self.state.lock().await;
        if let Some(timer) = guard.timer.take() {
            timer.abort();
        }
        guard.generation += 1;
        if guard.current.take().is_some() {
            let _ = self.events.send(DirectoryEvent::NotificationDismissed);
        }
    }

    pub async fn current(&self) -> Option<Notification> {
        self.state.lock().await.current.clone()
    }
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
