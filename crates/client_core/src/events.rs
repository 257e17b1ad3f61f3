use shared::domain::CollectionState;

use crate::{form::FormMode, notify::Notification};

#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    CollectionChanged(CollectionState),
    NotificationShown(Notification),
    NotificationDismissed,
    FormOpened(FormMode),
    FormClosed,
}
