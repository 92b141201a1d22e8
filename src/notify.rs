//! Transient toast notifications
//!
//! Every toast runs its own removal timer. Toasts stack; there is no dedupe
//! and no cap.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::frontend::Frontend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn from_success(ok: bool) -> Self {
        if ok {
            NotificationKind::Success
        } else {
            NotificationKind::Error
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct NotificationCenter {
    frontend: Arc<dyn Frontend>,
    ttl: Duration,
    active: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn new(frontend: Arc<dyn Frontend>, ttl: Duration) -> Self {
        Self {
            frontend,
            ttl,
            active: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Show a toast and schedule its removal. Must run inside a tokio runtime.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
        };
        let id = notification.id;
        tracing::debug!(%id, ?kind, message = %notification.message, "notification");

        self.frontend.show_notification(&notification);
        self.lock().push(notification);

        let active = Arc::clone(&self.active);
        let frontend = Arc::clone(&self.frontend);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            active
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|n| n.id != id);
            frontend.dismiss_notification(id);
        });

        id
    }

    /// Toasts currently on screen, oldest first
    pub fn active(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::RecordingFrontend;

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire_independently() {
        let frontend = Arc::new(RecordingFrontend::default());
        let center = NotificationCenter::new(frontend.clone(), Duration::from_millis(4000));

        let first = center.notify("Bot started!", NotificationKind::Success);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let second = center.notify("Bot started!", NotificationKind::Success);
        assert_eq!(center.active().len(), 2);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let remaining: Vec<Uuid> = center.active().iter().map(|n| n.id).collect();
        assert_eq!(remaining, vec![second]);
        assert_eq!(*frontend.dismissed.lock().unwrap(), vec![first]);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(center.active().is_empty());
        assert_eq!(frontend.toasts().len(), 2);
    }

    #[test]
    fn test_kind_from_success() {
        assert_eq!(NotificationKind::from_success(true), NotificationKind::Success);
        assert_eq!(NotificationKind::from_success(false), NotificationKind::Error);
    }
}
