//! App lifecycle: active until the first logout, stopped forever after
//!
//! Logout is the single cross-cutting failure path. It cancels the poll timer
//! synchronously, clears the session, and redirects exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::frontend::Frontend;
use crate::session::{Session, SessionStore};

/// Why the dashboard is leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// Operator pressed logout
    User,
    /// Backend answered 401
    Unauthorized,
    /// No session at startup
    NoSession,
}

pub struct Lifecycle {
    store: Arc<dyn SessionStore>,
    frontend: Arc<dyn Frontend>,
    stopped: AtomicBool,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn SessionStore>, frontend: Arc<dyn Frontend>) -> Self {
        Self {
            store,
            frontend,
            stopped: AtomicBool::new(false),
            poll_task: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    /// Session to authenticate with; `None` once stopped
    pub fn session(&self) -> Option<Session> {
        if self.is_active() {
            self.store.get()
        } else {
            None
        }
    }

    /// Register the periodic poll task so logout can cancel it.
    ///
    /// A task attached after logout is aborted on the spot.
    pub fn attach_poll_task(&self, handle: JoinHandle<()>) {
        let mut slot = self.poll_task.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_active() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        } else {
            handle.abort();
        }
    }

    /// Transition to stopped. Only the first call has any effect.
    pub fn logout(&self, reason: LogoutReason) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(?reason, "logging out");

        let task = self
            .poll_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }

        if let Err(e) = self.store.clear() {
            tracing::warn!("failed to clear session: {e}");
        }
        self.frontend.redirect_to_login();
    }
}
