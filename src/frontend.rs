//! Imperative surface the controller draws on
//!
//! Everything here is fire-and-forget: the controller computes view state and
//! the frontend reflects it, whether that is a terminal, a DOM, or a test probe.

use uuid::Uuid;

use crate::notify::Notification;
use crate::view::DashboardView;

pub trait Frontend: Send + Sync {
    /// Reflect the full dashboard state
    fn render(&self, view: &DashboardView);

    /// Show a new toast banner
    fn show_notification(&self, notification: &Notification);

    /// Remove an expired toast
    fn dismiss_notification(&self, id: Uuid);

    /// Leave the dashboard for the login page
    fn redirect_to_login(&self);
}
