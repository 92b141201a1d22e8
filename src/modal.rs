//! Modal dialogs: the confirmation slot and the OTP entry dialog

use crate::error::{DashboardError, Result};

/// Shortest OTP accepted before going to the network
pub const MIN_OTP_LEN: usize = 4;

/// Text of a confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub icon: String,
    pub title: String,
    pub body: String,
}

impl ConfirmPrompt {
    pub fn new(icon: &str, title: &str, body: &str) -> Self {
        Self {
            icon: icon.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

/// Single-slot confirmation gate.
///
/// `A` is the pending action. A second `request` replaces the first without
/// running it.
#[derive(Debug)]
pub struct ConfirmationModal<A> {
    pending: Option<(ConfirmPrompt, A)>,
}

impl<A> Default for ConfirmationModal<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ConfirmationModal<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, prompt: ConfirmPrompt, action: A) {
        if let Some((replaced, _)) = self.pending.replace((prompt, action)) {
            tracing::debug!(title = %replaced.title, "confirmation replaced");
        }
    }

    /// Hide the dialog and hand back the pending action for the caller to run
    pub fn confirm(&mut self) -> Option<A> {
        self.pending.take().map(|(_, action)| action)
    }

    /// Hide the dialog and drop the pending action
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn prompt(&self) -> Option<&ConfirmPrompt> {
        self.pending.as_ref().map(|(prompt, _)| prompt)
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }
}

/// Broker login progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtpFlow {
    #[default]
    Idle,
    OtpSent,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpModalView {
    pub visible: bool,
    pub input: String,
    pub input_focused: bool,
}

/// OTP entry dialog plus the login flow it drives
#[derive(Debug, Default)]
pub struct OtpModal {
    flow: OtpFlow,
    view: OtpModalView,
}

impl OtpModal {
    pub fn flow(&self) -> OtpFlow {
        self.flow
    }

    pub fn view(&self) -> &OtpModalView {
        &self.view
    }

    /// OTP was sent: show the dialog with a focused, empty input
    pub fn open(&mut self) {
        self.flow = OtpFlow::OtpSent;
        self.view = OtpModalView {
            visible: true,
            input: String::new(),
            input_focused: true,
        };
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.view.input = input.into();
    }

    pub fn close(&mut self) {
        self.view.visible = false;
        self.view.input_focused = false;
    }

    /// Trimmed input, or a validation error when it is missing or too short
    pub fn validated_input(&self) -> Result<String> {
        let otp = self.view.input.trim();
        if otp.chars().count() < MIN_OTP_LEN {
            return Err(DashboardError::Validation("Please enter a valid OTP".into()));
        }
        Ok(otp.to_string())
    }

    /// Server answered the OTP submission; the dialog closes either way
    pub fn finish(&mut self, authenticated: bool) {
        self.close();
        self.flow = if authenticated {
            OtpFlow::Authenticated
        } else {
            OtpFlow::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_confirm_runs_latest_only() {
        let ran = Rc::new(Cell::new(0));
        let mut modal: ConfirmationModal<Box<dyn FnOnce()>> = ConfirmationModal::new();

        let first = Rc::clone(&ran);
        modal.request(ConfirmPrompt::new("🛑", "Stop?", "..."), Box::new(move || first.set(1)));
        let second = Rc::clone(&ran);
        modal.request(ConfirmPrompt::new("⚡", "Live?", "..."), Box::new(move || second.set(2)));
        assert_eq!(modal.prompt().map(|p| p.title.as_str()), Some("Live?"));

        if let Some(action) = modal.confirm() {
            action();
        }
        assert_eq!(ran.get(), 2);
        assert!(!modal.is_open());
        assert!(modal.confirm().is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let mut modal = ConfirmationModal::new();
        modal.request(ConfirmPrompt::new("🛑", "Stop?", "..."), 7);
        modal.cancel();
        assert!(!modal.is_open());
        assert_eq!(modal.confirm(), None);
    }

    #[test]
    fn test_otp_validation() {
        let mut otp = OtpModal::default();
        otp.open();
        assert_eq!(otp.flow(), OtpFlow::OtpSent);
        assert!(otp.view().input_focused);

        otp.set_input("  12 ");
        assert!(otp.validated_input().is_err());
        otp.set_input(" 1234 ");
        assert_eq!(otp.validated_input().unwrap(), "1234");
    }

    #[test]
    fn test_otp_finish_closes() {
        let mut otp = OtpModal::default();
        otp.open();
        otp.finish(false);
        assert!(!otp.view().visible);
        assert_eq!(otp.flow(), OtpFlow::Idle);

        otp.open();
        otp.finish(true);
        assert_eq!(otp.flow(), OtpFlow::Authenticated);
    }
}
