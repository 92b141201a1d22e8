//! Terminal rendering of the dashboard

use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use fno_sentinel_client::form::{FIELDS, FieldInput, FieldKind};
use fno_sentinel_client::view::{LogLevel, SettingsView, StatusView, Tone};
use fno_sentinel_client::{DashboardView, Frontend, Notification, NotificationKind};

/// Prints toasts as they arrive. In live mode also reprints the status panel
/// whenever it changes.
pub struct TerminalFrontend {
    live: bool,
    last_status: Mutex<Option<StatusView>>,
}

impl TerminalFrontend {
    pub fn new(live: bool) -> Self {
        Self {
            live,
            last_status: Mutex::new(None),
        }
    }
}

impl Frontend for TerminalFrontend {
    fn render(&self, view: &DashboardView) {
        if !self.live {
            return;
        }
        let Some(status) = &view.status else {
            return;
        };
        let mut last = self
            .last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last.as_ref() == Some(status) {
            return;
        }
        println!("{}", format_status(&view.username, status));
        *last = Some(status.clone());
    }

    fn show_notification(&self, notification: &Notification) {
        println!("{}", format_notification(notification));
    }

    fn dismiss_notification(&self, _id: Uuid) {}

    fn redirect_to_login(&self) {
        eprintln!("Not logged in. Run `sentinel session set --token <TOKEN>` after signing in.");
    }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "●",
        Tone::Negative => "○",
        Tone::Warning => "◐",
    }
}

pub fn format_notification(notification: &Notification) -> String {
    let tag = match notification.kind {
        NotificationKind::Success => "[ok]",
        NotificationKind::Error => "[error]",
    };
    format!("{tag} {}", notification.message)
}

pub fn format_status(username: &str, status: &StatusView) -> String {
    let mut out = format!(
        "{} {}  [{}]  {}  ({username})",
        tone_marker(status.status_tone),
        status.status_text,
        status.mode,
        status.uptime_text,
    );
    if let Some(banner) = &status.running_banner {
        out.push_str(&format!("\n  {banner}"));
    }
    if status.otp_alert_visible {
        out.push_str("\n  ⚠ Broker OTP required: run `sentinel login`, then `sentinel otp <CODE>`");
    }
    for line in &status.logs {
        let prefix = match line.level {
            LogLevel::Error => "E",
            LogLevel::Warning => "W",
            LogLevel::Success => "S",
            LogLevel::Default => " ",
        };
        out.push_str(&format!("\n  {prefix} {}", line.text));
    }
    out.push_str(&format!("\n  [{}]", status.control.label));
    out
}

pub fn format_settings(view: &DashboardView) -> String {
    let settings: &SettingsView = &view.settings;
    let mut out = format!("Trading mode: {}", settings.mode);
    if let Some(credentials) = settings.credentials {
        out.push_str(&format!(
            "\n{} {}",
            tone_marker(credentials.tone()),
            credentials.label()
        ));
    }
    for spec in FIELDS {
        let value = match (spec.kind, view.form.get(spec.key)) {
            (FieldKind::Secret, _) => "(write-only)".to_string(),
            (_, Some(FieldInput::Text(text))) => text.clone(),
            (_, Some(FieldInput::Flag(flag))) => flag.to_string(),
            (_, None) => "-".to_string(),
        };
        out.push_str(&format!("\n  {:<24} {value}", spec.key));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fno_sentinel_client::BotStatus;
    use fno_sentinel_client::view::status_view;

    #[test]
    fn status_panel_lists_logs_and_control() {
        let status = BotStatus {
            running: true,
            uptime: "0h 1m 5s".into(),
            trading_mode: fno_sentinel_client::TradingMode::Live,
            otp_pending: true,
            logs: vec!["❌ Order rejected".into(), "heartbeat".into()],
        };
        let text = format_status("asha", &status_view(&status, false));
        assert!(text.starts_with("● RUNNING  [LIVE]  Uptime: 0h 1m 5s  (asha)"));
        assert!(text.contains("Running for 0h 1m 5s"));
        assert!(text.contains("Broker OTP required"));
        assert!(text.contains("E ❌ Order rejected"));
        assert!(text.ends_with("[STOP BOT]"));
    }

    #[test]
    fn settings_never_print_secret_values() {
        let view = DashboardView {
            username: "asha".into(),
            status: None,
            settings: SettingsView::default(),
            form: fno_sentinel_client::form::EditBuffer::new(),
            confirm: None,
            otp_modal: fno_sentinel_client::modal::OtpModalView::default(),
        };
        let text = format_settings(&view);
        assert!(text.contains("mstock_password"));
        assert!(text.contains("(write-only)"));
        assert!(text.starts_with("Trading mode: PAPER"));
    }
}
