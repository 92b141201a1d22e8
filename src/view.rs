//! Pure view-state mapping
//!
//! Turns server snapshots into what the dashboard shows. Nothing in here
//! touches the network or a rendering surface.

use crate::form::EditBuffer;
use crate::modal::{ConfirmPrompt, OtpModalView};
use crate::types::{BotStatus, Settings, TradingMode};

const ERROR_MARKERS: &[&str] = &["❌", "FATAL", "ERROR"];
const WARNING_MARKERS: &[&str] = &["⚠", "WARNING"];
const SUCCESS_MARKERS: &[&str] = &["✅", "ENTRY", "EXIT"];

/// What the main button does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
}

/// Color intent of a text fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Warning,
}

/// Log line styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Success,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub level: LogLevel,
}

/// Run/stop control appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlView {
    pub label: &'static str,
    pub action: ControlAction,
}

/// Everything derived from one status snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub control: ControlView,
    pub status_text: &'static str,
    pub status_tone: Tone,
    pub uptime_text: String,
    /// "Running for ..." banner, absent while stopped
    pub running_banner: Option<String>,
    pub mode: TradingMode,
    pub otp_alert_visible: bool,
    /// Full replacement of the log panel
    pub logs: Vec<LogLine>,
    pub scroll_to_bottom: bool,
}

/// Classify a log line. Precedence: error, warning, success, default.
pub fn classify_log(line: &str) -> LogLevel {
    let has_any = |markers: &[&str]| markers.iter().any(|m| line.contains(m));
    if has_any(ERROR_MARKERS) {
        LogLevel::Error
    } else if has_any(WARNING_MARKERS) {
        LogLevel::Warning
    } else if has_any(SUCCESS_MARKERS) {
        LogLevel::Success
    } else {
        LogLevel::Default
    }
}

/// Map a status snapshot to its five UI facets.
///
/// `otp_alert_forced` keeps the alert up after a `needs_otp` start reply until
/// the next snapshot is applied.
pub fn status_view(status: &BotStatus, otp_alert_forced: bool) -> StatusView {
    let running = status.running;
    let uptime = if status.uptime.is_empty() {
        "0s"
    } else {
        status.uptime.as_str()
    };

    StatusView {
        control: if running {
            ControlView {
                label: "STOP BOT",
                action: ControlAction::Stop,
            }
        } else {
            ControlView {
                label: "START BOT",
                action: ControlAction::Start,
            }
        },
        status_text: if running { "RUNNING" } else { "STOPPED" },
        status_tone: if running { Tone::Positive } else { Tone::Negative },
        uptime_text: format!("Uptime: {uptime}"),
        running_banner: running.then(|| format!("Running for {}", status.uptime)),
        mode: status.trading_mode,
        otp_alert_visible: status.otp_pending || otp_alert_forced,
        logs: status
            .logs
            .iter()
            .map(|line| LogLine {
                text: line.clone(),
                level: classify_log(line),
            })
            .collect(),
        scroll_to_bottom: true,
    }
}

/// Broker credential indicator, derived from `*_set` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Missing,
    SavedNotAuthenticated,
    Authenticated,
}

impl CredentialStatus {
    pub fn from_settings(settings: &Settings) -> Self {
        let connected = settings.mstock_api_key_set && settings.mstock_client_code_set;
        match (connected, settings.mstock_access_token_set) {
            (false, _) => CredentialStatus::Missing,
            (true, false) => CredentialStatus::SavedNotAuthenticated,
            (true, true) => CredentialStatus::Authenticated,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CredentialStatus::Missing => "⚠️ No mStock credentials yet",
            CredentialStatus::SavedNotAuthenticated => {
                "✅ mStock credentials saved · ⚠️ Not authenticated — click Initiate Login"
            }
            CredentialStatus::Authenticated => "✅ mStock credentials saved · Token active",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            CredentialStatus::Authenticated => Tone::Positive,
            _ => Tone::Warning,
        }
    }
}

/// Result of the last "Test Connection" press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub message: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsView {
    pub mode: TradingMode,
    /// `None` until settings have loaded once
    pub credentials: Option<CredentialStatus>,
    pub connection: Option<ConnectionCheck>,
    pub saving: bool,
    pub testing_connection: bool,
    pub initiating_login: bool,
}

/// Full dashboard snapshot handed to the frontend
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub username: String,
    /// `None` until the first successful poll
    pub status: Option<StatusView>,
    pub settings: SettingsView,
    pub form: EditBuffer,
    pub confirm: Option<ConfirmPrompt>,
    pub otp_modal: OtpModalView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(running: bool) -> BotStatus {
        BotStatus {
            running,
            uptime: "1h 2m 3s".into(),
            trading_mode: TradingMode::Paper,
            otp_pending: false,
            logs: vec![],
        }
    }

    #[test]
    fn test_running_and_stopped_facets() {
        let on = status_view(&snapshot(true), false);
        assert_eq!(on.control.label, "STOP BOT");
        assert_eq!(on.control.action, ControlAction::Stop);
        assert_eq!(on.status_text, "RUNNING");
        assert_eq!(on.running_banner.as_deref(), Some("Running for 1h 2m 3s"));

        let off = status_view(&snapshot(false), false);
        assert_eq!(off.control.label, "START BOT");
        assert_eq!(off.control.action, ControlAction::Start);
        assert_eq!(off.status_text, "STOPPED");
        assert_eq!(off.status_tone, Tone::Negative);
        assert!(off.running_banner.is_none());
    }

    #[test]
    fn test_empty_uptime_shows_zero() {
        let mut status = snapshot(false);
        status.uptime.clear();
        assert_eq!(status_view(&status, false).uptime_text, "Uptime: 0s");
    }

    #[test]
    fn test_log_precedence() {
        assert_eq!(classify_log("[09:15:00] ✅ ENTRY failed: ERROR"), LogLevel::Error);
        assert_eq!(classify_log("❌ FATAL: boom"), LogLevel::Error);
        assert_eq!(classify_log("⚠️ Loop error WARNING ✅"), LogLevel::Warning);
        assert_eq!(classify_log("EXIT NIFTY 24500CE"), LogLevel::Success);
        assert_eq!(classify_log("📊 Monitoring [NIFTY50]"), LogLevel::Default);
    }

    #[test]
    fn test_logs_replaced_wholesale() {
        let mut status = snapshot(true);
        status.logs = vec!["a".into(), "❌ b".into()];
        let view = status_view(&status, false);
        assert_eq!(view.logs.len(), 2);
        assert_eq!(view.logs[1].level, LogLevel::Error);
        assert!(view.scroll_to_bottom);
    }

    #[test]
    fn test_otp_alert_sources() {
        let mut status = snapshot(false);
        assert!(!status_view(&status, false).otp_alert_visible);
        assert!(status_view(&status, true).otp_alert_visible);
        status.otp_pending = true;
        assert!(status_view(&status, false).otp_alert_visible);
    }

    #[test]
    fn test_credential_indicator() {
        let mut s = Settings::default();
        assert_eq!(CredentialStatus::from_settings(&s), CredentialStatus::Missing);
        s.mstock_api_key_set = true;
        s.mstock_access_token_set = true;
        assert_eq!(CredentialStatus::from_settings(&s), CredentialStatus::Missing);
        s.mstock_client_code_set = true;
        assert_eq!(CredentialStatus::from_settings(&s), CredentialStatus::Authenticated);
        s.mstock_access_token_set = false;
        assert_eq!(
            CredentialStatus::from_settings(&s),
            CredentialStatus::SavedNotAuthenticated
        );
    }
}
