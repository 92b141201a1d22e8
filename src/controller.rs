//! Dashboard controller - owns the application state and runs every action
//!
//! Coordinates the API client, the modals, the notification center and the
//! frontend. State lives in one `AppState` behind a lock that is never held
//! across an `.await`; each mutation re-renders the full view.

use std::sync::{Arc, Mutex, PoisonError};

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::form::EditBuffer;
use crate::frontend::Frontend;
use crate::lifecycle::{Lifecycle, LogoutReason};
use crate::modal::{ConfirmPrompt, ConfirmationModal, OtpFlow, OtpModal};
use crate::notify::{Notification, NotificationCenter, NotificationKind};
use crate::poller::StatusPoller;
use crate::session::SessionStore;
use crate::transport::HttpTransport;
use crate::types::{BotStatus, Settings, TradingMode};
use crate::view::{
    ConnectionCheck, CredentialStatus, DashboardView, SettingsView, Tone, status_view,
};

/// Action waiting behind the confirmation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    StopBot,
    EnableLiveMode,
}

#[derive(Debug, Default)]
struct AppState {
    username: String,
    status: Option<BotStatus>,
    /// Set by a `needs_otp` start reply, cleared by the next applied poll
    otp_alert_forced: bool,
    settings: Option<Settings>,
    mode: TradingMode,
    form: EditBuffer,
    connection: Option<ConnectionCheck>,
    saving: bool,
    testing_connection: bool,
    initiating_login: bool,
    confirm: ConfirmationModal<PendingAction>,
    otp: OtpModal,
}

impl AppState {
    fn view(&self) -> DashboardView {
        DashboardView {
            username: self.username.clone(),
            status: self
                .status
                .as_ref()
                .map(|s| status_view(s, self.otp_alert_forced)),
            settings: SettingsView {
                mode: self.mode,
                credentials: self.settings.as_ref().map(CredentialStatus::from_settings),
                connection: self.connection.clone(),
                saving: self.saving,
                testing_connection: self.testing_connection,
                initiating_login: self.initiating_login,
            },
            form: self.form.clone(),
            confirm: self.confirm.prompt().cloned(),
            otp_modal: self.otp.view().clone(),
        }
    }

    /// Replace the edit buffer and mode from a server snapshot
    fn apply_settings(&mut self, settings: Settings) {
        self.form = EditBuffer::from_settings(&settings);
        self.mode = settings.trading_mode;
        self.settings = Some(settings);
    }
}

pub struct DashboardController {
    client: ApiClient,
    frontend: Arc<dyn Frontend>,
    notifications: NotificationCenter,
    poller: StatusPoller,
    state: Mutex<AppState>,
}

impl DashboardController {
    /// Wire a controller from its collaborators
    pub fn new(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        frontend: Arc<dyn Frontend>,
    ) -> Arc<Self> {
        let lifecycle = Arc::new(Lifecycle::new(store, Arc::clone(&frontend)));
        Arc::new(Self {
            client: ApiClient::new(transport, lifecycle),
            notifications: NotificationCenter::new(Arc::clone(&frontend), config.notification_ttl()),
            poller: StatusPoller::new(config.poll_interval()),
            frontend,
            state: Mutex::new(AppState::default()),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn lifecycle(&self) -> &Arc<Lifecycle> {
        self.client.lifecycle()
    }

    /// Pick up the stored session for the header, or log out when there is none
    pub fn restore_session(&self) -> bool {
        let Some(session) = self.lifecycle().session() else {
            tracing::info!("no session at startup");
            self.lifecycle().logout(LogoutReason::NoSession);
            return false;
        };
        self.update(|s| s.username = session.display_name().to_string());
        true
    }

    /// Gate on the session, then start polling and load settings.
    ///
    /// Returns `false` when there is no session; the frontend has been sent to
    /// login and nothing else is initialised.
    pub async fn start(self: &Arc<Self>) -> bool {
        if !self.restore_session() {
            return false;
        }
        self.poller.spawn(Arc::clone(self));
        self.load_settings().await;
        self.lifecycle().is_active()
    }

    /// Operator-initiated logout
    pub fn logout(&self) {
        self.lifecycle().logout(LogoutReason::User);
    }

    /// Current full view
    pub fn view(&self) -> DashboardView {
        self.lock().view()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.active()
    }

    pub fn status(&self) -> Option<BotStatus> {
        self.lock().status.clone()
    }

    pub fn settings(&self) -> Option<Settings> {
        self.lock().settings.clone()
    }

    pub fn trading_mode(&self) -> TradingMode {
        self.lock().mode
    }

    pub fn otp_flow(&self) -> OtpFlow {
        self.lock().otp.flow()
    }

    // ── Polling ──────────────────────────────────────────────

    /// Fetch one status snapshot; a failed fetch leaves the view as it was.
    ///
    /// Manual re-polls and timer ticks may interleave; the last applied wins.
    pub async fn poll_once(&self) {
        let Some(status) = self.client.status().await else {
            return;
        };
        self.update(|s| {
            s.status = Some(status);
            s.otp_alert_forced = false;
        });
    }

    // ── Bot control ──────────────────────────────────────────

    /// Start the bot, or ask for confirmation before stopping it
    pub async fn toggle_bot(&self) {
        let running = self.lock().status.as_ref().is_some_and(|s| s.running);
        if running {
            self.update(|s| {
                s.confirm.request(
                    ConfirmPrompt::new(
                        "🛑",
                        "Stop the Bot?",
                        "All monitoring will pause. Active positions will still be tracked when restarted.",
                    ),
                    PendingAction::StopBot,
                );
            });
        } else {
            self.start_bot().await;
        }
    }

    async fn start_bot(&self) {
        if let Some(reply) = self.client.start_bot().await {
            if reply.has_status("needs_otp") {
                self.update(|s| s.otp_alert_forced = true);
            }
            self.notifications.notify(
                reply.message_or("Bot started!"),
                NotificationKind::from_success(!reply.is_error()),
            );
        }
        self.poll_once().await;
    }

    async fn stop_bot(&self) {
        if let Some(reply) = self.client.stop_bot().await {
            self.notifications.notify(
                reply.message_or("Bot stopping..."),
                NotificationKind::from_success(!reply.is_error()),
            );
        }
        self.poll_once().await;
    }

    // ── Confirmation dialog ──────────────────────────────────

    /// Run the pending action, if any, and close the dialog
    pub async fn confirm(&self) {
        let Some(action) = self.update(|s| s.confirm.confirm()) else {
            return;
        };
        match action {
            PendingAction::StopBot => self.stop_bot().await,
            PendingAction::EnableLiveMode => self.update(|s| s.mode = TradingMode::Live),
        }
    }

    pub fn cancel_confirm(&self) {
        self.update(|s| s.confirm.cancel());
    }

    // ── Settings ─────────────────────────────────────────────

    /// Fetch settings and overwrite the edit buffer, unsaved edits included
    pub async fn load_settings(&self) {
        if let Some(settings) = self.client.settings().await {
            self.update(|s| s.apply_settings(settings));
        }
    }

    /// Switch trading mode; going LIVE needs confirmation
    pub fn set_mode(&self, mode: TradingMode) {
        self.update(|s| {
            if mode.is_live() && !s.mode.is_live() {
                s.confirm.request(
                    ConfirmPrompt::new(
                        "⚡",
                        "Switch to LIVE mode?",
                        "Real orders will be placed with mStock using your account. This action trades with real money.",
                    ),
                    PendingAction::EnableLiveMode,
                );
            } else {
                s.mode = mode;
            }
        });
    }

    pub fn edit_text(&self, key: &str, value: &str) -> Result<()> {
        self.update(|s| s.form.set_text(key, value))
    }

    pub fn edit_flag(&self, key: &str, value: bool) -> Result<()> {
        self.update(|s| s.form.set_flag(key, value))
    }

    /// Send the whole edit buffer, then re-sync from the server echo
    pub async fn save_settings(&self) {
        let payload = self.update(|s| {
            s.saving = true;
            s.form.to_payload(s.mode)
        });

        let reply = self.client.save_settings(payload).await;

        self.update(|s| s.saving = false);
        match reply {
            None => {
                self.notifications
                    .notify("❌ Failed to save settings.", NotificationKind::Error);
            }
            Some(reply) if reply.outcome.is_error() => {
                self.notifications.notify(
                    reply.outcome.message_or("❌ Failed to save settings."),
                    NotificationKind::Error,
                );
            }
            Some(reply) => {
                self.notifications
                    .notify("✅ Settings saved successfully!", NotificationKind::Success);
                if let Some(settings) = reply.settings {
                    self.update(|s| s.apply_settings(settings));
                }
            }
        }
    }

    pub async fn test_connection(&self) {
        self.update(|s| s.testing_connection = true);
        let reply = self.client.test_connection().await;
        self.update(|s| s.testing_connection = false);

        let Some(reply) = reply else {
            return;
        };
        let connected = reply.has_status("connected");
        let message = reply.message_or("Connection test finished");
        self.update(|s| {
            s.connection = Some(ConnectionCheck {
                message: message.clone(),
                tone: if connected { Tone::Positive } else { Tone::Warning },
            });
        });
        self.notifications
            .notify(message, NotificationKind::from_success(connected));
    }

    // ── Broker OTP login ─────────────────────────────────────

    /// Ask the backend to send an OTP; opens the OTP dialog on success
    pub async fn initiate_login(&self) {
        self.update(|s| s.initiating_login = true);
        let reply = self.client.initiate_login().await;
        self.update(|s| s.initiating_login = false);

        let Some(reply) = reply else {
            return;
        };
        let sent = reply.has_status("otp_sent");
        self.notifications.notify(
            reply.message_or("Failed to initiate login."),
            NotificationKind::from_success(sent),
        );
        if sent {
            self.update(|s| s.otp.open());
        }
    }

    pub fn set_otp_input(&self, input: &str) {
        self.update(|s| s.otp.set_input(input));
    }

    pub fn close_otp_dialog(&self) {
        self.update(|s| s.otp.close());
    }

    /// Submit the OTP. Short input never reaches the network.
    pub async fn submit_otp(&self) {
        let validated = self.lock().otp.validated_input();
        let otp = match validated {
            Ok(otp) => otp,
            Err(e) => {
                let message = match e {
                    DashboardError::Validation(message) => message,
                    other => other.to_string(),
                };
                self.notifications.notify(message, NotificationKind::Error);
                return;
            }
        };

        let reply = self.client.submit_otp(&otp).await;
        let authenticated = reply
            .as_ref()
            .is_some_and(|r| r.has_status("authenticated"));
        self.update(|s| s.otp.finish(authenticated));
        if let Some(reply) = reply {
            self.notifications.notify(
                reply.message_or("OTP submitted"),
                NotificationKind::from_success(authenticated),
            );
        }

        // Token presence flags changed either way
        self.load_settings().await;
    }

    // ── Internals ────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate state and re-render
    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let (result, view) = {
            let mut state = self.lock();
            let result = f(&mut state);
            (result, state.view())
        };
        self.frontend.render(&view);
        result
    }
}
