//! Wire types for the bot control API
//!
//! Shapes of the JSON bodies the dashboard reads from and writes to the backend.

use serde::{Deserialize, Serialize};

/// Operating mode of the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum TradingMode {
    /// Simulated fills, no broker orders
    #[default]
    Paper,
    /// Real orders on the broker account
    Live,
}

impl TradingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TradingMode::Paper => "PAPER",
            TradingMode::Live => "LIVE",
        }
    }

    pub fn is_live(self) -> bool {
        self == TradingMode::Live
    }
}

/// Anything the backend does not call `LIVE` is treated as paper trading.
impl From<String> for TradingMode {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("LIVE") {
            TradingMode::Live
        } else {
            TradingMode::Paper
        }
    }
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TradingMode {
    type Err = crate::error::DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAPER" => Ok(TradingMode::Paper),
            "LIVE" => Ok(TradingMode::Live),
            other => Err(crate::error::DashboardError::Validation(format!(
                "unknown trading mode: {other}"
            ))),
        }
    }
}

/// Server-authoritative bot status snapshot (`GET /api/bot/status`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    pub running: bool,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub trading_mode: TradingMode,
    #[serde(default)]
    pub otp_pending: bool,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Generic action reply: `{status, message}` on success paths,
/// `{detail}` when the backend raised an HTTP error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ActionResponse {
    pub fn has_status(&self, expected: &str) -> bool {
        self.status.as_deref() == Some(expected)
    }

    /// Business-level failure carried in a 2xx/4xx body
    pub fn is_error(&self) -> bool {
        self.detail.is_some() || matches!(self.status.as_deref(), Some("error" | "failed"))
    }

    /// Human-readable message, falling back to `detail` and then `default`
    pub fn message_or(&self, default: &str) -> String {
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return message.to_string();
        }
        match &self.detail {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(serde_json::Value::Null) | None => default.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Settings snapshot (`GET /api/settings/`)
///
/// Credential secrets never appear here, only their `*_set` presence flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // Broker credential presence
    #[serde(default)]
    pub mstock_api_key_set: bool,
    #[serde(default)]
    pub mstock_api_secret_set: bool,
    #[serde(default)]
    pub mstock_client_code_set: bool,
    #[serde(default)]
    pub mstock_access_token_set: bool,

    pub trading_mode: TradingMode,

    // Capital & risk
    pub initial_capital: Option<f64>,
    pub daily_loss_limit_pct: Option<f64>,
    pub daily_profit_cap: Option<f64>,

    // Strategy
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
    pub adx_min_daily: Option<f64>,
    pub vix_min_threshold: Option<f64>,
    pub profit_target_amount: Option<f64>,
    pub strike_depth: Option<i64>,

    // Hours
    pub market_open_time: Option<String>,
    pub entry_cutoff_time: Option<String>,

    // Stop-loss tiers
    pub nifty_sl_low: Option<f64>,
    pub nifty_sl_mid: Option<f64>,
    pub nifty_sl_high: Option<f64>,
    pub banknifty_sl_low: Option<f64>,
    pub banknifty_sl_mid: Option<f64>,
    pub banknifty_sl_high: Option<f64>,
    pub finnifty_sl_low: Option<f64>,
    pub finnifty_sl_mid: Option<f64>,
    pub finnifty_sl_high: Option<f64>,
    pub sensex_sl_low: Option<f64>,
    pub sensex_sl_mid: Option<f64>,
    pub sensex_sl_high: Option<f64>,

    // Lot sizes
    pub nifty_lots: Option<i64>,
    pub banknifty_lots: Option<i64>,
    pub finnifty_lots: Option<i64>,
    pub sensex_lots: Option<i64>,

    // Active indices
    pub trade_nifty: Option<bool>,
    pub trade_banknifty: Option<bool>,
    pub trade_finnifty: Option<bool>,
    pub trade_sensex: Option<bool>,

    // Notification channels
    pub email_enabled: Option<bool>,
    pub email_address: Option<String>,
    pub email_smtp_host: Option<String>,
    pub email_smtp_port: Option<i64>,
    #[serde(default)]
    pub email_smtp_user_set: bool,
    pub telegram_enabled: Option<bool>,
    #[serde(default)]
    pub telegram_bot_token_set: bool,
    pub telegram_chat_id: Option<String>,
}

/// Reply to `POST /api/settings/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSaveResponse {
    #[serde(flatten)]
    pub outcome: ActionResponse,
    #[serde(default)]
    pub settings: Option<Settings>,
}

/// Body of `POST /api/bot/otp`
#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest {
    pub otp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trading_mode_wire_format() {
        let live: TradingMode = serde_json::from_value(json!("LIVE")).unwrap();
        assert_eq!(live, TradingMode::Live);
        let odd: TradingMode = serde_json::from_value(json!("SIMULATION")).unwrap();
        assert_eq!(odd, TradingMode::Paper);
        assert_eq!(serde_json::to_value(TradingMode::Live).unwrap(), json!("LIVE"));
        assert!("margin".parse::<TradingMode>().is_err());
    }

    #[test]
    fn test_status_defaults() {
        let status: BotStatus = serde_json::from_value(json!({"running": true})).unwrap();
        assert!(status.running);
        assert_eq!(status.trading_mode, TradingMode::Paper);
        assert!(status.logs.is_empty());

        // An HTTP error body is not a status snapshot
        assert!(serde_json::from_value::<BotStatus>(json!({"detail": "boom"})).is_err());
    }

    #[test]
    fn test_action_response_messages() {
        let fastapi: ActionResponse =
            serde_json::from_value(json!({"detail": "mStock credentials not configured"})).unwrap();
        assert!(fastapi.is_error());
        assert_eq!(fastapi.message_or("Bot started!"), "mStock credentials not configured");

        let ok: ActionResponse = serde_json::from_value(json!({"status": "started"})).unwrap();
        assert!(!ok.is_error());
        assert_eq!(ok.message_or("Bot started!"), "Bot started!");
    }

    #[test]
    fn test_settings_requires_mode() {
        assert!(serde_json::from_value::<Settings>(json!({"detail": "nope"})).is_err());
        let s: Settings = serde_json::from_value(json!({
            "trading_mode": "PAPER",
            "initial_capital": 50000.0,
            "mstock_api_key_set": true
        }))
        .unwrap();
        assert_eq!(s.initial_capital, Some(50000.0));
        assert!(s.mstock_api_key_set);
        assert!(!s.mstock_client_code_set);
    }

    #[test]
    fn test_save_response_echo() {
        let r: SettingsSaveResponse = serde_json::from_value(json!({
            "message": "Settings saved successfully",
            "settings": {"trading_mode": "LIVE"}
        }))
        .unwrap();
        assert_eq!(r.outcome.message.as_deref(), Some("Settings saved successfully"));
        assert_eq!(r.settings.map(|s| s.trading_mode), Some(TradingMode::Live));
    }
}
