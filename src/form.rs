//! Settings form: field catalog, local edit buffer, save payload
//!
//! The buffer holds raw form input. It is replaced wholesale on every load or
//! save echo and turned into a payload only when the operator saves.
//!
//! A blank field means "leave unchanged" and is omitted from the payload. That
//! is what keeps write-only secrets from being wiped by an empty input.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::error::{DashboardError, Result};
use crate::types::{Settings, TradingMode};

/// How a field's raw input is turned into JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Int,
    Text,
    Flag,
    /// Write-only credential; never populated from the server
    Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
}

const fn field(key: &'static str, kind: FieldKind, label: &'static str) -> FieldSpec {
    FieldSpec { key, kind, label }
}

/// Every editable setting, in form order
pub const FIELDS: &[FieldSpec] = &[
    // Capital & risk
    field("initial_capital", FieldKind::Float, "Initial capital"),
    field("daily_loss_limit_pct", FieldKind::Float, "Daily loss limit %"),
    field("daily_profit_cap", FieldKind::Float, "Daily profit cap"),
    // Strategy
    field("rsi_min", FieldKind::Float, "RSI min"),
    field("rsi_max", FieldKind::Float, "RSI max"),
    field("adx_min_daily", FieldKind::Float, "ADX min (daily)"),
    field("vix_min_threshold", FieldKind::Float, "VIX min"),
    field("profit_target_amount", FieldKind::Float, "Profit target"),
    field("strike_depth", FieldKind::Int, "Strike depth"),
    // Hours
    field("market_open_time", FieldKind::Text, "Market open"),
    field("entry_cutoff_time", FieldKind::Text, "Entry cutoff"),
    // Stop-loss tiers
    field("nifty_sl_low", FieldKind::Float, "NIFTY SL low"),
    field("nifty_sl_mid", FieldKind::Float, "NIFTY SL mid"),
    field("nifty_sl_high", FieldKind::Float, "NIFTY SL high"),
    field("banknifty_sl_low", FieldKind::Float, "BANKNIFTY SL low"),
    field("banknifty_sl_mid", FieldKind::Float, "BANKNIFTY SL mid"),
    field("banknifty_sl_high", FieldKind::Float, "BANKNIFTY SL high"),
    field("finnifty_sl_low", FieldKind::Float, "FINNIFTY SL low"),
    field("finnifty_sl_mid", FieldKind::Float, "FINNIFTY SL mid"),
    field("finnifty_sl_high", FieldKind::Float, "FINNIFTY SL high"),
    field("sensex_sl_low", FieldKind::Float, "SENSEX SL low"),
    field("sensex_sl_mid", FieldKind::Float, "SENSEX SL mid"),
    field("sensex_sl_high", FieldKind::Float, "SENSEX SL high"),
    // Lot sizes
    field("nifty_lots", FieldKind::Int, "NIFTY lots"),
    field("banknifty_lots", FieldKind::Int, "BANKNIFTY lots"),
    field("finnifty_lots", FieldKind::Int, "FINNIFTY lots"),
    field("sensex_lots", FieldKind::Int, "SENSEX lots"),
    // Active indices
    field("trade_nifty", FieldKind::Flag, "Trade NIFTY"),
    field("trade_banknifty", FieldKind::Flag, "Trade BANKNIFTY"),
    field("trade_finnifty", FieldKind::Flag, "Trade FINNIFTY"),
    field("trade_sensex", FieldKind::Flag, "Trade SENSEX"),
    // Email
    field("email_enabled", FieldKind::Flag, "Email alerts"),
    field("email_address", FieldKind::Text, "Email address"),
    field("email_smtp_host", FieldKind::Text, "SMTP host"),
    field("email_smtp_port", FieldKind::Int, "SMTP port"),
    field("email_smtp_user", FieldKind::Secret, "SMTP user"),
    field("email_smtp_pass", FieldKind::Secret, "SMTP password"),
    // Telegram
    field("telegram_enabled", FieldKind::Flag, "Telegram alerts"),
    field("telegram_bot_token", FieldKind::Secret, "Telegram bot token"),
    field("telegram_chat_id", FieldKind::Text, "Telegram chat id"),
    // Broker credentials
    field("mstock_api_key", FieldKind::Secret, "mStock API key"),
    field("mstock_api_secret", FieldKind::Secret, "mStock API secret"),
    field("mstock_client_code", FieldKind::Secret, "mStock client code"),
    field("mstock_password", FieldKind::Secret, "mStock password"),
];

pub fn find_field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Raw value of one form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Flag(bool),
}

/// Local edit buffer. Absent keys are blank inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    values: BTreeMap<&'static str, FieldInput>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill a fresh buffer from a server snapshot. Secrets stay blank.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut buffer = Self::new();
        let snapshot = match serde_json::to_value(settings) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return buffer,
            Err(e) => {
                tracing::warn!("failed to flatten settings snapshot: {e}");
                return buffer;
            }
        };

        for spec in FIELDS {
            if spec.kind == FieldKind::Secret {
                continue;
            }
            let input = match snapshot.get(spec.key) {
                Some(Value::Bool(b)) => FieldInput::Flag(*b),
                Some(Value::String(s)) => FieldInput::Text(s.clone()),
                Some(Value::Number(n)) => FieldInput::Text(format_number(n)),
                _ => continue,
            };
            buffer.values.insert(spec.key, input);
        }
        buffer
    }

    pub fn get(&self, key: &str) -> Option<&FieldInput> {
        self.values.get(key)
    }

    /// Set a text-like field. An empty string blanks it.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let spec = lookup(key)?;
        if spec.kind == FieldKind::Flag {
            return Err(DashboardError::Validation(format!(
                "{key} is a checkbox, not a text field"
            )));
        }
        let value = value.into();
        if value.is_empty() {
            self.values.remove(spec.key);
        } else {
            self.values.insert(spec.key, FieldInput::Text(value));
        }
        Ok(())
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<()> {
        let spec = lookup(key)?;
        if spec.kind != FieldKind::Flag {
            return Err(DashboardError::Validation(format!("{key} is not a checkbox")));
        }
        self.values.insert(spec.key, FieldInput::Flag(value));
        Ok(())
    }

    pub fn clear(&mut self, key: &str) -> Result<()> {
        let spec = lookup(key)?;
        self.values.remove(spec.key);
        Ok(())
    }

    /// Build the save payload: the full buffer, blanks and unparseable
    /// numbers omitted, `trading_mode` always present.
    pub fn to_payload(&self, mode: TradingMode) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "trading_mode".to_string(),
            Value::String(mode.as_str().to_string()),
        );

        for spec in FIELDS {
            let Some(input) = self.values.get(spec.key) else {
                continue;
            };
            let value = match (spec.kind, input) {
                (FieldKind::Float, FieldInput::Text(raw)) => raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number),
                (FieldKind::Int, FieldInput::Text(raw)) => {
                    raw.trim().parse::<i64>().ok().map(Value::from)
                }
                (FieldKind::Text | FieldKind::Secret, FieldInput::Text(raw)) => {
                    (!raw.is_empty()).then(|| Value::String(raw.clone()))
                }
                (FieldKind::Flag, FieldInput::Flag(b)) => Some(Value::Bool(*b)),
                _ => None,
            };
            if let Some(value) = value {
                payload.insert(spec.key.to_string(), value);
            }
        }
        payload
    }
}

fn lookup(key: &str) -> Result<&'static FieldSpec> {
    find_field(key).ok_or_else(|| DashboardError::Validation(format!("unknown setting: {key}")))
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(f) = n.as_f64() {
        f.to_string()
    } else {
        n.to_string()
    }
}
