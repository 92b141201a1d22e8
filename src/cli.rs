//! Command line surface of the `sentinel` binary

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use fno_sentinel_client::TradingMode;

#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(about = "Control panel for the F&O Sentinel trading bot")]
pub struct SentinelCli {
    /// Backend origin (overrides SENTINEL_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file (overrides SENTINEL_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the stored dashboard session
    #[command(subcommand)]
    Session(SessionCommand),
    /// Live status panel, refreshed on the poll interval
    Watch,
    /// One status and settings snapshot
    Status,
    /// Start the bot
    Start,
    /// Stop the bot
    Stop(ConfirmArgs),
    /// Read or update bot settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Switch between paper and live trading
    Mode(ModeArgs),
    /// Ask the broker to send a login OTP
    Login,
    /// Submit the broker OTP
    Otp { code: String },
    /// Check the broker API connection
    TestConnection,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Store a token obtained from the login page
    Set {
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "")]
        username: String,
    },
    Show,
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Load current settings, apply edits, save the whole form
    Save {
        /// `key=value`; an empty value leaves the setting unchanged
        #[arg(long = "set", value_name = "KEY=VALUE")]
        edits: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ModeArgs {
    pub mode: ModeArg,
    #[command(flatten)]
    pub confirm: ConfirmArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Paper,
    Live,
}

impl From<ModeArg> for TradingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Paper => TradingMode::Paper,
            ModeArg::Live => TradingMode::Live,
        }
    }
}

/// Split one `--set key=value` edit
pub fn parse_edit(raw: &str) -> Option<(&str, &str)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
