//! F&O Sentinel Client - control panel for the F&O Sentinel trading bot
//!
//! Keeps a local view of the bot in sync with its backend API.
//!
//! # Architecture
//! - `ApiClient` wraps every backend call; failures become "no update this cycle"
//! - `Lifecycle` owns the single logout path (401, operator, missing session)
//! - `DashboardController` owns all view state and runs every operator action
//! - `StatusPoller` refreshes the status panel on a fixed interval
//! - `Frontend` is the rendering seam; the `sentinel` binary implements it for a terminal
//!
//! # Features
//! - Start/stop with confirmation, LIVE mode confirmation
//! - Broker OTP login flow
//! - Settings form with blank-field omission and server re-sync
//! - Log panel classification and self-expiring notifications

#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::if_not_else)] // Readability preference

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod frontend;
pub mod lifecycle;
pub mod modal;
pub mod notify;
pub mod poller;
pub mod session;
pub mod transport;
pub mod types;
pub mod view;

pub use client::ApiClient;
pub use config::Config;
pub use controller::{DashboardController, PendingAction};
pub use error::{DashboardError, Result};
pub use frontend::Frontend;
pub use lifecycle::{Lifecycle, LogoutReason};
pub use notify::{Notification, NotificationCenter, NotificationKind};
pub use poller::StatusPoller;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{ActionResponse, BotStatus, Settings, TradingMode};
pub use view::DashboardView;
