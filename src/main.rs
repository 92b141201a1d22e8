//! `sentinel` - terminal control panel for the F&O Sentinel trading bot

mod cli;
mod terminal;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fno_sentinel_client::form::{FieldKind, find_field};
use fno_sentinel_client::modal::ConfirmPrompt;
use fno_sentinel_client::{
    Config, DashboardController, DashboardError, FileSessionStore, ReqwestTransport, Result,
    Session, SessionStore, TradingMode,
};

use cli::{Commands, ConfirmArgs, SentinelCli, SessionCommand, SettingsCommand};
use terminal::TerminalFrontend;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = SentinelCli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(path) = cli.session_file {
        config.session_path = path;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    config.validate()?;
    let store = Arc::new(FileSessionStore::new(config.session_path.clone()));

    if let Commands::Session(command) = command {
        return session_command(command, store.as_ref());
    }

    let live = matches!(command, Commands::Watch);
    let frontend = Arc::new(TerminalFrontend::new(live));
    let transport = Arc::new(ReqwestTransport::new(&config)?);
    let controller = DashboardController::new(&config, transport, store, frontend);

    if live {
        return watch(&controller).await;
    }

    if !controller.restore_session() {
        return Err(DashboardError::Session("no stored session".into()));
    }

    match command {
        Commands::Session(_) | Commands::Watch => {}
        Commands::Status => {
            let client = controller.client();
            let (status, settings) = futures::join!(client.status(), client.settings());
            match status {
                Some(status) => {
                    let view = fno_sentinel_client::view::status_view(&status, false);
                    println!("{}", terminal::format_status(&controller.view().username, &view));
                }
                None => println!("Status unavailable"),
            }
            if let Some(settings) = settings {
                let credentials = fno_sentinel_client::view::CredentialStatus::from_settings(&settings);
                println!("Settings mode: {}  {}", settings.trading_mode, credentials.label());
            }
        }
        Commands::Start => {
            controller.poll_once().await;
            if controller.status().is_some_and(|s| s.running) {
                println!("Bot is already running");
            } else {
                controller.toggle_bot().await;
                print_status(&controller);
            }
        }
        Commands::Stop(args) => {
            controller.poll_once().await;
            if controller.status().is_some_and(|s| s.running) {
                controller.toggle_bot().await;
                resolve_confirmation(&controller, &args).await?;
                print_status(&controller);
            } else {
                println!("Bot is not running");
            }
        }
        Commands::Settings(SettingsCommand::Show) => {
            controller.load_settings().await;
            println!("{}", terminal::format_settings(&controller.view()));
        }
        Commands::Settings(SettingsCommand::Save { edits }) => {
            controller.load_settings().await;
            for raw in &edits {
                apply_edit(&controller, raw)?;
            }
            controller.save_settings().await;
        }
        Commands::Mode(args) => {
            controller.load_settings().await;
            let mode = TradingMode::from(args.mode);
            controller.set_mode(mode);
            resolve_confirmation(&controller, &args.confirm).await?;
            if controller.trading_mode() == mode {
                controller.save_settings().await;
            }
        }
        Commands::Login => controller.initiate_login().await,
        Commands::Otp { code } => {
            controller.set_otp_input(&code);
            controller.submit_otp().await;
        }
        Commands::TestConnection => controller.test_connection().await,
    }
    Ok(())
}

fn session_command(command: SessionCommand, store: &dyn SessionStore) -> Result<()> {
    match command {
        SessionCommand::Set { token, username } => {
            store.save(&Session::new(token, username))?;
            println!("Session saved");
        }
        SessionCommand::Show => match store.get() {
            Some(session) => println!("Logged in as {}", session.display_name()),
            None => println!("No session"),
        },
        SessionCommand::Clear => {
            store.clear()?;
            println!("Session cleared");
        }
    }
    Ok(())
}

async fn watch(controller: &Arc<DashboardController>) -> Result<()> {
    if !controller.start().await {
        return Err(DashboardError::Session("no stored session".into()));
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut check = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = check.tick() => {
                if !controller.lifecycle().is_active() {
                    return Err(DashboardError::Unauthorized);
                }
            }
        }
    }
    Ok(())
}

fn apply_edit(controller: &DashboardController, raw: &str) -> Result<()> {
    let (key, value) = cli::parse_edit(raw)
        .ok_or_else(|| DashboardError::Validation(format!("expected KEY=VALUE, got {raw}")))?;
    let spec = find_field(key)
        .ok_or_else(|| DashboardError::Validation(format!("unknown setting: {key}")))?;
    if spec.kind == FieldKind::Flag {
        let flag = value
            .parse::<bool>()
            .map_err(|_| DashboardError::Validation(format!("{key} expects true or false")))?;
        controller.edit_flag(key, flag)
    } else {
        controller.edit_text(key, value)
    }
}

/// Answer an open confirmation dialog from `--yes` or stdin
async fn resolve_confirmation(controller: &DashboardController, args: &ConfirmArgs) -> Result<()> {
    let Some(prompt) = controller.view().confirm else {
        return Ok(());
    };
    if args.yes || ask(prompt).await? {
        controller.confirm().await;
    } else {
        controller.cancel_confirm();
        println!("Cancelled");
    }
    Ok(())
}

async fn ask(prompt: ConfirmPrompt) -> Result<bool> {
    tokio::task::spawn_blocking(move || -> Result<bool> {
        use std::io::Write;
        println!("{} {}", prompt.icon, prompt.title);
        println!("{}", prompt.body);
        print!("Proceed? [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    })
    .await
    .map_err(|e| DashboardError::Io(std::io::Error::other(e)))?
}

fn print_status(controller: &DashboardController) {
    let view = controller.view();
    if let Some(status) = &view.status {
        println!("{}", terminal::format_status(&view.username, status));
    }
}
