//! user-manager binary entry point.
//!
//! Parses configuration, installs logging, then either runs a one-shot
//! subcommand or the TUI (raw mode + alternate screen, restored on exit).
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::sync::Arc;
use tracing::{error, info};

use user_manager::api::{HttpUserService, InMemoryUserService, UserId, UserService};
use user_manager::app::keymap::Keymap;
use user_manager::app::{self, Controller, Theme, ViewState};
use user_manager::cli::{self, Cli, Command};

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Print the result of a non-interactive subcommand as JSON.
async fn run_command(service: &dyn UserService, command: &Command) -> Result<()> {
    let json = match command {
        Command::List => serde_json::to_string_pretty(&service.list_users().await?)?,
        Command::Get { id } => {
            serde_json::to_string_pretty(&service.get_user(&UserId::new(id.as_str())).await?)?
        }
    };
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(&cli)?;

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;

    let (service, endpoint): (Arc<dyn UserService>, String) = if cli.demo {
        (Arc::new(InMemoryUserService::seeded()), "demo, in-memory".to_string())
    } else {
        let http = HttpUserService::new(&cli.api_url)?;
        let endpoint = http.base_url().to_string();
        (Arc::new(http), endpoint)
    };
    info!(%endpoint, "user service configured");

    if let Some(command) = &cli.command {
        return runtime.block_on(run_command(service.as_ref(), command));
    }

    let _guard = runtime.enter();
    let mut controller = Controller::new(service);
    let mut view = ViewState::new(
        Theme::load_or_init(&cli.theme),
        Keymap::load_or_init(&cli.keybinds),
        endpoint,
    );

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &mut controller, &mut view);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
