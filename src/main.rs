//! SchoolDesk - terminal shell over the dashboard session core
//!
//! # Overview
//!
//! This binary wires the library together and drives it from stdin. It initializes:
//! - Configuration loading ([`ConfigManager`]) from `schooldesk.yaml` plus `SCHOOLDESK_*` env vars
//! - Logging infrastructure (daily file rotation + optional console output)
//! - The configured storage backend and the [`SessionStore`] over it
//! - The navigation shell ([`AppController`])
//! - A listener thread that logs every [`SessionChange`]
//!
//! # Execution Flow
//!
//! 1. Load configuration from the directory given as the first argument
//!    (default `SchoolDesk Data`)
//! 2. Initialize logging
//! 3. Open storage, hydrate the session once
//! 4. Resolve the start page and read commands until `quit` or EOF
//! 5. Log the session metrics summary

use anyhow::{Context, Result};
use schooldesk::forms::LoginForm;
use schooldesk::models::{LanguageConfig, ThemeMode, ThemePatch, available_languages};
use schooldesk::storage::open_backend;
use schooldesk::ui::Screen;
use schooldesk::{
    APP_NAME, AppController, ConfigManager, Role, SessionChange, SessionStore, User, VERSION,
};
use std::io::{self, BufRead, Write};
use tokio::sync::broadcast::error::RecvError;

const DEFAULT_CONFIG_DIR: &str = "SchoolDesk Data";

const HELP: &str = "\
commands:
  goto <path>                         navigate to a path
  back | forward                      move through history
  login <email> <password> <role> [token]
  logout
  theme <light|dark>
  lang <code>                         one of the available languages
  sidebar                             toggle the sidebar
  nav                                 show sidebar entries
  status                              show the session
  quit";

fn main() -> Result<()> {
    let config_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string());

    let config_manager = ConfigManager::new(&config_dir)?;
    let config = config_manager.load_config()?;

    // Guard must live until exit to flush file logs
    let _log_guard = schooldesk::logging::setup_logging(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("API endpoint: {}", config.api.endpoint());

    let backend = open_backend(
        &config.storage,
        &config.cookies,
        &config_manager.storage_path(&config),
    );
    let store = SessionStore::new(backend);
    let metrics = std::sync::Arc::clone(store.metrics());

    let listener = spawn_change_listener(&store);

    store.initialize();
    let mut app = AppController::new(store);
    let screen = app.refresh();
    print_screen(&screen);

    let result = run_shell(&mut app);

    // Dropping the controller closes the channel and ends the listener
    drop(app);
    if listener.join().is_err() {
        tracing::warn!("Session listener thread panicked");
    }

    metrics.log_summary();
    tracing::info!("Shutdown complete");

    result
}

/// Log session changes from a background thread.
fn spawn_change_listener(store: &SessionStore) -> std::thread::JoinHandle<()> {
    let mut rx = store.subscribe();

    std::thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(change) => log_change(&change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Session listener lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("Session listener stopped");
    })
}

fn log_change(change: &SessionChange) {
    match change {
        SessionChange::Initialized { authenticated } => {
            tracing::info!("Session ready (authenticated={})", authenticated)
        }
        SessionChange::UserChanged {
            authenticated,
            role,
        } => tracing::info!(
            "User changed (authenticated={}, role={})",
            authenticated,
            role.as_ref().map_or("none", |r| r.as_str())
        ),
        SessionChange::LoggedOut => tracing::info!("Logged out"),
        other => tracing::debug!("Session change: {:?}", other),
    }
}

fn run_shell(app: &mut AppController) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{HELP}");

    loop {
        print!("{}> ", app.current_path());
        stdout.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read command")?;
        if read == 0 {
            return Ok(());
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => return Ok(()),
            ["help"] => println!("{HELP}"),
            ["goto", path] => print_screen(&app.navigate(path)),
            ["back"] => match app.back() {
                Some(screen) => print_screen(&screen),
                None => println!("already at the first page"),
            },
            ["forward"] => match app.forward() {
                Some(screen) => print_screen(&screen),
                None => println!("already at the last page"),
            },
            ["login", email, password, role, rest @ ..] => {
                login(app, email, password, role, rest.first().copied())
            }
            ["logout"] => print_screen(&app.logout()),
            ["theme", mode] => {
                let mode = match *mode {
                    "dark" => ThemeMode::Dark,
                    "light" => ThemeMode::Light,
                    other => {
                        println!("unknown theme mode '{other}'");
                        continue;
                    }
                };
                app.store().set_theme(ThemePatch::mode(mode));
                println!("{:?}", app.document_theme());
            }
            ["lang", code] => match LanguageConfig::find(code) {
                Some(language) => {
                    app.store().set_language(language);
                    println!("{:?}", app.document_theme());
                }
                None => {
                    let codes: Vec<String> =
                        available_languages().into_iter().map(|l| l.code).collect();
                    println!("unknown language '{code}', try one of {}", codes.join(", "));
                }
            },
            ["sidebar"] => {
                app.store().toggle_sidebar();
                println!("sidebar open: {}", app.store().read(|s| s.sidebar_open));
            }
            ["nav"] => {
                for item in app.navigation_items() {
                    let marker = if item.active { "*" } else { " " };
                    println!("{marker} {:<10} {}", item.key, item.path);
                }
            }
            ["status"] => {
                let session = app.store().snapshot();
                match &session.user {
                    Some(user) => println!("{} <{}> as {}", user.full_name(), user.email, user.role),
                    None => println!("signed out"),
                }
                if let Some(error) = &session.error {
                    println!("error: {error}");
                }
                println!(
                    "theme={:?} language={} sidebar_open={}",
                    session.theme.mode, session.language.code, session.sidebar_open
                );
            }
            _ => println!("unrecognized command, type 'help'"),
        }
    }
}

fn login(app: &mut AppController, email: &str, password: &str, role: &str, token: Option<&str>) {
    let form = LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    };

    if let Err(errors) = form.validate() {
        app.fail_login(&errors.to_string());
        println!("{errors}");
        return;
    }

    let role = Role::from(role);
    if !role.is_known() {
        tracing::warn!("Signing in with unrecognized role '{}'", role);
    }

    let first_name = email.split('@').next().unwrap_or(email);
    let user = User::new(email, email, first_name, "", role);
    print_screen(&app.login(user, token));
}

fn print_screen(screen: &Screen) {
    if screen.params.is_empty() {
        println!("[{}] {}", screen.view, screen.path);
    } else {
        let params: Vec<String> = screen
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!("[{}] {} ({})", screen.view, screen.path, params.join(", "));
    }
}
