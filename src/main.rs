// src/main.rs
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use talktolead_dashboard::api::{ApiClient, DashboardClient, DEFAULT_POLL_INTERVAL};
use talktolead_dashboard::auth::{
    route_for, CredentialStore, LineCallback, LineOAuth, Route, SessionManager, View,
};
use talktolead_dashboard::common::{
    safe_email_log, AppConfig, FileStore, KeyValueStore, MemoryStore,
};

#[cfg(feature = "demo-login")]
use talktolead_dashboard::auth::demo::print_demo_mode_status;
#[cfg(feature = "demo-login")]
use talktolead_dashboard::auth::DemoLogin;

// ============================================================================
// COMMAND LINE
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "talktolead")]
#[command(about = "TalkToLead manager dashboard client", long_about = None)]
struct Cli {
    /// Enable demo login (overrides DEMO_MODE; demo-login builds only)
    #[arg(long, global = true, conflicts_with = "no_demo", hide = !cfg!(feature = "demo-login"))]
    demo: bool,

    /// Disable demo login (overrides DEMO_MODE; demo-login builds only)
    #[arg(long, global = true, hide = !cfg!(feature = "demo-login"))]
    no_demo: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// CLI override for demo login
    fn demo_override(&self) -> Option<bool> {
        match (self.demo, self.no_demo) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(allow_hyphen_values = true)]
        password: String,
    },
    /// Sign in with a Google ID token
    LoginGoogle { id_token: String },
    /// Sign in with LINE (opens an authorization URL)
    LoginLine,
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Re-fetch the signed-in user
    Refresh,
    /// List recordings
    Recordings,
    /// Show one recording
    Recording { id: String },
    /// Wait until a recording finishes processing
    Wait { id: String },
    /// List contacts
    Contacts,
    /// Show one contact
    Contact { id: String },
    /// List team members
    Team,
    /// List a team member's recordings
    TeamRecordings { id: String },
    /// Per-member activity summary
    TeamSummary,
    /// Manager dashboard
    Dashboard,
}

impl Commands {
    fn is_login(&self) -> bool {
        matches!(
            self,
            Commands::Login { .. } | Commands::LoginGoogle { .. } | Commands::LoginLine
        )
    }
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let cli = Cli::parse();

    #[allow(unused_mut)]
    let mut config = AppConfig::from_env();
    info!("API base URL: {}", config.api_base_url);

    // ========================================================================
    // DEMO MODE CONFIGURATION
    // ========================================================================

    #[cfg(feature = "demo-login")]
    {
        if let Some(cli_demo_mode) = cli.demo_override() {
            println!("🔧 CLI override: DEMO_MODE = {}", cli_demo_mode);
            config.demo_mode = cli_demo_mode;
        }
        print_demo_mode_status(config.demo_mode);
    }
    #[cfg(not(feature = "demo-login"))]
    {
        if cli.demo_override().is_some() {
            tracing::warn!("Ignoring --demo/--no-demo; demo login is not compiled in");
        }
    }

    // ========================================================================
    // STORAGE SETUP
    // ========================================================================

    let persistent: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.storage_path())?);
    let session_scoped: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let credentials = CredentialStore::new(persistent);
    info!("Credential store: {}", config.storage_path().display());

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let api = ApiClient::new(&config, credentials.clone())?;

    let line = LineOAuth::new(config.line.clone(), session_scoped);
    let manager = SessionManager::new(Arc::new(api.clone()), credentials).with_line(line);

    #[cfg(feature = "demo-login")]
    let manager = if config.demo_mode {
        manager.with_demo_login(DemoLogin::default())
    } else {
        manager
    };

    let manager = Arc::new(manager);
    let on_unauthorized = manager.unauthorized_hook();
    let dashboard = DashboardClient::new(api.with_unauthorized_hook(move || {
        on_unauthorized();
        eprintln!("Session expired. Run `talktolead login` to sign in again.");
    }));

    // ========================================================================
    // COMMAND DISPATCH
    // ========================================================================

    let command = cli.command;
    if matches!(command, Commands::Logout) {
        let route = manager.logout();
        println!("Signed out. Next: {}", route.path());
        return Ok(());
    }

    manager.spawn_bootstrap().await?;
    let state = manager.state();

    if command.is_login() {
        if route_for(&state, View::Login) == Some(Route::Dashboard) {
            if let Some(user) = &state.user {
                println!("Already signed in as {}", user.name.as_deref().unwrap_or(&user.email));
            }
            return Ok(());
        }
        return run_login(&command, &manager).await;
    }

    if route_for(&state, View::Protected) == Some(Route::Login) {
        anyhow::bail!("Not signed in. Run `talktolead login <email> <password>` first.");
    }

    match command {
        Commands::Whoami => print_json(&manager.user())?,
        Commands::Refresh => {
            manager.refresh_user().await;
            print_json(&manager.user())?;
        }
        Commands::Recordings => print_json(&dashboard.recordings().await?)?,
        Commands::Recording { id } => print_json(&dashboard.recording(&id).await?)?,
        Commands::Wait { id } => {
            println!("Waiting for recording {} to finish processing...", id);
            let status = dashboard.wait_for_recording(&id, DEFAULT_POLL_INTERVAL).await?;
            print_json(&status)?;
        }
        Commands::Contacts => print_json(&dashboard.contacts().await?)?,
        Commands::Contact { id } => print_json(&dashboard.contact(&id).await?)?,
        Commands::Team => print_json(&dashboard.subordinates().await?)?,
        Commands::TeamRecordings { id } => print_json(&dashboard.subordinate_recordings(&id).await?)?,
        Commands::TeamSummary => print_json(&dashboard.team_summary().await?)?,
        Commands::Dashboard => print_json(&dashboard.manager_dashboard().await?)?,
        Commands::Login { .. }
        | Commands::LoginGoogle { .. }
        | Commands::LoginLine
        | Commands::Logout => {}
    }

    Ok(())
}

// ============================================================================
// LOGIN FLOWS
// ============================================================================

async fn run_login(command: &Commands, manager: &SessionManager) -> anyhow::Result<()> {
    let user = match command {
        Commands::Login { email, password } => {
            info!("Signing in {}", safe_email_log(email));
            manager
                .login(email, password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?
        }
        Commands::LoginGoogle { id_token } => manager
            .login_with_google(id_token)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?,
        Commands::LoginLine => {
            let line = manager
                .line()
                .filter(|l| l.is_configured())
                .ok_or_else(|| anyhow::anyhow!("LINE login is not configured (set LINE_CHANNEL_ID)"))?;

            println!("Open this URL in a browser and sign in with LINE:\n");
            println!("{}\n", line.auth_url()?);
            println!("Then paste the URL you were redirected to:");

            let mut pasted = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut pasted)
                .await?;

            let callback = LineCallback::from_query(pasted.trim());
            manager.complete_line_login(&callback).await?
        }
        _ => return Ok(()),
    };

    println!("✅ Signed in as {}", user.name.as_deref().unwrap_or(&user.email));
    print_json(&user)?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        Cli::try_parse_from(std::iter::once("talktolead").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse(&["login", "a@b.com", "pw"]).unwrap(),
            Commands::Login {
                email: "a@b.com".to_string(),
                password: "pw".to_string()
            }
        );
        assert_eq!(
            parse(&["recording", "42"]).unwrap(),
            Commands::Recording { id: "42".to_string() }
        );
        assert_eq!(parse(&["team-summary"]).unwrap(), Commands::TeamSummary);
        assert_eq!(
            parse(&["team-recordings", "7"]).unwrap(),
            Commands::TeamRecordings { id: "7".to_string() }
        );
        assert!(parse(&["login", "a@b.com"]).is_err());
        assert!(parse(&[]).is_err());
        assert!(parse(&["unknown"]).is_err());
    }

    #[test]
    fn test_password_may_start_with_dashes() {
        let expected = Commands::Login {
            email: "a@b.com".to_string(),
            password: "--p4ss".to_string(),
        };
        assert_eq!(parse(&["login", "a@b.com", "--p4ss"]).unwrap(), expected);
        assert_eq!(parse(&["login", "a@b.com", "--", "--p4ss"]).unwrap(), expected);
    }

    #[test]
    fn test_demo_flags() {
        let cli = Cli::try_parse_from(["talktolead", "whoami", "--demo"]).unwrap();
        assert_eq!(cli.demo_override(), Some(true));
        assert_eq!(cli.command, Commands::Whoami);

        let cli = Cli::try_parse_from(["talktolead", "--no-demo", "recordings"]).unwrap();
        assert_eq!(cli.demo_override(), Some(false));

        let cli = Cli::try_parse_from(["talktolead", "recordings"]).unwrap();
        assert_eq!(cli.demo_override(), None);

        assert!(Cli::try_parse_from(["talktolead", "--demo", "--no-demo", "whoami"]).is_err());
    }

    #[test]
    fn test_login_commands() {
        assert!(Commands::LoginLine.is_login());
        assert!(!Commands::Whoami.is_login());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
