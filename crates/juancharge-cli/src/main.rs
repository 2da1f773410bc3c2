//! JuanCharge CLI - drive the mobile client's session from a terminal.
//!
//! Wires one credential store, one API client and one router together the
//! way the app does at startup, and exposes the session flows as commands.

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use juancharge_core::models::{LoginRequest, RegisterRequest};
use juancharge_core::utils::{format_duration, format_energy};
use juancharge_core::{
    ApiClient, ApiRequest, Config, CredentialStore, RouteTable, Router, SessionManager,
    SessionState,
};

#[derive(Parser)]
#[command(name = "juancharge", version, about = "JuanCharge session client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the issued credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        device_name: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        device_name: Option<String>,
    },
    /// Sign out and clear stored credentials
    Logout,
    /// Resume a stored session (the splash-screen check)
    Restore,
    /// Show the stored session
    Status,
    /// Call an API endpoint through the session interceptor
    Get {
        path: String,
        /// Query parameters as key=value
        #[arg(short, long = "query", value_parser = parse_query)]
        query: Vec<(String, String)>,
    },
    /// List stations near a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Search radius in km (default 5)
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Show the running charging session
    Active,
    /// Navigate to a named route through the route guard
    Navigate { route: String },
    /// List the app's routes
    Routes,
}

fn parse_query(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env().context("Invalid configuration")?;
    let store = CredentialStore::detect(&config)
        .await
        .context("Failed to open credential storage")?;
    let api = ApiClient::new(&config, store.clone())
        .context("Failed to build API client")?
        .with_session_expired_handler(|| {
            eprintln!("Session expired - please log in again.");
        });
    let session = SessionManager::new(api.clone());
    info!(api = %config.api_base_url, storage = %store.backend_kind(), "JuanCharge CLI starting");

    match cli.command {
        Command::Login { email, device_name } => {
            let password = rpassword::prompt_password("Password: ")?;
            let user = session
                .login(&LoginRequest {
                    email,
                    password,
                    device_name,
                })
                .await?;
            println!("Logged in as {}", user.display_name());
        }
        Command::Register {
            name,
            email,
            device_name,
        } => {
            let password = rpassword::prompt_password("Password: ")?;
            let user = session
                .register(&RegisterRequest {
                    name,
                    email,
                    password,
                    device_name,
                })
                .await?;
            println!("Registered as {}", user.display_name());
        }
        Command::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        Command::Restore => match session.restore().await? {
            SessionState::Authenticated => println!("Session resumed"),
            SessionState::Anonymous => println!("No session - please log in"),
        },
        Command::Status => {
            println!("Storage:       {}", store.backend_kind());
            println!("Authenticated: {}", store.is_authenticated().await?);
            println!("Resumable:     {}", store.has_valid_credentials().await?);
            if let Some(expires) = store.token_expires_at().await? {
                println!("Expires at:    {}", expires);
            }
            if let Some(user) = session.cached_user().await? {
                println!("User:          {}", user.display_name());
            }
        }
        Command::Get { path, query } => {
            let mut request = ApiRequest::get(path);
            for (key, value) in query {
                request = request.query(key, value);
            }
            let body: serde_json::Value = api.send_json(&request).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Nearby { lat, lng, radius } => {
            for station in api.stations().nearby(lat, lng, radius).await? {
                let name = station.name.as_deref().unwrap_or("(unnamed)");
                let state = if station.is_available() { "available" } else { "busy" };
                match station.distance_km {
                    Some(km) => println!("{:<30} {:>6.1} km  {}", name, km, state),
                    None => println!("{:<30} {:>9}  {}", name, "", state),
                }
            }
        }
        Command::Active => match api.charging().active().await? {
            Some(charging) => {
                let id = charging.session_id.as_deref().unwrap_or("?");
                match charging.energy() {
                    Some(energy) => println!(
                        "{}: {} ({})",
                        id,
                        format_duration(energy.minutes),
                        format_energy(energy.wh)
                    ),
                    None => println!("{}", id),
                }
            }
            None => println!("No active charging session"),
        },
        Command::Navigate { route } => {
            let mut router = Router::new(RouteTable::app(), store.clone());
            let entered = router.navigate(&route).await?;
            if entered.name == route {
                println!("{} ({})", entered.meta.title, entered.path);
            } else {
                println!("Redirected to {} ({})", entered.meta.title, entered.path);
            }
        }
        Command::Routes => {
            let table = RouteTable::app();
            for route in table.iter() {
                let access = match (route.meta.requires_auth, route.meta.requires_guest) {
                    (true, _) => "auth",
                    (_, true) => "guest",
                    _ => "open",
                };
                println!("{:<14} {:<14} {}", route.name, route.path, access);
            }
        }
    }

    Ok(())
}
