#![forbid(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use safe_mobile::bootstrap::SeedOutcome;
use safe_mobile::config::Config;
use safe_mobile::device_admin::{DeviceAdminReceiver, LogNotifier};
use safe_mobile::session::{LoginOutcome, RegistrationOutcome, SessionManager, SessionRouter};
use safe_mobile::vault::CredentialStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Safe Mobile local vault.
#[derive(Parser, Debug)]
#[command(name = "safe-mobile", version, about)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and report the destination surface.
    Login {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Create a standard user.
    Register {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// List stored users.
    Users {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show the signed-in user, if any.
    Whoami,
    /// Forget the signed-in user.
    Logout,
    /// Simulate the platform's device-admin callbacks.
    DeviceAdmin {
        #[arg(value_enum)]
        transition: Transition,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Transition {
    Enable,
    Disable,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn open_vault(config: &Config) -> Result<(CredentialStore, SessionManager)> {
    let (store, seeded) = safe_mobile::start(config)?;
    if let SeedOutcome::Seeded {
        email,
        generated_password: Some(password),
        ..
    } = &seeded
    {
        println!("Provisioned administrator {email} with one-time password: {password}");
        println!("Store it now; it will not be shown again.");
    }
    Ok((store, SessionManager::new(&config.session_path()?)))
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.logging.level);
    tracing::debug!(
        path = %config.config_path.display(),
        found = config.config_path.exists(),
        "Configuration loaded"
    );

    match cli.command {
        Command::Login { email, password } => {
            let (store, sessions) = open_vault(&config)?;
            match SessionRouter::new(&store).login(&email, &password)? {
                LoginOutcome::Granted { user, destination } => {
                    sessions.save_session(user.id, &user.email)?;
                    println!("{}", destination.as_str());
                }
                denied @ LoginOutcome::Denied => {
                    if let Some(message) = denied.message() {
                        println!("{message}");
                    }
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Register { email, password } => {
            let (store, _) = open_vault(&config)?;
            let outcome = SessionRouter::new(&store).register(&email, &password)?;
            println!("{}", outcome.message());
            if outcome == RegistrationOutcome::MissingCredentials {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Users { json } => {
            let (store, _) = open_vault(&config)?;
            let users = store.all_users()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                for user in &users {
                    println!("{:>4}  {:<6}  {}", user.id, user.role.as_str(), user.email);
                }
            }
        }
        Command::Whoami => {
            let (store, sessions) = open_vault(&config)?;
            let user = match sessions.user_id() {
                Some(id) => store.get_user(id)?,
                None => None,
            };
            match user {
                Some(user) => println!("{} ({})", user.email, user.role.as_str()),
                None => {
                    // Drops a marker whose record is gone.
                    sessions.clear_session()?;
                    println!("Not signed in");
                }
            }
        }
        Command::Logout => {
            let (_, sessions) = open_vault(&config)?;
            sessions.clear_session()?;
            println!("Signed out");
        }
        Command::DeviceAdmin { transition } => {
            let receiver = DeviceAdminReceiver::new(LogNotifier);
            match transition {
                Transition::Enable => receiver.on_enabled(),
                Transition::Disable => receiver.on_disabled(),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
