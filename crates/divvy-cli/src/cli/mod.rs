//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "divvy")]
#[command(version = "0.2")]
#[command(about = "Divvy session and credential tool")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Restore the saved session and show where the app lands
    Session {
        /// Emit a machine-readable JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Save a token pair as the device credential
    Login {
        /// Account name to store the credential under
        #[arg(long, value_name = "NAME")]
        username: String,
    },
    /// Remove the saved credential
    Logout,
    /// Show the saved credential (tokens masked)
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides the
/// default `warn` filter.
fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    // default to the session check
    let Some(command) = cli.command else {
        return commands::session::run(false).await;
    };

    match command {
        Commands::Session { json } => commands::session::run(json).await,
        Commands::Login { username } => commands::auth::login(&username).await,
        Commands::Logout => commands::auth::logout(),
        Commands::Status => commands::auth::status().await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
