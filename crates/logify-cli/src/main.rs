//! Logify CLI - inspect and drive the local session store.

mod commands;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use logify_config::{Config, Paths};
use logify_session::AppMode;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Logify CLI - manage the signed-in user and connectivity mode.
#[derive(Parser)]
#[command(name = "logify")]
#[command(about = "Logify CLI for session and preference management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to LOGIFY_LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Base directory for config, state and logs (default: ~/.logify)
    #[arg(long, global = true, env = "LOGIFY_HOME")]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session
    Status,

    /// Sign in as a user and go online
    Login {
        /// User identifier
        user: String,
    },

    /// Continue offline without an account
    Offline,

    /// Switch connectivity mode
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show the theme palette
    Theme {
        /// Show the toggled (light) theme
        #[arg(long)]
        toggle: bool,
    },

    /// Show loaded environment settings
    Env,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Online,
    Offline,
}

impl From<ModeArg> for AppMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Online => AppMode::Online,
            ModeArg::Offline => AppMode::Offline,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let paths = match cli.base_dir {
        Some(dir) => Paths::with_base_dir(dir),
        None => Paths::new().context("Failed to resolve Logify home directory")?,
    };
    let config = Config::load(&paths).context("Failed to load configuration")?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    logify_config::init_logging(&paths, level);
    config.log_loaded_env();
    debug!(base_dir = %paths.base_dir().display(), "Logify CLI starting");

    let format = cli.format;
    let store = match cli.command {
        Commands::Theme { toggle } => return commands::theme(toggle, format),
        Commands::Env => return commands::env(&config, &paths, format),
        _ => commands::open_session(&paths).await?,
    };

    let result = match cli.command {
        Commands::Status => commands::status(&store, format).await,
        Commands::Login { user } => commands::login(&store, &user, format).await,
        Commands::Offline => commands::offline(&store, format).await,
        Commands::Mode { mode } => commands::set_mode(&store, mode.into(), format).await,
        Commands::Logout => commands::logout(&store, format).await,
        Commands::Theme { .. } | Commands::Env => Ok(()),
    };

    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "Session store did not shut down cleanly");
    }
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e), format);
        std::process::exit(1);
    }
}
