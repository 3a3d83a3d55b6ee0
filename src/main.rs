use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxcache::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxcache::AppCommand {
    fn from(cmd: Commands) -> fxcache::AppCommand {
        match cmd {
            Commands::Rate { from, to } => fxcache::AppCommand::Rate { from, to },
            Commands::Prune { days } => fxcache::AppCommand::Prune { days },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Print the exchange rate from one currency to another
    Rate {
        /// Currency to convert from, e.g. USD
        from: String,
        /// Currency to convert to, e.g. EUR
        to: String,
    },
    /// Remove cached rates older than the given number of days
    Prune {
        #[arg(short, long, default_value_t = 7)]
        days: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxcache::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxcache::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
provider:
  base_url: "https://api.freecurrencyapi.com/v1/latest"
  # The key is read from this environment variable first.
  api_key_env: "FXCACHE_API_KEY"
  timeout_secs: 10
  retries: 0

cache:
  backend: disk
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
