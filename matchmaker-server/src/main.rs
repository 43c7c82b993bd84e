use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use matchmaker_server::{telemetry, BoxError, ServerConfig, ServerSettings};

#[derive(Debug, Parser)]
#[command(author, version, about = "Multi-region player matchmaker")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,

    #[arg(long, value_name = "ADDR", global = true)]
    bind_addr: Option<SocketAddr>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the engine and HTTP server (the default when no subcommand is given).
    Run,
    /// Print the resolved configuration as JSON and exit without serving.
    ShowConfig,
}

impl Cli {
    fn resolve_config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }
        std::env::var("MATCHMAKER_CONFIG_PATH").ok().map(PathBuf::from)
    }

    fn apply_overrides(&self, settings: &mut ServerSettings) {
        if let Some(addr) = self.bind_addr {
            settings.bind_addr = addr.to_string();
        }
    }
}

/// Resolve settings for this run. A configuration load failure falls back
/// to defaults rather than aborting the process (§7: "defaults retained;
/// process continues").
fn build_settings(cli: &Cli) -> ServerSettings {
    let mut settings = match cli.resolve_config_path() {
        Some(path) => ServerSettings::from_file(&path).unwrap_or_else(|err| {
            tracing::warn!(%err, path = %path.display(), "matchmaker-server: config load failed, using defaults");
            ServerSettings::default()
        }),
        None => ServerSettings::from_env().unwrap_or_else(|err| {
            tracing::warn!(%err, "matchmaker-server: failed to read environment, using defaults");
            ServerSettings::default()
        }),
    };
    cli.apply_overrides(&mut settings);
    settings
}

#[tokio::main]
async fn main() {
    telemetry::init("matchmaker-server");

    let cli = Cli::parse();

    let settings = build_settings(&cli);

    match cli.command.unwrap_or(Command::Run) {
        Command::ShowConfig => match serde_json::to_string_pretty(&settings) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!(%err, "matchmaker-server: failed to render configuration"),
        },
        Command::Run => {
            let config = match ServerConfig::from_settings(settings) {
                Ok(config) => config,
                Err(err) => {
                    tracing::error!(%err, "matchmaker-server: invalid configuration");
                    return;
                }
            };
            if let Err(err) = matchmaker_server::run_with_ctrl_c(config).await {
                tracing::error!(%err, "matchmaker-server: exited with error");
            }
        }
    }
}
