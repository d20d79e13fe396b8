//! hearth-server: presence service for hearth campfires.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hearth_common::HearthError;
use hearth_config::{load_config, HearthConfig};
use hearth_presence::PresenceHub;
use hearth_server::{logging, serve, settings_from_config, shutdown_signal, ServerOptions};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "hearth-server", about = "WebSocket presence service for hearth campfires")]
struct Args {
    /// Path to hearth.toml. Defaults to the platform config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on. Overrides `[server] port`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter directive, e.g. `debug` or `hearth_presence=trace`.
    /// Takes precedence over RUST_LOG and `[logging] level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let pending_filter = logging::init(args.log_level.as_deref());

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(handle) = &pending_filter {
        logging::apply_config_level(handle, &config.logging.level);
    }
    if let Some(port) = args.port {
        config.server.port = port.into();
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hearth-server exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: HearthConfig) -> Result<(), HearthError> {
    let listener = TcpListener::bind(config.server.listen_addr()).await?;
    let hub = PresenceHub::new(settings_from_config(&config));

    tracing::info!(
        stale_secs = config.presence.stale_threshold,
        sweep_secs = config.presence.sweep_interval,
        heartbeat_hint_secs = config.presence.heartbeat_interval_hint,
        "Presence core ready"
    );

    serve(listener, hub, ServerOptions::from_config(&config), shutdown_signal()).await
}
