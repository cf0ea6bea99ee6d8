use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod actors;
mod bus;
mod spoiler;
mod state;

use state::config::SystemConfig;
use state::{BridgeState, Tables};

#[derive(Parser, Debug, Clone)]
#[command(name = "apbridge", about = "Multiworld session bridge for a polling game process")]
struct Cli {
    /// Config file path (default: ~/.config/apbridge/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port from the config file
    #[arg(long)]
    port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("apbridge=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!("debug logging enabled");

    let cli = Cli::parse();

    // Load (or create) config file
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(state::config::default_config_path);
    let system = SystemConfig::new(config_path);
    if let Some(port) = cli.port {
        system.override_with(|c| c.bridge.port = port);
    }
    let snap = system.snapshot();
    let tables = Tables::load(&snap.session.game_data)?;

    // Handlers and the coordinator share the store without locking across
    // awaits; one thread keeps them strictly interleaved.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async move {
        tracing::info!("using config {}", system.path().display());
        let state = Arc::new(BridgeState::new(system, tables));
        let bus = bus::channel("main");

        // Session actor: always on, and subscribed before anything can push.
        actors::start_actor("session".into(), Box::new(actors::session::SessionActor), &state, &bus);

        for ra in actors::resolve_actors(&snap) {
            tracing::info!("starting actor '{}' ({})", ra.id, ra.name);
            actors::start_actor(ra.id, ra.actor, &state, &bus);
        }
        tracing::info!("running actors: {}", state.actor_ids().join(", "));

        tokio::signal::ctrl_c().await?;

        tracing::info!("shutting down...");
        state.stop_all().await;
        Ok::<_, anyhow::Error>(())
    })
}
