//! playguide: curated game catalog service
//!
//! `serve` (the default) runs the HTTP API. `check-links` runs one link
//! health pass and exits, for schedulers that cannot reach the HTTP trigger.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use playguide::api::{auth::SecretValidator, create_router, AppState};
use playguide::links::{HttpLinkProbe, LinkMonitor};
use playguide::{CatalogDb, Config};

#[derive(Parser)]
#[command(name = "playguide")]
#[command(about = "Curated catalog of safe games for young children")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "playguide.toml")]
    config: PathBuf,

    /// SQLite database path (overrides config file)
    #[arg(long, env = "DATABASE_PATH")]
    database_path: Option<PathBuf>,

    /// HTTP listen address (overrides config file)
    #[arg(long, env = "LISTEN")]
    listen: Option<String>,

    /// BOOTSTRAP or REVIEW (overrides config file)
    #[arg(long, env = "SYSTEM_MODE")]
    system_mode: Option<String>,

    /// Shared secret for the link check trigger
    #[arg(long, env = "CRON_SECRET", hide_env_values = true)]
    cron_secret: Option<String>,

    /// Key for curator routes
    #[arg(long, env = "ADMIN_KEY", hide_env_values = true)]
    admin_key: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Probe every active game's link once and print the summary
    CheckLinks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::from_default_env().add_directive("playguide=info".parse()?);
    if cli.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut config = Config::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(path) = cli.database_path {
        config.database.path = path;
    }
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(mode) = cli.system_mode {
        config.curation.system_mode = Some(mode);
    }
    if let Some(secret) = cli.cron_secret {
        config.auth.cron_secret = Some(secret);
    }
    if let Some(key) = cli.admin_key {
        config.auth.admin_key = Some(key);
    }

    let mode = config.system_mode();
    info!(mode = %mode, "System mode");
    info!("Database: {}", config.database.path.display());

    let db = Arc::new(CatalogDb::open(&config.database.path)?);
    let probe = Arc::new(HttpLinkProbe::new(
        config.links.timeout(),
        &config.links.user_agent,
    )?);
    let monitor = Arc::new(LinkMonitor::new(db.clone(), probe, config.links.concurrency));

    match cli.command.unwrap_or(Command::Serve) {
        Command::CheckLinks => {
            let summary = monitor.run().await?;
            println!("{}", serde_json::to_string(&summary)?);
            Ok(())
        }
        Command::Serve => {
            let stats = db.stats()?;
            info!(
                games = stats.game_count,
                active = stats.active_count,
                broken_links = stats.broken_link_count,
                "Catalog loaded"
            );
            if config.auth.cron_secret.is_none() {
                tracing::warn!("No cron secret configured; link check trigger will reject all callers");
            }

            let state = Arc::new(AppState {
                db,
                mode,
                secrets: SecretValidator::from_config(&config.auth),
                monitor,
            });
            let app = create_router(state);

            let addr: SocketAddr = config.server.listen.parse()?;
            info!("Listening on http://{}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            info!("Shut down");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
