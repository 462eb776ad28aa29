use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use status_core::config::DashboardConfig;
use status_core::{RefreshOutcome, Refresher, ServiceManager};

mod page;
mod web;

#[derive(Parser, Debug)]
#[command(name = "status-dashboard")]
#[command(about = "Probes a fixed set of services and serves their status")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, env = "STATUS_CONFIG_PATH", global = true)]
    config_path: Option<String>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1", env = "STATUS_BIND")]
    bind: String,

    /// Port to listen on; the server does not start without one
    #[arg(long, env = "PORTS")]
    port: Option<String>,

    /// Seconds between background refreshes (0 disables), overrides the config file
    #[arg(long)]
    refresh_interval: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "STATUS_LOG_LEVEL", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one refresh pass, print every status and fail if any service is offline
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    info!(
        "status-dashboard v{} starting (os={}, arch={})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    );

    let config_path = cli
        .config_path
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(DashboardConfig::default_path);

    let mut config = if config_path.exists() {
        info!("loading config from {}", config_path.display());
        DashboardConfig::load(&config_path)?
    } else {
        warn!("no config found at {}, using defaults", config_path.display());
        DashboardConfig::default()
    };

    if let Some(secs) = cli.refresh_interval {
        config.refresh_interval_secs = secs;
    }

    let manager = Arc::new(config.build_manager());
    if manager.is_empty() {
        warn!("no services configured");
    }

    match cli.command {
        Some(Commands::Check) => run_check(&manager).await,
        None => {
            let port = match cli.port.as_deref().map(str::trim) {
                Some(p) if !p.is_empty() => p
                    .parse::<u16>()
                    .with_context(|| format!("invalid port '{}'", p))?,
                _ => {
                    info!("no port configured (--port or PORTS), not serving");
                    return Ok(());
                }
            };
            run_server(config, manager, &cli.bind, port).await
        }
    }
}

async fn run_check(manager: &ServiceManager) -> Result<()> {
    manager.update_all_status().await;

    let services = manager.snapshot();
    let width = services.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for svc in &services {
        let checked = svc
            .last_checked
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!("{:<width$}  {:<7}  {}", svc.name, svc.status, checked, width = width);
    }

    let offline = services.iter().filter(|s| !s.status.is_online()).count();
    if offline > 0 {
        anyhow::bail!("{} of {} services offline", offline, services.len());
    }
    Ok(())
}

async fn run_server(
    config: DashboardConfig,
    manager: Arc<ServiceManager>,
    bind: &str,
    port: u16,
) -> Result<()> {
    // Fill in real statuses before the first page is served
    if let RefreshOutcome::Completed { checked, offline } = manager.update_all_status().await {
        info!("initial refresh: {} checked, {} offline", checked, offline);
    }

    let interval = config.refresh_interval();
    match interval {
        Some(period) => info!("background refresh every {}s", period.as_secs()),
        None => info!("background refresh disabled, refreshing on request only"),
    }
    let (refresher, _refresh_task) = Refresher::spawn(Arc::clone(&manager), interval);

    let state = web::AppState {
        manager,
        refresher,
        title: Arc::from(config.title.as_str()),
    };

    let addr = format!("{}:{}", bind, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("serving dashboard on http://{}", listener.local_addr()?);

    web::serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}
