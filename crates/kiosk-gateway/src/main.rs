use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;
use kiosk_core::config::KioskConfig;
use kiosk_display::DisplayModel;
use kiosk_scheduler::{SchedulerEngine, SystemClock};
use kiosk_tasks::{Backend, HttpBackend, Kiosk};
use tracing::{error, info, warn};

mod app;
mod http;

#[derive(Parser, Debug)]
#[command(name = "kiosk-gateway", version, about = "Harbor kiosk display controller")]
struct Args {
    /// Config file; defaults to $KIOSK_CONFIG, then ~/.kiosk/kiosk.toml.
    #[arg(long)]
    config: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today for ephemeris lookups.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Override the display surface port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kiosk_gateway=info,kiosk_tasks=info,kiosk_scheduler=info,tower_http=debug".into()
            }),
        )
        .init();

    // explicit flag > KIOSK_CONFIG env > ~/.kiosk/kiosk.toml
    let config_path = args.config.or_else(|| std::env::var("KIOSK_CONFIG").ok());
    let mut config = KioskConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        KioskConfig::default()
    });
    if let Some(port) = args.port {
        config.gateway.port = port;
    }

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.backend)?);
    info!(base_url = %config.backend.base_url, "backend configured");

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let display = Arc::new(DisplayModel::from_config(&config.elements, &config.panels));
    let engine = SchedulerEngine::new();
    let kiosk = Arc::new(Kiosk::new(
        config,
        backend,
        display.clone(),
        Arc::new(SystemClock),
        engine.handle(),
        args.date,
    ));

    let state = Arc::new(app::AppState::new(display, Arc::clone(&kiosk), engine.handle()));
    let router = app::build_router(state);

    // the page may connect while startup is still fetching
    tokio::spawn(async move {
        if let Err(e) = kiosk.start().await {
            error!("kiosk startup failed: {e}");
        }
    });

    info!("Kiosk gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("ctrl-c received, shutting down"),
        Err(e) => {
            warn!("cannot listen for ctrl-c ({e}), running until killed");
            std::future::pending::<()>().await;
        }
    }
}
