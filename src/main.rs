//! macrolog server
//!
//! Serves the diary page and the JSON API.
//!
//! Run with: cargo run --bin macrolog -- --config config.toml

use clap::Parser;
use macrolog::api::{serve, AppState};
use macrolog::catalog::{spawn_load, CatalogHandle, CatalogSource, FileSource, HttpSource};
use macrolog::config::{Config, LoggingConfig};
use macrolog::storage::{DiaryStore, FileStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "macrolog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Single-user food diary server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Data directory
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    init_tracing(&config.logging)?;

    tracing::info!("Starting macrolog v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.storage.data_path();
    tracing::info!("Data directory: {:?}", data_dir);
    let store = Arc::new(DiaryStore::new(Box::new(FileStore::open(&data_dir)?)));

    // The page is usable before the catalog arrives
    let catalog = CatalogHandle::new();
    let source: Box<dyn CatalogSource> = match &config.catalog.url {
        Some(url) => Box::new(HttpSource::new(
            url.clone(),
            Duration::from_secs(config.catalog.timeout_secs),
        )?),
        None => Box::new(FileSource::new(&config.catalog.path)),
    };
    let loader = spawn_load(catalog.clone(), source);

    let api_config = config.api_config();
    let state = AppState::new(store, catalog, api_config.clone());
    serve(state, &api_config).await?;

    loader.abort();
    tracing::info!("macrolog stopped");

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("macrolog={},tower_http=debug", logging.level).into()
    });
    let json = logging.format.eq_ignore_ascii_case("json");
    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let writer = Mutex::new(file);
            if json {
                registry.with(fmt::layer().json().with_writer(writer)).init();
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
        }
        None if json => registry.with(fmt::layer().json()).init(),
        None => registry.with(fmt::layer()).init(),
    }

    Ok(())
}
