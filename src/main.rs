//! catalog-sync - Spreadsheet-to-Shopify product catalog synchronization
//!
//! This is the main entry point for the catalog-sync command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use catalog_sync::api::{HttpTransport, RateLimitedExecutor};
use catalog_sync::catalog::ShopifyGateway;
use catalog_sync::config::Config;
use catalog_sync::input::{load_records, InputFiles};
use catalog_sync::logging::init_tracing;
use catalog_sync::models::{SyncOutcome, SyncReport};
use catalog_sync::sync::{CatalogSync, SyncOptions};

/// catalog-sync - Upsert a CSV product catalog into a Shopify store
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Products CSV export
    products: PathBuf,

    /// Images CSV export (handle, src, alt)
    #[arg(long)]
    images: Option<PathBuf>,

    /// Metafields CSV export (handle, namespace, key, type, value)
    #[arg(long)]
    metafields: Option<PathBuf>,

    /// Look up products and build payloads without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Process only the first N products
    #[arg(long)]
    limit: Option<usize>,

    /// Path to a YAML configuration file
    #[arg(short, long, env = "CATALOG_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Existing environment variables take precedence over .env
    let dotenv = dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = load_config(&args)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv = dotenv.as_ref().map(|p| p.display().to_string()),
        "Starting catalog-sync"
    );

    let settings = config
        .shop
        .resolve()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let records = load_records(&InputFiles {
        products: args.products.clone(),
        images: args.images.clone(),
        metafields: args.metafields.clone(),
    })?;

    let transport = HttpTransport::new(&settings)?;
    info!(endpoint = %transport.endpoint(), "Using GraphQL endpoint");

    let executor = RateLimitedExecutor::new(transport, config.retry.clone(), config.throttle.clone());
    let gateway = Arc::new(ShopifyGateway::new(executor));

    let sync = CatalogSync::new(
        gateway,
        SyncOptions {
            dry_run: args.dry_run,
            location_id: settings.location_id.clone(),
            limit: args.limit,
        },
    );

    let report = sync.run(&records).await;
    log_failures(&report);

    Ok(())
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path.display());
            let mut config = Config::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            config
                .apply_env()
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            Ok(config)
        }
        None => Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e)),
    }
}

fn log_failures(report: &SyncReport) {
    let failed = report.records.iter().filter(|(_, o)| !o.is_success());
    for (handle, outcome) in failed {
        match outcome {
            SyncOutcome::UserErrorReported { errors } => {
                warn!(handle = %handle, errors = errors.len(), "Product not synced: rejected by store");
            }
            SyncOutcome::TransportFailed { message } => {
                warn!(handle = %handle, error = %message, "Product not synced: call failed");
            }
            _ => {}
        }
    }
}
