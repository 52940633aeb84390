//! ServiceHub client - command-line entry point.
//!
//! Prints the landing feed, or browse results when a category or search term
//! is given, as one JSON object per line on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use servicehub_client::notifications::TracingNotifier;
use servicehub_client::{CatalogService, CatalogServiceImpl, Category, Config};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "servicehub-client", about = "Browse ServiceHub listings")]
struct Args {
    /// Only listings in this category (e.g. "Plumbing", "HVAC")
    #[arg(short, long)]
    category: Option<String>,

    /// Case-insensitive text to look for in title or description
    #[arg(short, long)]
    search: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Using backend at {}", config.backend_url);

    let category = args
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .context("Invalid --category")?;

    let catalog = CatalogServiceImpl::from_config(&config, Arc::new(TracingNotifier));

    let services = if category.is_some() || args.search.is_some() {
        catalog
            .browse_services(category, args.search.as_deref())
            .await
    } else {
        catalog.featured_services().await
    };

    let services = match services {
        Ok(services) => services,
        Err(e) => {
            error!("{}", e);
            anyhow::bail!(e.user_message());
        }
    };

    for service in &services {
        println!("{}", serde_json::to_string(service)?);
    }

    info!(count = services.len(), "Listings printed");
    Ok(())
}
