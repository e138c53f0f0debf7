//! solaced - Solace daemon.
//!
//! Loads the emotion classifier and generation backend once, then serves the
//! pipeline over HTTP. Missing classifier artifacts or a missing API key stop
//! startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use solace::server;
use solace::{Config, Pipeline, SolaceError};

/// Solace daemon: journal emotion classification and support plans.
#[derive(Parser)]
#[command(name = "solaced")]
#[command(version)]
#[command(about = "Solace journal support service")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to, overriding the config file.
    #[arg(short, long, env = "SOLACE_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;

    // Both handles live for the whole process
    let classifier = config.build_classifier()?;
    let generator = config.build_generator()?;

    let address = args.address.unwrap_or_else(|| config.server.address.clone());
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| SolaceError::Configuration(format!("Invalid address {address:?}: {e}")))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        classifier = classifier.model_name(),
        generator = generator.backend_name(),
        model = %generator.options().model,
        "solaced starting"
    );

    let pipeline = Arc::new(Pipeline::new(classifier, generator));
    server::serve(addr, pipeline).await?;

    Ok(())
}
