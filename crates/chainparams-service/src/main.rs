//! Main entry point for the chain-parameter service.
//!
//! Loads the configuration, builds the engine with the HTTP-backed adapters
//! for the configured EVM and Cosmos networks, and serves the API until the
//! process is interrupted.

use chainparams_config::Config;
use chainparams_core::EngineBuilder;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the chain-parameter service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started chain-parameter service");

	let config_path = args.config.to_string_lossy();
	let config = Config::from_file(&config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.engine.id);

	let engine = Arc::new(EngineBuilder::new(config.clone()).build()?);
	engine.initialize().await;

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			tokio::select! {
				result = server::start_server(api_config, Arc::clone(&engine)) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Received interrupt");
				}
			}
		},
		None => {
			tracing::info!("API disabled, running engine only");
			tokio::signal::ctrl_c().await?;
		},
	}

	engine.shutdown().await;
	tracing::info!("Stopped chain-parameter service");
	Ok(())
}
