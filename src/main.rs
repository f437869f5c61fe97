//! Storage Bridge - Entry Point
//!
//! Serves `requestStoragePermission` and `saveFile` calls over a line-based
//! method channel and copies files into the shared media store.

use log::{info, warn};
use std::process;
use std::sync::Arc;

use storage_bridge::config::BridgeConfig;
use storage_bridge::error::BridgeError;
use storage_bridge::error::handlers::handle_error;
use storage_bridge::ingest::{Capabilities, IngestService, IngestSettings};
use storage_bridge::permissions::ConsentGate;
use storage_bridge::protocol::BridgeContext;
use storage_bridge::server::{Server, run_console};
use storage_bridge::storage::FsMediaStore;
use storage_bridge::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    let config = match BridgeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            process::exit(1);
        }
    };

    setup_logging(&config.startup.log_level);

    info!("Launching storage bridge...");

    if let Err(e) = run(config).await {
        handle_error(&e);
        process::exit(1);
    }
}

async fn run(config: BridgeConfig) -> Result<(), BridgeError> {
    let (startup, runtime) = config.split();

    let capabilities = Capabilities::resolve(startup.api_level);
    if !capabilities.supports_namespaced_storage {
        warn!(
            "Platform API level {} has no namespaced storage; saveFile will always return null",
            startup.api_level
        );
    }

    let store = FsMediaStore::new(&startup.storage_root_path())?;
    let gate = Arc::new(ConsentGate::new());

    let service = IngestService::new(
        Arc::new(store),
        gate.clone(),
        capabilities,
        IngestSettings {
            namespace: startup.namespace.clone(),
            include_title: startup.include_title,
            buffer_size: startup.buffer_size,
        },
    );

    let context = BridgeContext {
        service: Arc::new(service),
        runtime: Arc::clone(&runtime),
    };

    let server = Server::bind(&startup, context).await?;
    tokio::spawn(run_console(gate, runtime));
    server.start().await;

    Ok(())
}
