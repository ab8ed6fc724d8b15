use specgate::cli::{build_cli, parse_config};
use specgate::internal::server::create_server;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    let config = match parse_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = specgate::internal::logger::init_logger(&config.logging) {
        eprintln!("Failed to initialize logger: {:#}", e);
        std::process::exit(1);
    }

    info!("Starting specgate");
    info!("Version: {}", specgate::internal::config::get_version_info());
    info!("Mode: {:?}", config.server.mode);
    info!("API description: {}", config.spec_file);
    info!("Upstream: {}", config.endpoint.base_url);

    if let Some(adjustments_file) = &config.adjustments_file {
        info!("Adjustments file: {}", adjustments_file);
    }

    let server = match create_server(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create server: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start_with_graceful_shutdown().await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
    Ok(())
}
