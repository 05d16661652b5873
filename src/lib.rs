pub mod assistant;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod llm;
pub mod models;
pub mod server;

use crate::assistant::Assistant;
use crate::cli::Args;
use crate::config::AppConfig;
use crate::llm::oci::OciChatClient;
use crate::server::Server;
use log::info;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    if args.check {
        return if diagnostics::run_checks(&args).await {
            Ok(())
        } else {
            Err("OCI connection check failed".into())
        };
    }

    let config = Arc::new(AppConfig::from_args(&args)?);

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Frontend Origin: {}", config.frontend_origin);
    info!("OCI Config File: {}", config.oci_config_file.display());
    info!("OCI Profile: {}", config.oci_profile);
    info!("Service Endpoint: {}", config.service_endpoint);
    info!("Text Model: {}", config.text_model_id);
    info!("Vision Model: {}", config.vision_model_id);
    info!(
        "Timeouts: connect={}s, read={}s",
        config.connect_timeout.as_secs(),
        config.read_timeout.as_secs()
    );
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let client = Arc::new(OciChatClient::from_config(&config)?);
    let assistant = Arc::new(Assistant::new(client, config));
    let addr = args.server_addr.clone();
    let server = Server::new(addr, assistant, args);
    server.run().await?;

    Ok(())
}
