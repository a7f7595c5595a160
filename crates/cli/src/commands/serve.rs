//! Serve command handler.

use clap::Args;
use kbquery_core::{config::AppConfig, AppResult};

/// Serve the web UI and JSON API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Listen address (host:port)
    #[arg(short, long, env = "KBQUERY_API_ADDRESS")]
    pub address: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut config = config.clone();
        if let Some(address) = &self.address {
            config.server_address = address.clone();
        }

        kbquery_web::start(&config).await
    }
}
