//! Config command handler.
//!
//! Prints the effective configuration. The API key is never shown.

use clap::Args;
use kbquery_core::{config::AppConfig, AppResult};

/// Show the effective configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ConfigCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(config)?);
            return Ok(());
        }

        println!("Workspace:        {}", config.workspace.display());
        if let Some(config_file) = &config.config_file {
            println!("Config file:      {}", config_file.display());
        }
        println!("Provider:         {}", config.provider);
        println!(
            "Search endpoint:  {}",
            config.search_endpoint.as_deref().unwrap_or("(not set)")
        );
        println!(
            "API key:          {}",
            if config.api_key.is_some() { "set" } else { "(not set)" }
        );
        println!("Knowledge base:   {}", config.knowledge_base_name);
        println!("Knowledge sources:");
        for source in &config.knowledge_sources {
            println!("  - {}", source);
        }
        println!("API version:      {}", config.api_version);
        println!("Timeout:          {}s", config.timeout_secs);
        println!("Server address:   {}", config.server_address);

        match config.validate() {
            Ok(()) => println!("\nConfiguration is complete."),
            Err(e) => println!("\n{}", e),
        }

        Ok(())
    }
}
