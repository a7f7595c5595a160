//! Retrieval provider factory.
//!
//! Resolves a provider name from configuration into a shareable client.

use crate::client::RetrievalClient;
use crate::providers::AzureSearchClient;
use crate::types::{ProviderSettings, ProviderType};
use kbquery_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a retrieval client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("azure-search", "azure")
/// * `settings` - Endpoint, credential and knowledge base to target
///
/// # Errors
/// Returns a configuration error if the provider is unknown or the
/// underlying HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    settings: ProviderSettings,
) -> AppResult<Arc<dyn RetrievalClient>> {
    match ProviderType::parse(provider) {
        Some(ProviderType::AzureSearch) => {
            tracing::debug!("Creating Azure AI Search client: {:?}", settings);
            let client = AzureSearchClient::new(settings)?;
            Ok(Arc::new(client))
        }
        None => Err(AppError::Config(format!(
            "Unknown provider: {}. Supported: azure-search",
            provider
        ))),
    }
}
