use std::sync::Arc;

use kbquery_core::{AppConfig, AppResult};
use kbquery_query::QueryService;
use kbquery_render::{IndexPage, Renderer};

/// Shared state for all HTTP handlers.
///
/// Read-only after startup; requests never share mutable data.
#[derive(Clone)]
pub struct AppState {
    pub service: QueryService,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(service: QueryService, renderer: Renderer) -> Self {
        Self {
            service,
            renderer: Arc::new(renderer),
        }
    }

    /// Build the query service and renderer from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let service = QueryService::from_config(config)?;
        let renderer = Renderer::with_workspace(&config.workspace)?;
        Ok(Self::new(service, renderer))
    }

    /// Index page describing the configured knowledge base.
    pub fn index_page(&self) -> IndexPage {
        IndexPage::new(
            self.service.knowledge_base_name(),
            self.service.endpoint(),
            self.service.knowledge_sources().to_vec(),
        )
    }
}
