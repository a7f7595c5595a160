//! Retrieval provider boundary for KB Query.
//!
//! This crate provides a provider-agnostic abstraction over a managed
//! retrieval-augmented-generation service. Everything that happens on the
//! remote side (query planning, source routing, search, answer synthesis) is
//! opaque; this crate only sends a [`RetrievalRequest`] and decodes the
//! [`RetrievalResponse`].
//!
//! # Providers
//! - **Azure AI Search knowledge bases** (default)
//!
//! # Example
//! ```no_run
//! use kbquery_provider::{create_client, ProviderSettings, RetrievalRequest};
//!
//! # async fn example(settings: ProviderSettings) -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("azure-search", settings)?;
//! let request = RetrievalRequest::new("What does Contoso insure?", vec!["contoso-insurance-faq-index".into()]);
//! let response = client.retrieve(&request).await?;
//! println!("{} references", response.references.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    MessageContent, Reference, ResponseMessage, RetrievalClient, RetrievalRequest,
    RetrievalResponse,
};
pub use factory::create_client;
pub use providers::AzureSearchClient;
pub use types::{OutputMode, ProviderSettings, ProviderType, ReasoningEffort};
