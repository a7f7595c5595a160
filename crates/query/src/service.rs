//! Query orchestration.
//!
//! `QueryService::submit` runs normalizer → provider call → shaper once per
//! question, timing each phase. Nothing is retried here; a failed call is
//! reported to the caller together with whatever timing was captured.

use std::sync::Arc;
use std::time::Duration;

use kbquery_core::{AppConfig, AppError, AppResult, ProviderErrorKind};
use kbquery_provider::{create_client, ProviderSettings, RetrievalClient};
use thiserror::Error;
use tracing::Instrument;

use crate::normalize::{build_request, QueryInput};
use crate::shape::{extract_answers, shape_citations};
use crate::timing::{Phase, Timing, TimingRecorder};
use crate::types::{Interaction, InteractionMetadata};

/// A query that did not produce an interaction.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct QueryFailure {
    #[source]
    pub error: AppError,

    /// Phases completed before the failure; unreached phases are zero
    pub timing: Timing,
}

impl QueryFailure {
    pub fn new(error: AppError, timing: Timing) -> Self {
        Self { error, timing }
    }

    pub fn is_client_error(&self) -> bool {
        self.error.is_client_error()
    }
}

/// Issues questions against one remote knowledge base.
///
/// Holds no mutable state, so a single instance can serve concurrent callers.
#[derive(Clone)]
pub struct QueryService {
    client: Arc<dyn RetrievalClient>,
    knowledge_sources: Vec<String>,
    timeout: Duration,
}

impl QueryService {
    /// Create a service over an existing client.
    pub fn new(
        client: Arc<dyn RetrievalClient>,
        knowledge_sources: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            knowledge_sources,
            timeout,
        }
    }

    /// Create a service from application configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let settings = ProviderSettings::from_config(config)?;
        let client = create_client(&config.provider, settings)?;
        Ok(Self::new(
            client,
            config.knowledge_sources.clone(),
            config.timeout(),
        ))
    }

    pub fn knowledge_base_name(&self) -> &str {
        self.client.knowledge_base_name()
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn knowledge_sources(&self) -> &[String] {
        &self.knowledge_sources
    }

    /// Submit one question and shape the answer for display.
    pub async fn submit(&self, input: &QueryInput) -> Result<Interaction, QueryFailure> {
        let span = tracing::info_span!("kb_query", kb = %self.knowledge_base_name());
        self.submit_inner(input).instrument(span).await
    }

    async fn submit_inner(&self, input: &QueryInput) -> Result<Interaction, QueryFailure> {
        let mut timer = TimingRecorder::new();

        let (request, overrides) = timer
            .measure(Phase::RequestPreparation, || {
                build_request(input, &self.knowledge_sources)
            })
            .map_err(|e| {
                tracing::debug!("Rejected question before sending: {}", e);
                QueryFailure::new(e, timer.finish())
            })?;

        tracing::info!("Querying knowledge base: {}", request.question);

        let outcome = timer
            .measure_async(
                Phase::KbRetrieval,
                tokio::time::timeout(self.timeout, self.client.retrieve(&request)),
            )
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!("Knowledge base retrieval failed: {}", e);
                return Err(QueryFailure::new(e, timer.finish()));
            }
            Err(_) => {
                let e = AppError::provider(
                    ProviderErrorKind::Timeout,
                    format!(
                        "Knowledge base did not respond within {:.1}s",
                        self.timeout.as_secs_f64()
                    ),
                );
                tracing::warn!("{}", e);
                return Err(QueryFailure::new(e, timer.finish()));
            }
        };

        let (answers, citations) = timer.measure(Phase::ResponseProcessing, || {
            (
                extract_answers(&response, overrides.output_mode),
                shape_citations(&response.references),
            )
        });

        let timing = timer.finish();
        tracing::info!(
            "Answered with {} segment(s) and {} citation(s) in {:.2}s",
            answers.len(),
            citations.len(),
            timing.total
        );

        Ok(Interaction {
            question: request.question,
            answers,
            citations,
            timing,
            metadata: InteractionMetadata {
                knowledge_base_name: self.knowledge_base_name().to_string(),
                search_endpoint: self.endpoint().to_string(),
                request_overrides: overrides.applied(),
            },
            activity: response.activity,
        })
    }
}
