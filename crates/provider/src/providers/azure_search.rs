//! Azure AI Search knowledge base provider implementation.
//!
//! Talks to the knowledge base `retrieve` action of the search service REST API:
//! `POST {endpoint}/knowledgebases('{name}')/retrieve?api-version={version}`.

use crate::client::{Reference, ResponseMessage, RetrievalClient, RetrievalRequest, RetrievalResponse};
use crate::types::{OutputMode, ProviderSettings, ReasoningEffort};
use kbquery_core::{AppError, AppResult, ProviderErrorKind};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Longest provider error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Retrieve action request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveBody {
    messages: Vec<WireMessage>,
    knowledge_source_params: Vec<KnowledgeSourceParams>,
    include_activity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    retrieval_reasoning_effort: Option<ReasoningEffortBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_mode: Option<OutputMode>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<WireContent>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeSourceParams {
    kind: &'static str,
    knowledge_source_name: String,
    include_references: bool,
    include_reference_source_data: bool,
    always_query_source: bool,
}

#[derive(Debug, Serialize)]
struct ReasoningEffortBody {
    kind: ReasoningEffort,
}

/// Retrieve action response body.
#[derive(Debug, Deserialize)]
struct RetrieveResponseBody {
    #[serde(default)]
    response: Vec<ResponseMessage>,
    #[serde(default)]
    activity: Option<serde_json::Value>,
    #[serde(default)]
    references: Vec<Reference>,
}

/// Azure AI Search knowledge base client.
pub struct AzureSearchClient {
    /// Service endpoint without trailing slash
    endpoint: String,

    knowledge_base_name: String,

    api_version: String,

    api_key: String,

    /// HTTP client; cheap to clone and safe to share across tasks
    client: reqwest::Client,
}

impl AzureSearchClient {
    /// Create a new client. The settings' timeout bounds every round trip.
    pub fn new(settings: ProviderSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            knowledge_base_name: settings.knowledge_base_name,
            api_version: settings.api_version,
            api_key: settings.api_key,
            client,
        })
    }

    /// URL of the retrieve action, without the query string.
    fn retrieve_url(&self) -> String {
        format!(
            "{}/knowledgebases('{}')/retrieve",
            self.endpoint, self.knowledge_base_name
        )
    }

    /// Convert a RetrievalRequest to the service's wire format.
    fn to_wire_request(&self, request: &RetrievalRequest) -> RetrieveBody {
        RetrieveBody {
            messages: vec![WireMessage {
                role: "user",
                content: vec![WireContent {
                    kind: "text",
                    text: request.question.clone(),
                }],
            }],
            knowledge_source_params: request
                .target_sources
                .iter()
                .map(|name| KnowledgeSourceParams {
                    kind: "searchIndex",
                    knowledge_source_name: name.clone(),
                    include_references: true,
                    include_reference_source_data: true,
                    always_query_source: false,
                })
                .collect(),
            include_activity: request.include_activity,
            retrieval_reasoning_effort: request
                .reasoning_effort
                .map(|kind| ReasoningEffortBody { kind }),
            output_mode: request.output_mode,
        }
    }

    /// Convert the service's response to a RetrievalResponse.
    fn convert_response(&self, body: RetrieveResponseBody) -> RetrievalResponse {
        RetrievalResponse {
            messages: body.response,
            references: body.references,
            activity: body.activity,
        }
    }
}

/// Map a transport-level failure to a provider error.
fn transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::provider(
            ProviderErrorKind::Timeout,
            format!("Knowledge base did not respond in time: {}", err),
        )
    } else {
        AppError::provider(
            ProviderErrorKind::Network,
            format!("Failed to reach knowledge base: {}", err),
        )
    }
}

/// Map a non-success HTTP status to a provider error.
fn status_error(status: StatusCode, body: &str) -> AppError {
    let mut detail = body.trim().to_string();
    if detail.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !detail.is_char_boundary(cut) {
            cut -= 1;
        }
        detail.truncate(cut);
        detail.push_str("...");
    }
    if detail.is_empty() {
        detail = status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderErrorKind::Authentication,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderErrorKind::Timeout,
        _ => ProviderErrorKind::Status,
    };

    AppError::provider(
        kind,
        format!("Knowledge base API error ({}): {}", status, detail),
    )
}

/// Decode the retrieve response body.
fn decode_body(text: &str) -> AppResult<RetrieveResponseBody> {
    serde_json::from_str(text).map_err(|e| {
        AppError::provider(
            ProviderErrorKind::MalformedResponse,
            format!("Failed to parse knowledge base response: {}", e),
        )
    })
}

#[async_trait::async_trait]
impl RetrievalClient for AzureSearchClient {
    fn provider_name(&self) -> &str {
        "azure-search"
    }

    fn knowledge_base_name(&self) -> &str {
        &self.knowledge_base_name
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn retrieve(&self, request: &RetrievalRequest) -> AppResult<RetrievalResponse> {
        tracing::info!(
            "Sending retrieve request to knowledge base '{}'",
            self.knowledge_base_name
        );
        tracing::debug!("Request: {:?}", request);

        let body = self.to_wire_request(request);

        let response = self
            .client
            .post(self.retrieve_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let decoded = decode_body(&text)?;

        tracing::info!(
            "Received {} message(s) and {} reference(s) from knowledge base",
            decoded.response.len(),
            decoded.references.len()
        );

        Ok(self.convert_response(decoded))
    }
}
