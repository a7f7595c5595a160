//! Retrieval client abstraction and request/response types.
//!
//! This module defines the core abstractions for talking to a remote
//! knowledge base.

use kbquery_core::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{OutputMode, ReasoningEffort};

/// A single retrieval request against a knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// The user question, already trimmed
    pub question: String,

    /// Knowledge sources the knowledge base may consult, in order
    pub target_sources: Vec<String>,

    /// Reasoning effort override; `None` lets the knowledge base decide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,

    /// Output mode override; `None` lets the knowledge base decide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_mode: Option<OutputMode>,

    /// Ask the provider to return its source activity trace
    #[serde(default)]
    pub include_activity: bool,
}

impl RetrievalRequest {
    /// Create a request with no overrides.
    pub fn new(question: impl Into<String>, target_sources: Vec<String>) -> Self {
        Self {
            question: question.into(),
            target_sources,
            reasoning_effort: None,
            output_mode: None,
            include_activity: true,
        }
    }

    /// Set the reasoning effort override.
    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    /// Set the output mode override.
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = Some(mode);
        self
    }
}

/// One content part of a response message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    /// Content type, "text" for everything the service currently emits
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One message (answer segment) returned by the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl ResponseMessage {
    /// Non-empty text parts, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter_map(|c| c.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// A reference record pointing back at retrieved source material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Source kind, e.g. "searchIndex", "web", "azureBlob"
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: String,

    /// Provider-internal id; never used for citation numbering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Index into the activity trace that produced this reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_source: Option<i64>,

    /// Semantic reranker score (0..4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker_score: Option<f64>,

    /// Raw source fields (title, url, content, snippet, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data: Option<Value>,

    /// Any other fields the provider attached (docKey, blobUrl, ...)
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

fn unknown_kind() -> String {
    "unknown".to_string()
}

impl Reference {
    /// String field from `sourceData`, if present and non-empty.
    pub fn source_str(&self, key: &str) -> Option<&str> {
        self.source_data
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// String field from the additional properties, if present and non-empty.
    pub fn additional_str(&self, key: &str) -> Option<&str> {
        self.additional
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// Decoded response from a knowledge base retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResponse {
    /// Answer segments, in provider order
    #[serde(default)]
    pub messages: Vec<ResponseMessage>,

    /// Reference records, in provider order
    #[serde(default)]
    pub references: Vec<Reference>,

    /// Opaque source activity trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Value>,
}

/// Trait for retrieval providers.
///
/// Implementations must be safe to share across concurrent requests; the
/// web surface holds a single `Arc<dyn RetrievalClient>`.
#[async_trait::async_trait]
pub trait RetrievalClient: Send + Sync {
    /// Get the provider name (e.g., "azure-search").
    fn provider_name(&self) -> &str;

    /// Name of the knowledge base this client queries.
    fn knowledge_base_name(&self) -> &str;

    /// Service endpoint this client talks to.
    fn endpoint(&self) -> &str;

    /// Perform one retrieval round trip.
    async fn retrieve(&self, request: &RetrievalRequest) -> AppResult<RetrievalResponse>;
}
