//! Display-ready query result types.
//!
//! These types form the stable contract handed to presentation surfaces.
//! They serialize with the camelCase field names the browser UI reads.

use serde::{Deserialize, Serialize};

use crate::timing::Timing;

/// Echoed in metadata when the caller left an override unset.
pub const KNOWLEDGE_BASE_DEFAULT: &str = "knowledge base default";

/// Source classification of a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CitationType {
    SearchIndex,
    Web,
    Other,
}

impl CitationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchIndex => "searchIndex",
            Self::Web => "web",
            Self::Other => "other",
        }
    }
}

/// A single citation, numbered within its interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// 1-based position in the interaction's citation list
    pub id: u32,

    #[serde(rename = "type")]
    pub kind: CitationType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Source document identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    /// Relevance in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,

    /// Verbatim excerpt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_text: Option<String>,

    /// Fallback explanation when no excerpt is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Citation {
    /// An empty citation of the given kind.
    pub fn new(id: u32, kind: CitationType) -> Self {
        Self {
            id,
            kind,
            title: None,
            url: None,
            document: None,
            relevance_score: None,
            citation_text: None,
            note: None,
        }
    }
}

/// The override values that were actually sent for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOverrides {
    /// Canonical effort, or [`KNOWLEDGE_BASE_DEFAULT`]
    pub retrieval_reasoning_effort: String,

    /// Canonical output mode, or [`KNOWLEDGE_BASE_DEFAULT`]
    pub knowledge_retrieval_output_mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionMetadata {
    pub knowledge_base_name: String,
    pub search_endpoint: String,
    pub request_overrides: AppliedOverrides,
}

/// One answered question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub question: String,

    /// Answer segments in provider order
    pub answers: Vec<String>,

    /// Citations numbered 1..N in encounter order
    pub citations: Vec<Citation>,

    pub timing: Timing,

    pub metadata: InteractionMetadata,

    /// Opaque source activity trace from the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<serde_json::Value>,
}

impl Interaction {
    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }
}
