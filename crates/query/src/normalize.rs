//! Query normalization.
//!
//! Turns a free-form question plus optional override strings into a
//! provider request. Unset overrides are omitted from the request so the
//! knowledge base applies its own configured defaults.

use kbquery_core::{AppError, AppResult};
use kbquery_provider::{OutputMode, ReasoningEffort, RetrievalRequest};
use serde::{Deserialize, Serialize};

use crate::types::{AppliedOverrides, KNOWLEDGE_BASE_DEFAULT};

/// A question as submitted by a presentation surface.
///
/// Only the recognized override keys are accepted; anything else is a
/// deserialization error at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryInput {
    pub question: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_reasoning_effort: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_retrieval_output_mode: Option<String>,
}

impl QueryInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.retrieval_reasoning_effort = Some(effort.into());
        self
    }

    pub fn with_output_mode(mut self, mode: impl Into<String>) -> Self {
        self.knowledge_retrieval_output_mode = Some(mode.into());
        self
    }
}

/// Validated per-request overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOverrides {
    pub reasoning_effort: Option<ReasoningEffort>,
    pub output_mode: Option<OutputMode>,
}

impl RequestOverrides {
    /// Parse raw override strings. Blank values mean "use the knowledge base default".
    pub fn parse(reasoning_effort: Option<&str>, output_mode: Option<&str>) -> AppResult<Self> {
        let reasoning_effort = match non_blank(reasoning_effort) {
            None => None,
            Some(raw) => Some(ReasoningEffort::parse(raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "retrievalReasoningEffort must be one of: {} (got '{}')",
                    join_names(ReasoningEffort::ALL.iter().map(|e| e.as_str())),
                    raw
                ))
            })?),
        };

        let output_mode = match non_blank(output_mode) {
            None => None,
            Some(raw) => Some(OutputMode::parse(raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "knowledgeRetrievalOutputMode must be one of: {} (got '{}')",
                    join_names(OutputMode::ALL.iter().map(|m| m.as_str())),
                    raw
                ))
            })?),
        };

        Ok(Self {
            reasoning_effort,
            output_mode,
        })
    }

    /// What was actually requested, for display.
    pub fn applied(&self) -> AppliedOverrides {
        AppliedOverrides {
            retrieval_reasoning_effort: self
                .reasoning_effort
                .map(|e| e.as_str())
                .unwrap_or(KNOWLEDGE_BASE_DEFAULT)
                .to_string(),
            knowledge_retrieval_output_mode: self
                .output_mode
                .map(|m| m.as_str())
                .unwrap_or(KNOWLEDGE_BASE_DEFAULT)
                .to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Trim a question, rejecting blank input.
pub fn normalize_question(question: &str) -> AppResult<String> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Question text is required.".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Build the provider request for one question.
///
/// Returns the request together with the parsed overrides so the caller can
/// echo them in the interaction metadata.
pub fn build_request(
    input: &QueryInput,
    target_sources: &[String],
) -> AppResult<(RetrievalRequest, RequestOverrides)> {
    let question = normalize_question(&input.question)?;
    let overrides = RequestOverrides::parse(
        input.retrieval_reasoning_effort.as_deref(),
        input.knowledge_retrieval_output_mode.as_deref(),
    )?;

    let mut request = RetrievalRequest::new(question, target_sources.to_vec());
    if let Some(effort) = overrides.reasoning_effort {
        request = request.with_reasoning_effort(effort);
    }
    if let Some(mode) = overrides.output_mode {
        request = request.with_output_mode(mode);
    }

    tracing::debug!(
        "Built retrieval request (effort: {:?}, mode: {:?}, sources: {})",
        overrides.reasoning_effort,
        overrides.output_mode,
        target_sources.len()
    );

    Ok((request, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<String> {
        vec!["insurance".to_string(), "retail".to_string()]
    }

    #[test]
    fn test_blank_question_rejected() {
        for q in ["", "   ", "\n\t"] {
            let err = normalize_question(q).unwrap_err();
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(normalize_question("  hello?\n").unwrap(), "hello?");
    }

    #[test]
    fn test_no_overrides_echo_default_marker() {
        let (request, overrides) = build_request(&QueryInput::new("q"), &sources()).unwrap();

        assert!(request.reasoning_effort.is_none());
        assert!(request.output_mode.is_none());
        let applied = overrides.applied();
        assert_eq!(applied.retrieval_reasoning_effort, KNOWLEDGE_BASE_DEFAULT);
        assert_eq!(applied.knowledge_retrieval_output_mode, KNOWLEDGE_BASE_DEFAULT);
    }

    #[test]
    fn test_overrides_applied_and_echoed_canonically() {
        let input = QueryInput::new("q")
            .with_reasoning_effort(" MEDIUM ")
            .with_output_mode("extractivedata");
        let (request, overrides) = build_request(&input, &sources()).unwrap();

        assert_eq!(request.reasoning_effort, Some(ReasoningEffort::Medium));
        assert_eq!(request.output_mode, Some(OutputMode::ExtractiveData));
        assert_eq!(request.target_sources, sources());
        let applied = overrides.applied();
        assert_eq!(applied.retrieval_reasoning_effort, "medium");
        assert_eq!(applied.knowledge_retrieval_output_mode, "extractiveData");
    }

    #[test]
    fn test_empty_override_means_default() {
        let overrides = RequestOverrides::parse(Some("  "), Some("")).unwrap();
        assert_eq!(overrides, RequestOverrides::default());
    }

    #[test]
    fn test_out_of_enum_override_is_validation_error() {
        let err = RequestOverrides::parse(Some("extreme"), None).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("minimal, low, medium"));

        let err = RequestOverrides::parse(None, Some("summary")).unwrap_err();
        assert!(err.to_string().contains("knowledgeRetrievalOutputMode"));
    }

    #[test]
    fn test_query_input_rejects_unknown_keys() {
        let result: Result<QueryInput, _> = serde_json::from_str(
            r#"{"question":"q","temperature":0.2}"#,
        );
        assert!(result.is_err());

        let input: QueryInput = serde_json::from_str(
            r#"{"question":"q","retrievalReasoningEffort":"low"}"#,
        )
        .unwrap();
        assert_eq!(input.retrieval_reasoning_effort.as_deref(), Some("low"));
        assert!(input.knowledge_retrieval_output_mode.is_none());
    }
}
