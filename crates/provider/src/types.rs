//! Provider configuration and request knob types.

use std::fmt;
use std::time::Duration;

use kbquery_core::{AppConfig, AppError, AppResult};
use serde::{Deserialize, Serialize};

/// How much multi-step query planning the knowledge base performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
}

impl ReasoningEffort {
    /// Every recognized value, in increasing effort.
    pub const ALL: [ReasoningEffort; 3] = [Self::Minimal, Self::Low, Self::Medium];

    /// Parse a reasoning effort, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            _ => None,
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the knowledge base returns verbatim passages or a synthesized answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputMode {
    ExtractiveData,
    AnswerSynthesis,
}

impl OutputMode {
    pub const ALL: [OutputMode; 2] = [Self::ExtractiveData, Self::AnswerSynthesis];

    /// Parse an output mode, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "extractivedata" => Some(Self::ExtractiveData),
            "answersynthesis" => Some(Self::AnswerSynthesis),
            _ => None,
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractiveData => "extractiveData",
            Self::AnswerSynthesis => "answerSynthesis",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    AzureSearch,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "azure-search" | "azure" | "azure-ai-search" => Some(Self::AzureSearch),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureSearch => "azure-search",
        }
    }
}

/// Everything a provider client needs to reach one knowledge base.
#[derive(Clone)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: String,
    pub knowledge_base_name: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("knowledge_base_name", &self.knowledge_base_name)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderSettings {
    /// Build provider settings from a validated application config.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let endpoint = config
            .search_endpoint
            .clone()
            .ok_or_else(|| AppError::Config("Search endpoint is not configured".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Config("Search API key is not configured".to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            knowledge_base_name: config.knowledge_base_name.clone(),
            api_version: config.api_version.clone(),
            timeout: config.timeout(),
        })
    }
}
