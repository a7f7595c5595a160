//! Configuration management for KB Query.
//!
//! This module handles loading and merging configuration from multiple sources,
//! in increasing precedence:
//! - Built-in defaults
//! - A `.env` file in the current directory (optional)
//! - Config file (`.kbquery/config.yaml` in the workspace, or `KBQUERY_CONFIG`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Provider used when nothing else is configured.
pub const DEFAULT_PROVIDER: &str = "azure-search";

/// Knowledge base queried when nothing else is configured.
pub const DEFAULT_KNOWLEDGE_BASE: &str = "contoso-multi-index-kb";

/// Search service REST API version carrying the knowledge base endpoints.
pub const DEFAULT_API_VERSION: &str = "2025-11-01-preview";

/// Knowledge sources targeted when nothing else is configured.
pub const DEFAULT_KNOWLEDGE_SOURCES: [&str; 4] = [
    "contoso-insurance-faq-index",
    "contoso-retail-index",
    "contoso-gaming-index",
    "knowledgesource-1nykaa-financials",
];

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";

/// Main application configuration.
///
/// This struct holds everything the CLI, the web surface and the query
/// service need to reach the remote knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .kbquery/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Retrieval provider (e.g., "azure-search")
    pub provider: String,

    /// Search service endpoint, e.g. `https://my-search.search.windows.net`
    pub search_endpoint: Option<String>,

    /// API key for the search service
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Name of the remote knowledge base
    pub knowledge_base_name: String,

    /// Knowledge sources targeted by every request, in order
    pub knowledge_sources: Vec<String>,

    /// REST API version sent with every provider call
    pub api_version: String,

    /// Deadline for one provider round trip, in seconds
    pub timeout_secs: u64,

    /// Listen address for the web surface
    pub server_address: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    provider: Option<String>,
    search: Option<SearchSection>,
    knowledge_base: Option<KnowledgeBaseSection>,
    server: Option<ServerSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSection {
    endpoint: Option<String>,
    api_key_env: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeBaseSection {
    name: Option<String>,
    sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: DEFAULT_PROVIDER.to_string(),
            search_endpoint: None,
            api_key: None,
            knowledge_base_name: DEFAULT_KNOWLEDGE_BASE.to_string(),
            knowledge_sources: DEFAULT_KNOWLEDGE_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `KBQUERY_WORKSPACE`: Override workspace path
    /// - `KBQUERY_CONFIG`: Path to config file
    /// - `KBQUERY_PROVIDER`: Retrieval provider
    /// - `KBQUERY_SEARCH_URL`: Search service endpoint
    /// - `KBQUERY_SEARCH_API_KEY`: Search service API key
    /// - `KBQUERY_KNOWLEDGE_BASE`: Knowledge base name
    /// - `KBQUERY_KNOWLEDGE_SOURCES`: Comma separated knowledge source names
    /// - `KBQUERY_API_VERSION`: REST API version
    /// - `KBQUERY_TIMEOUT_SECS`: Provider deadline
    /// - `KBQUERY_API_ADDRESS`: Web listen address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use kbquery_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Knowledge base: {}", config.knowledge_base_name);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file
    /// standing in for `KBQUERY_WORKSPACE` and `KBQUERY_CONFIG`.
    pub fn load_from(workspace: Option<&Path>, config_file: Option<&Path>) -> AppResult<Self> {
        // A missing .env is normal; a malformed one is not.
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppError::Config(format!("Failed to read .env: {}", e))),
        }

        let explicit = |path: Option<&Path>| path.map(|p| p.to_string_lossy().into_owned());

        Self::load_with(|key| match key {
            "KBQUERY_WORKSPACE" => explicit(workspace).or_else(|| std::env::var(key).ok()),
            "KBQUERY_CONFIG" => explicit(config_file).or_else(|| std::env::var(key).ok()),
            _ => std::env::var(key).ok(),
        })
    }

    /// Load configuration using `lookup` in place of the process environment.
    pub fn load_with<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = lookup("KBQUERY_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = lookup("KBQUERY_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.kbquery_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path, &lookup)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        config.apply_env(&lookup)?;

        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: &F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("KBQUERY_PROVIDER") {
            self.provider = provider;
        }

        if let Some(endpoint) = lookup("KBQUERY_SEARCH_URL") {
            self.search_endpoint = Some(endpoint);
        }

        if let Some(key) = lookup("KBQUERY_SEARCH_API_KEY") {
            self.api_key = Some(key);
        }

        if let Some(name) = lookup("KBQUERY_KNOWLEDGE_BASE") {
            self.knowledge_base_name = name;
        }

        if let Some(sources) = lookup("KBQUERY_KNOWLEDGE_SOURCES") {
            self.knowledge_sources = split_list(&sources);
        }

        if let Some(version) = lookup("KBQUERY_API_VERSION") {
            self.api_version = version;
        }

        if let Some(timeout) = lookup("KBQUERY_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "KBQUERY_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    timeout
                ))
            })?;
        }

        if let Some(address) = lookup("KBQUERY_API_ADDRESS") {
            self.server_address = address;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml<F>(&self, path: &Path, lookup: &F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(provider) = config_file.provider {
            result.provider = provider;
        }

        if let Some(search) = config_file.search {
            if let Some(endpoint) = search.endpoint {
                result.search_endpoint = Some(endpoint);
            }
            if let Some(env_var) = search.api_key_env {
                result.api_key = lookup(&env_var);
            }
            if let Some(version) = search.api_version {
                result.api_version = version;
            }
            if let Some(timeout) = search.timeout_secs {
                result.timeout_secs = timeout;
            }
        }

        if let Some(kb) = config_file.knowledge_base {
            if let Some(name) = kb.name {
                result.knowledge_base_name = name;
            }
            if let Some(sources) = kb.sources {
                result.knowledge_sources = sources;
            }
        }

        if let Some(server) = config_file.server {
            if let Some(address) = server.address {
                result.server_address = address;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        knowledge_base: Option<String>,
        timeout_secs: Option<u64>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(knowledge_base) = knowledge_base {
            self.knowledge_base_name = knowledge_base;
        }

        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .kbquery directory.
    pub fn kbquery_dir(&self) -> PathBuf {
        self.workspace.join(".kbquery")
    }

    /// Provider deadline as a `Duration`.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Validate that the provider can be reached with this configuration.
    pub fn validate(&self) -> AppResult<()> {
        let endpoint = self.search_endpoint.as_deref().unwrap_or("").trim();
        let api_key = self.api_key.as_deref().unwrap_or("").trim();

        if endpoint.is_empty() || api_key.is_empty() {
            return Err(AppError::Config(
                "Both KBQUERY_SEARCH_URL and KBQUERY_SEARCH_API_KEY must be configured."
                    .to_string(),
            ));
        }

        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(AppError::Config(format!(
                "Search endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }

        if self.knowledge_base_name.trim().is_empty() {
            return Err(AppError::Config(
                "Knowledge base name must not be empty".to_string(),
            ));
        }

        if self.knowledge_sources.is_empty() {
            return Err(AppError::Config(
                "At least one knowledge source must be configured".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(
                "Provider timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

/// Split a comma separated list, dropping blank entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid_config() -> AppConfig {
        AppConfig {
            search_endpoint: Some("https://contoso.search.windows.net".to_string()),
            api_key: Some("secret".to_string()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "azure-search");
        assert_eq!(config.knowledge_base_name, "contoso-multi-index-kb");
        assert_eq!(config.knowledge_sources.len(), 4);
        assert_eq!(config.timeout_secs, 60);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().to_string_lossy().to_string();
        let lookup = env_of(&[
            ("KBQUERY_WORKSPACE", workspace.as_str()),
            ("KBQUERY_SEARCH_URL", "https://example.search.windows.net"),
            ("KBQUERY_SEARCH_API_KEY", "k"),
            ("KBQUERY_KNOWLEDGE_SOURCES", "a, b,,c"),
            ("KBQUERY_TIMEOUT_SECS", "5"),
        ]);

        let config = AppConfig::load_with(lookup).unwrap();
        assert_eq!(
            config.search_endpoint.as_deref(),
            Some("https://example.search.windows.net")
        );
        assert_eq!(config.knowledge_sources, vec!["a", "b", "c"]);
        assert_eq!(config.timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout_env_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().to_string_lossy().to_string();
        let lookup = env_of(&[
            ("KBQUERY_WORKSPACE", workspace.as_str()),
            ("KBQUERY_TIMEOUT_SECS", "soon"),
        ]);

        let err = AppConfig::load_with(lookup).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_yaml_config_then_env_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let kb_dir = dir.path().join(".kbquery");
        std::fs::create_dir_all(&kb_dir).unwrap();
        std::fs::write(
            kb_dir.join("config.yaml"),
            r#"
search:
  endpoint: https://yaml.search.windows.net
  apiKeyEnv: MY_SEARCH_KEY
  timeoutSecs: 12
knowledgeBase:
  name: yaml-kb
  sources: [one, two]
server:
  address: 0.0.0.0:9000
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let workspace = dir.path().to_string_lossy().to_string();
        let lookup = env_of(&[
            ("KBQUERY_WORKSPACE", workspace.as_str()),
            ("MY_SEARCH_KEY", "from-yaml-env"),
            ("KBQUERY_KNOWLEDGE_BASE", "env-kb"),
        ]);

        let config = AppConfig::load_with(lookup).unwrap();
        assert_eq!(
            config.search_endpoint.as_deref(),
            Some("https://yaml.search.windows.net")
        );
        assert_eq!(config.api_key.as_deref(), Some("from-yaml-env"));
        assert_eq!(config.knowledge_base_name, "env-kb");
        assert_eq!(config.knowledge_sources, vec!["one", "two"]);
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.server_address, "0.0.0.0:9000");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
    }

    #[test]
    fn test_explicit_missing_config_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = dir.path().to_string_lossy().to_string();
        let missing = dir.path().join("nope.yaml").to_string_lossy().to_string();
        let lookup = env_of(&[
            ("KBQUERY_WORKSPACE", workspace.as_str()),
            ("KBQUERY_CONFIG", missing.as_str()),
        ]);

        assert!(AppConfig::load_with(lookup).is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("other-kb".to_string()),
            Some(3),
            None,
            true,
            false,
        );

        assert_eq!(overridden.knowledge_base_name, "other-kb");
        assert_eq!(overridden.timeout_secs, 3);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_requires_endpoint_and_key() {
        let config = AppConfig::default();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = valid_config();
        config.api_key = Some("   ".to_string());
        assert!(config.validate().is_err());

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_no_sources() {
        let mut config = valid_config();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.knowledge_sources.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let json = serde_json::to_string(&valid_config()).unwrap();
        assert!(!json.contains("secret"));
    }
}
