// ============================================================================
// File: src/config.rs
// Environment-backed configuration and validation
// ============================================================================

use std::env;
use std::fmt;

use thiserror::Error;

/// Model used when `MODEL_NAME` is not set
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash-lite-preview-09-2025";

/// Base URL of the Gemini REST API
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Custom Search JSON API endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Number of search results requested per query
pub const DEFAULT_NUM_RESULTS: u8 = 5;

/// The search API refuses `num` values above this
pub const MAX_NUM_RESULTS: u8 = 10;

// Candidate variable names, first non-empty value wins.
const GEMINI_KEY_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];
const SEARCH_KEY_VARS: &[&str] = &["GOOGLE_CSE_API_KEY", "GOOGLE_API_KEY"];
const SEARCH_ENGINE_VARS: &[&str] = &["GOOGLE_CSE_CX", "GOOGLE_CSE_ID"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY (or GEMINI_API_KEY) not found in environment")]
    MissingGeminiKey,

    #[error("GOOGLE_CSE_API_KEY and GOOGLE_CSE_CX (or GOOGLE_CSE_ID) must both be set to search")]
    MissingSearchCredentials,

    #[error("number of search results must be between 1 and 10, got {0}")]
    InvalidNumResults(u8),
}

/// Key and engine id for the Custom Search API. Only exists when both are set.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

/// Everything the agent needs, resolved once at startup
#[derive(Clone)]
pub struct Config {
    /// Gemini API key; `None` means only search-only commands can run
    pub gemini_api_key: Option<String>,

    /// Gemini model name, e.g. "models/gemini-2.5-flash"
    pub model_name: String,

    /// Gemini REST base URL (overridable for testing)
    pub gemini_base_url: String,

    /// Search credentials; `None` disables web search for the session
    pub search: Option<SearchCredentials>,

    /// Custom Search endpoint (overridable for testing)
    pub search_endpoint: String,

    /// Results requested per search (1..=10)
    pub num_results: u8,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("search", &self.search)
            .field("search_endpoint", &self.search_endpoint)
            .field("num_results", &self.num_results)
            .finish()
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let search_key = first_non_empty(&lookup, SEARCH_KEY_VARS);
        let engine_id = first_non_empty(&lookup, SEARCH_ENGINE_VARS);

        let search = match (search_key, engine_id) {
            (Some(api_key), Some(engine_id)) => Some(SearchCredentials { api_key, engine_id }),
            _ => None,
        };

        Self {
            gemini_api_key: first_non_empty(&lookup, GEMINI_KEY_VARS),
            model_name: first_non_empty(&lookup, &["MODEL_NAME"])
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: first_non_empty(&lookup, &["GEMINI_API_BASE"])
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            search,
            search_endpoint: first_non_empty(&lookup, &["GOOGLE_CSE_ENDPOINT"])
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            num_results: DEFAULT_NUM_RESULTS,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_results == 0 || self.num_results > MAX_NUM_RESULTS {
            return Err(ConfigError::InvalidNumResults(self.num_results));
        }
        Ok(())
    }

    pub fn require_gemini_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(ConfigError::MissingGeminiKey)
    }

    pub fn require_search(&self) -> Result<&SearchCredentials, ConfigError> {
        self.search
            .as_ref()
            .ok_or(ConfigError::MissingSearchCredentials)
    }
}

fn first_non_empty<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_with(&[]);

        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.model_name, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.num_results, DEFAULT_NUM_RESULTS);
        assert!(config.search.is_none());
        assert_eq!(config.require_gemini_key(), Err(ConfigError::MissingGeminiKey));
    }

    #[test]
    fn test_google_api_key_wins_over_gemini_api_key() {
        let config = config_with(&[("GOOGLE_API_KEY", "google"), ("GEMINI_API_KEY", "gemini")]);
        assert_eq!(config.require_gemini_key(), Ok("google"));

        let config = config_with(&[("GOOGLE_API_KEY", ""), ("GEMINI_API_KEY", "gemini")]);
        assert_eq!(config.require_gemini_key(), Ok("gemini"));
    }

    #[test]
    fn test_search_key_falls_back_to_google_api_key() {
        let config = config_with(&[("GOOGLE_API_KEY", "shared"), ("GOOGLE_CSE_CX", "engine")]);

        let search = config.require_search().unwrap();
        assert_eq!(search.api_key, "shared");
        assert_eq!(search.engine_id, "engine");
    }

    #[test]
    fn test_cse_cx_wins_over_cse_id() {
        let config = config_with(&[
            ("GOOGLE_CSE_API_KEY", "cse"),
            ("GOOGLE_CSE_CX", "cx"),
            ("GOOGLE_CSE_ID", "id"),
        ]);
        assert_eq!(config.require_search().unwrap().engine_id, "cx");

        let config = config_with(&[("GOOGLE_CSE_API_KEY", "cse"), ("GOOGLE_CSE_ID", "id")]);
        assert_eq!(config.require_search().unwrap().engine_id, "id");
    }

    #[test]
    fn test_search_disabled_without_engine_id() {
        let config = config_with(&[("GOOGLE_CSE_API_KEY", "cse")]);
        assert_eq!(
            config.require_search(),
            Err(ConfigError::MissingSearchCredentials)
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_result_count() {
        let mut config = config_with(&[]);
        assert!(config.validate().is_ok());

        config.num_results = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidNumResults(0)));

        config.num_results = 11;
        assert_eq!(config.validate(), Err(ConfigError::InvalidNumResults(11)));
    }

    #[test]
    fn test_debug_output_hides_keys() {
        let config = config_with(&[
            ("GOOGLE_API_KEY", "secret-llm"),
            ("GOOGLE_CSE_API_KEY", "secret-cse"),
            ("GOOGLE_CSE_CX", "engine"),
        ]);
        let printed = format!("{:?}", config);

        assert!(!printed.contains("secret-llm"));
        assert!(!printed.contains("secret-cse"));
        assert!(printed.contains("engine"));
    }
}
