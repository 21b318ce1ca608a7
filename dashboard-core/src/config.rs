use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    history::DEFAULT_HISTORY_CAPACITY,
    resolver::ResolverMode,
    session::FailurePolicy,
    suggest::SuggestionSourceKind,
};

/// Connection settings for the place-search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceSearchConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// How many candidates the validating resolver asks for.
    pub candidate_limit: usize,
}

impl Default for PlaceSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("weather-dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            candidate_limit: 10,
        }
    }
}

/// Settings for the as-you-type suggestion list. Unset values fall back to
/// the defaults of the chosen source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// "popular" or "live".
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_query_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            source: SuggestionSourceKind::Popular.as_str().to_string(),
            debounce_ms: None,
            min_query_len: None,
            max_results: None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// resolver = "validated"
/// on_failure = "clear"
///
/// [suggestions]
/// source = "live"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// "mock" or "validated".
    pub resolver: String,

    /// "retain" or "clear". When absent the resolver mode decides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<String>,

    pub history_capacity: usize,

    pub place_search: PlaceSearchConfig,

    pub suggestions: SuggestionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver: ResolverMode::Mock.as_str().to_string(),
            on_failure: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            place_search: PlaceSearchConfig::default(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl Config {
    /// Return the resolver mode as a strongly-typed value.
    pub fn resolver_mode(&self) -> Result<ResolverMode> {
        ResolverMode::try_from(self.resolver.as_str())
    }

    pub fn set_resolver_mode(&mut self, mode: ResolverMode) {
        self.resolver = mode.as_str().to_string();
    }

    /// Failure policy from `on_failure`, falling back to the resolver's default.
    pub fn failure_policy(&self) -> Result<FailurePolicy> {
        match &self.on_failure {
            Some(s) => FailurePolicy::try_from(s.as_str()),
            None => Ok(self.resolver_mode()?.default_failure_policy()),
        }
    }

    pub fn set_failure_policy(&mut self, policy: FailurePolicy) {
        self.on_failure = Some(policy.as_str().to_string());
    }

    pub fn suggestion_source(&self) -> Result<SuggestionSourceKind> {
        SuggestionSourceKind::try_from(self.suggestions.source.as_str())
    }

    pub fn set_suggestion_source(&mut self, kind: SuggestionSourceKind) {
        self.suggestions.source = kind.as_str().to_string();
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;

        // Surface typos at load time rather than on first search.
        cfg.resolver_mode()?;
        cfg.failure_policy()?;
        cfg.suggestion_source()?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
