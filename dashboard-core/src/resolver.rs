use crate::{
    Config,
    error::SearchError,
    mock::NameCasing,
    place::{NominatimClient, PlaceSearch},
    resolver::{mock::MockResolver, validated::ValidatedResolver},
    session::FailurePolicy,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod mock;
pub mod validated;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverMode {
    /// Accept any non-blank name as typed.
    Mock,
    /// Check the name against the place-search service.
    Validated,
}

impl ResolverMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverMode::Mock => "mock",
            ResolverMode::Validated => "validated",
        }
    }

    pub const fn all() -> &'static [ResolverMode] {
        &[ResolverMode::Mock, ResolverMode::Validated]
    }

    /// Mock searches keep the last good report on failure; validated ones drop it.
    pub fn default_failure_policy(&self) -> FailurePolicy {
        match self {
            ResolverMode::Mock => FailurePolicy::Retain,
            ResolverMode::Validated => FailurePolicy::Clear,
        }
    }
}

impl std::fmt::Display for ResolverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ResolverMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "mock" => Ok(ResolverMode::Mock),
            "validated" => Ok(ResolverMode::Validated),
            _ => Err(anyhow::anyhow!(
                "Unknown resolver '{value}'. Supported resolvers: mock, validated."
            )),
        }
    }
}

/// A city name the resolver accepted, plus how it should be capitalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCity {
    pub name: String,
    pub casing: NameCasing,
}

#[async_trait]
pub trait CityResolver: Send + Sync + Debug {
    fn mode(&self) -> ResolverMode;

    /// Turn free text into a city name, or explain why it can't be used.
    async fn resolve(&self, query: &str) -> Result<ResolvedCity, SearchError>;
}

/// Trim `query`, rejecting blank input.
pub(crate) fn non_blank(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(SearchError::EmptyCityName)
    } else {
        Ok(trimmed)
    }
}

/// Construct a resolver for an explicit mode.
pub fn resolver_from_config(
    mode: ResolverMode,
    config: &Config,
) -> anyhow::Result<Box<dyn CityResolver>> {
    let boxed: Box<dyn CityResolver> = match mode {
        ResolverMode::Mock => Box::new(MockResolver),
        ResolverMode::Validated => {
            let places: Arc<dyn PlaceSearch> =
                Arc::new(NominatimClient::new(&config.place_search)?);
            Box::new(ValidatedResolver::new(
                places,
                config.place_search.candidate_limit,
            ))
        }
    };

    Ok(boxed)
}

/// Construct the resolver named by the config's `resolver` field.
pub fn default_resolver_from_config(config: &Config) -> anyhow::Result<Box<dyn CityResolver>> {
    let mode = config.resolver_mode()?;
    resolver_from_config(mode, config)
}
