use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{error::SearchError, mock::NameCasing, place::PlaceSearch};

use super::{CityResolver, ResolvedCity, ResolverMode, non_blank};

/// Resolves names through the place-search service and uses the first
/// settlement-like hit as the canonical name.
#[derive(Debug, Clone)]
pub struct ValidatedResolver {
    places: Arc<dyn PlaceSearch>,
    limit: usize,
}

impl ValidatedResolver {
    pub fn new(places: Arc<dyn PlaceSearch>, limit: usize) -> Self {
        Self {
            places,
            limit: limit.max(1),
        }
    }
}

#[async_trait]
impl CityResolver for ValidatedResolver {
    fn mode(&self) -> ResolverMode {
        ResolverMode::Validated
    }

    async fn resolve(&self, query: &str) -> Result<ResolvedCity, SearchError> {
        let query = non_blank(query)?;

        // Weather searches are never cancelled; only suggestion lookups are.
        let candidates = self
            .places
            .search(query, self.limit, &CancellationToken::new())
            .await
            .map_err(|e| {
                tracing::warn!("City validation for {query:?} failed: {e}");
                SearchError::ValidationTransport(e)
            })?;

        let name = candidates
            .iter()
            .filter(|c| c.is_settlement())
            .map(|c| c.canonical_name())
            .find(|name| !name.is_empty())
            .ok_or_else(|| SearchError::CityNotFound(query.to_string()))?;

        tracing::info!("Resolved {query:?} to {name:?}");

        Ok(ResolvedCity {
            name: name.to_string(),
            casing: NameCasing::PreserveRest,
        })
    }
}
