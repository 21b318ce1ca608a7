use async_trait::async_trait;

use crate::{error::SearchError, mock::NameCasing};

use super::{CityResolver, ResolvedCity, ResolverMode, non_blank};

/// Reserved name that never resolves.
const NOT_FOUND_SENTINEL: &str = "notfound";

/// Accepts any non-blank name without a lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockResolver;

#[async_trait]
impl CityResolver for MockResolver {
    fn mode(&self) -> ResolverMode {
        ResolverMode::Mock
    }

    async fn resolve(&self, query: &str) -> Result<ResolvedCity, SearchError> {
        let name = non_blank(query)?;

        if name.eq_ignore_ascii_case(NOT_FOUND_SENTINEL) {
            return Err(SearchError::CityNotFound(name.to_string()));
        }

        Ok(ResolvedCity {
            name: name.to_string(),
            casing: NameCasing::LowerRest,
        })
    }
}
