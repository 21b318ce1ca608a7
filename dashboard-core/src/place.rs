//! Text search against an external place database (Nominatim / OpenStreetMap).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{config::PlaceSearchConfig, error::PlaceSearchError};

/// Place types accepted as a city-like match.
const SETTLEMENT_TYPES: &[&str] = &[
    "city",
    "town",
    "village",
    "hamlet",
    "municipality",
    "county",
    "state",
    "region",
    "province",
    "island",
    "country",
    "suburb",
    "locality",
    "administrative",
];

/// One search hit, already validated at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCandidate {
    pub display_name: String,
    /// Coarse classification, e.g. "place" or "boundary".
    pub class: String,
    /// Finer type tag, e.g. "city" or "administrative".
    pub kind: String,
}

impl PlaceCandidate {
    /// Whether this hit names an inhabited place or an administrative area.
    pub fn is_settlement(&self) -> bool {
        let is_place = self.class == "place";
        let allowed_type = SETTLEMENT_TYPES.contains(&self.kind.as_str());
        let admin_boundary = self.class == "boundary"
            && (self.kind == "administrative" || self.kind == "political");

        is_place || allowed_type || admin_boundary
    }

    /// The part of the display name before the first comma, trimmed.
    pub fn canonical_name(&self) -> &str {
        self.display_name
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

#[async_trait]
pub trait PlaceSearch: Send + Sync + Debug {
    /// Look up at most `limit` candidates for `query`. Returns
    /// [`PlaceSearchError::Aborted`] once `cancel` fires.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlaceCandidate>, PlaceSearchError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    class: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Parse a Nominatim `format=json` search body into candidates.
pub fn parse_candidates(body: &str) -> Result<Vec<PlaceCandidate>, PlaceSearchError> {
    let raw: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| PlaceSearchError::Parse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .map(|p| PlaceCandidate {
            display_name: p.display_name,
            class: p.class,
            kind: p.kind,
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    http: Client,
}

impl NominatimClient {
    pub fn new(config: &PlaceSearchConfig) -> Result<Self, PlaceSearchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, PlaceSearchError> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("format", "json"),
                ("addressdetails", "0"),
                ("limit", limit.as_str()),
                ("q", query),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!("Place search for {query:?} returned status {status}");
            return Err(PlaceSearchError::Status(status.as_u16()));
        }

        let body = res.text().await?;
        let candidates = parse_candidates(&body)?;
        tracing::debug!("Place search for {query:?} returned {} candidates", candidates.len());

        Ok(candidates)
    }
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlaceCandidate>, PlaceSearchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(PlaceSearchError::Aborted),
            result = self.fetch(query, limit) => result,
        }
    }
}
