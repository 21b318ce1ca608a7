//! As-you-type city suggestions.
//!
//! [`SuggestionFeed`] runs in its own task. Every query update restarts a
//! quiescence timer; only when the input has been stable for the whole window
//! is a lookup issued. Issuing a lookup cancels the one still in flight, and
//! results are tagged with a generation so that anything but the latest
//! request is dropped.

use async_trait::async_trait;
use std::{collections::HashSet, convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tokio_util::sync::CancellationToken;

use crate::{
    Config,
    error::PlaceSearchError,
    place::{NominatimClient, PlaceSearch},
};

/// Well-known cities offered by the offline source.
pub const POPULAR_CITIES: &[&str] = &[
    "New York",
    "London",
    "Paris",
    "Tokyo",
    "Sydney",
    "Los Angeles",
    "Chicago",
    "Miami",
    "Berlin",
    "Amsterdam",
    "Barcelona",
    "Rome",
    "Moscow",
    "Dubai",
    "Singapore",
    "Hong Kong",
    "Toronto",
    "Vancouver",
    "Montreal",
    "Mumbai",
    "Delhi",
    "Bangkok",
    "Seoul",
    "Beijing",
    "Madrid",
    "Vienna",
    "Stockholm",
];

/// Candidates requested from the place search per live lookup.
const LIVE_FETCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionSourceKind {
    Popular,
    Live,
}

impl SuggestionSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionSourceKind::Popular => "popular",
            SuggestionSourceKind::Live => "live",
        }
    }

    pub const fn all() -> &'static [SuggestionSourceKind] {
        &[SuggestionSourceKind::Popular, SuggestionSourceKind::Live]
    }

    pub fn default_settings(&self) -> SuggestionSettings {
        match self {
            SuggestionSourceKind::Popular => SuggestionSettings {
                debounce: Duration::from_millis(300),
                min_query_len: 2,
                max_results: 5,
            },
            SuggestionSourceKind::Live => SuggestionSettings {
                debounce: Duration::from_millis(500),
                min_query_len: 3,
                max_results: 8,
            },
        }
    }
}

impl std::fmt::Display for SuggestionSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SuggestionSourceKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "popular" => Ok(SuggestionSourceKind::Popular),
            "live" => Ok(SuggestionSourceKind::Live),
            _ => Err(anyhow::anyhow!(
                "Unknown suggestion source '{value}'. Supported sources: popular, live."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionSettings {
    /// Quiescence window before a lookup fires.
    pub debounce: Duration,
    /// Shorter queries clear the list instead of triggering a lookup.
    pub min_query_len: usize,
    pub max_results: usize,
}

#[async_trait]
pub trait SuggestionSource: Send + Sync + Debug {
    async fn suggest(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PlaceSearchError>;
}

/// Case-insensitive substring match against [`POPULAR_CITIES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PopularCities;

#[async_trait]
impl SuggestionSource for PopularCities {
    async fn suggest(
        &self,
        query: &str,
        limit: usize,
        _cancel: &CancellationToken,
    ) -> Result<Vec<String>, PlaceSearchError> {
        let needle = query.trim().to_lowercase();

        Ok(POPULAR_CITIES
            .iter()
            .filter(|city| city.to_lowercase().contains(&needle))
            .take(limit)
            .map(|city| city.to_string())
            .collect())
    }
}

/// Canonical names of settlement hits from the place search.
#[derive(Debug, Clone)]
pub struct LiveSuggestions {
    places: Arc<dyn PlaceSearch>,
}

impl LiveSuggestions {
    pub fn new(places: Arc<dyn PlaceSearch>) -> Self {
        Self { places }
    }
}

#[async_trait]
impl SuggestionSource for LiveSuggestions {
    async fn suggest(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, PlaceSearchError> {
        let candidates = self
            .places
            .search(query.trim(), LIVE_FETCH_LIMIT, cancel)
            .await?;

        let mut seen = HashSet::new();
        Ok(candidates
            .iter()
            .filter(|c| c.is_settlement())
            .map(|c| c.canonical_name())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.to_string()))
            .take(limit)
            .map(str::to_string)
            .collect())
    }
}

/// Build the configured source and its effective settings.
pub fn suggestion_source_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn SuggestionSource>, SuggestionSettings)> {
    let kind = config.suggestion_source()?;
    let defaults = kind.default_settings();
    let overrides = &config.suggestions;

    let settings = SuggestionSettings {
        debounce: overrides
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce),
        min_query_len: overrides.min_query_len.unwrap_or(defaults.min_query_len),
        max_results: overrides.max_results.unwrap_or(defaults.max_results),
    };

    let source: Arc<dyn SuggestionSource> = match kind {
        SuggestionSourceKind::Popular => Arc::new(PopularCities),
        SuggestionSourceKind::Live => Arc::new(LiveSuggestions::new(Arc::new(
            NominatimClient::new(&config.place_search)?,
        ))),
    };

    Ok((source, settings))
}

/// The latest suggestion list and the query it answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub query: String,
    pub names: Vec<String>,
}

type Finished = (u64, String, Result<Vec<String>, PlaceSearchError>);

/// Debounced, self-cancelling suggestion lookups.
#[derive(Debug)]
pub struct SuggestionFeed {
    input: mpsc::UnboundedSender<String>,
    output: watch::Receiver<Suggestions>,
    task: JoinHandle<()>,
}

impl SuggestionFeed {
    /// Start the feed on the current tokio runtime.
    pub fn spawn(source: Arc<dyn SuggestionSource>, settings: SuggestionSettings) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let (tx, output) = watch::channel(Suggestions::default());
        let task = tokio::spawn(run_feed(source, settings, rx, tx));

        Self {
            input,
            output,
            task,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (source, settings) = suggestion_source_from_config(config)?;
        Ok(Self::spawn(source, settings))
    }

    /// Report that the query text changed.
    pub fn update(&self, query: &str) {
        if self.input.send(query.to_string()).is_err() {
            tracing::debug!("Suggestion feed has stopped; ignoring update");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.output.clone()
    }

    pub fn latest(&self) -> Suggestions {
        self.output.borrow().clone()
    }

    /// Stop accepting updates, cancel any lookup and wait for the task.
    pub async fn shutdown(self) {
        drop(self.input);
        if let Err(e) = self.task.await {
            tracing::warn!("Suggestion feed task failed: {e}");
        }
    }
}

async fn run_feed(
    source: Arc<dyn SuggestionSource>,
    settings: SuggestionSettings,
    mut input: mpsc::UnboundedReceiver<String>,
    output: watch::Sender<Suggestions>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Finished>();
    let mut generation: u64 = 0;
    let mut in_flight: Option<CancellationToken> = None;
    let mut pending: Option<(String, Instant)> = None;

    loop {
        let deadline = pending.as_ref().map(|(_, at)| *at);

        tokio::select! {
            next = input.recv() => {
                let Some(query) = next else { break };

                if query.trim().chars().count() < settings.min_query_len {
                    // Too short: drop whatever is scheduled or running.
                    pending = None;
                    generation += 1;
                    if let Some(token) = in_flight.take() {
                        token.cancel();
                    }
                    output.send_replace(Suggestions { query, names: Vec::new() });
                } else {
                    pending = Some((query, Instant::now() + settings.debounce));
                }
            }

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let Some((query, _)) = pending.take() else { continue };

                if let Some(token) = in_flight.take() {
                    tracing::trace!("Aborting superseded suggestion lookup");
                    token.cancel();
                }

                generation += 1;
                let token = CancellationToken::new();
                in_flight = Some(token.clone());

                tracing::debug!("Suggestion lookup #{generation} for {query:?}");

                let source = Arc::clone(&source);
                let done = done_tx.clone();
                let issued = generation;
                let limit = settings.max_results;
                tokio::spawn(async move {
                    let result = source.suggest(&query, limit, &token).await;
                    let _ = done.send((issued, query, result));
                });
            }

            Some((issued, query, result)) = done_rx.recv() => {
                if issued != generation {
                    tracing::trace!("Discarding stale suggestions #{issued} for {query:?}");
                    continue;
                }
                in_flight = None;

                match result {
                    Ok(names) => {
                        output.send_replace(Suggestions { query, names });
                    }
                    Err(e) if e.is_aborted() => {}
                    Err(e) => {
                        tracing::warn!("Suggestion lookup for {query:?} failed: {e}");
                        output.send_replace(Suggestions { query, names: Vec::new() });
                    }
                }
            }
        }
    }

    if let Some(token) = in_flight {
        token.cancel();
    }
}
