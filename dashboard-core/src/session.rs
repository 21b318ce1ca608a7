//! Search session state and the controller that owns it.
//!
//! All mutation goes through [`SessionController`]. Observers get a copy of
//! the session after every transition through a `watch` channel.

use serde::Serialize;
use std::convert::TryFrom;
use tokio::sync::watch;

use crate::{
    Config,
    error::SearchError,
    history::RecentHistory,
    mock,
    model::{OutfitAdvice, Report, WeatherSnapshot},
    outfit,
    resolver::{CityResolver, default_resolver_from_config},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Loading,
    Error,
}

/// What happens to the displayed report when a search fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep showing the previous report next to the error.
    Retain,
    /// Drop the previous report; only the error is shown.
    Clear,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Retain => "retain",
            FailurePolicy::Clear => "clear",
        }
    }

    pub const fn all() -> &'static [FailurePolicy] {
        &[FailurePolicy::Retain, FailurePolicy::Clear]
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FailurePolicy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "retain" => Ok(FailurePolicy::Retain),
            "clear" => Ok(FailurePolicy::Clear),
            _ => Err(anyhow::anyhow!(
                "Unknown failure policy '{value}'. Supported policies: retain, clear."
            )),
        }
    }
}

/// Everything the presentation layer needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSession {
    /// Weather and outfit are stored together so one never shows without the other.
    pub report: Option<Report>,
    pub history: RecentHistory,
    pub status: Status,
    pub error_message: String,
}

impl SearchSession {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            report: None,
            history: RecentHistory::new(history_capacity),
            status: Status::Idle,
            error_message: String::new(),
        }
    }

    pub fn current_weather(&self) -> Option<&WeatherSnapshot> {
        self.report.as_ref().map(|r| &r.weather)
    }

    pub fn outfit_advice(&self) -> Option<&OutfitAdvice> {
        self.report.as_ref().map(|r| &r.outfit)
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }
}

/// Resolve, generate and advise. Any failure aborts the chain.
pub async fn search_report(
    resolver: &dyn CityResolver,
    query: &str,
) -> Result<Report, SearchError> {
    let city = resolver.resolve(query).await?;
    let weather = mock::mock_weather(&city.name, city.casing);
    let outfit = outfit::advise(&weather);

    Ok(Report { weather, outfit })
}

#[derive(Debug)]
pub struct SessionController {
    resolver: Box<dyn CityResolver>,
    policy: FailurePolicy,
    session: SearchSession,
    updates: watch::Sender<SearchSession>,
}

impl SessionController {
    pub fn new(
        resolver: Box<dyn CityResolver>,
        policy: FailurePolicy,
        history_capacity: usize,
    ) -> Self {
        let session = SearchSession::new(history_capacity);
        let (updates, _) = watch::channel(session.clone());

        Self {
            resolver,
            policy,
            session,
            updates,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let resolver = default_resolver_from_config(config)?;
        let policy = config.failure_policy()?;

        Ok(Self::new(resolver, policy, config.history_capacity))
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn resolver(&self) -> &dyn CityResolver {
        self.resolver.as_ref()
    }

    /// Receive a copy of the session after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SearchSession> {
        self.updates.subscribe()
    }

    /// Run one search to completion. Blank queries are ignored.
    pub async fn submit(&mut self, query: &str) -> &SearchSession {
        let Some(query) = self.begin(query) else {
            return &self.session;
        };

        let outcome = search_report(self.resolver.as_ref(), &query).await;
        self.finish(outcome);

        &self.session
    }

    /// Picking a suggestion or a history entry is the same as typing it.
    pub async fn select_suggestion(&mut self, name: &str) -> &SearchSession {
        self.submit(name).await
    }

    /// Enter the loading state. Returns the trimmed query, or `None` (and
    /// leaves the session untouched) when the query is blank.
    pub fn begin(&mut self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("Ignoring blank search");
            return None;
        }

        tracing::debug!("Searching for {query:?}");
        self.session.status = Status::Loading;
        self.session.error_message.clear();
        self.publish();

        Some(query.to_string())
    }

    /// Apply the outcome of a search started with [`Self::begin`].
    pub fn finish(&mut self, outcome: Result<Report, SearchError>) {
        match outcome {
            Ok(report) => {
                tracing::debug!("Search succeeded for {}", report.weather.city);
                self.session.history.record(&report.weather.city);
                self.session.report = Some(report);
                self.session.status = Status::Idle;
                self.session.error_message.clear();
            }
            Err(e) => {
                tracing::debug!("Search failed: {e}");
                if self.policy == FailurePolicy::Clear {
                    self.session.report = None;
                }
                self.session.status = Status::Error;
                self.session.error_message = e.to_string();
            }
        }

        self.publish();
    }

    /// Dismiss the current error without touching weather or history.
    pub fn clear_error(&mut self) {
        if self.session.status == Status::Error {
            self.session.status = Status::Idle;
        }
        self.session.error_message.clear();
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.session.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mock::NameCasing,
        model::Condition,
        resolver::{ResolvedCity, ResolverMode, mock::MockResolver},
    };
    use async_trait::async_trait;

    /// Accepts everything except "nowhere", preserving case like a real lookup.
    #[derive(Debug)]
    struct StrictResolver;

    #[async_trait]
    impl CityResolver for StrictResolver {
        fn mode(&self) -> ResolverMode {
            ResolverMode::Validated
        }

        async fn resolve(&self, query: &str) -> Result<ResolvedCity, SearchError> {
            let query = query.trim();
            if query.is_empty() {
                return Err(SearchError::EmptyCityName);
            }
            if query == "nowhere" {
                return Err(SearchError::CityNotFound(query.to_string()));
            }
            Ok(ResolvedCity {
                name: query.to_string(),
                casing: NameCasing::PreserveRest,
            })
        }
    }

    fn mock_controller() -> SessionController {
        SessionController::new(Box::new(MockResolver), FailurePolicy::Retain, 5)
    }

    #[tokio::test]
    async fn success_sets_report_and_history() {
        let mut ctl = mock_controller();
        let session = ctl.submit("paris").await;

        assert_eq!(session.status, Status::Idle);
        assert!(session.error_message.is_empty());
        let weather = session.current_weather().expect("weather");
        assert_eq!(weather.city, "Paris");
        assert_eq!(weather.condition, Condition::Snowy);
        assert_eq!(session.outfit_advice(), Some(&outfit::advise(weather)));
        assert_eq!(session.history.entries(), ["Paris"]);
    }

    #[tokio::test]
    async fn blank_query_changes_nothing() {
        let mut ctl = mock_controller();
        ctl.submit("notfound").await;
        let before = ctl.session().clone();

        let mut updates = ctl.subscribe();
        updates.borrow_and_update();

        for query in ["", "   "] {
            assert!(ctl.begin(query).is_none());
            ctl.submit(query).await;
        }

        assert_eq!(ctl.session(), &before);
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn begin_enters_loading_and_clears_error() {
        let mut ctl = mock_controller();
        ctl.submit("notfound").await;
        assert_eq!(ctl.session().status, Status::Error);

        let updates = ctl.subscribe();
        let query = ctl.begin("  rome ");

        assert_eq!(query.as_deref(), Some("rome"));
        assert!(ctl.session().is_loading());
        assert!(ctl.session().error_message.is_empty());
        assert_eq!(updates.borrow().status, Status::Loading);
    }

    #[tokio::test]
    async fn history_keeps_five_unique_most_recent_first() {
        let mut ctl = mock_controller();
        for city in ["paris", "london", "tokyo", "rome", "oslo", "lima"] {
            ctl.submit(city).await;
        }
        assert_eq!(
            ctl.session().history.entries(),
            ["Lima", "Oslo", "Rome", "Tokyo", "London"]
        );

        ctl.submit("TOKYO").await;
        assert_eq!(
            ctl.session().history.entries(),
            ["Tokyo", "Lima", "Oslo", "Rome", "London"]
        );
    }

    #[tokio::test]
    async fn not_found_retains_previous_report() {
        let mut ctl = mock_controller();
        ctl.submit("paris").await;
        let previous = ctl.session().report.clone();

        let session = ctl.submit("NotFound").await;

        assert_eq!(session.status, Status::Error);
        assert!(session.error_message.contains("not found"));
        assert_eq!(session.report, previous);
        assert_eq!(session.history.entries(), ["Paris"]);
    }

    #[tokio::test]
    async fn clear_policy_drops_report_on_failure() {
        let mut ctl = SessionController::new(Box::new(StrictResolver), FailurePolicy::Clear, 5);
        ctl.submit("São Paulo").await;
        assert_eq!(
            ctl.session().current_weather().map(|w| w.city.as_str()),
            Some("São Paulo")
        );

        let session = ctl.submit("nowhere").await;

        assert_eq!(session.status, Status::Error);
        assert_eq!(session.error_message, "City not found: nowhere");
        assert!(session.current_weather().is_none());
        assert!(session.outfit_advice().is_none());
        assert_eq!(session.history.entries(), ["São Paulo"]);
    }

    #[tokio::test]
    async fn select_suggestion_is_submit() {
        let mut a = mock_controller();
        let mut b = mock_controller();

        a.submit("Berlin").await;
        b.select_suggestion("Berlin").await;

        assert_eq!(a.session(), b.session());
    }

    #[tokio::test]
    async fn clear_error_keeps_report() {
        let mut ctl = mock_controller();
        ctl.submit("paris").await;
        ctl.submit("notfound").await;

        ctl.clear_error();

        assert_eq!(ctl.session().status, Status::Idle);
        assert!(ctl.session().error_message.is_empty());
        assert!(ctl.session().report.is_some());
    }

    #[tokio::test]
    async fn subscribers_see_final_state() {
        let mut ctl = mock_controller();
        let mut updates = ctl.subscribe();

        ctl.submit("london").await;

        assert!(updates.has_changed().unwrap());
        let seen = updates.borrow_and_update();
        assert_eq!(seen.status, Status::Idle);
        assert_eq!(seen.history.entries(), ["London"]);
    }

    #[test]
    fn failure_policy_parse() {
        for policy in FailurePolicy::all() {
            assert_eq!(FailurePolicy::try_from(policy.as_str()).unwrap(), *policy);
        }
        assert!(FailurePolicy::try_from("forget").is_err());
    }
}
