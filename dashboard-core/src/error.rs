use thiserror::Error;

/// Failures of a weather search. The `Display` text is what the session shows
/// as its error message.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please enter a city name")]
    EmptyCityName,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Could not validate the city right now. Please try again.")]
    ValidationTransport(#[source] PlaceSearchError),
}

/// Failures of a single place-search lookup.
#[derive(Debug, Error)]
pub enum PlaceSearchError {
    #[error("Place search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Place search returned status {0}")]
    Status(u16),

    #[error("Place search response could not be parsed: {0}")]
    Parse(String),

    /// The lookup was superseded and cancelled before it finished.
    #[error("Place search was aborted")]
    Aborted,
}

impl PlaceSearchError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
