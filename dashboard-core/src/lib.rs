//! Core library for the `weather-dashboard` CLI.
//!
//! This crate defines:
//! - City resolution, either accepted as typed or validated against a place search
//! - Deterministic mock weather and outfit advice
//! - The search session (current report, recent history, status) and its controller
//! - Debounced, cancellable city suggestions
//! - Configuration handling
//!
//! It is used by `dashboard-cli`, but can also be driven by other front-ends.

pub mod config;
pub mod error;
pub mod history;
pub mod mock;
pub mod model;
pub mod outfit;
pub mod place;
pub mod resolver;
pub mod session;
pub mod suggest;

pub use config::{Config, PlaceSearchConfig, SuggestionConfig};
pub use error::{PlaceSearchError, SearchError};
pub use history::RecentHistory;
pub use model::{Condition, OutfitAdvice, Report, WeatherSnapshot};
pub use resolver::{CityResolver, ResolverMode};
pub use session::{FailurePolicy, SearchSession, SessionController, Status};
pub use suggest::{SuggestionFeed, SuggestionSourceKind, Suggestions};
