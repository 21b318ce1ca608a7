use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather condition. The order of [`Condition::ALL`] defines the mock
/// mapping from a city hash to a condition and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Windy,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Sunny,
        Condition::Cloudy,
        Condition::Rainy,
        Condition::Snowy,
        Condition::Windy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::Rainy => "rainy",
            Condition::Snowy => "snowy",
            Condition::Windy => "windy",
        }
    }

    /// Capitalised label for display, e.g. "Sunny".
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Sunny => "Sunny",
            Condition::Cloudy => "Cloudy",
            Condition::Rainy => "Rainy",
            Condition::Snowy => "Snowy",
            Condition::Windy => "Windy",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Condition::Sunny => "☀️",
            Condition::Cloudy => "☁️",
            Condition::Rainy => "🌧️",
            Condition::Snowy => "❄️",
            Condition::Windy => "💨",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature_c: i32,
    pub condition: Condition,
    pub wind_speed_kmh: u32,
    pub humidity_pct: u32,
    pub icon: String,
}

/// Clothing suggestion derived from a [`WeatherSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitAdvice {
    pub message: String,
    pub items: Vec<String>,
}

/// A snapshot together with the advice computed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub weather: WeatherSnapshot,
    pub outfit: OutfitAdvice,
}
