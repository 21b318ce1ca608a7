//! Deterministic mock weather.
//!
//! Weather is derived from a fingerprint of the city name: the sum of the
//! UTF-16 code units of the lower-cased name. Addition is commutative, so
//! names made of the same characters in a different order (case-insensitive
//! anagrams) get the same fingerprint and the same weather.

use crate::model::{Condition, WeatherSnapshot};

/// How the city name is capitalised in the generated snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCasing {
    /// First character upper-cased, the rest lower-cased ("new YORK" -> "New york").
    LowerRest,
    /// First character upper-cased, the rest kept as given.
    PreserveRest,
}

impl NameCasing {
    pub fn apply(&self, name: &str) -> String {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return String::new();
        };

        let rest = chars.as_str();
        let rest = match self {
            NameCasing::LowerRest => rest.to_lowercase(),
            NameCasing::PreserveRest => rest.to_string(),
        };

        first.to_uppercase().chain(rest.chars()).collect()
    }
}

/// Fingerprint of a city name.
pub fn city_hash(name: &str) -> u64 {
    name.to_lowercase().encode_utf16().map(u64::from).sum()
}

/// Build the snapshot for a fingerprint. Pure: equal inputs give equal output.
pub fn generate(hash: u64, name: &str, casing: NameCasing) -> WeatherSnapshot {
    let index = (hash % Condition::ALL.len() as u64) as usize;
    let condition = Condition::ALL[index];

    WeatherSnapshot {
        city: casing.apply(name),
        temperature_c: (hash % 35) as i32 + 5,
        condition,
        wind_speed_kmh: (hash % 20) as u32 + 5,
        humidity_pct: (hash % 40) as u32 + 40,
        icon: condition.icon().to_string(),
    }
}

/// Hash `name` and generate its snapshot in one step.
pub fn mock_weather(name: &str, casing: NameCasing) -> WeatherSnapshot {
    generate(city_hash(name), name, casing)
}
