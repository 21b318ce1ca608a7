use crate::model::{Condition, OutfitAdvice, WeatherSnapshot};

const VERY_COLD: &[&str] = &["Heavy coat", "Warm hat", "Gloves", "Scarf", "Warm boots"];
const CHILLY: &[&str] = &["Jacket", "Long pants", "Closed shoes"];
const PLEASANT: &[&str] = &["Light sweater", "Jeans", "Sneakers"];
const WARM: &[&str] = &["T-shirt", "Shorts", "Sandals"];

const RAIN_GEAR: &[&str] = &["Umbrella", "Rain jacket"];
const SUN_GEAR: &[&str] = &["Sunglasses", "Sunscreen", "Hat"];
const WIND_GEAR: &[&str] = &["Windbreaker"];
const SNOW_GEAR: &[&str] = &["Waterproof boots", "Extra layers"];
const NO_GEAR: &[&str] = &[];

/// Suggest what to wear. The temperature band picks the base message and
/// items; the condition may append a sentence and extra items after them.
pub fn advise(weather: &WeatherSnapshot) -> OutfitAdvice {
    let (message, base) = match weather.temperature_c {
        t if t < 5 => ("It's very cold! Bundle up warm.", VERY_COLD),
        t if t < 15 => ("It's chilly. Layer up!", CHILLY),
        t if t < 25 => ("Pleasant weather. Dress comfortably.", PLEASANT),
        _ => ("It's warm! Light clothing recommended.", WARM),
    };

    let (note, extra) = match weather.condition {
        Condition::Rainy => (Some("Don't forget rain protection!"), RAIN_GEAR),
        Condition::Sunny => (Some("Perfect for outdoor activities!"), SUN_GEAR),
        Condition::Windy => (None, WIND_GEAR),
        Condition::Snowy => (None, SNOW_GEAR),
        Condition::Cloudy => (None, NO_GEAR),
    };

    let mut message = message.to_string();
    if let Some(note) = note {
        message.push(' ');
        message.push_str(note);
    }

    let items = base.iter().chain(extra).map(|s| s.to_string()).collect();

    OutfitAdvice { message, items }
}
