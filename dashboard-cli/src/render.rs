use dashboard_core::{Report, SearchSession};
use std::fmt::Write;

pub fn report(report: &Report) -> String {
    let weather = &report.weather;
    let outfit = &report.outfit;
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", weather.icon, weather.city);
    let _ = writeln!(
        out,
        "  {}°C, {}",
        weather.temperature_c,
        weather.condition.label()
    );
    let _ = writeln!(out, "  💨 Wind Speed  {} km/h", weather.wind_speed_kmh);
    let _ = writeln!(out, "  💧 Humidity    {}%", weather.humidity_pct);
    let _ = writeln!(out);
    let _ = writeln!(out, "👔 Outfit Suggestion");
    let _ = writeln!(out, "  {}", outfit.message);
    let _ = writeln!(out, "  {}", outfit.items.join(" · "));

    out
}

pub fn history(entries: &[String]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    format!("🕐 Recent Searches: {}\n", entries.join(", "))
}

pub fn session(session: &SearchSession) -> String {
    let mut out = String::new();

    if !session.error_message.is_empty() {
        let _ = writeln!(out, "⚠️ {}", session.error_message);
        let _ = writeln!(out);
    }

    if let Some(r) = &session.report {
        out.push_str(&report(r));
        let _ = writeln!(out);
    }

    out.push_str(&history(session.history.entries()));
    out
}

pub fn suggestions(names: &[String]) -> String {
    if names.is_empty() {
        return "No suggestions.\n".to_string();
    }
    names.iter().map(|name| format!("  {name}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{mock, outfit};

    fn paris() -> Report {
        let weather = mock::mock_weather("paris", mock::NameCasing::LowerRest);
        let outfit = outfit::advise(&weather);
        Report { weather, outfit }
    }

    #[test]
    fn report_shows_weather_and_outfit() {
        let text = report(&paris());

        assert!(text.starts_with("❄️ Paris"));
        assert!(text.contains("23°C, Snowy"));
        assert!(text.contains("8 km/h"));
        assert!(text.contains("63%"));
        assert!(text.contains("Pleasant weather. Dress comfortably."));
        assert!(text.contains("Sneakers · Waterproof boots · Extra layers"));
    }

    #[test]
    fn session_shows_error_first() {
        let mut session = SearchSession::new(5);
        session.report = Some(paris());
        session.history.record("Paris");
        session.error_message = "City not found: notfound".into();

        let text = super::session(&session);

        assert!(text.starts_with("⚠️ City not found: notfound"));
        assert!(text.contains("❄️ Paris"));
        assert!(text.ends_with("🕐 Recent Searches: Paris\n"));
    }

    #[test]
    fn empty_history_renders_nothing() {
        assert_eq!(history(&[]), "");
    }

    #[test]
    fn suggestions_listing() {
        assert_eq!(suggestions(&[]), "No suggestions.\n");
        assert_eq!(
            suggestions(&["London".into(), "Londonderry".into()]),
            "  London\n  Londonderry\n"
        );
    }
}
