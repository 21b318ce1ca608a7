use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, FailurePolicy, ResolverMode, SessionController, Status, SuggestionFeed,
    SuggestionSourceKind, Suggestions,
};
use inquire::{InquireError, Select, Text};

use crate::render;

/// Upper bound on waiting for one suggestion answer (debounce plus lookup).
const SUGGESTION_WAIT: Duration = Duration::from_secs(15);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather and outfit dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Override the configured resolver: "mock" or "validated".
    #[arg(long, global = true)]
    pub resolver: Option<String>,

    /// Override the configured suggestion source: "popular" or "live".
    #[arg(long, global = true)]
    pub suggestions: Option<String>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose resolver, failure policy and suggestion source interactively.
    Configure,

    /// Show weather and outfit advice for a city.
    Show {
        /// City name.
        city: String,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List city suggestions for partial input.
    Suggest {
        /// Partial city name.
        text: String,
    },

    /// Search repeatedly with suggestions and recent history (default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        if let Some(mode) = &self.resolver {
            config.set_resolver_mode(ResolverMode::try_from(mode.as_str())?);
        }
        if let Some(source) = &self.suggestions {
            config.set_suggestion_source(SuggestionSourceKind::try_from(source.as_str())?);
        }

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(config),
            Command::Show { city, json } => show(&config, &city, json).await,
            Command::Suggest { text } => {
                let feed = SuggestionFeed::from_config(&config)?;
                let found = lookup_suggestions(&feed, &text).await;
                feed.shutdown().await;

                print!("{}", render::suggestions(&found.names));
                Ok(())
            }
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let mode = Select::new("City resolver:", ResolverMode::all().to_vec())
        .with_help_message("mock accepts any name; validated checks it against OpenStreetMap")
        .prompt()?;
    config.set_resolver_mode(mode);

    let policy = Select::new(
        "On a failed search:",
        vec![
            PolicyChoice::ResolverDefault(mode.default_failure_policy()),
            PolicyChoice::Explicit(FailurePolicy::Retain),
            PolicyChoice::Explicit(FailurePolicy::Clear),
        ],
    )
    .prompt()?;
    config.on_failure = match policy {
        PolicyChoice::ResolverDefault(_) => None,
        PolicyChoice::Explicit(p) => Some(p.as_str().to_string()),
    };

    let source = Select::new("Suggestions:", SuggestionSourceKind::all().to_vec()).prompt()?;
    config.set_suggestion_source(source);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum PolicyChoice {
    ResolverDefault(FailurePolicy),
    Explicit(FailurePolicy),
}

impl std::fmt::Display for PolicyChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyChoice::ResolverDefault(p) => write!(f, "resolver default ({p})"),
            PolicyChoice::Explicit(FailurePolicy::Retain) => f.write_str("retain last report"),
            PolicyChoice::Explicit(FailurePolicy::Clear) => f.write_str("clear last report"),
        }
    }
}

async fn show(config: &Config, city: &str, json: bool) -> anyhow::Result<()> {
    let mut controller = SessionController::from_config(config)?;
    let session = controller.submit(city).await;

    if session.status == Status::Error {
        bail!("{}", session.error_message);
    }

    let Some(report) = &session.report else {
        bail!("Please enter a city name");
    };

    if json {
        let text =
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
        println!("{text}");
    } else {
        print!("{}", render::report(report));
    }

    Ok(())
}

/// Feed `text` to the suggestion pipeline and wait for its answer.
async fn lookup_suggestions(feed: &SuggestionFeed, text: &str) -> Suggestions {
    let mut updates = feed.subscribe();
    updates.borrow_and_update();
    feed.update(text);

    let answered = async {
        while updates.changed().await.is_ok() {
            if updates.borrow_and_update().query == text {
                return true;
            }
        }
        false
    };

    match tokio::time::timeout(SUGGESTION_WAIT, answered).await {
        Ok(true) => feed.latest(),
        Ok(false) => Suggestions::default(),
        Err(_) => {
            tracing::warn!("Timed out waiting for suggestions for {text:?}");
            Suggestions::default()
        }
    }
}

/// Prompt result, with Esc/Ctrl-C mapped to `None`.
fn cancellable<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let mut controller = SessionController::from_config(config)?;
    let feed = SuggestionFeed::from_config(config)?;

    let mut updates = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if updates.borrow_and_update().is_loading() {
                eprintln!("🔄 Searching…");
            }
        }
    });

    println!("🌤️ Weather Dashboard ({} resolver)", controller.resolver().mode());

    loop {
        let Some(input) = cancellable(
            Text::new("City:")
                .with_placeholder("Enter city name...")
                .with_help_message("?text for suggestions, :h for recent searches, :q to quit")
                .prompt(),
        )?
        else {
            break;
        };
        let input = input.trim();

        let city = match input {
            ":q" => break,
            ":h" => {
                let entries = controller.session().history.entries().to_vec();
                if entries.is_empty() {
                    println!("No recent searches yet.");
                    continue;
                }
                match cancellable(Select::new("Recent searches:", entries).prompt())? {
                    Some(city) => city,
                    None => continue,
                }
            }
            text if text.starts_with('?') => {
                let found = lookup_suggestions(&feed, text.trim_start_matches('?')).await;
                if found.names.is_empty() {
                    print!("{}", render::suggestions(&found.names));
                    continue;
                }
                match cancellable(Select::new("Suggestions:", found.names).prompt())? {
                    Some(city) => city,
                    None => continue,
                }
            }
            "" => continue,
            text => text.to_string(),
        };

        controller.select_suggestion(&city).await;
        print!("\n{}", render::session(controller.session()));

        // Errors are shown once, not repeated under the next search.
        if controller.session().status == Status::Error {
            controller.clear_error();
        }
    }

    watcher.abort();
    feed.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use dashboard_core::suggest::{PopularCities, SuggestionSettings};
    use std::sync::Arc;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weather-dashboard"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn show_accepts_global_overrides() {
        let cli = Cli::try_parse_from([
            "weather-dashboard",
            "show",
            "Paris",
            "--json",
            "--resolver",
            "validated",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.resolver.as_deref(), Some("validated"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Show { city, json }) => {
                assert_eq!(city, "Paris");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn policy_choice_labels() {
        let default = PolicyChoice::ResolverDefault(FailurePolicy::Clear);
        assert_eq!(default.to_string(), "resolver default (clear)");
        assert_eq!(
            PolicyChoice::Explicit(FailurePolicy::Retain).to_string(),
            "retain last report"
        );
    }

    fn popular_feed() -> SuggestionFeed {
        SuggestionFeed::spawn(
            Arc::new(PopularCities),
            SuggestionSettings {
                debounce: Duration::from_millis(300),
                min_query_len: 2,
                max_results: 5,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_waits_for_matching_answer() {
        let feed = popular_feed();

        let found = lookup_suggestions(&feed, "lon").await;
        assert_eq!(found.query, "lon");
        assert_eq!(found.names, ["London", "Barcelona"]);

        feed.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_of_short_text_is_empty() {
        let feed = popular_feed();

        let found = lookup_suggestions(&feed, "L").await;
        assert_eq!(found.query, "L");
        assert!(found.names.is_empty());

        feed.shutdown().await;
    }
}
