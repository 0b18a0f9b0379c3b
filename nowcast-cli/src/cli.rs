use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use nowcast_core::{
    Config, Controller, TemperatureUnit, ViewState, client_from_config, location_or_misconfigured,
};

use crate::{configure, render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nowcast", version, about = "Current weather conditions")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, default unit and location source.
    Configure,

    /// Show current weather for a place.
    Show {
        /// Place name, postcode, IATA code or "lat,lon".
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Show current weather for this device's location.
    Here {
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Interactive single-screen session.
    Screen {
        /// Unit to start with.
        #[arg(short, long, value_parser = parse_unit)]
        unit: Option<TemperatureUnit>,
    },
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Temperature unit: celsius (c) or fahrenheit (f).
    #[arg(short, long, value_parser = parse_unit)]
    pub unit: Option<TemperatureUnit>,

    /// Print the screen as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

fn parse_unit(value: &str) -> Result<TemperatureUnit, String> {
    TemperatureUnit::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure::run(),
            Command::Show { query, display } => {
                let config = Config::load()?;
                let mut controller = build_controller(&config, display.unit)?;
                controller.submit_search(&query.join(" "));
                finish(controller, &display).await
            }
            Command::Here { display } => {
                let config = Config::load()?;
                let mut controller = build_controller(&config, display.unit)?;
                controller.request_location();
                finish(controller, &display).await
            }
            Command::Screen { unit } => {
                let config = Config::load()?;
                session::run(build_controller(&config, unit)?).await
            }
        }
    }
}

fn build_controller(config: &Config, unit: Option<TemperatureUnit>) -> Result<Controller> {
    let client = client_from_config(config)?;
    // Text search must keep working when the location section is broken.
    let location = location_or_misconfigured(&config.location, config.timeout());

    Ok(Controller::new(Arc::new(client), location, unit.unwrap_or(config.unit)))
}

/// Wait for the single fetch, print the screen, and turn failure into an exit code.
async fn finish(mut controller: Controller, display: &DisplayArgs) -> Result<()> {
    controller.settle().await;

    if display.json {
        println!("{}", serde_json::to_string_pretty(controller.screen())?);
    } else if matches!(controller.state(), ViewState::Loaded(_)) {
        print!("{}", render::screen_text(controller.screen(), render::use_color()));
    }

    if let ViewState::Failed(kind) = controller.state() {
        bail!(kind.user_message());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use nowcast_core::{ErrorKind, LocationConfig, LocationMode};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_joins_multi_word_query() {
        let cli = Cli::try_parse_from(["nowcast", "show", "New", "York", "-u", "f"]).unwrap();

        match cli.command {
            Command::Show { query, display } => {
                assert_eq!(query.join(" "), "New York");
                assert_eq!(display.unit, Some(TemperatureUnit::Fahrenheit));
                assert!(!display.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global_and_counted() {
        let cli = Cli::try_parse_from(["nowcast", "here", "-vv", "--json"]).unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Here { display } if display.json));
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["nowcast", "screen", "--unit", "kelvin"]).is_err());
    }

    fn broken_location_config(base_url: String) -> Config {
        let mut config = Config {
            base_url: Some(base_url),
            location: LocationConfig { mode: LocationMode::Fixed, latitude: None, longitude: None },
            ..Config::default()
        };
        config.set_api_key("TEST_KEY".into());
        config
    }

    #[tokio::test]
    async fn text_search_works_with_broken_location_config() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": "London" },
                "current": { "temp_c": 15.0, "temp_f": 59.0, "condition": { "text": "Clear", "code": 1000 } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = broken_location_config(format!("{}/v1/", mock_server.uri()));
        let mut controller = build_controller(&config, None).unwrap();

        controller.submit_search("London");
        assert!(matches!(controller.settle().await, ViewState::Loaded(_)));

        controller.request_location();
        assert_eq!(controller.settle().await, &ViewState::Failed(ErrorKind::LocationOther));
    }

    #[test]
    fn show_requires_query() {
        assert!(Cli::try_parse_from(["nowcast", "show"]).is_err());
    }
}
