//! `nowcast screen`: a prompt loop standing in for the single weather screen.
//!
//! Typed text searches, `/here` uses the location backend, `/unit` flips
//! between Celsius and Fahrenheit without fetching again.

use anyhow::{Context, Result};
use inquire::{InquireError, Text};
use nowcast_core::{Controller, TemperatureUnit};
use tracing::debug;

use crate::render;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Search(&'a str),
    Here,
    ToggleUnit,
    Help,
    Quit,
    Empty,
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Input::Empty,
            "/here" | "/h" => Input::Here,
            "/unit" | "/u" => Input::ToggleUnit,
            "/help" | "/?" => Input::Help,
            "/quit" | "/q" | "/exit" => Input::Quit,
            text => Input::Search(text),
        }
    }
}

const HELP: &str = "\
Type a place and press enter to search.
  /here   weather at your location
  /unit   toggle °C / °F
  /help   this message
  /quit   leave";

pub async fn run(mut controller: Controller) -> Result<()> {
    let color = render::use_color();
    println!("{HELP}\n");
    print!("{}", render::screen_text(controller.screen(), color));

    while let Some(line) = prompt_line(controller.unit()).await? {
        match Input::parse(&line) {
            Input::Quit => break,
            Input::Empty => continue,
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Here => {
                controller.request_location();
            }
            Input::ToggleUnit => {
                let unit = controller.toggle_unit();
                debug!(%unit, "unit toggled");
            }
            Input::Search(text) => {
                controller.submit_search(text);
            }
        }

        controller.settle().await;
        print!("{}", render::screen_text(controller.screen(), color));
    }

    Ok(())
}

/// `None` when the user cancels (Esc / Ctrl-C / Ctrl-D).
async fn prompt_line(unit: TemperatureUnit) -> Result<Option<String>> {
    let label = format!("Search [{}]:", unit.symbol());
    let answer = tokio::task::spawn_blocking(move || Text::new(&label).prompt())
        .await
        .context("Prompt task failed")?;

    match answer {
        Ok(line) => Ok(Some(line)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read input"),
    }
}
