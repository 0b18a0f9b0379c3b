//! Presentation state for the single weather screen.
//!
//! Fetches run on spawned tasks and report back through a channel. Only the
//! owner of the [`Controller`] applies completions, so screen state is never
//! touched from a network task. In-flight fetches are not cancelled: when two
//! overlap, whichever completion is applied last is what the screen shows.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    client::WeatherSource,
    error::ErrorKind,
    icon::ConditionIcon,
    location::{LocationService, one_shot_fix},
    model::{TemperatureUnit, WeatherResponse},
    query::Query,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub response: WeatherResponse,
    pub fetched_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Loaded(Loaded),
    Failed(ErrorKind),
}

/// What the screen currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub location: String,
    pub condition: String,
    pub icon: ConditionIcon,
    pub temperature: String,
    /// Local time of the last successful fetch.
    pub updated: Option<String>,
    pub status: Option<String>,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            location: String::new(),
            condition: String::new(),
            icon: ConditionIcon::placeholder(),
            temperature: String::new(),
            updated: None,
            status: None,
        }
    }
}

#[derive(Debug)]
struct Completion {
    request: u64,
    outcome: Result<WeatherResponse, ErrorKind>,
}

pub struct Controller {
    source: Arc<dyn WeatherSource>,
    location: Arc<dyn LocationService>,
    unit: TemperatureUnit,
    state: ViewState,
    current: Option<Loaded>,
    screen: Screen,
    next_request: u64,
    pending: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl Controller {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        location: Arc<dyn LocationService>,
        unit: TemperatureUnit,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            source,
            location,
            unit,
            state: ViewState::Idle,
            current: None,
            screen: Screen::default(),
            next_request: 0,
            pending: 0,
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Most recent successful fetch, kept across later failures.
    pub fn current(&self) -> Option<&Loaded> {
        self.current.as_ref()
    }

    /// Number of fetches started but not yet applied. While this is non-zero
    /// [`Controller::state`] reports `Loading`, even if an earlier completion
    /// already updated the screen.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Search by typed text. Returns the request id, or `None` when the text
    /// can't be turned into a request.
    pub fn submit_search(&mut self, text: &str) -> Option<u64> {
        let query = Query::text(text);
        if let Err(error) = query.to_param() {
            warn!(%error, "Could not get URL");
            self.fail(error.kind());
            if self.pending > 0 {
                self.state = ViewState::Loading;
            }
            return None;
        }

        let source = Arc::clone(&self.source);
        Some(self.spawn(async move { source.current(&query).await.map_err(|e| e.kind()) }))
    }

    /// Search by a one-shot location fix.
    pub fn request_location(&mut self) -> u64 {
        let source = Arc::clone(&self.source);
        let location = Arc::clone(&self.location);

        self.spawn(async move {
            let coords = one_shot_fix(location.as_ref()).await.map_err(|e| e.kind())?;
            source.current(&Query::Coordinates(coords)).await.map_err(|e| e.kind())
        })
    }

    /// Change the display unit. Re-renders from held data, never fetches.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        self.render_temperature();
    }

    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.set_unit(self.unit.toggled());
        self.unit
    }

    /// Wait for the next fetch to finish and apply it. `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<&ViewState> {
        if self.pending == 0 {
            return None;
        }

        let completion = self.completions_rx.recv().await?;
        self.apply(completion);
        Some(&self.state)
    }

    /// Apply completions until nothing is in flight.
    pub async fn settle(&mut self) -> &ViewState {
        while self.next_completion().await.is_some() {}
        &self.state
    }

    fn spawn<F>(&mut self, work: F) -> u64
    where
        F: Future<Output = Result<WeatherResponse, ErrorKind>> + Send + 'static,
    {
        self.next_request += 1;
        let request = self.next_request;
        self.pending += 1;

        self.state = ViewState::Loading;
        self.screen.status = Some("Loading…".to_string());
        debug!(request, pending = self.pending, "fetch started");

        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // Run the work on its own task so a panic still produces a completion.
            let outcome = match tokio::spawn(work).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(request, %error, "fetch task aborted");
                    Err(ErrorKind::Internal)
                }
            };
            // The receiver lives as long as the controller; a send error only
            // means the screen is gone.
            let _ = tx.send(Completion { request, outcome });
        });

        request
    }

    fn apply(&mut self, completion: Completion) {
        self.pending = self.pending.saturating_sub(1);
        debug!(request = completion.request, pending = self.pending, "fetch completed");

        match completion.outcome {
            Ok(response) => {
                let loaded = Loaded { response, fetched_at: Local::now() };
                self.show(&loaded);
                self.current = Some(loaded.clone());
                self.state = ViewState::Loaded(loaded);
            }
            Err(kind) => self.fail(kind),
        }

        // Still waiting on another fetch: the screen shows this result, the
        // state stays Loading until the last one lands.
        if self.pending > 0 {
            self.state = ViewState::Loading;
            self.screen.status = Some("Loading…".to_string());
        }
    }

    fn show(&mut self, loaded: &Loaded) {
        let current = &loaded.response.current;

        self.screen.location = loaded.response.location.name.clone();
        self.screen.condition = current.condition.text.clone();
        self.screen.icon = ConditionIcon::for_code(current.condition.code);
        self.screen.temperature = self.unit.format(loaded.response.temperature(self.unit));
        self.screen.updated = Some(loaded.fetched_at.format("%H:%M").to_string());
        self.screen.status = None;
    }

    fn render_temperature(&mut self) {
        if let Some(loaded) = &self.current {
            self.screen.temperature = self.unit.format(loaded.response.temperature(self.unit));
        }
    }

    fn fail(&mut self, kind: ErrorKind) {
        self.state = ViewState::Failed(kind);
        self.screen.status = Some(kind.user_message());
    }
}
