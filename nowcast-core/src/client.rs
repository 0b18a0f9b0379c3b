use std::{fmt::Debug, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    Config,
    error::ErrorKind,
    model::WeatherResponse,
    query::{self, Query, QueryError},
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build request URL: {0}")]
    Query(#[from] QueryError),

    #[error("failed to send request to WeatherAPI.com: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("WeatherAPI.com request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse WeatherAPI.com JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Query(e) => e.kind(),
            FetchError::Transport(_) => ErrorKind::NetworkTransport,
            FetchError::Status { status, .. } => ErrorKind::HttpStatus { status: status.as_u16() },
            FetchError::Decode(_) => ErrorKind::JsonDecode,
        }
    }
}

/// Anything that can answer a current-conditions query.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &Query) -> Result<WeatherResponse, FetchError>;
}

/// HTTP client for WeatherAPI.com `current.json`.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: String,
    base: Url,
    http: Client,
}

impl WeatherClient {
    pub fn new(api_key: String) -> Result<Self, FetchError> {
        Self::with_base_url(query::DEFAULT_BASE_URL, api_key, Duration::from_secs(10))
    }

    pub fn with_base_url(base: &str, api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        let base = query::parse_base(base)?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()?;

        Ok(Self { api_key, base, http })
    }

    pub fn url_for(&self, query: &Query) -> Result<Url, QueryError> {
        query::build_current_url(&self.base, &self.api_key, query)
    }

    /// One GET + decode. Failures are logged here and returned typed.
    pub async fn fetch(&self, url: Url) -> Result<WeatherResponse, FetchError> {
        let shown = query::redacted(&url);
        debug!(url = %shown, "fetching current weather");

        let result = self.fetch_inner(url).await;
        match &result {
            Ok(response) => info!(
                location = %response.location.name,
                code = response.current.condition.code,
                "current weather received"
            ),
            Err(error) => warn!(url = %shown, %error, "weather fetch failed"),
        }
        result
    }

    async fn fetch_inner(&self, url: Url) -> Result<WeatherResponse, FetchError> {
        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(WeatherResponse::from_json(&body)?)
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current(&self, query: &Query) -> Result<WeatherResponse, FetchError> {
        let url = self.url_for(query).inspect_err(|error| {
            warn!(%error, "could not build weather URL");
        })?;
        self.fetch(url).await
    }
}

/// Construct the client from config: API key, base URL and timeout.
pub fn client_from_config(config: &Config) -> anyhow::Result<WeatherClient> {
    let api_key = config.api_key()?;
    WeatherClient::with_base_url(config.base_url(), api_key, config.timeout())
        .context("Failed to set up the WeatherAPI.com client")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
