//! Building `current.json` request URLs.

use thiserror::Error;
use url::Url;

use crate::{error::ErrorKind, location::Coordinates};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1/";
const CURRENT_ENDPOINT: &str = "current.json";

/// What to look up: a place typed by the user, or a position.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Text(String),
    Coordinates(Coordinates),
}

impl Query {
    pub fn text(value: impl Into<String>) -> Self {
        Query::Text(value.into())
    }

    /// Value of the `q` parameter before encoding.
    pub fn to_param(&self) -> Result<String, QueryError> {
        match self {
            Query::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(QueryError::EmptyQuery);
                }
                Ok(trimmed.to_string())
            }
            Query::Coordinates(coords) => {
                coords.validate()?;
                Ok(coords.to_string())
            }
        }
    }
}

impl From<Coordinates> for Query {
    fn from(value: Coordinates) -> Self {
        Query::Coordinates(value)
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid base URL '{base}': {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL '{0}' must be an http(s) URL")]
    UnsupportedBase(String),

    #[error("search text is empty")]
    EmptyQuery,

    #[error("coordinates out of range: {latitude},{longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("could not join endpoint onto base URL: {0}")]
    Join(#[from] url::ParseError),
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UrlConstruction
    }
}

/// Parse and normalize an API base URL so endpoints join as path segments.
pub fn parse_base(base: &str) -> Result<Url, QueryError> {
    let mut url = Url::parse(base).map_err(|source| QueryError::InvalidBase {
        base: base.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(QueryError::UnsupportedBase(base.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// `{base}current.json?key={api_key}&q={query}` with form-encoded parameters.
pub fn build_current_url(base: &Url, api_key: &str, query: &Query) -> Result<Url, QueryError> {
    let q = query.to_param()?;

    let mut url = base.join(CURRENT_ENDPOINT)?;
    url.query_pairs_mut()
        .append_pair("key", api_key)
        .append_pair("q", &q);

    Ok(url)
}

/// Render a request URL for logs with the API key masked.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    if pairs.is_empty() {
        return masked.to_string();
    }

    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
