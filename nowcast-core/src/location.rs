//! One-shot location fixes.
//!
//! A [`LocationService`] is asked for authorization and then for a single fix.
//! Backends either look the position up from the public IP, return configured
//! coordinates, or refuse.

use std::{fmt::Debug, sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{LocationConfig, LocationMode},
    error::ErrorKind,
    query::QueryError,
};

pub const IPINFO_URL: &str = "https://ipinfo.io/json";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(QueryError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Parse a `"lat,lon"` pair.
    pub fn parse_pair(value: &str) -> Option<Self> {
        let (lat, lon) = value.split_once(',')?;
        let latitude = lat.trim().parse().ok()?;
        let longitude = lon.trim().parse().ok()?;
        Some(Self::new(latitude, longitude))
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied,
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location services are denied")]
    PermissionDenied,

    #[error("location data is currently unavailable")]
    Unavailable,

    #[error("location lookup failed: {0}")]
    Other(String),
}

impl LocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocationError::PermissionDenied => ErrorKind::LocationPermissionDenied,
            LocationError::Unavailable => ErrorKind::LocationUnavailable,
            LocationError::Other(_) => ErrorKind::LocationOther,
        }
    }
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    async fn request_authorization(&self) -> Authorization;

    /// One-shot request. The most recent fix is the last element.
    async fn request_location(&self) -> Result<Vec<Coordinates>, LocationError>;
}

/// Authorize, request a single fix and keep the latest coordinate.
pub async fn one_shot_fix(service: &dyn LocationService) -> Result<Coordinates, LocationError> {
    let result = match service.request_authorization().await {
        Authorization::Denied => Err(LocationError::PermissionDenied),
        Authorization::Granted => service
            .request_location()
            .await
            .and_then(|fixes| fixes.last().copied().ok_or(LocationError::Unavailable)),
    };

    match &result {
        Ok(coords) => info!(%coords, "location fix received"),
        Err(LocationError::PermissionDenied) => warn!("Location services are denied."),
        Err(LocationError::Unavailable) => warn!("Location data is currently unavailable."),
        Err(LocationError::Other(reason)) => warn!(%reason, "Failed to get user location."),
    }

    result
}

/// Position from the public IP address (ipinfo.io).
#[derive(Debug, Clone)]
pub struct IpLocation {
    http: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct IpInfo {
    loc: Option<String>,
    city: Option<String>,
}

impl IpLocation {
    pub fn new(timeout: Duration) -> Result<Self, LocationError> {
        Self::with_endpoint(IPINFO_URL, timeout)
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Result<Self, LocationError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| LocationError::Other(format!("invalid endpoint '{endpoint}': {e}")))?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;

        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl LocationService for IpLocation {
    async fn request_authorization(&self) -> Authorization {
        Authorization::Granted
    }

    async fn request_location(&self) -> Result<Vec<Coordinates>, LocationError> {
        debug!(endpoint = %self.endpoint, "requesting IP location");

        let res = self.http.get(self.endpoint.clone()).send().await.map_err(|e| {
            debug!(error = %e, "IP location request failed");
            LocationError::Unavailable
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::Other(format!(
                "IP location service answered with status {status}"
            )));
        }

        let body = res.text().await.map_err(|_| LocationError::Unavailable)?;
        let info: IpInfo = serde_json::from_str(&body)
            .map_err(|e| LocationError::Other(format!("unreadable IP location response: {e}")))?;

        let coords = info
            .loc
            .as_deref()
            .and_then(Coordinates::parse_pair)
            .ok_or(LocationError::Unavailable)?;

        debug!(city = ?info.city, %coords, "IP location resolved");
        Ok(vec![coords])
    }
}

/// Always answers with the same position.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationService for FixedLocation {
    async fn request_authorization(&self) -> Authorization {
        Authorization::Granted
    }

    async fn request_location(&self) -> Result<Vec<Coordinates>, LocationError> {
        Ok(vec![self.coordinates])
    }
}

/// Location turned off by the user.
#[derive(Debug, Clone, Default)]
pub struct DisabledLocation;

#[async_trait]
impl LocationService for DisabledLocation {
    async fn request_authorization(&self) -> Authorization {
        Authorization::Denied
    }

    async fn request_location(&self) -> Result<Vec<Coordinates>, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Stands in for a backend that could not be built. Every request fails with
/// the build error, so only location lookups are affected.
#[derive(Debug, Clone)]
pub struct MisconfiguredLocation {
    reason: String,
}

impl MisconfiguredLocation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl LocationService for MisconfiguredLocation {
    async fn request_authorization(&self) -> Authorization {
        Authorization::Granted
    }

    async fn request_location(&self) -> Result<Vec<Coordinates>, LocationError> {
        Err(LocationError::Other(self.reason.clone()))
    }
}

/// Like [`location_from_config`], but a bad `[location]` section turns into a
/// [`MisconfiguredLocation`] instead of an error.
pub fn location_or_misconfigured(
    config: &LocationConfig,
    timeout: Duration,
) -> Arc<dyn LocationService> {
    location_from_config(config, timeout).unwrap_or_else(|error| {
        warn!(%error, "location backend unavailable");
        Arc::new(MisconfiguredLocation::new(error.to_string()))
    })
}

/// Build the location backend selected in config.
pub fn location_from_config(
    config: &LocationConfig,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn LocationService>> {
    let service: Arc<dyn LocationService> = match config.mode {
        LocationMode::Ip => Arc::new(IpLocation::new(timeout)?),
        LocationMode::Disabled => Arc::new(DisabledLocation),
        LocationMode::Fixed => {
            let (Some(latitude), Some(longitude)) = (config.latitude, config.longitude) else {
                return Err(anyhow!(
                    "Location mode is 'fixed' but latitude/longitude are not set.\n\
                     Hint: run `nowcast configure` and enter coordinates."
                ));
            };
            let coordinates = Coordinates::new(latitude, longitude);
            coordinates.validate()?;
            Arc::new(FixedLocation::new(coordinates))
        }
    };

    Ok(service)
}
