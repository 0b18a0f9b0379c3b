//! Core library for the `nowcast` current-conditions app.
//!
//! This crate defines:
//! - The WeatherAPI.com response model and URL construction
//! - An HTTP client behind the `WeatherSource` trait
//! - One-shot location backends behind the `LocationService` trait
//! - The screen controller that ties them together
//! - Configuration & credentials handling
//!
//! It is used by `nowcast-cli`, but has no terminal-specific code of its own.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod query;

pub use client::{FetchError, WeatherClient, WeatherSource, client_from_config};
pub use config::{Config, LocationConfig, LocationMode};
pub use controller::{Controller, Loaded, Screen, ViewState};
pub use error::ErrorKind;
pub use icon::{Color, ConditionIcon, Icon};
pub use location::{
    Coordinates, LocationError, LocationService, location_from_config, location_or_misconfigured,
};
pub use model::{TemperatureUnit, WeatherResponse};
pub use query::{Query, QueryError};

/// Sent with every outgoing request.
pub const USER_AGENT: &str = concat!("nowcast/", env!("CARGO_PKG_VERSION"));
