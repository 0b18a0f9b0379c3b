//! Failure classes shared by every fetch path.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkTransport,
    HttpStatus { status: u16 },
    JsonDecode,
    UrlConstruction,
    LocationPermissionDenied,
    LocationUnavailable,
    LocationOther,
    /// The fetch task died before reporting back.
    Internal,
}

impl ErrorKind {
    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkTransport => "Network error. Check your connection.".to_string(),
            Self::HttpStatus { status: 401 | 403 } => {
                "The weather service rejected the API key.".to_string()
            }
            Self::HttpStatus { status: 400 } => "No matching location found.".to_string(),
            Self::HttpStatus { status } => format!("Weather service error (HTTP {status})."),
            Self::JsonDecode => "Unexpected response from the weather service.".to_string(),
            Self::UrlConstruction => "That search can't be used as a location.".to_string(),
            Self::LocationPermissionDenied => "Location services are denied.".to_string(),
            Self::LocationUnavailable => "Location data is currently unavailable.".to_string(),
            Self::LocationOther => "Could not determine your location.".to_string(),
            Self::Internal => "Something went wrong while fetching the weather.".to_string(),
        }
    }

    pub fn is_location(&self) -> bool {
        matches!(
            self,
            Self::LocationPermissionDenied | Self::LocationUnavailable | Self::LocationOther
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}
