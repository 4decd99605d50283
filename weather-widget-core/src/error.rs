//! Error taxonomy shared by every core operation.
//!
//! Raw failures (HTTP status codes, connection errors, geolocation codes) are
//! resolved into a [`WeatherError`] once, where they are first observed.

use thiserror::Error;

pub const NOT_CONFIGURED_MESSAGE: &str =
    "Weather API key is not configured. Please set api_key in the config file or WEATHER_API_KEY.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Transport { status: Option<u16>, message: String },

    #[error("{0}")]
    Geolocation(GeolocationCause),
}

/// Why a position lookup failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationCause {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location information unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation is not supported by your browser")]
    Unsupported,
}

impl GeolocationCause {
    /// Map the platform's numeric position-error code (1, 2, 3).
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}

impl From<GeolocationCause> for WeatherError {
    fn from(cause: GeolocationCause) -> Self {
        WeatherError::Geolocation(cause)
    }
}

/// A failed upstream call, as observed at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// No response at all (DNS, connect, TLS, body read).
    Network { message: String },
    /// The request could not be built from the configured URL.
    InvalidUrl { url: String },
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        match err.status() {
            Some(status) => TransportFailure::Status {
                status: status.as_u16(),
                body: String::new(),
            },
            None => TransportFailure::Network {
                message: err.to_string(),
            },
        }
    }
}

/// Resolve a raw transport failure into the domain taxonomy.
pub fn normalize(failure: TransportFailure) -> WeatherError {
    match failure {
        TransportFailure::Status { status, body } => {
            let message = match status {
                401 => "Invalid API key".to_string(),
                404 => "City not found".to_string(),
                429 => "API rate limit exceeded".to_string(),
                other => format!("Error: HTTP {other}: {}", truncate_body(&body)),
            };
            WeatherError::Transport {
                status: Some(status),
                message,
            }
        }
        TransportFailure::Network { message } => WeatherError::Transport {
            status: None,
            message: format!("Error: {message}"),
        },
        TransportFailure::InvalidUrl { url } => WeatherError::Configuration(format!(
            "Invalid request URL '{url}'. Check base_url and use_proxy in the configuration."
        )),
    }
}

impl WeatherError {
    pub fn not_configured() -> Self {
        WeatherError::Configuration(NOT_CONFIGURED_MESSAGE.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        WeatherError::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Copy suitable for an error banner.
    ///
    /// `city` is the search term that triggered the request, if any.
    pub fn user_message(&self, city: Option<&str>) -> String {
        let WeatherError::Transport { status, message } = self else {
            return self.to_string();
        };

        match status {
            None | Some(0) => "Network error. Please check your internet connection.".to_string(),
            Some(401 | 403) => {
                "API authentication failed. Please check your API key configuration.".to_string()
            }
            Some(404) => match city {
                Some(city) => format!(
                    "City \"{city}\" not found. Please check the spelling and try again."
                ),
                None => "Location not found. Please check the spelling and try again.".to_string(),
            },
            Some(429) => "Too many requests. Please wait a moment and try again.".to_string(),
            Some(s) if *s >= 500 => {
                "Weather service is currently unavailable. Please try again later.".to_string()
            }
            Some(_) => message.clone(),
        }
    }

    /// Whether reissuing the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::Transport { status, .. } => {
                matches!(status, None | Some(0) | Some(429)) || status.is_some_and(|s| s >= 500)
            }
            _ => false,
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
