//! Error types for external fetches and the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use saferoute_core::CoreError;
use serde_json::json;
use thiserror::Error;

/// Failure of a single external call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("rate limited by {url}")]
    RateLimited { url: String },
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("network error calling {url}: {message}")]
    Network { url: String, message: String },
    #[error("malformed response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Parse(_) => false,
        }
    }

    pub fn from_status(url: &str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                status: status.as_u16(),
            }
        }
    }

    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return Self::from_status(url, status);
        }
        if err.is_decode() {
            return Self::Parse(err.to_string());
        }
        Self::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// The directions provider could not supply route geometry.
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("directions provider unavailable: {0}")]
    Unavailable(#[from] FetchError),
    #[error("directions provider rejected the request: {0}")]
    Rejected(String),
    #[error("no route found between the requested points")]
    NoRoute,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Directions(#[from] DirectionsError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Directions(DirectionsError::NoRoute) => StatusCode::NOT_FOUND,
            Self::Directions(DirectionsError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Directions(DirectionsError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> FetchError {
        FetchError::Http {
            url: "http://x".to_string(),
            status,
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_transient() {
        assert!(http(500).is_transient());
        assert!(http(503).is_transient());
        assert!(FetchError::from_status("http://x", reqwest::StatusCode::TOO_MANY_REQUESTS)
            .is_transient());
        assert!(FetchError::Timeout {
            url: "http://x".to_string()
        }
        .is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        assert!(!http(400).is_transient());
        assert!(!http(404).is_transient());
        assert!(!FetchError::Parse("bad json".to_string()).is_transient());
    }

    #[test]
    fn api_errors_map_to_status_codes() {
        let err = ApiError::from(CoreError::UnknownProfile("x".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = ApiError::from(DirectionsError::NoRoute);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = ApiError::from(DirectionsError::Unavailable(http(502)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
