//! Fare query service error types.

use std::fmt;
use std::time::Duration;

/// Errors from the fare query service.
#[derive(Debug)]
pub enum FareError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// Rejected by the service's rate limiter
    RateLimited { retry_after: Duration },

    /// Invalid API key or unauthorized
    Unauthorized,

    /// Local fare data could not be read
    Data(String),
}

impl FareError {
    /// How long the caller should wait before retrying, if the service said.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FareError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl fmt::Display for FareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FareError::Http(e) => write!(f, "HTTP error: {e}"),
            FareError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FareError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            FareError::RateLimited { retry_after } => {
                write!(
                    f,
                    "rate limited by fare service (retry after {}s)",
                    retry_after.as_secs()
                )
            }
            FareError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            FareError::Data(msg) => write!(f, "fare data error: {msg}"),
        }
    }
}

impl std::error::Error for FareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FareError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FareError {
    fn from(err: reqwest::Error) -> Self {
        FareError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FareError::ApiError {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = FareError::RateLimited {
            retry_after: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "rate limited by fare service (retry after 30s)"
        );

        let err = FareError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn retry_after_only_for_rate_limit() {
        let err = FareError::RateLimited {
            retry_after: Duration::from_secs(5),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
        assert_eq!(FareError::Unauthorized.retry_after(), None);
    }
}
