//! Geometry store error types.

/// Errors loading route geometry.
///
/// Messages are kept as strings so one failed load can be shared by every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Store returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Document is not valid geometry JSON
    #[error("JSON parse error: {0}")]
    Json(String),

    /// Local geometry file could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for GeometryError {
    fn from(err: reqwest::Error) -> Self {
        GeometryError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GeometryError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error 503: unavailable");
        assert_eq!(
            GeometryError::Io("denied".into()).to_string(),
            "I/O error: denied"
        );
    }
}
