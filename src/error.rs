//! Error types for psifold

use thiserror::Error;

/// Errors that can occur while building or rendering a dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network failure, timeout or non-2xx status from a feed
    #[error("Feed request failed: {0}")]
    Fetch(String),

    #[error("Failed to parse feed payload: {0}")]
    Parse(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DashboardError::Parse(e.to_string())
        } else {
            DashboardError::Fetch(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_and_io_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(DashboardError::from(json_err), DashboardError::Json(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DashboardError::from(io_err);
        assert!(matches!(err, DashboardError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: denied");
    }
}
