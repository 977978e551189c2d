//! Result and error types for the rooming list suite.

use thiserror::Error;

/// Result type for rooming list operations
pub type RoomingResult<T> = Result<T, RoomingError>;

/// Errors that can occur while driving the rooming list view
#[derive(Debug, Error)]
pub enum RoomingError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms: {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// No element matched a locator that had to resolve
    #[error("No element matches {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// The element exists but has no rendered area
    #[error("Element {locator} is not visible")]
    ElementNotVisible {
        /// Locator description
        locator: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// A carousel walk hit its page cap while "next" was still shown
    #[error("Carousel walk exceeded {max_pages} pages without the next control disappearing")]
    PaginationUnbounded {
        /// Page cap that was reached
        max_pages: usize,
    },

    /// A carousel walk kept advancing without discovering new cards
    #[error("Carousel walk stalled: {pages} consecutive pages added no new titles ({seen} seen)")]
    PaginationStalled {
        /// Consecutive pages without progress
        pages: usize,
        /// Distinct titles collected before the stall
        seen: usize,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl RoomingError {
    /// Build an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Whether this error came from a wait budget running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_the_condition() {
        let err = RoomingError::Timeout {
            ms: 1500,
            waited_for: "listing to settle".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operation timed out after 1500ms: listing to settle"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_pagination_errors_are_descriptive() {
        let err = RoomingError::PaginationUnbounded { max_pages: 50 };
        assert!(err.to_string().contains("50 pages"));

        let err = RoomingError::PaginationStalled { pages: 2, seen: 7 };
        assert!(err.to_string().contains("2 consecutive pages"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: RoomingError = parse.unwrap_err().into();
        assert!(matches!(err, RoomingError::Json(_)));
    }
}
