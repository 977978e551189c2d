//! Network request interception.
//!
//! Routes substitute fixed responses for backend calls so a scenario can run
//! against known data. Drivers consult installed routes when the page issues
//! a request; anything unmatched continues to the live backend.

use crate::result::{RoomingError, RoomingResult};
use serde::{Deserialize, Serialize};

/// HTTP methods for request matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// Any method
    Any,
}

impl HttpMethod {
    /// Parse from string; unknown verbs map to `Any`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            _ => Self::Any,
        }
    }

    /// Check if this method matches another
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        *self == Self::Any || *other == Self::Any || self == other
    }
}

/// Mock response for intercepted requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl MockResponse {
    /// Create an empty 200 response
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON response
    pub fn json<T: Serialize>(data: &T) -> RoomingResult<Self> {
        let body = serde_json::to_vec(data)?;
        Ok(Self::new()
            .with_content_type("application/json")
            .with_body(body))
    }

    /// Create a plain text response
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::new()
            .with_content_type("text/plain")
            .with_body(content.as_bytes().to_vec())
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self {
            status,
            ..Self::new()
        }
        .with_content_type("application/json")
        .with_body(body.into_bytes())
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Set the content type
    #[must_use]
    pub fn with_content_type(self, content_type: &str) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Body as a lossy UTF-8 string
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Decode a JSON body
    pub fn body_json<T: for<'de> Deserialize<'de>>(&self) -> RoomingResult<T> {
        serde_json::from_slice(&self.body).map_err(RoomingError::from)
    }
}

/// Pattern for matching request URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/api/rooming-lists*")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// Simple glob matching: `*` spans any run of characters
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let parts: Vec<&str> = pattern.split('*').collect();
        let mut pos = 0;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            if let Some(found) = url[pos..].find(part) {
                if i == 0 && found != 0 {
                    return false;
                }
                pos += found + part.len();
            } else {
                return false;
            }
        }

        pattern.ends_with('*') || pos == url.len()
    }

    /// Glob form understood by the CDP Fetch domain
    #[must_use]
    pub fn to_fetch_glob(&self) -> String {
        match self {
            Self::Exact(s) | Self::Glob(s) => s.clone(),
            Self::Prefix(s) => format!("{s}*"),
            Self::Contains(s) => format!("*{s}*"),
            Self::Regex(_) | Self::Any => "*".to_string(),
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "exact:{s}"),
            Self::Prefix(s) => write!(f, "prefix:{s}"),
            Self::Contains(s) => write!(f, "contains:{s}"),
            Self::Regex(s) => write!(f, "regex:{s}"),
            Self::Glob(s) => write!(f, "glob:{s}"),
            Self::Any => write!(f, "*"),
        }
    }
}

/// A route that fulfils matching requests with a canned response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// URL pattern
    pub pattern: UrlPattern,
    /// HTTP method
    pub method: HttpMethod,
    /// Response to return
    pub response: MockResponse,
}

impl Route {
    /// Create a new route
    #[must_use]
    pub const fn new(pattern: UrlPattern, method: HttpMethod, response: MockResponse) -> Self {
        Self {
            pattern,
            method,
            response,
        }
    }

    /// GET route from a glob
    #[must_use]
    pub fn get(glob: &str, response: MockResponse) -> Self {
        Self::new(UrlPattern::Glob(glob.to_string()), HttpMethod::Get, response)
    }

    /// Check if this route matches a request
    #[must_use]
    pub fn matches(&self, url: &str, method: &HttpMethod) -> bool {
        self.pattern.matches(url) && self.method.matches(method)
    }
}

/// Find the most recently installed route for a request
#[must_use]
pub fn find_route<'a>(routes: &'a [Route], url: &str, method: &HttpMethod) -> Option<&'a Route> {
    routes.iter().rev().find(|r| r.matches(url, method))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_glob_matches_listing_endpoint() {
            let pattern = UrlPattern::Glob("**/rooming-lists*".to_string());
            assert!(pattern.matches("http://localhost:3000/api/rooming-lists"));
            assert!(pattern.matches("http://localhost:3000/api/rooming-lists?search=Crew"));
            assert!(!pattern.matches("http://localhost:3000/api/bookings"));
        }

        #[test]
        fn test_glob_anchors_without_leading_star() {
            let pattern = UrlPattern::Glob("http://a/*".to_string());
            assert!(pattern.matches("http://a/x"));
            assert!(!pattern.matches("https://b/http://a/x"));
        }

        #[test]
        fn test_other_patterns() {
            assert!(UrlPattern::Exact("http://a".into()).matches("http://a"));
            assert!(UrlPattern::Prefix("http://a".into()).matches("http://a/b"));
            assert!(UrlPattern::Contains("lists".into()).matches("http://a/lists"));
            assert!(UrlPattern::Regex(r"lists\?page=\d+".into()).matches("/lists?page=2"));
            assert!(!UrlPattern::Regex("(".into()).matches("("));
            assert!(UrlPattern::Any.matches(""));
        }

        #[test]
        fn test_fetch_glob() {
            assert_eq!(UrlPattern::Contains("api".into()).to_fetch_glob(), "*api*");
            assert_eq!(UrlPattern::Prefix("http://a".into()).to_fetch_glob(), "http://a*");
            assert_eq!(UrlPattern::Any.to_fetch_glob(), "*");
        }
    }

    mod response_tests {
        use super::*;

        #[test]
        fn test_json_response() {
            let response = MockResponse::json(&serde_json::json!([{"eventId": "E1"}])).unwrap();
            assert_eq!(response.status, 200);
            assert!(response
                .headers
                .iter()
                .any(|(k, v)| k == "Content-Type" && v == "application/json"));
            let back: serde_json::Value = response.body_json().unwrap();
            assert_eq!(back[0]["eventId"], "E1");
        }

        #[test]
        fn test_error_response() {
            let response = MockResponse::error(500, "boom");
            assert_eq!(response.status, 500);
            assert!(response.body_string().contains("boom"));
        }
    }

    mod route_tests {
        use super::*;

        #[test]
        fn test_latest_route_wins() {
            let routes = vec![
                Route::get("**/rooming-lists*", MockResponse::text("first")),
                Route::get("**/rooming-lists*", MockResponse::text("second")),
            ];
            let hit = find_route(&routes, "http://x/rooming-lists", &HttpMethod::Get).unwrap();
            assert_eq!(hit.response.body_string(), "second");
        }

        #[test]
        fn test_method_must_match() {
            let routes = vec![Route::get("*", MockResponse::new())];
            assert!(find_route(&routes, "http://x", &HttpMethod::Post).is_none());
            assert!(find_route(&routes, "http://x", &HttpMethod::Any).is_some());
            assert_eq!(HttpMethod::parse("delete"), HttpMethod::Delete);
        }
    }
}
