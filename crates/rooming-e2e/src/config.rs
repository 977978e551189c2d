//! Suite configuration.
//!
//! Values come from defaults, an optional YAML file, and `ROOMING_E2E_*`
//! environment variables, in that order of precedence (env wins).

use crate::carousel::WalkOptions;
use crate::result::{RoomingError, RoomingResult};
use crate::wait::{WaitOptions, DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the application URL
pub const ENV_BASE_URL: &str = "ROOMING_E2E_BASE_URL";

/// Configuration for a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// URL of the Rooming List Management view
    pub base_url: String,
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Actionability and expectation timeout
    pub element_timeout_ms: u64,
    /// Navigation timeout
    pub navigation_timeout_ms: u64,
    /// Maximum carousel pages visited per walk
    pub max_carousel_pages: usize,
    /// Consecutive pages without new cards before a walk fails
    pub stall_limit: usize,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1440,
            viewport_height: 900,
            element_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            max_carousel_pages: 50,
            stall_limit: 2,
        }
    }
}

impl E2eConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> RoomingResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load a YAML file, then apply environment overrides
    pub fn from_yaml_file(path: impl AsRef<Path>) -> RoomingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&text)?;
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (the process environment in practice)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> RoomingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            self.chromium_path = Some(path);
        }
        if let Some(v) = lookup("ROOMING_E2E_HEADLESS") {
            self.headless = parse_flag("ROOMING_E2E_HEADLESS", &v)?;
        }
        if let Some(v) = lookup("ROOMING_E2E_NO_SANDBOX") {
            self.sandbox = !parse_flag("ROOMING_E2E_NO_SANDBOX", &v)?;
        }
        if let Some(v) = lookup("ROOMING_E2E_ELEMENT_TIMEOUT_MS") {
            self.element_timeout_ms = parse_number("ROOMING_E2E_ELEMENT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("ROOMING_E2E_NAVIGATION_TIMEOUT_MS") {
            self.navigation_timeout_ms = parse_number("ROOMING_E2E_NAVIGATION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("ROOMING_E2E_MAX_CAROUSEL_PAGES") {
            self.max_carousel_pages = parse_number("ROOMING_E2E_MAX_CAROUSEL_PAGES", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values that would make every scenario fail
    pub fn validate(&self) -> RoomingResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(RoomingError::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.max_carousel_pages == 0 {
            return Err(RoomingError::Config {
                message: "max_carousel_pages must be at least 1".to_string(),
            });
        }
        if self.stall_limit == 0 {
            return Err(RoomingError::Config {
                message: "stall_limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Set the application URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the element timeout
    #[must_use]
    pub const fn with_element_timeout(mut self, ms: u64) -> Self {
        self.element_timeout_ms = ms;
        self
    }

    /// Wait options for element-level waits
    #[must_use]
    pub fn element_wait(&self) -> WaitOptions {
        WaitOptions::new().with_timeout(self.element_timeout_ms)
    }

    /// Wait options for page loads
    #[must_use]
    pub const fn navigation_wait(&self) -> WaitOptions {
        WaitOptions::navigation().with_timeout(self.navigation_timeout_ms)
    }

    /// Carousel walk limits
    #[must_use]
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions::default()
            .with_max_pages(self.max_carousel_pages)
            .with_stall_limit(self.stall_limit)
            .with_settle(self.element_wait())
    }
}

fn parse_flag(key: &str, value: &str) -> RoomingResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RoomingError::Config {
            message: format!("{key}: expected a boolean, got {other:?}"),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> RoomingResult<T> {
    value.trim().parse().map_err(|_| RoomingError::Config {
        message: format!("{key}: expected a number, got {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = E2eConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.headless);
        assert_eq!(config.max_carousel_pages, 50);
    }

    #[test]
    fn test_env_overrides() {
        let config = E2eConfig::default()
            .with_env_overrides(env(&[
                (ENV_BASE_URL, "http://app:8080/"),
                ("ROOMING_E2E_HEADLESS", "false"),
                ("ROOMING_E2E_NO_SANDBOX", "1"),
                ("ROOMING_E2E_ELEMENT_TIMEOUT_MS", "1200"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://app:8080/");
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.element_wait().timeout_ms, 1200);
    }

    #[test]
    fn test_bad_env_values_are_config_errors() {
        let err = E2eConfig::default()
            .with_env_overrides(env(&[("ROOMING_E2E_HEADLESS", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, RoomingError::Config { .. }));

        let err = E2eConfig::default()
            .with_env_overrides(env(&[("ROOMING_E2E_MAX_CAROUSEL_PAGES", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_carousel_pages"));
    }

    #[test]
    fn test_yaml_file_with_partial_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://staging/\nstall_limit: 3").unwrap();
        let config = E2eConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.stall_limit, 3);
        assert_eq!(config.viewport_width, 1440);
    }

    #[test]
    fn test_builders() {
        let config = E2eConfig::new()
            .with_base_url("http://x/")
            .with_headless(false)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox()
            .with_viewport(800, 600)
            .with_element_timeout(10);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        assert_eq!(config.walk_options().settle.timeout_ms, 10);
    }
}
