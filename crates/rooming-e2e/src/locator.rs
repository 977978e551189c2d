//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a serializable pipeline of [`Step`]s applied to the
//! document. The same pipeline is interpreted by the JavaScript resolver in
//! the Chromium driver and by the in-memory DOM in [`crate::mock`], so a
//! locator means the same thing in both places.
//!
//! # Resolution rules
//!
//! - `Find` searches strict descendants of every element in the current set.
//! - Results are de-duplicated and kept in document order.
//! - `Text` selects the innermost elements whose whitespace-normalized text
//!   matches: an element is skipped when one of its children matches too.
//! - `Nth` out of range yields an empty set, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default timeout for actionability waits (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box for an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f32,
    /// Y position
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box with no rendered area
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when both dimensions are non-zero
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// How an element's text is compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextMatch {
    /// Whole normalized text equals the value
    Exact {
        /// Expected text
        value: String,
    },
    /// Normalized text contains the value
    Contains {
        /// Expected substring
        value: String,
    },
    /// Normalized text matches a regular expression
    Pattern {
        /// Regex source, in the common subset of Rust and JavaScript syntax
        value: String,
        /// Case-insensitive matching
        ignore_case: bool,
    },
}

impl TextMatch {
    /// Exact text match
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact {
            value: value.into(),
        }
    }

    /// Substring match
    #[must_use]
    pub fn contains(value: impl Into<String>) -> Self {
        Self::Contains {
            value: value.into(),
        }
    }

    /// Case-sensitive regex match
    #[must_use]
    pub fn pattern(value: impl Into<String>) -> Self {
        Self::Pattern {
            value: value.into(),
            ignore_case: false,
        }
    }

    /// Case-insensitive regex match
    #[must_use]
    pub fn pattern_ignore_case(value: impl Into<String>) -> Self {
        Self::Pattern {
            value: value.into(),
            ignore_case: true,
        }
    }

    /// Check raw text against this matcher (whitespace is normalized first)
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_whitespace(text);
        match self {
            Self::Exact { value } => text == *value,
            Self::Contains { value } => text.contains(value.as_str()),
            Self::Pattern { value, ignore_case } => regex::RegexBuilder::new(value)
                .case_insensitive(*ignore_case)
                .build()
                .map(|re| re.is_match(&text))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { value } => write!(f, "{value:?}"),
            Self::Contains { value } => write!(f, "*{value:?}*"),
            Self::Pattern { value, ignore_case } => {
                write!(f, "/{value}/{}", if *ignore_case { "i" } else { "" })
            }
        }
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector; a leading `>` is relative to the scope element
    Css {
        /// Selector source
        value: String,
    },
    /// Innermost elements whose text matches
    Text {
        /// Text matcher
        matcher: TextMatch,
    },
    /// Elements with an ARIA role, optionally filtered by accessible name
    Role {
        /// Role name (button, heading, dialog, ...)
        role: String,
        /// Accessible name matcher
        name: Option<TextMatch>,
    },
    /// Inputs by placeholder text
    Placeholder {
        /// Placeholder text
        value: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            value: selector.into(),
        }
    }

    /// Create a text selector
    #[must_use]
    pub const fn text(matcher: TextMatch) -> Self {
        Self::Text { matcher }
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: Option<TextMatch>) -> Self {
        Self::Role {
            role: role.into(),
            name,
        }
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(value: impl Into<String>) -> Self {
        Self::Placeholder {
            value: value.into(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { value } => write!(f, "css={value}"),
            Self::Text { matcher } => write!(f, "text={matcher}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name}]"),
            Self::Placeholder { value } => write!(f, "placeholder={value:?}"),
        }
    }
}

/// One stage of locator resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Replace the set with matching descendants
    Find {
        /// Selector to search with
        selector: Selector,
    },
    /// Keep only the element at this position
    Nth {
        /// Zero-based index
        index: usize,
    },
    /// Replace each element with its parent
    Parent,
    /// Keep elements whose full text matches
    HasText {
        /// Text matcher
        matcher: TextMatch,
    },
    /// Keep elements containing a descendant that matches
    Has {
        /// Selector for the descendant
        selector: Selector,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find { selector } => write!(f, "{selector}"),
            Self::Nth { index } => write!(f, "nth={index}"),
            Self::Parent => write!(f, ".."),
            Self::HasText { matcher } => write!(f, "has-text={matcher}"),
            Self::Has { selector } => write!(f, "has({selector})"),
        }
    }
}

/// Locator options for customizing behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorOptions {
    /// Timeout for actionability waits, in milliseconds
    pub timeout_ms: u64,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// A locator for finding elements.
///
/// Locators are values: every chaining method returns a new locator and the
/// DOM is only touched when a driver resolves one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Locator {
    steps: Vec<Step>,
    #[serde(skip)]
    options: LocatorOptions,
}

impl Locator {
    /// The document itself (no steps)
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::root().locator(selector)
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self::root().find(selector)
    }

    fn push(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self {
            steps,
            options: self.options,
        }
    }

    /// Search descendants with any selector
    #[must_use]
    pub fn find(&self, selector: Selector) -> Self {
        self.push(Step::Find { selector })
    }

    /// Search descendants with a CSS selector
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Self {
        self.find(Selector::css(css))
    }

    /// Search descendants by text
    #[must_use]
    pub fn get_by_text(&self, matcher: TextMatch) -> Self {
        self.find(Selector::text(matcher))
    }

    /// Search descendants by role and accessible name
    #[must_use]
    pub fn get_by_role(&self, role: &str, name: Option<TextMatch>) -> Self {
        self.find(Selector::role(role, name))
    }

    /// Search descendants by placeholder
    #[must_use]
    pub fn get_by_placeholder(&self, placeholder: &str) -> Self {
        self.find(Selector::placeholder(placeholder))
    }

    /// Pick one match by position
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.push(Step::Nth { index })
    }

    /// Pick the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Move to the parent element
    #[must_use]
    pub fn parent(&self) -> Self {
        self.push(Step::Parent)
    }

    /// Move up a fixed number of ancestors
    #[must_use]
    pub fn ancestor(&self, hops: usize) -> Self {
        (0..hops).fold(self.clone(), |loc, _| loc.parent())
    }

    /// Keep matches whose text satisfies the matcher
    #[must_use]
    pub fn filter_has_text(&self, matcher: TextMatch) -> Self {
        self.push(Step::HasText { matcher })
    }

    /// Keep matches that contain a descendant matching the selector
    #[must_use]
    pub fn filter_has(&self, selector: Selector) -> Self {
        self.push(Step::Has { selector })
    }

    /// Set a custom actionability timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Resolution steps
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Actionability timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.options.timeout_ms)
    }

    /// Steps as JSON for the browser-side resolver
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.steps).unwrap_or_else(|_| "[]".to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "document");
        }
        let parts: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" >> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_exact_normalizes_whitespace() {
            let m = TextMatch::exact("Cut-Off Date");
            assert!(m.matches("  Cut-Off\n   Date "));
            assert!(!m.matches("Cut-Off Date:"));
        }

        #[test]
        fn test_contains() {
            assert!(TextMatch::contains("Agreement:").matches("Agreement: Leisure"));
            assert!(!TextMatch::contains("agreement:").matches("Agreement: Leisure"));
        }

        #[test]
        fn test_bracketed_title_pattern() {
            let m = TextMatch::pattern(r"^\[.*\]$");
            assert!(m.matches("[Crew A]"));
            assert!(!m.matches("Crew A"));
            assert!(!m.matches("[Crew A] Active"));
        }

        #[test]
        fn test_ignore_case_pattern() {
            let m = TextMatch::pattern_ignore_case("^[a-z]{3}$");
            assert!(m.matches("Sep"));
            assert!(!m.matches("Sept"));
            assert!(!TextMatch::pattern("^[a-z]{3}$").matches("Sep"));
        }

        #[test]
        fn test_invalid_pattern_never_matches() {
            assert!(!TextMatch::pattern("([").matches("(["));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_chaining_does_not_mutate_base() {
            let base = Locator::new("main > div > div");
            let card = base.nth(1).locator("> div");
            assert_eq!(base.steps().len(), 1);
            assert_eq!(card.steps().len(), 3);
        }

        #[test]
        fn test_ancestor_adds_parent_steps() {
            let loc = Locator::root()
                .get_by_text(TextMatch::exact("[Crew A]"))
                .ancestor(3);
            let parents = loc
                .steps()
                .iter()
                .filter(|s| matches!(s, Step::Parent))
                .count();
            assert_eq!(parents, 3);
        }

        #[test]
        fn test_display() {
            let loc = Locator::root()
                .get_by_role("button", Some(TextMatch::exact("Filters")))
                .first();
            assert_eq!(loc.to_string(), "role=button[name=\"Filters\"] >> nth=0");
            assert_eq!(Locator::root().to_string(), "document");
        }

        #[test]
        fn test_json_shape_for_resolver() {
            let loc = Locator::new("button").filter_has_text(TextMatch::exact("Save"));
            let json: serde_json::Value = serde_json::from_str(&loc.to_json()).unwrap();
            assert_eq!(json[0]["kind"], "find");
            assert_eq!(json[0]["selector"]["kind"], "css");
            assert_eq!(json[0]["selector"]["value"], "button");
            assert_eq!(json[1]["kind"], "has_text");
            assert_eq!(json[1]["matcher"]["kind"], "exact");
        }

        #[test]
        fn test_with_timeout() {
            let loc = Locator::new("input").with_timeout(Duration::from_millis(250));
            assert_eq!(loc.timeout(), Duration::from_millis(250));
            assert_eq!(Locator::new("input").options().timeout_ms, DEFAULT_TIMEOUT_MS);
        }
    }

    mod bounding_box_tests {
        use super::*;

        #[test]
        fn test_center() {
            let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
            assert_eq!(bbox.center(), Point::new(60.0, 45.0));
        }

        #[test]
        fn test_has_area_needs_both_dimensions() {
            assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).has_area());
            assert!(!BoundingBox::new(0.0, 0.0, 0.0, 10.0).has_area());
            assert!(!BoundingBox::new(0.0, 0.0, 10.0, 0.0).has_area());
            assert!(!BoundingBox::empty().has_area());
        }
    }
}
