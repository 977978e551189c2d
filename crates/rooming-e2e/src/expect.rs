//! Auto-retrying expectations.
//!
//! An expectation polls the page until it holds or its timeout runs out, so
//! callers never have to guess how long a re-render takes. A failure carries
//! the last value observed.
//!
//! ```ignore
//! expect(page.driver(), regions::no_results()).to_be_visible().await?;
//! expect(page.driver(), regions::search_input()).to_have_value("Crew").await?;
//! ```

use crate::driver::PageDriver;
use crate::locator::{normalize_whitespace, Locator};
use crate::result::{RoomingError, RoomingResult};
use crate::wait::WaitOptions;
use std::fmt::Debug;
use std::future::Future;
use std::time::Instant;

/// Start an expectation on a locator
#[must_use]
pub fn expect<D: PageDriver>(driver: &D, locator: Locator) -> Expect<'_, D> {
    Expect::new(driver, locator)
}

/// Retrying assertion bound to one locator
#[derive(Debug)]
pub struct Expect<'a, D: PageDriver> {
    driver: &'a D,
    locator: Locator,
    options: WaitOptions,
}

impl<'a, D: PageDriver> Expect<'a, D> {
    /// Create an expectation using the locator's own timeout
    #[must_use]
    pub fn new(driver: &'a D, locator: Locator) -> Self {
        let options = WaitOptions::new().with_timeout(locator.options().timeout_ms);
        Self {
            driver,
            locator,
            options,
        }
    }

    /// Override the retry budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options = self.options.with_timeout(timeout_ms);
        self
    }

    async fn retry<T, F, Fut, A>(&self, expectation: &str, mut probe: F, accept: A) -> RoomingResult<()>
    where
        T: Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = RoomingResult<T>>,
        A: Fn(&T) -> bool,
    {
        let start = Instant::now();
        loop {
            let observed = probe().await?;
            if accept(&observed) {
                return Ok(());
            }
            if start.elapsed() >= self.options.timeout() {
                return Err(RoomingError::AssertionFailed {
                    message: format!(
                        "expected {} to {expectation} within {}ms, last observed {observed:?}",
                        self.locator, self.options.timeout_ms
                    ),
                });
            }
            tokio::time::sleep(self.options.poll_interval()).await;
        }
    }

    /// First match has a rendered area
    pub async fn to_be_visible(&self) -> RoomingResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        self.retry("be visible", move || driver.is_visible(locator), |v| *v)
            .await
    }

    /// Nothing matches, or the first match has no rendered area
    pub async fn to_be_hidden(&self) -> RoomingResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        self.retry("be hidden", move || driver.is_visible(locator), |v| !*v)
            .await
    }

    /// Exactly `expected` elements match
    pub async fn to_have_count(&self, expected: usize) -> RoomingResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        self.retry(
            &format!("have count {expected}"),
            move || driver.count(locator),
            |n| *n == expected,
        )
        .await
    }

    /// Whitespace-normalized text of the first match equals `expected`
    pub async fn to_have_text(&self, expected: &str) -> RoomingResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        let wanted = normalize_whitespace(expected);
        self.retry(
            &format!("have text {expected:?}"),
            move || driver.text_content(locator),
            |text| {
                text.as_deref()
                    .is_some_and(|t| normalize_whitespace(t) == wanted)
            },
        )
        .await
    }

    /// Text of the first match contains `expected`
    pub async fn to_contain_text(&self, expected: &str) -> RoomingResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        self.retry(
            &format!("contain text {expected:?}"),
            move || driver.text_content(locator),
            |text| text.as_deref().is_some_and(|t| t.contains(expected)),
        )
        .await
    }

    /// Value of the first matching input equals `expected`
    pub async fn to_have_value(&self, expected: &str) -> RoomingResult<()> {
        let (driver, locator) = (self.driver, &self.locator);
        self.retry(
            &format!("have value {expected:?}"),
            move || driver.input_value(locator),
            |value| value.as_deref() == Some(expected),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::regions;

    async fn loaded() -> MockDriver {
        let mut driver = MockDriver::new();
        driver.navigate("http://localhost:3000/").await.unwrap();
        driver
    }

    #[tokio::test]
    async fn test_visible_and_hidden() {
        let driver = loaded().await;
        expect(&driver, regions::search_input())
            .to_be_visible()
            .await
            .unwrap();
        expect(&driver, regions::filter_surface())
            .to_be_hidden()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failure_reports_last_observed_value() {
        let driver = loaded().await;
        let err = expect(&driver, regions::search_input())
            .with_timeout(20)
            .to_have_value("Crew")
            .await
            .unwrap_err();
        match err {
            RoomingError::AssertionFailed { message } => {
                assert!(message.contains("have value \"Crew\""));
                assert!(message.contains("Some(\"\")"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_text_expectations() {
        let driver = loaded().await;
        expect(&driver, regions::page_heading())
            .to_have_text("Rooming List Management:   Events")
            .await
            .unwrap();
        expect(&driver, regions::page_heading())
            .to_contain_text("Events")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_count() {
        let driver = loaded().await;
        expect(&driver, regions::filters_button())
            .to_have_count(1)
            .await
            .unwrap();
        assert!(expect(&driver, regions::bookings_dialog())
            .with_timeout(10)
            .to_have_count(1)
            .await
            .is_err());
    }
}
