//! PageDriver - Abstract Browser Automation Trait
//!
//! Every page object in this crate talks to the browser through this trait,
//! so the same page objects run against Chromium ([`crate::CdpDriver`], behind
//! the `browser` feature) and against the in-memory application
//! ([`crate::mock::MockDriver`]).
//!
//! Each call is one suspension point. Calls issued in sequence reach the page
//! in that sequence, but a returned call says nothing about whether the page
//! has finished re-rendering; use [`crate::wait`] for that.

use crate::locator::{BoundingBox, Locator};
use crate::network::Route;
use crate::result::RoomingResult;
use async_trait::async_trait;

/// Abstract driver trait for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load event
    async fn navigate(&mut self, url: &str) -> RoomingResult<()>;

    /// Install a network route; applies to requests issued after this call
    async fn route(&mut self, route: Route) -> RoomingResult<()>;

    /// Number of elements matching the locator
    async fn count(&self, locator: &Locator) -> RoomingResult<usize>;

    /// Text content of the first match, `None` when nothing matches
    async fn text_content(&self, locator: &Locator) -> RoomingResult<Option<String>>;

    /// Value of the first matching form control
    async fn input_value(&self, locator: &Locator) -> RoomingResult<Option<String>>;

    /// Bounding boxes of every match, in resolution order
    async fn bounding_boxes(&self, locator: &Locator) -> RoomingResult<Vec<BoundingBox>>;

    /// Click the first match once it is visible
    async fn click(&self, locator: &Locator) -> RoomingResult<()>;

    /// Replace the value of the first matching input
    async fn fill(&self, locator: &Locator, text: &str) -> RoomingResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> RoomingResult<Vec<u8>>;

    /// Get current URL
    async fn current_url(&self) -> RoomingResult<String>;

    /// Close the page and release the browser
    async fn close(&mut self) -> RoomingResult<()>;

    /// Bounding box of the first match
    async fn bounding_box(&self, locator: &Locator) -> RoomingResult<Option<BoundingBox>> {
        Ok(self.bounding_boxes(locator).await?.into_iter().next())
    }

    /// True iff the first match has non-zero width and height
    async fn is_visible(&self, locator: &Locator) -> RoomingResult<bool> {
        Ok(self
            .bounding_box(locator)
            .await?
            .is_some_and(|b| b.has_area()))
    }
}
