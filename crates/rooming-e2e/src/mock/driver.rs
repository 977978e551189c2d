//! [`PageDriver`] over the in-memory application.

use super::app::MockRoomingApp;
use super::dom::{Document, NodeId};
use crate::driver::PageDriver;
use crate::fixtures::{parse_listing, RoomingListRecord, LISTING_ENDPOINT_PATH};
use crate::locator::{BoundingBox, Locator};
use crate::network::{find_route, HttpMethod, Route};
use crate::result::{RoomingError, RoomingResult};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A driver call, as recorded in the history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// `navigate(url)`
    Navigate(String),
    /// `route(..)` with the route's URL pattern
    Route(String),
    /// `click(locator)`
    Click(String),
    /// `fill(locator, text)`
    Fill {
        /// Target locator
        locator: String,
        /// Text typed
        text: String,
    },
    /// `screenshot()`
    Screenshot,
    /// `close()`
    Close,
}

/// Driver backed by [`MockRoomingApp`]
#[derive(Debug)]
pub struct MockDriver {
    app: Mutex<MockRoomingApp>,
    routes: Vec<Route>,
    url: String,
    history: Mutex<Vec<DriverCall>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Driver over the default seeded application
    #[must_use]
    pub fn new() -> Self {
        Self::with_app(MockRoomingApp::default())
    }

    /// Driver over a configured application
    #[must_use]
    pub fn with_app(app: MockRoomingApp) -> Self {
        Self {
            app: Mutex::new(app),
            routes: Vec::new(),
            url: "about:blank".to_string(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Driver whose application serves `records` by default
    #[must_use]
    pub fn with_records(records: Vec<RoomingListRecord>) -> Self {
        Self::with_app(MockRoomingApp::new(records))
    }

    fn app(&self) -> MutexGuard<'_, MockRoomingApp> {
        self.app.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: DriverCall) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Every call made so far
    #[must_use]
    pub fn history(&self) -> Vec<DriverCall> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of clicks issued against exactly this locator
    #[must_use]
    pub fn clicks_on(&self, locator: &Locator) -> usize {
        let target = locator.to_string();
        self.history()
            .iter()
            .filter(|c| matches!(c, DriverCall::Click(l) if *l == target))
            .count()
    }

    /// Read application state directly
    pub fn inspect<R>(&self, f: impl FnOnce(&MockRoomingApp) -> R) -> R {
        f(&self.app())
    }

    fn first_match(doc: &Document, locator: &Locator) -> RoomingResult<NodeId> {
        doc.resolve(locator)?
            .first()
            .copied()
            .ok_or_else(|| RoomingError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    fn actionable(doc: &Document, locator: &Locator) -> RoomingResult<NodeId> {
        let node = Self::first_match(doc, locator)?;
        if doc.is_hidden(node) {
            return Err(RoomingError::ElementNotVisible {
                locator: locator.to_string(),
            });
        }
        Ok(node)
    }

    fn load_listing(&self, url: &str) -> RoomingResult<Vec<RoomingListRecord>> {
        let listing_url = format!("{}{LISTING_ENDPOINT_PATH}", url.trim_end_matches('/'));
        match find_route(&self.routes, &listing_url, &HttpMethod::Get) {
            Some(route) if route.response.status >= 400 => {
                tracing::warn!(
                    status = route.response.status,
                    url = %listing_url,
                    "listing request failed"
                );
                Ok(Vec::new())
            }
            Some(route) => parse_listing(&route.response.body),
            None => Ok(self.app().seed().to_vec()),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> RoomingResult<()> {
        self.record(DriverCall::Navigate(url.to_string()));
        let records = self.load_listing(url)?;
        self.app().load(records);
        self.url = url.to_string();
        Ok(())
    }

    async fn route(&mut self, route: Route) -> RoomingResult<()> {
        self.record(DriverCall::Route(route.pattern.to_string()));
        self.routes.push(route);
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> RoomingResult<usize> {
        Ok(self.app().render().resolve(locator)?.len())
    }

    async fn text_content(&self, locator: &Locator) -> RoomingResult<Option<String>> {
        let doc = self.app().render();
        Ok(doc
            .resolve(locator)?
            .first()
            .map(|n| doc.text_content(*n)))
    }

    async fn input_value(&self, locator: &Locator) -> RoomingResult<Option<String>> {
        let doc = self.app().render();
        let Some(node) = doc.resolve(locator)?.first().copied() else {
            return Ok(None);
        };
        match doc.element(node) {
            Some(el) if el.tag == "input" || el.tag == "textarea" => {
                Ok(Some(el.attr("value").unwrap_or_default().to_string()))
            }
            _ => Err(RoomingError::Page {
                message: format!("{locator} is not a form control"),
            }),
        }
    }

    async fn bounding_boxes(&self, locator: &Locator) -> RoomingResult<Vec<BoundingBox>> {
        let doc = self.app().render();
        Ok(doc
            .resolve(locator)?
            .into_iter()
            .map(|n| doc.bounding_box(n))
            .collect())
    }

    async fn click(&self, locator: &Locator) -> RoomingResult<()> {
        self.record(DriverCall::Click(locator.to_string()));
        let mut app = self.app();
        let doc = app.render();
        let node = Self::actionable(&doc, locator)?;
        match doc.action(node) {
            Some(action) => app.apply(&action),
            None => {
                tracing::debug!(%locator, "click had no effect");
                Ok(())
            }
        }
    }

    async fn fill(&self, locator: &Locator, text: &str) -> RoomingResult<()> {
        self.record(DriverCall::Fill {
            locator: locator.to_string(),
            text: text.to_string(),
        });
        let mut app = self.app();
        let doc = app.render();
        let node = Self::actionable(&doc, locator)?;
        if doc.element(node).is_some_and(|e| e.tag == "input") {
            app.set_search(text);
            Ok(())
        } else {
            Err(RoomingError::Page {
                message: format!("{locator} is not an input"),
            })
        }
    }

    async fn screenshot(&self) -> RoomingResult<Vec<u8>> {
        self.record(DriverCall::Screenshot);
        Err(RoomingError::Screenshot {
            message: "the in-memory page renders no pixels".to_string(),
        })
    }

    async fn current_url(&self) -> RoomingResult<String> {
        Ok(self.url.clone())
    }

    async fn close(&mut self) -> RoomingResult<()> {
        self.record(DriverCall::Close);
        self.app().unload();
        self.url = "about:blank".to_string();
        Ok(())
    }
}
