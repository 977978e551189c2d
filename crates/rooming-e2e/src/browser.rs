//! Chromium driver over the Chrome DevTools Protocol.
//!
//! Locators are resolved inside the page by [`RESOLVER_JS`], which interprets
//! the same serialized steps the in-memory DOM does. Clicks go through CDP
//! input events at the element's center, after the element is scrolled into
//! view and has a rendered area. Network routes are served from the Fetch
//! domain.

use crate::config::E2eConfig;
use crate::driver::PageDriver;
use crate::locator::{BoundingBox, Locator};
use crate::network::{find_route, HttpMethod, Route};
use crate::result::{RoomingError, RoomingResult};
use crate::wait::{wait_for_value, WaitOptions};
use async_trait::async_trait;
use base64::Engine as _;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FulfillRequestParams, HeaderEntry,
    RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// In-page locator resolver.
///
/// Called as `(steps, op, arg)`. Mirrors the in-memory resolver: `find`
/// searches strict descendants, text selectors keep the innermost match, a
/// leading `>` in CSS is anchored to the scope, and every step result is
/// de-duplicated in document order.
pub const RESOLVER_JS: &str = r#"(steps, op, arg) => {
  const norm = (s) => (s || '').split(/\s+/).filter(Boolean).join(' ');
  const textMatches = (m, raw) => {
    const text = norm(raw);
    if (m.kind === 'exact') return text === m.value;
    if (m.kind === 'contains') return text.includes(m.value);
    try { return new RegExp(m.value, m.ignore_case ? 'i' : '').test(text); } catch (e) { return false; }
  };
  const implicitRole = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit;
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    if (tag === 'dialog') return 'dialog';
    if (tag === 'li') return 'listitem';
    if (tag === 'textarea') return 'textbox';
    if (tag === 'input') return el.type === 'checkbox' ? 'checkbox' : 'textbox';
    return null;
  };
  const accessibleName = (el) => norm(el.getAttribute('aria-label') || el.textContent);
  const descendants = (scope) => Array.from(scope.querySelectorAll('*'));
  const select = (scope, sel) => {
    if (sel.kind === 'css') {
      const source = sel.value.trim().startsWith('>') ? ':scope ' + sel.value : sel.value;
      return Array.from(scope.querySelectorAll(source));
    }
    if (sel.kind === 'text') {
      return descendants(scope).filter((el) => textMatches(sel.matcher, el.textContent)
        && !Array.from(el.children).some((c) => textMatches(sel.matcher, c.textContent)));
    }
    if (sel.kind === 'role') {
      return descendants(scope).filter((el) => implicitRole(el) === sel.role
        && (!sel.name || textMatches(sel.name, accessibleName(el))));
    }
    if (sel.kind === 'placeholder') {
      const wanted = sel.value.toLowerCase();
      return descendants(scope).filter((el) =>
        (el.getAttribute('placeholder') || '').toLowerCase().includes(wanted));
    }
    throw new Error('unknown selector kind ' + sel.kind);
  };
  const ordered = (els) => {
    const unique = Array.from(new Set(els));
    return unique.sort((a, b) =>
      a === b ? 0 : (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1));
  };
  let current = [document];
  for (const step of steps) {
    if (step.kind === 'find') current = current.flatMap((el) => select(el, step.selector));
    else if (step.kind === 'nth') current = current[step.index] ? [current[step.index]] : [];
    else if (step.kind === 'parent') current = current.map((el) => el.parentElement).filter(Boolean);
    else if (step.kind === 'has_text') current = current.filter((el) => textMatches(step.matcher, el.textContent));
    else if (step.kind === 'has') current = current.filter((el) => select(el, step.selector).length > 0);
    current = ordered(current);
  }
  const box = (el) => {
    const r = el.getBoundingClientRect();
    return { x: r.x, y: r.y, width: r.width, height: r.height };
  };
  const first = current[0];
  switch (op) {
    case 'count': return current.length;
    case 'text': return first ? first.textContent : null;
    case 'value': return first && 'value' in first ? String(first.value) : null;
    case 'boxes': return current.map(box);
    case 'reveal':
      if (!first) return null;
      first.scrollIntoView({ block: 'nearest', inline: 'nearest' });
      return box(first);
    case 'fill': {
      if (!first) return false;
      const proto = first instanceof HTMLTextAreaElement
        ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
      const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
      first.focus();
      setter.call(first, arg);
      first.dispatchEvent(new Event('input', { bubbles: true }));
      first.dispatchEvent(new Event('change', { bubbles: true }));
      return true;
    }
    default: throw new Error('unknown op ' + op);
  }
}"#;

#[derive(Debug, Deserialize)]
struct JsBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl From<JsBox> for BoundingBox {
    fn from(b: JsBox) -> Self {
        Self::new(b.x, b.y, b.width, b.height)
    }
}

fn page_error(e: impl std::fmt::Display) -> RoomingError {
    RoomingError::Page {
        message: e.to_string(),
    }
}

/// Chromium-backed [`PageDriver`]
#[derive(Debug)]
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    routes: Arc<Mutex<Vec<Route>>>,
    handler: JoinHandle<()>,
    interceptor: Option<JoinHandle<()>>,
    navigation: WaitOptions,
}

impl CdpDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(config: &E2eConfig) -> RoomingResult<Self> {
        let mut builder = BrowserConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            if !std::path::Path::new(path).exists() {
                return Err(RoomingError::BrowserNotFound);
            }
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| RoomingError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            Browser::launch(cdp_config)
                .await
                .map_err(|e| RoomingError::BrowserLaunch {
                    message: e.to_string(),
                })?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(page_error)?;
        tracing::info!(headless = config.headless, "chromium launched");
        Ok(Self {
            browser,
            page,
            routes: Arc::new(Mutex::new(Vec::new())),
            handler,
            interceptor: None,
            navigation: config.navigation_wait(),
        })
    }

    async fn resolve<T: DeserializeOwned>(&self, locator: &Locator, op: &str, arg: &str) -> RoomingResult<T> {
        let script = format!(
            "({RESOLVER_JS})({}, {}, {})",
            serde_json::to_string(locator.steps())?,
            serde_json::to_string(op)?,
            serde_json::to_string(arg)?,
        );
        self.page
            .evaluate(script)
            .await
            .map_err(|e| RoomingError::Script {
                message: format!("{locator}: {e}"),
            })?
            .into_value()
            .map_err(|e| RoomingError::Script {
                message: format!("{locator}: {e}"),
            })
    }

    /// Poll until the first match is scrolled into view with a rendered area
    async fn actionable_box(&self, locator: &Locator) -> RoomingResult<BoundingBox> {
        let options = WaitOptions::new().with_timeout(locator.options().timeout_ms);
        let description = format!("{locator} to be visible");
        let this = self;
        wait_for_value(&description, options, move || async move {
            let found: Option<JsBox> = this.resolve(locator, "reveal", "").await?;
            Ok(found.map(BoundingBox::from).filter(BoundingBox::has_area))
        })
        .await
    }

    /// Enable Fetch interception for every installed route
    async fn enable_interception(&mut self) -> RoomingResult<()> {
        let patterns: Vec<RequestPattern> = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| RequestPattern::builder().url_pattern(r.pattern.to_fetch_glob()).build())
            .collect();
        if self.interceptor.is_none() {
            let mut events = self
                .page
                .event_listener::<EventRequestPaused>()
                .await
                .map_err(page_error)?;
            let page = self.page.clone();
            let routes = Arc::clone(&self.routes);
            self.interceptor = Some(tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    if let Err(e) = answer_paused_request(&page, &routes, &event).await {
                        tracing::warn!(url = %event.request.url, error = %e, "request interception failed");
                    }
                }
            }));
        }
        self.page
            .execute(EnableParams::builder().patterns(patterns).build())
            .await
            .map_err(page_error)?;
        Ok(())
    }
}

async fn answer_paused_request(
    page: &Page,
    routes: &Mutex<Vec<Route>>,
    event: &EventRequestPaused,
) -> RoomingResult<()> {
    let url = &event.request.url;
    let method = HttpMethod::parse(&event.request.method);
    let response = find_route(
        &routes.lock().unwrap_or_else(PoisonError::into_inner),
        url,
        &method,
    )
    .map(|r| r.response.clone());

    match response {
        Some(response) => {
            tracing::debug!(%url, status = response.status, "fulfilling mocked request");
            let headers: Vec<HeaderEntry> = response
                .headers
                .iter()
                .map(|(k, v)| HeaderEntry::new(k.clone(), v.clone()))
                .collect();
            let params = FulfillRequestParams::builder()
                .request_id(event.request_id.clone())
                .response_code(i64::from(response.status))
                .response_headers(headers)
                .body(base64::engine::general_purpose::STANDARD.encode(&response.body))
                .build()
                .map_err(|message| RoomingError::Page { message })?;
            page.execute(params).await.map_err(page_error)?;
        }
        None => {
            let params = ContinueRequestParams::builder()
                .request_id(event.request_id.clone())
                .build()
                .map_err(|message| RoomingError::Page { message })?;
            page.execute(params).await.map_err(page_error)?;
        }
    }
    Ok(())
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn navigate(&mut self, url: &str) -> RoomingResult<()> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await.map(|_| ())
        };
        tokio::time::timeout(self.navigation.timeout(), load)
            .await
            .map_err(|_| RoomingError::Timeout {
                ms: self.navigation.timeout_ms,
                waited_for: format!("navigation to {url}"),
            })?
            .map_err(|e| RoomingError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn route(&mut self, route: Route) -> RoomingResult<()> {
        tracing::debug!(pattern = %route.pattern, "installing route");
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
        self.enable_interception().await
    }

    async fn count(&self, locator: &Locator) -> RoomingResult<usize> {
        self.resolve(locator, "count", "").await
    }

    async fn text_content(&self, locator: &Locator) -> RoomingResult<Option<String>> {
        self.resolve(locator, "text", "").await
    }

    async fn input_value(&self, locator: &Locator) -> RoomingResult<Option<String>> {
        self.resolve(locator, "value", "").await
    }

    async fn bounding_boxes(&self, locator: &Locator) -> RoomingResult<Vec<BoundingBox>> {
        let boxes: Vec<JsBox> = self.resolve(locator, "boxes", "").await?;
        Ok(boxes.into_iter().map(BoundingBox::from).collect())
    }

    async fn click(&self, locator: &Locator) -> RoomingResult<()> {
        let target = self.actionable_box(locator).await?;
        let center = target.center();
        self.page
            .click(Point {
                x: f64::from(center.x),
                y: f64::from(center.y),
            })
            .await
            .map_err(page_error)?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> RoomingResult<()> {
        self.actionable_box(locator).await?;
        let filled: bool = self.resolve(locator, "fill", text).await?;
        if filled {
            Ok(())
        } else {
            Err(RoomingError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    async fn screenshot(&self) -> RoomingResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| RoomingError::Screenshot {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| RoomingError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn current_url(&self) -> RoomingResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(page_error)?
            .unwrap_or_default())
    }

    async fn close(&mut self) -> RoomingResult<()> {
        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
        self.browser.close().await.map_err(|e| RoomingError::BrowserLaunch {
            message: e.to_string(),
        })?;
        self.handler.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_understands_every_step_kind() {
        let loc = Locator::new("main > div > div")
            .nth(0)
            .get_by_text(crate::locator::TextMatch::exact("x"))
            .parent()
            .filter_has_text(crate::locator::TextMatch::contains("y"))
            .filter_has(crate::locator::Selector::placeholder("z"));
        let json = serde_json::to_value(loc.steps()).unwrap();
        for step in json.as_array().unwrap() {
            let kind = step["kind"].as_str().unwrap();
            assert!(RESOLVER_JS.contains(&format!("'{kind}'")), "{kind}");
        }
    }
}
