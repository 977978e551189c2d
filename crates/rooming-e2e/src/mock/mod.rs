//! In-memory stand-in for the Rooming List Management view.
//!
//! Page objects run against [`MockDriver`] exactly as they run against a
//! browser: locators are resolved over a rendered [`dom::Document`], clicks
//! dispatch to [`MockRoomingApp`] and the page is re-rendered on the next
//! query.
//!
//! ```rust,ignore
//! use rooming_e2e::mock::{MockDriver, MockRoomingApp};
//!
//! let app = MockRoomingApp::default().with_page_size(2).with_step(1);
//! let mut driver = MockDriver::with_app(app);
//! driver.navigate("http://localhost:3000/").await?;
//! ```

pub mod app;
pub mod css;
pub mod dom;
pub mod driver;

pub use app::{Action, EventGroup, MockRoomingApp, DEFAULT_PAGE_SIZE, DEFAULT_STEP};
pub use driver::{DriverCall, MockDriver};
