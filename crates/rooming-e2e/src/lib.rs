//! Rooming E2E: page objects and scenarios for the Rooming List Management view
//!
//! The suite drives the listing page through a [`PageDriver`], so every
//! scenario runs unchanged against headless Chromium ([`CdpDriver`], behind the
//! `browser` feature) and against the in-memory application in [`mock`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ROOMING E2E Architecture                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ Page       │    │ PageDriver │            │
//! │   │ (TC01..)   │───►│ Objects    │───►│ CDP / mock │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │                           │                                     │
//! │                     ┌─────┴──────┐                              │
//! │                     │ Locators   │  serializable steps,         │
//! │                     │ (regions)  │  resolved by either driver   │
//! │                     └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust,ignore
//! use rooming_e2e::{scenarios, E2eConfig, RoomingListPage};
//! use rooming_e2e::mock::MockDriver;
//!
//! let mut page = RoomingListPage::new(MockDriver::new(), E2eConfig::default());
//! scenarios::search_filters_events(&mut page, "Crew").await?;
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod bookings;
#[cfg(feature = "browser")]
mod browser;
mod card;
mod carousel;
mod config;
mod driver;
mod expect;
mod filter;
mod page;
mod result;

/// Listing fixtures and the listing endpoint route
pub mod fixtures;

/// Serializable element locators
pub mod locator;

/// In-memory Rooming List Management application
pub mod mock;

/// Network Request Interception
pub mod network;

/// Locators for every region of the listing page
pub mod regions;

/// End-to-end scenarios
pub mod scenarios;

/// Wait Mechanisms
pub mod wait;

pub use bookings::BookingsModal;
#[cfg(feature = "browser")]
pub use browser::{CdpDriver, RESOLVER_JS};
pub use card::{parse_booking_count, parse_title_name, Card, CardSnapshot, CutOffDate};
pub use carousel::{
    CardVisitor, Carousel, SnapshotCollector, TitleCollector, WalkOptions, WalkSummary,
};
pub use config::{E2eConfig, ENV_BASE_URL};
pub use driver::PageDriver;
pub use expect::{expect, Expect};
pub use filter::{FilterCheckbox, FilterState, RfpStatus};
pub use fixtures::{BookingRecord, RoomingListRecord};
pub use locator::{BoundingBox, Locator, LocatorOptions, Point, Selector, Step, TextMatch};
pub use network::{HttpMethod, MockResponse, Route, UrlPattern};
pub use page::RoomingListPage;
pub use result::{RoomingError, RoomingResult};
pub use wait::{wait_for_value, wait_until, WaitOptions, WaitResult};

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
