//! Scenarios against a running application in headless Chromium.
//!
//! Skipped unless `ROOMING_E2E_BASE_URL` is set.

#![cfg(feature = "browser")]

use rooming_e2e::scenarios::{self, FILTER_COMBINATIONS, MATCHING_SEARCH, UNMATCHED_SEARCH};
use rooming_e2e::{CdpDriver, E2eConfig, RoomingListPage, RoomingResult, ENV_BASE_URL};

async fn open() -> Option<RoomingListPage<CdpDriver>> {
    rooming_e2e::init_tracing();
    if std::env::var(ENV_BASE_URL).is_err() {
        tracing::info!("{ENV_BASE_URL} not set, skipping browser scenario");
        return None;
    }
    let config = E2eConfig::from_env().unwrap();
    let driver = CdpDriver::launch(&config).await.unwrap();
    Some(RoomingListPage::new(driver, config))
}

async fn finish(page: RoomingListPage<CdpDriver>, outcome: RoomingResult<()>) {
    let mut driver = page.into_driver();
    let _ = rooming_e2e::PageDriver::close(&mut driver).await;
    outcome.unwrap();
}

#[tokio::test]
async fn tc01_search_input_is_visible() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::search_input_is_visible(&mut page).await;
    finish(page, outcome).await;
}

#[tokio::test]
async fn tc03_search_filters_events() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::search_filters_events(&mut page, MATCHING_SEARCH).await;
    finish(page, outcome).await;
}

#[tokio::test]
async fn tc04_unmatched_search_shows_no_results() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::unmatched_search_shows_no_results(&mut page, UNMATCHED_SEARCH).await;
    finish(page, outcome).await;
}

#[tokio::test]
async fn tc07_filter_options_are_listed() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::filter_options_are_listed(&mut page).await;
    finish(page, outcome).await;
}

#[tokio::test]
async fn tc08_filter_combinations() {
    for filters in FILTER_COMBINATIONS {
        let Some(mut page) = open().await else { return };
        let outcome = scenarios::filters_restrict_listing(&mut page, filters).await;
        finish(page, outcome).await;
    }
}

#[tokio::test]
async fn tc18_page_heading_is_visible() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::page_heading_is_visible(&mut page).await;
    finish(page, outcome).await;
}

#[tokio::test]
async fn mocked_grouping() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::records_group_by_event(&mut page).await;
    finish(page, outcome).await;
}

#[tokio::test]
async fn mocked_empty_listing() {
    let Some(mut page) = open().await else { return };
    let outcome = scenarios::empty_listing_shows_no_results(&mut page).await;
    finish(page, outcome).await;
}
