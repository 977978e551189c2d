//! Every scenario against the in-memory application.

use rooming_e2e::fixtures::{grouping_records, RoomingListRecord};
use rooming_e2e::mock::{MockDriver, MockRoomingApp};
use rooming_e2e::scenarios::{self, FILTER_COMBINATIONS, MATCHING_SEARCH, UNMATCHED_SEARCH};
use rooming_e2e::{E2eConfig, FilterState, RoomingError, RoomingListPage};

fn config() -> E2eConfig {
    E2eConfig::default().with_element_timeout(200)
}

fn page() -> RoomingListPage<MockDriver> {
    rooming_e2e::init_tracing();
    RoomingListPage::new(MockDriver::new(), config())
}

fn page_over(app: MockRoomingApp) -> RoomingListPage<MockDriver> {
    rooming_e2e::init_tracing();
    RoomingListPage::new(MockDriver::with_app(app), config())
}

mod search {
    use super::*;

    #[tokio::test]
    async fn tc01_search_input_is_visible() {
        scenarios::search_input_is_visible(&mut page()).await.unwrap();
    }

    #[tokio::test]
    async fn tc02_search_accepts_text() {
        scenarios::search_accepts_text(&mut page(), "Ultra")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tc03_search_filters_events() {
        scenarios::search_filters_events(&mut page(), MATCHING_SEARCH)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tc03_search_ignores_case() {
        scenarios::search_filters_events(&mut page(), "crew")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tc03_padded_search_filters_events() {
        scenarios::search_filters_events(&mut page(), " Crew")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tc04_unmatched_search_shows_no_results() {
        scenarios::unmatched_search_shows_no_results(&mut page(), UNMATCHED_SEARCH)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tc04_fails_when_results_remain() {
        let err = scenarios::unmatched_search_shows_no_results(&mut page(), MATCHING_SEARCH)
            .await
            .unwrap_err();
        assert!(matches!(err, RoomingError::AssertionFailed { .. }));
    }
}

mod filters {
    use super::*;

    #[tokio::test]
    async fn tc05_filters_button_is_visible() {
        scenarios::filters_button_is_visible(&mut page()).await.unwrap();
    }

    #[tokio::test]
    async fn tc06_filters_button_opens_surface() {
        scenarios::filters_button_opens_surface(&mut page())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn tc07_filter_options_are_listed() {
        scenarios::filter_options_are_listed(&mut page()).await.unwrap();
    }

    #[tokio::test]
    async fn tc08_every_combination_restricts_listing() {
        for filters in FILTER_COMBINATIONS {
            scenarios::filters_restrict_listing(&mut page(), filters)
                .await
                .unwrap_or_else(|e| panic!("{filters}: {e}"));
        }
    }

    #[tokio::test]
    async fn tc10_every_combination_persists() {
        for filters in FILTER_COMBINATIONS {
            scenarios::filters_persist(&mut page(), filters)
                .await
                .unwrap_or_else(|e| panic!("{filters}: {e}"));
        }
    }

    #[tokio::test]
    async fn tc11_filters_select_and_deselect() {
        scenarios::filters_select_and_deselect(&mut page())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn partial_apply_keeps_unspecified_flags() {
        let mut page = page();
        page.goto().await.unwrap();
        page.apply_filters(FilterState::of(false, true, false))
            .await
            .unwrap();
        page.apply_filters(FilterState::unset().with_active(true))
            .await
            .unwrap();
        assert_eq!(
            page.read_filters().await.unwrap(),
            FilterState::of(true, true, false)
        );
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn tc18_page_heading_is_visible() {
        scenarios::page_heading_is_visible(&mut page()).await.unwrap();
    }

    #[tokio::test]
    async fn records_group_by_event() {
        scenarios::records_group_by_event(&mut page()).await.unwrap();
    }

    #[tokio::test]
    async fn grouping_survives_narrow_windows() {
        let app = MockRoomingApp::new(grouping_records())
            .with_page_size(1)
            .with_step(1);
        scenarios::records_group_by_event(&mut page_over(app))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_listing_shows_no_results() {
        scenarios::empty_listing_shows_no_results(&mut page())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn search_and_filter_compose() {
        scenarios::search_and_filter_compose(&mut page(), MATCHING_SEARCH)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn padded_search_and_filter_compose() {
        scenarios::search_and_filter_compose(&mut page(), "crew  ")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bookings_match_card_count() {
        scenarios::bookings_match_card_count(&mut page())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bookings_without_guests() {
        let records = vec![RoomingListRecord::new("ev-solo", "Solo")];
        let mut page = page();
        page.mock_listing(&records).await.unwrap();
        scenarios::bookings_match_card_count(&mut page).await.unwrap();
    }

    #[tokio::test]
    async fn stuck_carousel_is_reported() {
        let app = MockRoomingApp::default().with_stuck_next(true);
        let mut page = RoomingListPage::new(
            MockDriver::with_app(app),
            E2eConfig::default().with_element_timeout(20),
        );
        page.goto().await.unwrap();
        let err = page.collect_cards().await.unwrap_err();
        assert!(matches!(err, RoomingError::PaginationStalled { .. }));
    }
}
