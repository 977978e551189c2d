//! End-to-end scenarios for the Rooming List Management view.
//!
//! Every scenario starts from a fresh load, talks to the page only through
//! [`RoomingListPage`], and fails with [`RoomingError::AssertionFailed`]. The
//! same functions run against the in-memory application and against Chromium.

use crate::card::parse_title_name;
use crate::driver::PageDriver;
use crate::filter::{FilterState, RfpStatus};
use crate::fixtures::grouping_records;
use crate::page::RoomingListPage;
use crate::regions;
use crate::result::{RoomingError, RoomingResult};

/// The eight checked/unchecked combinations of the three status filters
pub const FILTER_COMBINATIONS: [FilterState; 8] = [
    FilterState::of(true, false, false),
    FilterState::of(false, true, false),
    FilterState::of(false, false, true),
    FilterState::of(true, true, false),
    FilterState::of(true, false, true),
    FilterState::of(false, true, true),
    FilterState::of(true, true, true),
    FilterState::of(false, false, false),
];

/// Search text matching some RFP names in the seeded listing
pub const MATCHING_SEARCH: &str = "Crew";

/// Search text matching nothing
pub const UNMATCHED_SEARCH: &str = "TTT___";

fn ensure(condition: bool, message: impl FnOnce() -> String) -> RoomingResult<()> {
    if condition {
        Ok(())
    } else {
        Err(RoomingError::assertion(message()))
    }
}

async fn card_statuses<D: PageDriver>(page: &RoomingListPage<D>) -> RoomingResult<Vec<String>> {
    let mut statuses: Vec<String> = page
        .collect_cards()
        .await?
        .into_iter()
        .filter_map(|card| card.status)
        .collect();
    statuses.sort();
    Ok(statuses)
}

/// TC01: the search input is displayed
pub async fn search_input_is_visible<D: PageDriver>(page: &mut RoomingListPage<D>) -> RoomingResult<()> {
    page.goto().await?;
    page.expect(regions::search_input()).to_be_visible().await
}

/// TC02: text typed into the search input stays there
pub async fn search_accepts_text<D: PageDriver>(
    page: &mut RoomingListPage<D>,
    text: &str,
) -> RoomingResult<()> {
    page.goto().await?;
    page.search(text).await?;
    let typed = page.search_text().await?;
    ensure(typed == text, || format!("search input holds {typed:?}, typed {text:?}"))
}

/// TC03: every card left after a search matches the search text
pub async fn search_filters_events<D: PageDriver>(
    page: &mut RoomingListPage<D>,
    text: &str,
) -> RoomingResult<()> {
    page.goto().await?;
    page.search(text).await?;
    page.wait_for_search_applied(text).await?;
    let needle = text.trim().to_lowercase();
    let options = page.config().walk_options();
    for carousel in page.list_carousels().await? {
        for card in carousel.snapshots(&options).await? {
            let rfp_name = parse_title_name(&card.title);
            ensure(rfp_name.to_lowercase().contains(&needle), || {
                format!("RFP {rfp_name:?} does not match search {text:?}")
            })?;
        }
    }
    Ok(())
}

/// TC04: a search matching nothing shows the no-results message
pub async fn unmatched_search_shows_no_results<D: PageDriver>(
    page: &mut RoomingListPage<D>,
    text: &str,
) -> RoomingResult<()> {
    page.goto().await?;
    page.search(text).await?;
    page.expect(regions::no_results()).to_be_visible().await
}

/// TC05: the Filters button is displayed
pub async fn filters_button_is_visible<D: PageDriver>(page: &mut RoomingListPage<D>) -> RoomingResult<()> {
    page.goto().await?;
    page.expect(regions::filters_button()).to_be_visible().await
}

/// TC06: clicking Filters opens the filter surface
pub async fn filters_button_opens_surface<D: PageDriver>(
    page: &mut RoomingListPage<D>,
) -> RoomingResult<()> {
    page.goto().await?;
    page.open_filters().await?;
    page.expect(regions::filter_surface()).to_be_visible().await
}

/// TC07: the surface offers Active, Closed and Cancelled
pub async fn filter_options_are_listed<D: PageDriver>(page: &mut RoomingListPage<D>) -> RoomingResult<()> {
    page.goto().await?;
    page.open_filters().await?;
    for status in RfpStatus::ALL {
        page.expect(page.filter(status).root().clone())
            .to_be_visible()
            .await?;
    }
    Ok(())
}

/// TC08: after saving `filters` only cards with a selected status remain.
///
/// With nothing selected every card remains.
pub async fn filters_restrict_listing<D: PageDriver>(
    page: &mut RoomingListPage<D>,
    filters: FilterState,
) -> RoomingResult<()> {
    page.goto().await?;
    let before = card_statuses(page).await?;
    let expected: Vec<String> = before
        .into_iter()
        .filter(|s| s.parse::<RfpStatus>().is_ok_and(|status| filters.allows(status)))
        .collect();

    page.apply_filters(filters).await?;
    page.wait_for_filters_applied(&filters).await?;
    let actual = card_statuses(page).await?;
    ensure(actual == expected, || {
        format!("filters {filters}: expected statuses {expected:?}, found {actual:?}")
    })
}

/// TC10: saved filters read back unchanged
pub async fn filters_persist<D: PageDriver>(
    page: &mut RoomingListPage<D>,
    filters: FilterState,
) -> RoomingResult<()> {
    page.goto().await?;
    page.apply_filters(filters).await?;
    let saved = page.read_filters().await?;
    ensure(saved == filters, || format!("saved {filters}, read back {saved}"))
}

/// TC11: every option can be checked and then unchecked
pub async fn filters_select_and_deselect<D: PageDriver>(
    page: &mut RoomingListPage<D>,
) -> RoomingResult<()> {
    page.goto().await?;
    page.open_filters().await?;
    page.clear_filters().await?;
    for target in [true, false] {
        for status in RfpStatus::ALL {
            page.filter(status).set_checked(target).await?;
        }
        for status in RfpStatus::ALL {
            let checked = page.filter(status).is_checked().await?;
            ensure(checked == target, || {
                format!("{status} checked={checked}, wanted {target}")
            })?;
        }
    }
    Ok(())
}

/// TC18: the page heading is displayed
pub async fn page_heading_is_visible<D: PageDriver>(page: &mut RoomingListPage<D>) -> RoomingResult<()> {
    page.goto().await?;
    page.expect(regions::page_heading()).to_be_visible().await
}

/// Records sharing an event id render as one carousel
pub async fn records_group_by_event<D: PageDriver>(page: &mut RoomingListPage<D>) -> RoomingResult<()> {
    page.mock_listing(&grouping_records()).await?;
    page.goto().await?;
    let titles = page.carousel_titles().await?;
    let expected = vec![
        vec!["[Crew A]".to_string(), "[Crew B]".to_string()],
        vec!["[Other]".to_string()],
    ];
    ensure(titles == expected, || format!("carousels {titles:?}, expected {expected:?}"))
}

/// An empty listing shows the no-results message and no carousels
pub async fn empty_listing_shows_no_results<D: PageDriver>(
    page: &mut RoomingListPage<D>,
) -> RoomingResult<()> {
    page.mock_listing(&[]).await?;
    page.goto().await?;
    page.expect(regions::no_results()).to_be_visible().await?;
    let count = page.carousel_count().await?;
    ensure(count == 0, || format!("{count} carousels rendered for an empty listing"))
}

/// Search and a status filter narrow the listing together
pub async fn search_and_filter_compose<D: PageDriver>(
    page: &mut RoomingListPage<D>,
    text: &str,
) -> RoomingResult<()> {
    page.goto().await?;
    let filters = FilterState::unset().with_active(true);
    page.apply_filters(filters).await?;
    page.wait_for_filters_applied(&filters).await?;
    page.search(text).await?;
    page.wait_for_search_applied(text).await?;
    let needle = text.trim().to_lowercase();
    for card in page.collect_cards().await? {
        ensure(parse_title_name(&card.title).to_lowercase().contains(&needle), || {
            format!("card {} does not match search {text:?}", card.title)
        })?;
        ensure(card.rfp_status() == Some(RfpStatus::Active), || {
            format!("card {} has status {:?}", card.title, card.status)
        })?;
    }
    Ok(())
}

/// The bookings dialog lists as many rows as the card's button announces
pub async fn bookings_match_card_count<D: PageDriver>(
    page: &mut RoomingListPage<D>,
) -> RoomingResult<()> {
    page.goto().await?;
    let card = page.carousel(0).card_at(0);
    let expected = card.booking_count().await?;
    card.activate_bookings_view().await?;
    let modal = page.bookings_modal();
    modal.wait_until_open().await?;
    let rows = modal.row_count().await?;
    ensure(rows == expected as usize, || {
        format!("dialog lists {rows} bookings, card announces {expected}")
    })?;
    modal.close().await
}
