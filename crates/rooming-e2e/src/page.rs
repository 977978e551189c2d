//! Page object for the Rooming List Management view.
//!
//! [`RoomingListPage`] owns the driver for one scenario and composes the
//! search box, the filter surface, the event carousels and the bookings
//! dialog. Everything it returns borrows the page, so a stale card can never
//! outlive the page it was read from.

use crate::bookings::BookingsModal;
use crate::card::{Card, CardSnapshot};
use crate::carousel::{CardVisitor, Carousel, SnapshotCollector, WalkSummary};
use crate::config::E2eConfig;
use crate::driver::PageDriver;
use crate::expect::Expect;
use crate::filter::{FilterCheckbox, FilterState, RfpStatus};
use crate::fixtures::{listing_route, RoomingListRecord};
use crate::locator::Locator;
use crate::regions;
use crate::result::RoomingResult;
use crate::wait::wait_until;

/// The Rooming List Management view
#[derive(Debug)]
pub struct RoomingListPage<D: PageDriver> {
    driver: D,
    config: E2eConfig,
}

impl<D: PageDriver> RoomingListPage<D> {
    /// Wrap a driver
    #[must_use]
    pub const fn new(driver: D, config: E2eConfig) -> Self {
        Self { driver, config }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Release the driver
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &E2eConfig {
        &self.config
    }

    /// Serve `records` from the listing endpoint on the next load
    pub async fn mock_listing(&mut self, records: &[RoomingListRecord]) -> RoomingResult<()> {
        self.driver.route(listing_route(records)?).await
    }

    /// Load the view and wait for the listing to render
    pub async fn goto(&mut self) -> RoomingResult<()> {
        let url = self.config.base_url.clone();
        tracing::info!(%url, "opening rooming lists");
        self.driver.navigate(&url).await?;
        self.wait_for_listing().await
    }

    /// Retrying expectation with the configured element timeout
    #[must_use]
    pub fn expect(&self, locator: Locator) -> Expect<'_, D> {
        Expect::new(&self.driver, locator).with_timeout(self.config.element_timeout_ms)
    }

    /// Text of the page heading
    pub async fn heading(&self) -> RoomingResult<Option<String>> {
        self.driver.text_content(&regions::page_heading()).await
    }

    /// Whether the empty-listing message is shown
    pub async fn no_results(&self) -> RoomingResult<bool> {
        self.driver.is_visible(&regions::no_results()).await
    }

    /// Either the empty-state message or at least one carousel is rendered
    pub async fn wait_for_listing(&self) -> RoomingResult<()> {
        let driver = &self.driver;
        wait_until(
            "listing to render",
            self.config.navigation_wait(),
            move || async move {
                Ok(driver.is_visible(&regions::no_results()).await?
                    || driver.count(&regions::carousels()).await? > 0)
            },
        )
        .await?;
        Ok(())
    }

    /// Focus the search input and replace its text.
    ///
    /// Does not wait for the listing; follow with
    /// [`Self::wait_for_search_applied`].
    pub async fn search(&self, text: &str) -> RoomingResult<()> {
        tracing::debug!(text, "searching");
        let input = regions::search_input();
        self.driver.click(&input).await?;
        self.driver.fill(&input, text).await
    }

    /// Current text of the search input
    pub async fn search_text(&self) -> RoomingResult<String> {
        Ok(self
            .driver
            .input_value(&regions::search_input())
            .await?
            .unwrap_or_default())
    }

    async fn on_screen_titles(&self) -> RoomingResult<Vec<String>> {
        let mut titles = Vec::new();
        for index in 0..self.carousel_count().await? {
            for card in self.carousel(index).visible_cards().await? {
                if let Some(title) = card.title().await? {
                    titles.push(title);
                }
            }
        }
        Ok(titles)
    }

    /// Wait until the on-screen cards all match `text`, or the empty state
    /// is shown. Titles are matched against the trimmed text, as the
    /// application matches them.
    pub async fn wait_for_search_applied(&self, text: &str) -> RoomingResult<()> {
        let typed = text.to_lowercase();
        let trimmed = text.trim().to_lowercase();
        let (typed, needle) = (typed.as_str(), trimmed.as_str());
        let this = self;
        wait_until(
            "search to apply",
            self.config.element_wait(),
            move || async move {
                if this.search_text().await?.to_lowercase() != typed {
                    return Ok(false);
                }
                if this.no_results().await? {
                    return Ok(true);
                }
                let titles = this.on_screen_titles().await?;
                Ok(!titles.is_empty() && titles.iter().all(|t| t.to_lowercase().contains(needle)))
            },
        )
        .await?;
        Ok(())
    }

    /// Wait until every on-screen card has a status `filters` lets through,
    /// or the empty state is shown
    pub async fn wait_for_filters_applied(&self, filters: &FilterState) -> RoomingResult<()> {
        let this = self;
        wait_until(
            "filters to apply",
            self.config.element_wait(),
            move || async move {
                if this.no_results().await? {
                    return Ok(true);
                }
                let statuses = this.on_screen_statuses().await?;
                Ok(!statuses.is_empty()
                    && statuses.iter().all(|s| {
                        s.as_deref()
                            .and_then(|s| s.parse::<RfpStatus>().ok())
                            .is_some_and(|status| filters.allows(status))
                    }))
            },
        )
        .await?;
        Ok(())
    }

    async fn on_screen_statuses(&self) -> RoomingResult<Vec<Option<String>>> {
        let mut statuses = Vec::new();
        for index in 0..self.carousel_count().await? {
            for card in self.carousel(index).visible_cards().await? {
                statuses.push(card.status().await?);
            }
        }
        Ok(statuses)
    }

    /// One status option of the filter surface
    #[must_use]
    pub fn filter(&self, status: RfpStatus) -> FilterCheckbox<'_, D> {
        FilterCheckbox::new(&self.driver, status)
    }

    /// Open the filter surface if it is not already open
    pub async fn open_filters(&self) -> RoomingResult<()> {
        let surface = regions::filter_surface();
        if self.driver.is_visible(&surface).await? {
            return Ok(());
        }
        self.driver.click(&regions::filters_button()).await?;
        let driver = &self.driver;
        let surface = &surface;
        wait_until(
            "filter surface to open",
            self.config.element_wait(),
            move || async move { driver.is_visible(surface).await },
        )
        .await?;
        Ok(())
    }

    /// Uncheck every option on the open surface without saving
    pub async fn clear_filters(&self) -> RoomingResult<()> {
        self.open_filters().await?;
        for status in RfpStatus::ALL {
            self.filter(status).set_checked(false).await?;
        }
        Ok(())
    }

    /// Set the specified flags, leave the rest, and save
    pub async fn apply_filters(&self, request: FilterState) -> RoomingResult<()> {
        tracing::info!(filters = %request, "applying filters");
        self.open_filters().await?;
        for (status, checked) in request.specified() {
            self.filter(status).set_checked(checked).await?;
        }
        self.driver.click(&regions::save_filters_button()).await?;
        let driver = &self.driver;
        wait_until(
            "filter surface to close",
            self.config.element_wait(),
            move || async move { Ok(!driver.is_visible(&regions::filter_surface()).await?) },
        )
        .await?;
        Ok(())
    }

    /// Read all three flags.
    ///
    /// Opens the filter surface as a side effect and leaves it open.
    pub async fn read_filters(&self) -> RoomingResult<FilterState> {
        self.open_filters().await?;
        Ok(FilterState::of(
            self.filter(RfpStatus::Active).is_checked().await?,
            self.filter(RfpStatus::Closed).is_checked().await?,
            self.filter(RfpStatus::Cancelled).is_checked().await?,
        ))
    }

    /// Number of event groups rendered
    pub async fn carousel_count(&self) -> RoomingResult<usize> {
        self.driver.count(&regions::carousels()).await
    }

    /// Event group at a position in listing order
    #[must_use]
    pub fn carousel(&self, index: usize) -> Carousel<'_, D> {
        Carousel::new(&self.driver, regions::carousels().nth(index), index)
    }

    /// Every event group, in listing order
    pub async fn list_carousels(&self) -> RoomingResult<Vec<Carousel<'_, D>>> {
        let count = self.carousel_count().await?;
        Ok((0..count).map(|i| self.carousel(i)).collect())
    }

    /// Walk every carousel, visiting each distinct card once per carousel
    pub async fn for_each_card<V>(&self, visitor: &mut V) -> RoomingResult<WalkSummary>
    where
        V: CardVisitor<D>,
    {
        let options = self.config.walk_options();
        let mut total = WalkSummary { pages: 0, cards: 0 };
        for carousel in self.list_carousels().await? {
            let summary = carousel.walk(&options, visitor).await?;
            total.pages += summary.pages;
            total.cards += summary.cards;
        }
        tracing::debug!(pages = total.pages, cards = total.cards, "walked all carousels");
        Ok(total)
    }

    /// Snapshot of every card on the page
    pub async fn collect_cards(&self) -> RoomingResult<Vec<CardSnapshot>> {
        let mut collector = SnapshotCollector::default();
        self.for_each_card(&mut collector).await?;
        Ok(collector.snapshots)
    }

    /// Distinct titles of each carousel, in listing order
    pub async fn carousel_titles(&self) -> RoomingResult<Vec<Vec<String>>> {
        let options = self.config.walk_options();
        let mut out = Vec::new();
        for carousel in self.list_carousels().await? {
            out.push(carousel.titles(&options).await?);
        }
        Ok(out)
    }

    /// Card located anywhere on the page by its exact title
    #[must_use]
    pub fn card_by_title(&self, title: &str) -> Card<'_, D> {
        Card::new(&self.driver, regions::card_by_title(title))
    }

    /// The bookings dialog
    #[must_use]
    pub fn bookings_modal(&self) -> BookingsModal<'_, D> {
        BookingsModal::new(&self.driver, self.config.element_wait())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::TitleCollector;
    use crate::fixtures::grouping_records;
    use crate::mock::{MockDriver, MockRoomingApp};

    fn config() -> E2eConfig {
        E2eConfig::default().with_element_timeout(200)
    }

    async fn open(driver: MockDriver) -> RoomingListPage<MockDriver> {
        let mut page = RoomingListPage::new(driver, config());
        page.goto().await.unwrap();
        page
    }

    mod search_tests {
        use super::*;

        #[tokio::test]
        async fn test_padded_search_counts_as_applied() {
            let page = open(MockDriver::new()).await;
            page.search("  Crew ").await.unwrap();
            page.wait_for_search_applied("  Crew ").await.unwrap();
            assert_eq!(page.search_text().await.unwrap(), "  Crew ");
        }

        #[tokio::test]
        async fn test_search_round_trips_text() {
            let page = open(MockDriver::new()).await;
            page.search("Crew").await.unwrap();
            assert_eq!(page.search_text().await.unwrap(), "Crew");
            page.wait_for_search_applied("Crew").await.unwrap();
        }

        #[tokio::test]
        async fn test_search_without_matches_shows_empty_state() {
            let page = open(MockDriver::new()).await;
            page.search("TTT___").await.unwrap();
            page.wait_for_search_applied("TTT___").await.unwrap();
            assert!(page.no_results().await.unwrap());
            assert_eq!(page.carousel_count().await.unwrap(), 0);
        }
    }

    mod filter_tests {
        use super::*;

        #[tokio::test]
        async fn test_partial_apply_preserves_other_flags() {
            let page = open(MockDriver::new()).await;
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

        #[tokio::test]
        async fn test_read_filters_leaves_surface_open() {
            let page = open(MockDriver::new()).await;
            let _ = page.read_filters().await.unwrap();
            assert!(page.driver().is_visible(&regions::filter_surface()).await.unwrap());
        }

        #[tokio::test]
        async fn test_set_checked_toggles_at_most_once() {
            let page = open(MockDriver::new()).await;
            page.open_filters().await.unwrap();
            let active = page.filter(RfpStatus::Active);
            active.set_checked(true).await.unwrap();
            assert!(active.is_checked().await.unwrap());
            active.set_checked(true).await.unwrap();
            assert!(active.is_checked().await.unwrap());
            assert_eq!(page.driver().clicks_on(active.root()), 1);
        }

        #[tokio::test]
        async fn test_filters_applied_waits_for_rerender() {
            let page = open(MockDriver::new()).await;
            let active = FilterState::unset().with_active(true);
            let err = page.wait_for_filters_applied(&active).await.unwrap_err();
            assert!(err.is_timeout());

            page.apply_filters(active).await.unwrap();
            page.wait_for_filters_applied(&active).await.unwrap();
        }

        #[tokio::test]
        async fn test_filters_applied_accepts_empty_state() {
            let records = vec![RoomingListRecord::new("ev", "Solo")
                .with_status(RfpStatus::Closed)];
            let mut page = RoomingListPage::new(MockDriver::new(), config());
            page.mock_listing(&records).await.unwrap();
            page.goto().await.unwrap();
            let active = FilterState::unset().with_active(true);
            page.apply_filters(active).await.unwrap();
            page.wait_for_filters_applied(&active).await.unwrap();
            assert!(page.no_results().await.unwrap());
        }
    }

    mod traversal_tests {
        use super::*;

        #[tokio::test]
        async fn test_grouping_by_event() {
            let mut page = RoomingListPage::new(MockDriver::new(), config());
            page.mock_listing(&grouping_records()).await.unwrap();
            page.goto().await.unwrap();
            assert_eq!(
                page.carousel_titles().await.unwrap(),
                vec![
                    vec!["[Crew A]".to_string(), "[Crew B]".to_string()],
                    vec!["[Other]".to_string()],
                ]
            );
        }

        #[tokio::test]
        async fn test_for_each_card_visits_every_seeded_record_once() {
            let page = open(MockDriver::new()).await;
            let mut collector = TitleCollector::default();
            let summary = page.for_each_card(&mut collector).await.unwrap();
            let expected: Vec<String> = crate::fixtures::seed_records()
                .iter()
                .map(RoomingListRecord::title)
                .collect();
            assert_eq!(collector.titles, expected);
            assert_eq!(summary.cards, expected.len());
        }

        #[tokio::test]
        async fn test_card_by_title_reads_fields() {
            let page = open(MockDriver::new()).await;
            let card = page.card_by_title("[Crew A]");
            let snap = card.snapshot().await.unwrap().unwrap();
            assert_eq!(snap.status.as_deref(), Some("Active"));
            assert_eq!(snap.agreement_type.as_deref(), Some("Leisure"));
            assert_eq!(snap.booking_count, 2);
            let cut_off = snap.cut_off_date.unwrap();
            assert_eq!((cut_off.month.as_str(), cut_off.day.as_str()), ("Jan", "15"));
        }

        #[tokio::test]
        async fn test_stuck_carousel_fails_instead_of_hanging() {
            let app = MockRoomingApp::default().with_stuck_next(true);
            let config = config().with_element_timeout(20);
            let mut page = RoomingListPage::new(MockDriver::with_app(app), config);
            page.goto().await.unwrap();
            let err = page.collect_cards().await.unwrap_err();
            assert!(matches!(
                err,
                crate::result::RoomingError::PaginationStalled { .. }
            ));
        }
    }

    mod bookings_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_and_close_bookings() {
            let page = open(MockDriver::new()).await;
            page.card_by_title("[Crew A]")
                .activate_bookings_view()
                .await
                .unwrap();
            let modal = page.bookings_modal();
            modal.wait_until_open().await.unwrap();
            assert_eq!(modal.row_count().await.unwrap(), 2);
            assert_eq!(modal.rows().await.unwrap(), vec!["Ana Ruiz", "Ben Ode"]);
            modal.close().await.unwrap();
            assert!(!modal.is_open().await.unwrap());
        }
    }
}
