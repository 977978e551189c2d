//! Event carousel page object and the aggregation walk.
//!
//! A carousel is a sliding-window scroller, not a paged list: after one
//! "next" click a card may still be partly on screen, so consecutive
//! captures overlap. The walk therefore keys every card by its title and
//! visits each title once.
//!
//! # Termination
//!
//! The walk ends when the next arrow is gone. Because a rendering fault can
//! leave that arrow up forever, the walk is also bounded:
//!
//! - `max_pages` caps the number of captures ([`RoomingError::PaginationUnbounded`])
//! - `stall_limit` consecutive captures with no new title while the arrow is
//!   still shown fail with [`RoomingError::PaginationStalled`]

use crate::card::{Card, CardSnapshot};
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::regions;
use crate::result::{RoomingError, RoomingResult};
use crate::wait::{wait_until, WaitOptions};
use async_trait::async_trait;
use std::collections::HashSet;

/// Limits for one aggregation walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum number of page captures
    pub max_pages: usize,
    /// Consecutive captures without new titles before giving up
    pub stall_limit: usize,
    /// How long to wait for the window to move after each advance
    pub settle: WaitOptions,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_pages: 50,
            stall_limit: 2,
            settle: WaitOptions::default(),
        }
    }
}

impl WalkOptions {
    /// Set the page cap
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the stall limit
    #[must_use]
    pub const fn with_stall_limit(mut self, stall_limit: usize) -> Self {
        self.stall_limit = stall_limit;
        self
    }

    /// Set the settle wait
    #[must_use]
    pub const fn with_settle(mut self, settle: WaitOptions) -> Self {
        self.settle = settle;
        self
    }
}

/// Outcome of a completed walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Page captures taken
    pub pages: usize,
    /// Distinct titles visited
    pub cards: usize,
}

/// Receives each distinct card of a walk while it is on screen
#[async_trait]
pub trait CardVisitor<D: PageDriver>: Send {
    /// Called once per distinct title
    async fn visit(&mut self, card: &Card<'_, D>) -> RoomingResult<()>;
}

/// Collects titles in visiting order
#[derive(Debug, Default)]
pub struct TitleCollector {
    /// Titles seen so far
    pub titles: Vec<String>,
}

#[async_trait]
impl<D: PageDriver> CardVisitor<D> for TitleCollector {
    async fn visit(&mut self, card: &Card<'_, D>) -> RoomingResult<()> {
        if let Some(title) = card.title().await? {
            self.titles.push(title);
        }
        Ok(())
    }
}

/// Collects a full snapshot of every card
#[derive(Debug, Default)]
pub struct SnapshotCollector {
    /// Snapshots taken so far
    pub snapshots: Vec<CardSnapshot>,
}

#[async_trait]
impl<D: PageDriver> CardVisitor<D> for SnapshotCollector {
    async fn visit(&mut self, card: &Card<'_, D>) -> RoomingResult<()> {
        if let Some(snapshot) = card.snapshot().await? {
            self.snapshots.push(snapshot);
        }
        Ok(())
    }
}

/// One horizontally paginated event group
#[derive(Debug)]
pub struct Carousel<'a, D: PageDriver> {
    driver: &'a D,
    root: Locator,
    index: usize,
}

impl<'a, D: PageDriver> Carousel<'a, D> {
    /// Wrap a carousel root region
    #[must_use]
    pub const fn new(driver: &'a D, root: Locator, index: usize) -> Self {
        Self {
            driver,
            root,
            index,
        }
    }

    /// Position among the page's carousels
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Root region of the carousel
    #[must_use]
    pub const fn root(&self) -> &Locator {
        &self.root
    }

    fn cards(&self) -> Locator {
        regions::carousel_cards(&self.root)
    }

    fn next_button(&self) -> Locator {
        regions::carousel_arrow(&self.root, regions::NEXT_ARROW_SVG_PATH)
    }

    fn previous_button(&self) -> Locator {
        regions::carousel_arrow(&self.root, regions::PREVIOUS_ARROW_SVG_PATH)
    }

    /// Mounted cards, on screen or not
    pub async fn card_count(&self) -> RoomingResult<usize> {
        self.driver.count(&self.cards()).await
    }

    /// Card at a position among the mounted cards
    #[must_use]
    pub fn card_at(&self, index: usize) -> Card<'a, D> {
        Card::new(self.driver, self.cards().nth(index))
    }

    /// Mounted cards with a non-zero rendered area
    pub async fn visible_cards(&self) -> RoomingResult<Vec<Card<'a, D>>> {
        let boxes = self.driver.bounding_boxes(&self.cards()).await?;
        Ok(boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.has_area())
            .map(|(i, _)| self.card_at(i))
            .collect())
    }

    async fn visible_titles(&self) -> RoomingResult<Vec<String>> {
        let mut titles = Vec::new();
        for card in self.visible_cards().await? {
            if let Some(title) = card.title().await? {
                titles.push(title);
            }
        }
        Ok(titles)
    }

    /// Whether the next arrow is present and visible
    pub async fn can_advance(&self) -> RoomingResult<bool> {
        self.driver.is_visible(&self.next_button()).await
    }

    /// Whether the previous arrow is present and visible
    pub async fn can_retreat(&self) -> RoomingResult<bool> {
        self.driver.is_visible(&self.previous_button()).await
    }

    /// Scroll forward one step; previously returned cards may be stale
    pub async fn advance(&self) -> RoomingResult<()> {
        self.driver.click(&self.next_button()).await
    }

    /// Scroll back one step; previously returned cards may be stale
    pub async fn retreat(&self) -> RoomingResult<()> {
        self.driver.click(&self.previous_button()).await
    }

    /// Visit every card of the group exactly once, paging forward as needed
    pub async fn walk<V>(&self, options: &WalkOptions, visitor: &mut V) -> RoomingResult<WalkSummary>
    where
        V: CardVisitor<D>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut pages = 0;
        let mut stalled = 0;

        loop {
            pages += 1;
            let mut captured = Vec::new();
            let mut fresh = 0;
            for card in self.visible_cards().await? {
                let Some(title) = card.title().await? else {
                    continue;
                };
                if seen.insert(title.clone()) {
                    fresh += 1;
                    visitor.visit(&card).await?;
                }
                captured.push(title);
            }
            tracing::debug!(
                carousel = self.index,
                page = pages,
                visible = captured.len(),
                fresh,
                "captured carousel page"
            );

            if !self.can_advance().await? {
                break;
            }

            if fresh == 0 {
                stalled += 1;
                tracing::warn!(
                    carousel = self.index,
                    page = pages,
                    stalled,
                    "carousel page added no new cards"
                );
                if stalled >= options.stall_limit {
                    return Err(RoomingError::PaginationStalled {
                        pages: stalled,
                        seen: seen.len(),
                    });
                }
            } else {
                stalled = 0;
            }

            if pages >= options.max_pages {
                return Err(RoomingError::PaginationUnbounded {
                    max_pages: options.max_pages,
                });
            }

            self.advance().await?;
            self.settle_after_advance(&captured, options.settle).await?;
        }

        Ok(WalkSummary {
            pages,
            cards: seen.len(),
        })
    }

    /// Wait for the visible window to move. Running out of time is not an
    /// error here: the next capture then adds nothing and counts as a stall.
    async fn settle_after_advance(
        &self,
        before: &[String],
        settle: WaitOptions,
    ) -> RoomingResult<()> {
        let this = self;
        let outcome = wait_until("carousel window to move", settle, move || async move {
            Ok(this.visible_titles().await? != before)
        })
        .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(e) if e.is_timeout() => {
                tracing::debug!(carousel = self.index, "carousel window did not move");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Every distinct title, in visiting order
    pub async fn titles(&self, options: &WalkOptions) -> RoomingResult<Vec<String>> {
        let mut collector = TitleCollector::default();
        self.walk(options, &mut collector).await?;
        Ok(collector.titles)
    }

    /// A snapshot of every distinct card, in visiting order
    pub async fn snapshots(&self, options: &WalkOptions) -> RoomingResult<Vec<CardSnapshot>> {
        let mut collector = SnapshotCollector::default();
        self.walk(options, &mut collector).await?;
        Ok(collector.snapshots)
    }
}
