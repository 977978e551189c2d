//! Event card page object.
//!
//! A [`Card`] is a view over one card's subtree in the live page. Nothing is
//! cached: every accessor re-reads the DOM. Accessors return `None` while an
//! element is missing, because a card that is mid re-render legitimately
//! lacks its title for a moment; callers that need presence should use
//! [`crate::expect`].

use crate::driver::PageDriver;
use crate::filter::RfpStatus;
use crate::locator::Locator;
use crate::regions;
use crate::result::RoomingResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Cut-off date as rendered on a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutOffDate {
    /// Three-letter month abbreviation
    pub month: String,
    /// Day of month, as rendered
    pub day: String,
}

/// Extract the count from a "View Bookings (7)" label.
///
/// Labels without a parenthesized number read as zero.
#[must_use]
pub fn parse_booking_count(label: &str) -> u32 {
    static COUNT: OnceLock<Regex> = OnceLock::new();
    let re = COUNT.get_or_init(|| Regex::new(r"\((\d+)\)").expect("static regex"));
    re.captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// RFP name without the surrounding brackets
#[must_use]
pub fn parse_title_name(title: &str) -> &str {
    let trimmed = title.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(trimmed)
}

/// Everything a card shows, read at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Bracketed RFP name
    pub title: String,
    /// Status badge text
    pub status: Option<String>,
    /// Agreement type
    pub agreement_type: Option<String>,
    /// Cut-off date
    pub cut_off_date: Option<CutOffDate>,
    /// Number of bookings from the button label
    pub booking_count: u32,
}

impl CardSnapshot {
    /// Status parsed into the closed set, if it is one of them
    #[must_use]
    pub fn rfp_status(&self) -> Option<RfpStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// One event card
#[derive(Debug)]
pub struct Card<'a, D: PageDriver> {
    driver: &'a D,
    root: Locator,
}

impl<'a, D: PageDriver> Card<'a, D> {
    /// Wrap a card root region
    #[must_use]
    pub const fn new(driver: &'a D, root: Locator) -> Self {
        Self { driver, root }
    }

    /// Root region of the card
    #[must_use]
    pub const fn root(&self) -> &Locator {
        &self.root
    }

    async fn text_of(&self, locator: &Locator) -> RoomingResult<Option<String>> {
        Ok(self
            .driver
            .text_content(locator)
            .await?
            .map(|t| t.trim().to_string()))
    }

    /// Bracketed title
    pub async fn title(&self) -> RoomingResult<Option<String>> {
        self.text_of(&regions::card_title(&self.root)).await
    }

    /// Status badge text
    pub async fn status(&self) -> RoomingResult<Option<String>> {
        let badge = regions::card_status_badge(&self.root);
        if self.driver.count(&badge).await? > 0 {
            return self.text_of(&badge).await;
        }
        self.text_of(&regions::card_status_text(&self.root)).await
    }

    /// Agreement type next to the "Agreement:" label
    pub async fn agreement_type(&self) -> RoomingResult<Option<String>> {
        self.text_of(&regions::card_agreement(&self.root)).await
    }

    /// Month and day of the cut-off date; `None` unless both are present
    pub async fn cut_off_date(&self) -> RoomingResult<Option<CutOffDate>> {
        let month = self.text_of(&regions::card_cut_off_month(&self.root)).await?;
        let day = self.text_of(&regions::card_cut_off_day(&self.root)).await?;
        Ok(month
            .zip(day)
            .map(|(month, day)| CutOffDate { month, day }))
    }

    /// Number of bookings shown on the View Bookings button
    pub async fn booking_count(&self) -> RoomingResult<u32> {
        let label = self
            .driver
            .text_content(&regions::card_view_bookings(&self.root))
            .await?;
        Ok(label.as_deref().map_or(0, parse_booking_count))
    }

    /// Whether the card has a rendered area
    pub async fn is_visible(&self) -> RoomingResult<bool> {
        self.driver.is_visible(&self.root).await
    }

    /// Open the bookings dialog; wait on [`crate::BookingsModal`] afterwards
    pub async fn activate_bookings_view(&self) -> RoomingResult<()> {
        self.driver
            .click(&regions::card_view_bookings(&self.root))
            .await
    }

    /// Read every field; `None` when the title is not rendered
    pub async fn snapshot(&self) -> RoomingResult<Option<CardSnapshot>> {
        let Some(title) = self.title().await? else {
            return Ok(None);
        };
        Ok(Some(CardSnapshot {
            title,
            status: self.status().await?,
            agreement_type: self.agreement_type().await?,
            cut_off_date: self.cut_off_date().await?,
            booking_count: self.booking_count().await?,
        }))
    }
}
