//! Status filters.
//!
//! The filter surface offers one option per [`RfpStatus`]. Options are not
//! native checkboxes: the only trace of their state is a checkmark glyph
//! rendered next to the label, so "checked" means "the glyph is visible".

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::regions;
use crate::result::{RoomingError, RoomingResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an RFP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RfpStatus {
    /// Open for bookings
    Active,
    /// Past its cut-off
    Closed,
    /// Withdrawn
    Cancelled,
}

impl RfpStatus {
    /// Every status, in the order the filter surface lists them
    pub const ALL: [Self; 3] = [Self::Active, Self::Closed, Self::Cancelled];

    /// Label used by the UI
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Closed => "Closed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for RfpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RfpStatus {
    type Err = RoomingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Active" => Ok(Self::Active),
            "Closed" => Ok(Self::Closed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(RoomingError::assertion(format!(
                "unknown RFP status {other:?}"
            ))),
        }
    }
}

/// Requested or observed state of the three status filters.
///
/// `None` means "leave as is" when applied; a state read back from the page
/// always has every flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Active flag
    pub active: Option<bool>,
    /// Closed flag
    pub closed: Option<bool>,
    /// Cancelled flag
    pub cancelled: Option<bool>,
}

impl FilterState {
    /// A state with no flags specified
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            active: None,
            closed: None,
            cancelled: None,
        }
    }

    /// A fully specified state
    #[must_use]
    pub const fn of(active: bool, closed: bool, cancelled: bool) -> Self {
        Self {
            active: Some(active),
            closed: Some(closed),
            cancelled: Some(cancelled),
        }
    }

    /// Set the active flag
    #[must_use]
    pub const fn with_active(mut self, checked: bool) -> Self {
        self.active = Some(checked);
        self
    }

    /// Set the closed flag
    #[must_use]
    pub const fn with_closed(mut self, checked: bool) -> Self {
        self.closed = Some(checked);
        self
    }

    /// Set the cancelled flag
    #[must_use]
    pub const fn with_cancelled(mut self, checked: bool) -> Self {
        self.cancelled = Some(checked);
        self
    }

    /// Flag for one status
    #[must_use]
    pub const fn get(&self, status: RfpStatus) -> Option<bool> {
        match status {
            RfpStatus::Active => self.active,
            RfpStatus::Closed => self.closed,
            RfpStatus::Cancelled => self.cancelled,
        }
    }

    /// Replace the flag for one status
    #[must_use]
    pub const fn with(self, status: RfpStatus, checked: bool) -> Self {
        match status {
            RfpStatus::Active => self.with_active(checked),
            RfpStatus::Closed => self.with_closed(checked),
            RfpStatus::Cancelled => self.with_cancelled(checked),
        }
    }

    /// Specified flags as (status, checked) pairs
    pub fn specified(&self) -> impl Iterator<Item = (RfpStatus, bool)> + '_ {
        RfpStatus::ALL
            .into_iter()
            .filter_map(|s| self.get(s).map(|checked| (s, checked)))
    }

    /// Partial update: flags set here win, unset flags keep `previous`
    #[must_use]
    pub fn merged_onto(&self, previous: &Self) -> Self {
        Self {
            active: self.active.or(previous.active),
            closed: self.closed.or(previous.closed),
            cancelled: self.cancelled.or(previous.cancelled),
        }
    }

    /// Statuses whose flag is `Some(true)`
    #[must_use]
    pub fn selected_statuses(&self) -> Vec<RfpStatus> {
        self.specified()
            .filter_map(|(s, checked)| checked.then_some(s))
            .collect()
    }

    /// Whether the listing shows cards with this status.
    ///
    /// With nothing selected the application shows everything; this mirrors
    /// the observed behavior, not a confirmed product rule.
    #[must_use]
    pub fn allows(&self, status: RfpStatus) -> bool {
        let selected = self.selected_statuses();
        selected.is_empty() || selected.contains(&status)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |v: Option<bool>| v.map_or_else(|| "-".to_string(), |b| b.to_string());
        write!(
            f,
            "active={}, closed={}, cancelled={}",
            flag(self.active),
            flag(self.closed),
            flag(self.cancelled)
        )
    }
}

/// One checkmark-backed filter option
#[derive(Debug)]
pub struct FilterCheckbox<'a, D: PageDriver> {
    driver: &'a D,
    status: RfpStatus,
    root: Locator,
}

impl<'a, D: PageDriver> FilterCheckbox<'a, D> {
    /// Bind the option for a status
    #[must_use]
    pub fn new(driver: &'a D, status: RfpStatus) -> Self {
        Self {
            driver,
            status,
            root: regions::filter_option(status),
        }
    }

    /// Status this option controls
    #[must_use]
    pub const fn status(&self) -> RfpStatus {
        self.status
    }

    /// Root region of the option
    #[must_use]
    pub const fn root(&self) -> &Locator {
        &self.root
    }

    /// Whether the option row is on screen
    pub async fn is_visible(&self) -> RoomingResult<bool> {
        self.driver.is_visible(&self.root).await
    }

    /// True iff the checkmark glyph is rendered and visible
    pub async fn is_checked(&self) -> RoomingResult<bool> {
        self.driver
            .is_visible(&regions::filter_checkmark(&self.root))
            .await
    }

    /// Activate the option once, whatever its state
    pub async fn toggle(&self) -> RoomingResult<()> {
        tracing::debug!(status = %self.status, "toggling filter");
        self.driver.click(&self.root).await
    }

    /// Bring the option to `target`, toggling at most once
    pub async fn set_checked(&self, target: bool) -> RoomingResult<()> {
        if self.is_checked().await? == target {
            return Ok(());
        }
        self.toggle().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod status_tests {
        use super::*;

        #[test]
        fn test_round_trip_labels() {
            for status in RfpStatus::ALL {
                assert_eq!(status.as_str().parse::<RfpStatus>().unwrap(), status);
            }
            assert!("Pending".parse::<RfpStatus>().is_err());
        }
    }

    mod filter_state_tests {
        use super::*;

        #[test]
        fn test_partial_update_preserves_unspecified_flags() {
            let previous = FilterState::of(false, true, false);
            let request = FilterState::unset().with_active(true);
            assert_eq!(request.merged_onto(&previous), FilterState::of(true, true, false));
        }

        #[test]
        fn test_selected_statuses() {
            let state = FilterState::unset().with_closed(true).with_cancelled(false);
            assert_eq!(state.selected_statuses(), vec![RfpStatus::Closed]);
        }

        #[test]
        fn test_nothing_selected_shows_all() {
            let none = FilterState::of(false, false, false);
            assert!(RfpStatus::ALL.iter().all(|s| none.allows(*s)));
            assert!(RfpStatus::ALL.iter().all(|s| FilterState::unset().allows(*s)));
        }

        #[test]
        fn test_selection_restricts() {
            let state = FilterState::of(true, false, true);
            assert!(state.allows(RfpStatus::Active));
            assert!(!state.allows(RfpStatus::Closed));
            assert!(state.allows(RfpStatus::Cancelled));
        }

        #[test]
        fn test_specified_skips_unset() {
            let state = FilterState::unset().with(RfpStatus::Cancelled, true);
            let pairs: Vec<_> = state.specified().collect();
            assert_eq!(pairs, vec![(RfpStatus::Cancelled, true)]);
        }

        #[test]
        fn test_display() {
            let state = FilterState::unset().with_active(true);
            assert_eq!(state.to_string(), "active=true, closed=-, cancelled=-");
        }
    }
}
