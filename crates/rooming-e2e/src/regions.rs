//! Element locator set for the Rooming List Management view.
//!
//! The application exposes no test ids, so every anchor the page objects use
//! is defined here, once. Anchors prefer accessible names, placeholders and
//! attributes; where only document position identifies a region the
//! heuristic is spelled out as a named constant so it can be changed in one
//! place when the markup moves.

use crate::filter::RfpStatus;
use crate::locator::{Locator, Selector, TextMatch};

/// Placeholder of the search input
pub const SEARCH_PLACEHOLDER: &str = "Search";

/// Heading shown at the top of the filter surface
pub const FILTER_SURFACE_HEADING: &str = "RFP status";

/// Page heading
pub const PAGE_HEADING: &str = "Rooming List Management: Events";

/// Message rendered when the listing is empty
pub const NO_RESULTS_TEXT: &str = "No rooming lists found";

/// Path data of the carousel's "previous" arrow icon
pub const PREVIOUS_ARROW_SVG_PATH: &str = "M15 19l-7-7 7-7";

/// Path data of the carousel's "next" arrow icon
pub const NEXT_ARROW_SVG_PATH: &str = "M9 5l7 7-7 7";

/// Positional heuristic: each event group is a grandchild `div` of `main`
pub const CAROUSEL_ROOT_CSS: &str = "main > div > div";

/// Positional heuristic: cards sit three wrappers below the carousel's
/// second `div` (viewport > track > row > card)
pub const CAROUSEL_CARDS_CSS: &str = "> div:nth-of-type(2) > div > div > div";

/// Positional heuristic: a card root is this many ancestors above its title
pub const CARD_ANCESTOR_HOPS: usize = 2;

/// RFP names are rendered wrapped in square brackets
pub const CARD_TITLE_PATTERN: &str = r"^\[.*\]$";

/// Text fallback for the status badge
pub const CARD_STATUS_PATTERN: &str = "^(Active|Closed|Cancelled)$";

/// Label preceding the agreement type
pub const AGREEMENT_LABEL: &str = "Agreement:";

/// Label anchoring the cut-off date block
pub const CUT_OFF_LABEL: &str = "Cut-Off Date";

/// Accessible-name pattern of the bookings button
pub const VIEW_BOOKINGS_PATTERN: &str = "View Bookings";

/// Search input
#[must_use]
pub fn search_input() -> Locator {
    Locator::root().get_by_placeholder(SEARCH_PLACEHOLDER)
}

/// Filters button
#[must_use]
pub fn filters_button() -> Locator {
    Locator::root().get_by_role("button", Some(TextMatch::exact("Filters")))
}

/// Save button on the filter surface
#[must_use]
pub fn save_filters_button() -> Locator {
    Locator::root().get_by_role("button", Some(TextMatch::exact("Save")))
}

/// Heading that is only rendered while the filter surface is open
#[must_use]
pub fn filter_surface() -> Locator {
    Locator::root().get_by_text(TextMatch::exact(FILTER_SURFACE_HEADING))
}

/// Clickable row of one status filter
#[must_use]
pub fn filter_option(status: RfpStatus) -> Locator {
    Locator::new("label").filter_has_text(TextMatch::exact(status.as_str()))
}

/// Checkmark glyph inside a filter option; rendered only while checked
#[must_use]
pub fn filter_checkmark(option: &Locator) -> Locator {
    option.locator("svg")
}

/// Page heading
#[must_use]
pub fn page_heading() -> Locator {
    Locator::root().get_by_role("heading", Some(TextMatch::exact(PAGE_HEADING)))
}

/// Empty-listing indicator
#[must_use]
pub fn no_results() -> Locator {
    Locator::root().get_by_text(TextMatch::exact(NO_RESULTS_TEXT))
}

/// All event groups, in document order
#[must_use]
pub fn carousels() -> Locator {
    Locator::new(CAROUSEL_ROOT_CSS)
}

/// Arrow button inside a carousel, identified by its icon path
#[must_use]
pub fn carousel_arrow(carousel: &Locator, svg_path: &str) -> Locator {
    carousel
        .locator("button")
        .filter_has(Selector::css(format!("svg path[d=\"{svg_path}\"]")))
}

/// Card roots of a carousel, including off-screen ones
#[must_use]
pub fn carousel_cards(carousel: &Locator) -> Locator {
    carousel.locator(CAROUSEL_CARDS_CSS)
}

/// Title element inside a card
#[must_use]
pub fn card_title(card: &Locator) -> Locator {
    card.get_by_text(TextMatch::pattern(CARD_TITLE_PATTERN))
}

/// Status badge by its structural attribute
#[must_use]
pub fn card_status_badge(card: &Locator) -> Locator {
    card.locator("[data-status]")
}

/// Status badge by its text, for markup without the attribute
#[must_use]
pub fn card_status_text(card: &Locator) -> Locator {
    card.get_by_text(TextMatch::pattern(CARD_STATUS_PATTERN))
}

/// Agreement type value next to its label
#[must_use]
pub fn card_agreement(card: &Locator) -> Locator {
    card.locator("div")
        .filter_has_text(TextMatch::contains(AGREEMENT_LABEL))
        .locator("> span")
        .first()
}

/// Container holding the cut-off label and its month/day values
#[must_use]
pub fn card_cut_off_container(card: &Locator) -> Locator {
    card.get_by_text(TextMatch::exact(CUT_OFF_LABEL)).parent()
}

/// Three-letter month abbreviation of the cut-off date
#[must_use]
pub fn card_cut_off_month(card: &Locator) -> Locator {
    card_cut_off_container(card).get_by_text(TextMatch::pattern_ignore_case("^[a-z]{3}$"))
}

/// Day number of the cut-off date
#[must_use]
pub fn card_cut_off_day(card: &Locator) -> Locator {
    card_cut_off_container(card).get_by_text(TextMatch::pattern(r"^\d{1,2}$"))
}

/// View Bookings button of a card
#[must_use]
pub fn card_view_bookings(card: &Locator) -> Locator {
    card.get_by_role(
        "button",
        Some(TextMatch::pattern(VIEW_BOOKINGS_PATTERN)),
    )
}

/// Card root found anywhere on the page by its exact title
#[must_use]
pub fn card_by_title(title: &str) -> Locator {
    Locator::root()
        .get_by_text(TextMatch::exact(title))
        .first()
        .ancestor(CARD_ANCESTOR_HOPS)
}

/// Bookings dialog
#[must_use]
pub fn bookings_dialog() -> Locator {
    Locator::root().get_by_role("dialog", None)
}

/// One row per booking inside the dialog
#[must_use]
pub fn bookings_rows() -> Locator {
    bookings_dialog().get_by_role("listitem", None)
}

/// Close button of the dialog
#[must_use]
pub fn bookings_close_button() -> Locator {
    bookings_dialog().get_by_role("button", Some(TextMatch::exact("Close")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Step;

    #[test]
    fn test_card_by_title_hops_to_card_root() {
        let loc = card_by_title("[Crew A]");
        let hops = loc
            .steps()
            .iter()
            .filter(|s| matches!(s, Step::Parent))
            .count();
        assert_eq!(hops, CARD_ANCESTOR_HOPS);
    }

    #[test]
    fn test_arrow_locator_targets_icon_path() {
        let next = carousel_arrow(&carousels().nth(0), NEXT_ARROW_SVG_PATH);
        assert!(next.to_string().contains("M9 5l7 7-7 7"));
    }

    #[test]
    fn test_filter_option_uses_status_label() {
        let loc = filter_option(RfpStatus::Cancelled);
        assert!(loc.to_string().contains("\"Cancelled\""));
    }
}
