//! In-memory Rooming List Management view.
//!
//! Holds the state the real application keeps (loaded records, search text,
//! saved and draft filters, carousel offsets, open dialog) and renders it to
//! a [`Document`] whose structure matches what the locator set expects.

use super::dom::{Document, El, NodeId};
use crate::filter::{FilterState, RfpStatus};
use crate::fixtures::{seed_records, RoomingListRecord};
use crate::regions;
use crate::result::{RoomingError, RoomingResult};
use std::collections::HashMap;

/// Cards rendered on screen per carousel
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// Cards the window moves per arrow click
pub const DEFAULT_STEP: usize = 2;

const CHECKMARK_SVG_PATH: &str = "M5 13l4 4L19 7";

/// What clicking an element does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Focus the search input
    FocusSearch,
    /// Open or close the filter surface
    ToggleFilterPanel,
    /// Flip one draft checkmark
    ToggleDraft(RfpStatus),
    /// Commit the draft filters
    SaveFilters,
    /// Move an event's window forward
    Next(String),
    /// Move an event's window back
    Previous(String),
    /// Open the bookings dialog for a record
    OpenBookings(usize),
    /// Close the bookings dialog
    CloseBookings,
}

/// Records of one event, in listing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGroup {
    /// Grouping key
    pub event_id: String,
    /// Heading of the carousel
    pub event_name: String,
    /// Indexes into the loaded records
    pub records: Vec<usize>,
}

/// Application state
#[derive(Debug, Clone)]
pub struct MockRoomingApp {
    seed: Vec<RoomingListRecord>,
    records: Vec<RoomingListRecord>,
    loaded: bool,
    search: String,
    saved: FilterState,
    draft: FilterState,
    panel_open: bool,
    offsets: HashMap<String, usize>,
    bookings_for: Option<usize>,
    page_size: usize,
    step: usize,
    stuck_next: bool,
}

impl Default for MockRoomingApp {
    fn default() -> Self {
        Self::new(seed_records())
    }
}

impl MockRoomingApp {
    /// Application serving `seed` when no listing route is installed
    #[must_use]
    pub fn new(seed: Vec<RoomingListRecord>) -> Self {
        Self {
            seed,
            records: Vec::new(),
            loaded: false,
            search: String::new(),
            saved: FilterState::of(false, false, false),
            draft: FilterState::of(false, false, false),
            panel_open: false,
            offsets: HashMap::new(),
            bookings_for: None,
            page_size: DEFAULT_PAGE_SIZE,
            step: DEFAULT_STEP,
            stuck_next: false,
        }
    }

    /// Set the window size
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the advance step
    #[must_use]
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step.max(1);
        self
    }

    /// Keep the next arrow on screen even past the last card
    #[must_use]
    pub const fn with_stuck_next(mut self, stuck: bool) -> Self {
        self.stuck_next = stuck;
        self
    }

    /// Seeded records
    #[must_use]
    pub fn seed(&self) -> &[RoomingListRecord] {
        &self.seed
    }

    /// Replace the listing with `records`, as a fresh page load does
    pub fn load(&mut self, records: Vec<RoomingListRecord>) {
        tracing::debug!(records = records.len(), "mock listing loaded");
        let (page_size, step, stuck_next) = (self.page_size, self.step, self.stuck_next);
        *self = Self {
            records,
            loaded: true,
            ..Self::new(std::mem::take(&mut self.seed))
        };
        self.page_size = page_size;
        self.step = step;
        self.stuck_next = stuck_next;
    }

    /// Drop the page, as closing the tab does
    pub fn unload(&mut self) {
        self.loaded = false;
        self.records.clear();
    }

    /// Current search text
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Type into the search input
    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
        self.offsets.clear();
    }

    /// Filters committed by the last Save
    #[must_use]
    pub const fn saved_filters(&self) -> FilterState {
        self.saved
    }

    fn is_listed(&self, record: &RoomingListRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty() || record.rfp_name.to_lowercase().contains(&needle);
        matches_search && self.saved.allows(record.status)
    }

    /// Listed records grouped by event, in first-seen order
    #[must_use]
    pub fn groups(&self) -> Vec<EventGroup> {
        let mut groups: Vec<EventGroup> = Vec::new();
        for (i, record) in self.records.iter().enumerate() {
            if !self.is_listed(record) {
                continue;
            }
            if let Some(group) = groups.iter_mut().find(|g| g.event_id == record.event_id) {
                group.records.push(i);
            } else {
                groups.push(EventGroup {
                    event_id: record.event_id.clone(),
                    event_name: record.event_name.clone(),
                    records: vec![i],
                });
            }
        }
        groups
    }

    fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.page_size)
    }

    fn offset(&self, group: &EventGroup) -> usize {
        self.offsets
            .get(&group.event_id)
            .copied()
            .unwrap_or(0)
            .min(self.max_offset(group.records.len()))
    }

    fn group(&self, event_id: &str) -> RoomingResult<EventGroup> {
        self.groups()
            .into_iter()
            .find(|g| g.event_id == event_id)
            .ok_or_else(|| RoomingError::Page {
                message: format!("no carousel for event {event_id}"),
            })
    }

    /// Carry out a click
    pub fn apply(&mut self, action: &Action) -> RoomingResult<()> {
        tracing::debug!(?action, "mock app action");
        match action {
            Action::FocusSearch => {}
            Action::ToggleFilterPanel => {
                if self.panel_open {
                    self.panel_open = false;
                } else {
                    self.panel_open = true;
                    self.draft = self.saved;
                }
            }
            Action::ToggleDraft(status) => {
                let checked = self.draft.get(*status).unwrap_or(false);
                self.draft = self.draft.with(*status, !checked);
            }
            Action::SaveFilters => {
                self.saved = self.draft.merged_onto(&FilterState::of(false, false, false));
                self.panel_open = false;
                self.offsets.clear();
            }
            Action::Next(event_id) => {
                let group = self.group(event_id)?;
                let next = (self.offset(&group) + self.step).min(self.max_offset(group.records.len()));
                let _ = self.offsets.insert(group.event_id, next);
            }
            Action::Previous(event_id) => {
                let group = self.group(event_id)?;
                let previous = self.offset(&group).saturating_sub(self.step);
                let _ = self.offsets.insert(group.event_id, previous);
            }
            Action::OpenBookings(record) => {
                if *record >= self.records.len() {
                    return Err(RoomingError::Page {
                        message: format!("no record {record}"),
                    });
                }
                self.bookings_for = Some(*record);
            }
            Action::CloseBookings => self.bookings_for = None,
        }
        Ok(())
    }

    /// Render the current state
    #[must_use]
    pub fn render(&self) -> Document {
        let mut doc = Document::new();
        if !self.loaded {
            return doc;
        }
        let body = doc.append(Document::ROOT, El::new("body"));
        self.render_header(&mut doc, body);
        self.render_listing(&mut doc, body);
        if let Some(record) = self.bookings_for.and_then(|i| self.records.get(i)) {
            render_bookings(&mut doc, body, record);
        }
        doc
    }

    fn render_header(&self, doc: &mut Document, body: NodeId) {
        let header = doc.append(body, El::new("header"));
        let _ = doc.append(header, El::new("h1").text(regions::PAGE_HEADING));
        let _ = doc.append(
            header,
            El::new("input")
                .attr("type", "text")
                .attr("placeholder", regions::SEARCH_PLACEHOLDER)
                .attr("value", self.search.clone())
                .on_click(Action::FocusSearch),
        );
        let _ = doc.append(
            header,
            El::new("button")
                .text("Filters")
                .on_click(Action::ToggleFilterPanel),
        );
        if !self.panel_open {
            return;
        }
        let panel = doc.append(header, El::new("div"));
        let _ = doc.append(panel, El::new("p").text(regions::FILTER_SURFACE_HEADING));
        for status in RfpStatus::ALL {
            let label = doc.append(panel, El::new("label").on_click(Action::ToggleDraft(status)));
            if self.draft.get(status) == Some(true) {
                let svg = doc.append(label, El::new("svg"));
                let _ = doc.append(svg, El::new("path").attr("d", CHECKMARK_SVG_PATH));
            }
            let _ = doc.append(label, El::new("span").text(status.as_str()));
        }
        let _ = doc.append(panel, El::new("button").text("Save").on_click(Action::SaveFilters));
    }

    fn render_listing(&self, doc: &mut Document, body: NodeId) {
        let main = doc.append(body, El::new("main"));
        let groups = self.groups();
        if groups.is_empty() {
            let _ = doc.append(main, El::new("p").text(regions::NO_RESULTS_TEXT));
            return;
        }
        let list = doc.append(main, El::new("div"));
        for group in &groups {
            self.render_carousel(doc, list, group);
        }
    }

    fn render_carousel(&self, doc: &mut Document, list: NodeId, group: &EventGroup) {
        let offset = self.offset(group);
        let window = offset..offset + self.page_size;
        let carousel = doc.append(list, El::new("div"));
        let head = doc.append(carousel, El::new("div"));
        let _ = doc.append(head, El::new("h2").text(group.event_name.clone()));
        if offset > 0 {
            arrow(
                doc,
                head,
                "Previous",
                regions::PREVIOUS_ARROW_SVG_PATH,
                Action::Previous(group.event_id.clone()),
            );
        }
        if window.end < group.records.len() || self.stuck_next {
            arrow(
                doc,
                head,
                "Next",
                regions::NEXT_ARROW_SVG_PATH,
                Action::Next(group.event_id.clone()),
            );
        }
        let viewport = doc.append(carousel, El::new("div"));
        let track = doc.append(viewport, El::new("div"));
        let row = doc.append(track, El::new("div"));
        for (position, index) in group.records.iter().enumerate() {
            if let Some(record) = self.records.get(*index) {
                render_card(doc, row, *index, record, !window.contains(&position));
            }
        }
    }
}

fn arrow(doc: &mut Document, parent: NodeId, label: &str, path: &str, action: Action) {
    let button = doc.append(
        parent,
        El::new("button").attr("aria-label", label).on_click(action),
    );
    let svg = doc.append(button, El::new("svg"));
    let _ = doc.append(svg, El::new("path").attr("d", path));
}

fn render_card(doc: &mut Document, row: NodeId, index: usize, record: &RoomingListRecord, hidden: bool) {
    let card = doc.append(row, El::new("div").attr("class", "card").hidden(hidden));
    let header = doc.append(card, El::new("div"));
    let _ = doc.append(header, El::new("h3").text(record.title()));
    let _ = doc.append(
        header,
        El::new("span")
            .attr("data-status", record.status.as_str().to_lowercase())
            .text(record.status.as_str()),
    );
    let agreement = doc.append(card, El::new("div").text(format!("{} ", regions::AGREEMENT_LABEL)));
    let _ = doc.append(agreement, El::new("span").text(record.agreement_type.clone()));
    if let Some((month, day)) = record.cut_off_parts() {
        let cut_off = doc.append(card, El::new("div"));
        let _ = doc.append(cut_off, El::new("p").text(regions::CUT_OFF_LABEL));
        let date = doc.append(cut_off, El::new("div"));
        let _ = doc.append(date, El::new("span").text(month));
        let _ = doc.append(date, El::new("span").text(day));
    }
    let _ = doc.append(
        card,
        El::new("button")
            .text(format!("View Bookings ({})", record.bookings.len()))
            .on_click(Action::OpenBookings(index)),
    );
}

fn render_bookings(doc: &mut Document, body: NodeId, record: &RoomingListRecord) {
    let dialog = doc.append(
        body,
        El::new("div").attr("role", "dialog").attr("aria-label", "Bookings"),
    );
    let _ = doc.append(dialog, El::new("h2").text(format!("Bookings for {}", record.title())));
    let list = doc.append(dialog, El::new("ul"));
    for booking in &record.bookings {
        let _ = doc.append(list, El::new("li").text(booking.guest_name.clone()));
    }
    let _ = doc.append(dialog, El::new("button").text("Close").on_click(Action::CloseBookings));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grouping_records;

    fn loaded(records: Vec<RoomingListRecord>) -> MockRoomingApp {
        let mut app = MockRoomingApp::new(Vec::new());
        app.load(records);
        app
    }

    mod grouping_tests {
        use super::*;

        #[test]
        fn test_groups_in_first_seen_order() {
            let mut records = grouping_records();
            records.push(RoomingListRecord::new("E1", "Late"));
            let app = loaded(records);
            let groups = app.groups();
            assert_eq!(groups.len(), 2);
            assert_eq!(groups[0].event_id, "E1");
            assert_eq!(groups[0].records, vec![0, 1, 3]);
            assert_eq!(groups[1].records, vec![2]);
        }

        #[test]
        fn test_search_is_case_insensitive() {
            let mut app = loaded(grouping_records());
            app.set_search("crew");
            let groups = app.groups();
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].records.len(), 2);
        }

        #[test]
        fn test_unloaded_page_is_blank() {
            let app = MockRoomingApp::default();
            assert!(app.render().descendants(Document::ROOT).is_empty());
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_draft_is_committed_only_on_save() {
            let mut app = loaded(grouping_records());
            app.apply(&Action::ToggleFilterPanel).unwrap();
            app.apply(&Action::ToggleDraft(RfpStatus::Closed)).unwrap();
            assert_eq!(app.saved_filters(), FilterState::of(false, false, false));
            app.apply(&Action::SaveFilters).unwrap();
            assert_eq!(app.saved_filters(), FilterState::of(false, true, false));
            assert!(app.groups().is_empty());
        }

        #[test]
        fn test_reopening_discards_unsaved_draft() {
            let mut app = loaded(grouping_records());
            app.apply(&Action::ToggleFilterPanel).unwrap();
            app.apply(&Action::ToggleDraft(RfpStatus::Active)).unwrap();
            app.apply(&Action::ToggleFilterPanel).unwrap();
            app.apply(&Action::ToggleFilterPanel).unwrap();
            app.apply(&Action::SaveFilters).unwrap();
            assert_eq!(app.saved_filters(), FilterState::of(false, false, false));
        }
    }

    mod window_tests {
        use super::*;

        fn five() -> Vec<RoomingListRecord> {
            (0..5)
                .map(|i| RoomingListRecord::new("E1", format!("Crew {i}")))
                .collect()
        }

        #[test]
        fn test_window_clamps_to_last_full_page() {
            let mut app = loaded(five()).with_page_size(2).with_step(2);
            let next = Action::Next("E1".to_string());
            app.apply(&next).unwrap();
            app.apply(&next).unwrap();
            app.apply(&next).unwrap();
            let group = app.groups().remove(0);
            assert_eq!(app.offset(&group), 3);
            app.apply(&Action::Previous("E1".to_string())).unwrap();
            assert_eq!(app.offset(&group), 1);
        }

        #[test]
        fn test_unknown_event_is_a_page_error() {
            let mut app = loaded(five());
            assert!(app.apply(&Action::Next("nope".to_string())).is_err());
            assert!(app.apply(&Action::OpenBookings(99)).is_err());
        }
    }
}
