//! Test data for the rooming-lists listing endpoint.
//!
//! The wire shape is the JSON array the application fetches: camelCase keys,
//! one object per RFP, grouped into carousels by `eventId` on the client.

use crate::filter::RfpStatus;
use crate::network::{MockResponse, Route};
use crate::result::RoomingResult;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// URL glob of the listing endpoint
pub const LISTING_ENDPOINT_GLOB: &str = "**/rooming-lists*";

/// Path the application requests the listing from
pub const LISTING_ENDPOINT_PATH: &str = "/api/rooming-lists";

/// One booking inside a rooming list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    /// Guest name
    pub guest_name: String,
    /// Contact number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Check-in date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<NaiveDate>,
    /// Check-out date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<NaiveDate>,
}

impl BookingRecord {
    /// A booking with only a guest name
    #[must_use]
    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            guest_name: name.into(),
            phone_number: None,
            check_in_date: None,
            check_out_date: None,
        }
    }
}

/// One rooming list as served by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomingListRecord {
    /// Event the list belongs to; the grouping key
    pub event_id: String,
    /// Display name of the event
    #[serde(default)]
    pub event_name: String,
    /// RFP name, rendered in brackets as the card title
    pub rfp_name: String,
    /// Lifecycle status; records served without one are active
    #[serde(default = "active_status")]
    pub status: RfpStatus,
    /// Agreement type
    #[serde(default)]
    pub agreement_type: String,
    /// Cut-off date
    #[serde(default)]
    pub cut_off_date: Option<NaiveDate>,
    /// Bookings attached to the list
    #[serde(default)]
    pub bookings: Vec<BookingRecord>,
}

const fn active_status() -> RfpStatus {
    RfpStatus::Active
}

impl RoomingListRecord {
    /// Minimal record: an event id and an RFP name
    #[must_use]
    pub fn new(event_id: impl Into<String>, rfp_name: impl Into<String>) -> Self {
        let event_id = event_id.into();
        Self {
            event_name: event_id.clone(),
            event_id,
            rfp_name: rfp_name.into(),
            status: RfpStatus::Active,
            agreement_type: "Leisure".to_string(),
            cut_off_date: None,
            bookings: Vec::new(),
        }
    }

    /// Set the event display name
    #[must_use]
    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: RfpStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the agreement type
    #[must_use]
    pub fn with_agreement(mut self, agreement: impl Into<String>) -> Self {
        self.agreement_type = agreement.into();
        self
    }

    /// Set the cut-off date
    #[must_use]
    pub const fn with_cut_off(mut self, date: NaiveDate) -> Self {
        self.cut_off_date = Some(date);
        self
    }

    /// Attach bookings for the given guests
    #[must_use]
    pub fn with_guests(mut self, guests: &[&str]) -> Self {
        self.bookings = guests.iter().map(|g| BookingRecord::guest(*g)).collect();
        self
    }

    /// Card title: the RFP name in square brackets
    #[must_use]
    pub fn title(&self) -> String {
        format!("[{}]", self.rfp_name)
    }

    /// Month abbreviation and day of the cut-off date, as a card renders them
    #[must_use]
    pub fn cut_off_parts(&self) -> Option<(String, String)> {
        self.cut_off_date
            .map(|d| (d.format("%b").to_string(), d.day().to_string()))
    }
}

/// Route serving `records` from the listing endpoint
pub fn listing_route(records: &[RoomingListRecord]) -> RoomingResult<Route> {
    Ok(Route::get(LISTING_ENDPOINT_GLOB, MockResponse::json(&records)?))
}

/// Parse a listing payload
pub fn parse_listing(body: &[u8]) -> RoomingResult<Vec<RoomingListRecord>> {
    Ok(serde_json::from_slice(body)?)
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Data the in-memory application serves when no route is installed.
///
/// Two events; the first has more cards than fit in one carousel window.
#[must_use]
pub fn seed_records() -> Vec<RoomingListRecord> {
    let festival = |rfp: &str, status: RfpStatus, day: u32, guests: &[&str]| {
        let mut record = RoomingListRecord::new("ev-ultra", rfp)
            .with_event_name("Ultra Musical Festival")
            .with_status(status)
            .with_guests(guests);
        record.cut_off_date = date(2025, 1, day);
        record
    };
    let summit = |rfp: &str, status: RfpStatus, agreement: &str| {
        let mut record = RoomingListRecord::new("ev-summit", rfp)
            .with_event_name("Tech Summit")
            .with_status(status)
            .with_agreement(agreement);
        record.cut_off_date = date(2025, 3, 9);
        record
    };
    vec![
        festival("Crew A", RfpStatus::Active, 15, &["Ana Ruiz", "Ben Ode"]),
        festival("Crew B", RfpStatus::Closed, 16, &["Cyd Park"]),
        festival("Artists", RfpStatus::Active, 17, &[]),
        festival("Crew C", RfpStatus::Cancelled, 18, &["Dee Voss", "Eli Hart", "Fay Lin"]),
        festival("Vendors", RfpStatus::Closed, 19, &["Gus Moe"]),
        summit("Speakers", RfpStatus::Active, "Staff"),
        summit("Crew Summit", RfpStatus::Cancelled, "Artist"),
    ]
}

/// Three records in two events: two cards for E1, one for E2
#[must_use]
pub fn grouping_records() -> Vec<RoomingListRecord> {
    vec![
        RoomingListRecord::new("E1", "Crew A"),
        RoomingListRecord::new("E1", "Crew B"),
        RoomingListRecord::new("E2", "Other"),
    ]
}
