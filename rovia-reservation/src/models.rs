use chrono::{DateTime, Utc};
use rovia_catalog::pricing::{BillingBreakdown, QuoteInput};
use rovia_shared::Contact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Reservation status in the lifecycle. `PendingPayment` is the
/// terminal success state of this workflow - payment capture happens
/// downstream and moves the record to `Confirmed` from outside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Draft,
    PendingPayment,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Draft => "DRAFT",
            ReservationStatus::PendingPayment => "PENDING_PAYMENT",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(ReservationStatus::Draft),
            "PENDING_PAYMENT" => Some(ReservationStatus::PendingPayment),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow cursor: the step the customer submits next. Transitions are
/// strictly forward one at a time, with an explicit step-back for
/// editing; there is no skip-forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    TripDetails,
    Extras,
    Identity,
    Confirm,
}

impl Step {
    pub fn index(self) -> u8 {
        match self {
            Step::TripDetails => 0,
            Step::Extras => 1,
            Step::Identity => 2,
            Step::Confirm => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Step::TripDetails),
            1 => Some(Step::Extras),
            2 => Some(Step::Identity),
            3 => Some(Step::Confirm),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Step::from_index(self.index() + 1)
    }

    pub fn back(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Step::from_index)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::TripDetails => "TRIP_DETAILS",
            Step::Extras => "EXTRAS",
            Step::Identity => "IDENTITY",
            Step::Confirm => "CONFIRM",
        };
        f.write_str(name)
    }
}

/// Step-0 input: everything needed to open a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDetails {
    pub contact: Contact,
    pub pickup_at: DateTime<Utc>,
    pub return_at: DateTime<Utc>,
    pub pickup_location: String,
    pub return_location: String,
    pub vehicle_count: u32,
    pub license_count: u32,
}

/// Step-2 input. All fields are free-form and optional; the document
/// upload itself is an external concern that attaches to the record
/// elsewhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdentityDetails {
    pub holder_name: String,
    pub address: String,
    pub country: String,
    pub postal_code: String,
    pub license_number: String,
    pub passport_number: String,
    pub has_international_permit: bool,
}

/// The customer's in-progress or confirmed booking record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub contact: Contact,
    pub pickup_at: DateTime<Utc>,
    pub return_at: DateTime<Utc>,
    pub pickup_location: String,
    pub return_location: String,
    pub vehicle_count: u32,
    pub license_count: u32,
    pub extras: HashMap<String, u32>,
    pub identity: IdentityDetails,
    pub coupon_code: Option<String>,
    /// Snapshot taken at confirmation for audit and notifications;
    /// quotes before that point are recomputed on every read.
    pub breakdown: Option<BillingBreakdown>,
    pub status: ReservationStatus,
    pub step: Step,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Opens a draft positioned at the extras step; the trip details
    /// submission that created it is step 0.
    pub fn new(details: TripDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact: details.contact,
            pickup_at: details.pickup_at,
            return_at: details.return_at,
            pickup_location: details.pickup_location,
            return_location: details.return_location,
            vehicle_count: details.vehicle_count,
            license_count: details.license_count,
            extras: HashMap::new(),
            identity: IdentityDetails::default(),
            coupon_code: None,
            breakdown: None,
            status: ReservationStatus::Draft,
            step: Step::Extras,
            created_at: Utc::now(),
        }
    }

    pub fn apply_trip_details(&mut self, details: TripDetails) {
        self.contact = details.contact;
        self.pickup_at = details.pickup_at;
        self.return_at = details.return_at;
        self.pickup_location = details.pickup_location;
        self.return_location = details.return_location;
        self.vehicle_count = details.vehicle_count;
        self.license_count = details.license_count;
    }

    pub fn quote_input(&self) -> QuoteInput {
        QuoteInput {
            pickup_at: self.pickup_at,
            return_at: self.return_at,
            pickup_location: self.pickup_location.clone(),
            return_location: self.return_location.clone(),
            vehicle_count: self.vehicle_count,
            license_count: self.license_count,
            extras: self.extras.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trip_details() -> TripDetails {
        TripDetails {
            contact: Contact {
                name: "Jane Doe".to_string(),
                email: "jane.doe@example.com".to_string(),
                phone: "+49 170 1234567".to_string(),
            },
            pickup_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            return_at: Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap(),
            pickup_location: "City Office".to_string(),
            return_location: "Airport".to_string(),
            vehicle_count: 1,
            license_count: 1,
        }
    }

    #[test]
    fn test_new_reservation_is_a_draft_at_extras() {
        let r = Reservation::new(trip_details());

        assert_eq!(r.status, ReservationStatus::Draft);
        assert_eq!(r.step, Step::Extras);
        assert!(r.breakdown.is_none());
        assert!(r.coupon_code.is_none());
    }

    #[test]
    fn test_step_navigation() {
        assert_eq!(Step::TripDetails.next(), Some(Step::Extras));
        assert_eq!(Step::Confirm.next(), None);
        assert_eq!(Step::Confirm.back(), Some(Step::Identity));
        assert_eq!(Step::TripDetails.back(), None);
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            ReservationStatus::Draft,
            ReservationStatus::PendingPayment,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("BOOKED"), None);
    }
}
