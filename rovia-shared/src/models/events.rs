use uuid::Uuid;

use crate::pii::Contact;

/// Published exactly once when a reservation transitions to
/// PENDING_PAYMENT. Every notification channel consumes this one event;
/// nothing re-publishes it on a retried confirmation.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationConfirmedEvent {
    pub reservation_id: Uuid,
    pub contact: Contact,
    pub pickup_at: chrono::DateTime<chrono::Utc>,
    pub return_at: chrono::DateTime<chrono::Utc>,
    pub pickup_location: String,
    pub return_location: String,
    pub vehicle_count: u32,
    pub coupon_code: Option<String>,
    /// Serialized billing breakdown snapshot taken at confirmation time.
    pub breakdown: serde_json::Value,
    pub timestamp: i64,
}
