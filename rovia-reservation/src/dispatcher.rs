use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

use rovia_catalog::pricing::BillingBreakdown;
use rovia_core::notify::{NotificationKind, NotificationMessage, NotificationSender, NotifyError};
use rovia_shared::models::events::ReservationConfirmedEvent;

/// Fans one confirmed-reservation event out to every notification
/// channel. Channels are independent: each send is retried on its own
/// and a channel that keeps failing is logged and dropped without
/// touching the others or the reservation itself.
pub struct NotificationDispatcher {
    sender: Arc<dyn NotificationSender>,
    ops_recipient: String,
    max_attempts: u32,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn NotificationSender>, ops_recipient: String, max_attempts: u32) -> Self {
        Self { sender, ops_recipient, max_attempts: max_attempts.max(1) }
    }

    /// One message per channel: customer email confirmation, customer
    /// phone ping, internal ops alert.
    pub fn messages_for(&self, event: &ReservationConfirmedEvent) -> Vec<NotificationMessage> {
        let breakdown: Option<BillingBreakdown> =
            serde_json::from_value(event.breakdown.clone()).ok();
        // Amounts are rounded here, at presentation time, and nowhere
        // upstream.
        let total_line = breakdown
            .as_ref()
            .map(|b| format!("{:.2}", b.total))
            .unwrap_or_else(|| "n/a".to_string());
        let deposit_line = breakdown
            .as_ref()
            .map(|b| format!("{:.2}", b.deposit))
            .unwrap_or_else(|| "n/a".to_string());

        let mut body = format!(
            "Hi {},\n\nYour rental is booked and awaiting payment.\n\n\
             Pickup:  {} at {}\nReturn:  {} at {}\nVehicles: {}\n\
             Total due: {}\nRefundable deposit included: {}\n",
            event.contact.name,
            event.pickup_at.format("%Y-%m-%d %H:%M"),
            event.pickup_location,
            event.return_at.format("%Y-%m-%d %H:%M"),
            event.return_location,
            event.vehicle_count,
            total_line,
            deposit_line,
        );
        if let Some(code) = &event.coupon_code {
            body.push_str(&format!("Coupon applied: {}\n", code));
        }

        vec![
            NotificationMessage {
                kind: NotificationKind::CustomerConfirmation,
                recipient: event.contact.email.clone(),
                subject: format!("Your reservation {}", short_id(event)),
                body,
                reservation_id: event.reservation_id,
            },
            NotificationMessage {
                kind: NotificationKind::CustomerMessage,
                recipient: event.contact.phone.clone(),
                subject: "Reservation booked".to_string(),
                body: format!(
                    "Your rental from {} is booked. Total due: {}.",
                    event.pickup_at.format("%Y-%m-%d"),
                    total_line
                ),
                reservation_id: event.reservation_id,
            },
            NotificationMessage {
                kind: NotificationKind::OpsAlert,
                recipient: self.ops_recipient.clone(),
                subject: format!("New booking {}", short_id(event)),
                body: format!(
                    "Reservation {} committed for {} ({} vehicle(s), {} -> {}), total {}{}.",
                    event.reservation_id,
                    event.contact.name,
                    event.vehicle_count,
                    event.pickup_location,
                    event.return_location,
                    total_line,
                    event
                        .coupon_code
                        .as_deref()
                        .map(|c| format!(", coupon {}", c))
                        .unwrap_or_default(),
                ),
                reservation_id: event.reservation_id,
            },
        ]
    }

    pub async fn dispatch(&self, event: &ReservationConfirmedEvent) {
        for message in self.messages_for(event) {
            if !self.send_with_retry(&message).await {
                tracing::error!(
                    reservation_id = %message.reservation_id,
                    kind = ?message.kind,
                    "Notification channel gave up after {} attempts",
                    self.max_attempts
                );
            }
        }
    }

    async fn send_with_retry(&self, message: &NotificationMessage) -> bool {
        for attempt in 1..=self.max_attempts {
            match self.sender.send(message).await {
                Ok(()) => return true,
                Err(e) => {
                    tracing::warn!(
                        reservation_id = %message.reservation_id,
                        kind = ?message.kind,
                        attempt,
                        "Notification send failed: {}",
                        e
                    );
                    if attempt < self.max_attempts {
                        sleep(Duration::from_millis(50 * attempt as u64)).await;
                    }
                }
            }
        }
        false
    }
}

fn short_id(event: &ReservationConfirmedEvent) -> String {
    event.reservation_id.simple().to_string()[..8].to_string()
}

/// Sender that records what it was asked to deliver, optionally failing
/// the first N sends. Backs the dispatcher tests and local runs.
pub struct RecordingNotifier {
    messages: Mutex<Vec<NotificationMessage>>,
    failures_remaining: AtomicU32,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self { messages: Mutex::new(Vec::new()), failures_remaining: AtomicU32::new(0) }
    }

    pub fn failing_first(failures: u32) -> Self {
        Self { messages: Mutex::new(Vec::new()), failures_remaining: AtomicU32::new(failures) }
    }

    pub async fn recorded(&self) -> Vec<NotificationMessage> {
        self.messages.lock().await.clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(NotifyError::Transport("simulated outage".to_string()));
        }
        self.messages.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rovia_shared::Contact;
    use uuid::Uuid;

    fn event(coupon: Option<&str>) -> ReservationConfirmedEvent {
        let breakdown = BillingBreakdown {
            rental_days: 3,
            per_day_rate: 55.0,
            rental_subtotal: 165.0,
            per_license_rate: 20.0,
            license_subtotal: 0.0,
            extras_subtotal: 2.0,
            pickup_surcharge: 0.0,
            return_surcharge: 25.0,
            deposit: 150.0,
            subtotal: 342.0,
            discount_applied: 0.0,
            total: 342.0,
        };
        ReservationConfirmedEvent {
            reservation_id: Uuid::new_v4(),
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
            coupon_code: coupon.map(str::to_string),
            breakdown: serde_json::to_value(&breakdown).unwrap(),
            timestamp: 1704100000,
        }
    }

    fn dispatcher(sender: Arc<RecordingNotifier>, attempts: u32) -> NotificationDispatcher {
        NotificationDispatcher::new(sender, "bookings@internal".to_string(), attempts)
    }

    #[tokio::test]
    async fn test_one_message_per_channel() {
        let sender = Arc::new(RecordingNotifier::new());
        let d = dispatcher(sender.clone(), 1);

        let messages = d.messages_for(&event(Some("SAVE10")));

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].kind, NotificationKind::CustomerConfirmation);
        assert_eq!(messages[0].recipient, "jane.doe@example.com");
        assert_eq!(messages[1].kind, NotificationKind::CustomerMessage);
        assert_eq!(messages[1].recipient, "+49 170 1234567");
        assert_eq!(messages[2].kind, NotificationKind::OpsAlert);
        assert_eq!(messages[2].recipient, "bookings@internal");
    }

    #[tokio::test]
    async fn test_amounts_are_rounded_in_message_bodies() {
        let sender = Arc::new(RecordingNotifier::new());
        let d = dispatcher(sender, 1);

        let messages = d.messages_for(&event(None));

        assert!(messages[0].body.contains("342.00"));
        assert!(messages[0].body.contains("150.00"));
        assert!(!messages[0].body.contains("SAVE10"));
    }

    #[tokio::test]
    async fn test_dispatch_delivers_all_channels() {
        let sender = Arc::new(RecordingNotifier::new());
        let d = dispatcher(sender.clone(), 1);

        d.dispatch(&event(None)).await;

        assert_eq!(sender.recorded().await.len(), 3);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let sender = Arc::new(RecordingNotifier::failing_first(1));
        let d = dispatcher(sender.clone(), 3);

        d.dispatch(&event(None)).await;

        assert_eq!(sender.recorded().await.len(), 3);
    }

    #[tokio::test]
    async fn test_dead_channel_does_not_block_the_others() {
        // First channel burns through all of its attempts; the other
        // two still deliver and dispatch itself never errors.
        let sender = Arc::new(RecordingNotifier::failing_first(2));
        let d = dispatcher(sender.clone(), 2);

        d.dispatch(&event(None)).await;

        let recorded = sender.recorded().await;
        assert_eq!(recorded.len(), 2);
        assert!(recorded.iter().all(|m| m.kind != NotificationKind::CustomerConfirmation));
    }
}
