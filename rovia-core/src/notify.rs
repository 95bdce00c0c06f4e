use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which audience a message is addressed to. The dispatcher builds one
/// message per kind for every confirmed reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Booking confirmation sent to the customer's email address.
    CustomerConfirmation,
    /// Short ping to the customer's phone number (messaging transport).
    CustomerMessage,
    /// Operational alert for the internal bookings channel.
    OpsAlert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub kind: NotificationKind,
    /// Email address, phone number, or internal channel name depending
    /// on the kind.
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub reservation_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Transport rejected message: {0}")]
    Transport(String),
    #[error("Channel unavailable: {0}")]
    Unavailable(String),
}

/// Boundary to the actual email/messaging transport. Sends are
/// fire-and-forget from the workflow's point of view: the dispatcher
/// logs failures and never surfaces them to the customer.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}

/// Default sender for environments without a wired transport: writes the
/// message to the log and reports success.
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        tracing::info!(
            reservation_id = %message.reservation_id,
            kind = ?message.kind,
            recipient = %rovia_shared::pii::redact_email(&message.recipient),
            "Notification dispatched: {}",
            message.subject
        );
        Ok(())
    }
}
