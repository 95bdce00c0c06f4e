use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use rovia_reservation::NotificationDispatcher;
use rovia_shared::models::events::ReservationConfirmedEvent;

/// Consumes the confirmed-reservation stream and fans each event out to
/// the notification channels. Runs for the life of the process; channel
/// failures are the dispatcher's problem and never propagate here.
pub async fn start_notification_worker(
    mut rx: broadcast::Receiver<ReservationConfirmedEvent>,
    dispatcher: Arc<NotificationDispatcher>,
) {
    info!("Notification worker started, waiting for confirmations...");

    loop {
        match rx.recv().await {
            Ok(event) => dispatcher.dispatch(&event).await,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Notification worker lagged, {} confirmations skipped", missed);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    info!("Notification worker stopped");
}
