use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use rovia_catalog::extras::ExtrasCatalog;
use rovia_catalog::locations::LocationCatalog;
use rovia_catalog::pricing::{BillingBreakdown, PricingEngine};
use rovia_coupon::{validate_coupon, Coupon, CouponLedger};
use rovia_shared::models::events::ReservationConfirmedEvent;

use crate::machine::{storage, ReservationError};
use crate::models::{Reservation, ReservationStatus, Step};
use crate::repository::ReservationRepository;

/// Runs the step-3 commit: the only transition with effects beyond
/// storage (coupon mutation, notification). Re-issuing it against an
/// already committed reservation is a no-op - the stored status is the
/// idempotency gate for both the ledger increment and the event
/// publish.
pub struct ConfirmationOrchestrator {
    repo: Arc<dyn ReservationRepository>,
    ledger: Arc<dyn CouponLedger>,
    pricing: Arc<PricingEngine>,
    locations: Arc<LocationCatalog>,
    extras: Arc<ExtrasCatalog>,
    events: broadcast::Sender<ReservationConfirmedEvent>,
}

impl ConfirmationOrchestrator {
    pub fn new(
        repo: Arc<dyn ReservationRepository>,
        ledger: Arc<dyn CouponLedger>,
        pricing: Arc<PricingEngine>,
        locations: Arc<LocationCatalog>,
        extras: Arc<ExtrasCatalog>,
        events: broadcast::Sender<ReservationConfirmedEvent>,
    ) -> Self {
        Self { repo, ledger, pricing, locations, extras, events }
    }

    /// Recompute the billing breakdown for the current draft state. An
    /// attached coupon code is validated in passing and silently
    /// ignored when invalid - the quote view never hard-fails on a bad
    /// code; only the confirm commit does. Committed reservations
    /// return their audit snapshot instead.
    pub async fn quote(
        &self,
        id: Uuid,
        coupon_code: Option<&str>,
    ) -> Result<BillingBreakdown, ReservationError> {
        let reservation = self.load(id).await?;

        if reservation.status != ReservationStatus::Draft {
            if let Some(snapshot) = &reservation.breakdown {
                return Ok(snapshot.clone());
            }
        }

        let coupon = match normalize_code(coupon_code) {
            Some(code) => {
                match validate_coupon(&code, self.ledger.as_ref(), Utc::now().date_naive()).await {
                    Ok(coupon) => Some(coupon),
                    Err(e) => {
                        tracing::debug!(reservation_id = %id, "Quote ignores coupon: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        Ok(self.compute(&reservation, coupon.as_ref()))
    }

    /// Step 3. Order of operations: idempotency gate, coupon
    /// validation, breakdown computation, conditional redemption,
    /// persistence, single event publish. Redemption losing the race
    /// fails the whole commit closed with the reservation still DRAFT.
    pub async fn confirm(
        &self,
        id: Uuid,
        coupon_code: Option<String>,
    ) -> Result<Reservation, ReservationError> {
        let mut reservation = self.load(id).await?;

        match reservation.status {
            ReservationStatus::Draft => {}
            ReservationStatus::PendingPayment => {
                tracing::info!(
                    reservation_id = %id,
                    "Confirm re-issued on a committed reservation; returning stored state"
                );
                return Ok(reservation);
            }
            status => {
                return Err(ReservationError::InvalidTransition {
                    from: status.to_string(),
                    to: ReservationStatus::PendingPayment.to_string(),
                });
            }
        }

        if reservation.step != Step::Confirm {
            return Err(ReservationError::OutOfOrder {
                expected: reservation.step,
                submitted: Step::Confirm,
            });
        }

        let coupon = match normalize_code(coupon_code.as_deref()) {
            Some(code) => {
                Some(validate_coupon(&code, self.ledger.as_ref(), Utc::now().date_naive()).await?)
            }
            None => None,
        };

        let breakdown = self.compute(&reservation, coupon.as_ref());

        if let Some(coupon) = &coupon {
            let won = self.ledger.try_redeem(coupon.id).await.map_err(storage)?;
            if !won {
                tracing::warn!(
                    reservation_id = %id,
                    coupon = %coupon.code,
                    "Coupon exhausted between validation and redemption"
                );
                return Err(ReservationError::RedemptionConflict);
            }
        }

        reservation.coupon_code = coupon.as_ref().map(|c| c.code.clone());
        reservation.breakdown = Some(breakdown);
        reservation.status = ReservationStatus::PendingPayment;

        if let Err(e) = self.repo.save_confirmation(&reservation).await {
            // Redemption and persistence are separate network writes
            // with no shared transaction; a failure here can leave the
            // counter incremented for an uncommitted reservation.
            tracing::error!(reservation_id = %id, "Confirmation persist failed: {}", e);
            return Err(storage(e));
        }

        tracing::info!(
            reservation_id = %id,
            total = reservation.breakdown.as_ref().map(|b| b.total).unwrap_or(0.0),
            "Reservation committed, awaiting payment"
        );

        let event = confirmed_event(&reservation);
        if self.events.send(event).is_err() {
            tracing::debug!(reservation_id = %id, "No active notification subscribers");
        }

        Ok(reservation)
    }

    fn compute(&self, reservation: &Reservation, coupon: Option<&Coupon>) -> BillingBreakdown {
        let discount = coupon.map(|c| c.discount());
        self.pricing.quote(
            &reservation.quote_input(),
            &self.locations,
            &self.extras,
            discount.as_ref(),
        )
    }

    async fn load(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        self.repo
            .get(id)
            .await
            .map_err(storage)?
            .ok_or(ReservationError::NotFound(id))
    }
}

fn normalize_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string)
}

fn confirmed_event(reservation: &Reservation) -> ReservationConfirmedEvent {
    ReservationConfirmedEvent {
        reservation_id: reservation.id,
        contact: reservation.contact.clone(),
        pickup_at: reservation.pickup_at,
        return_at: reservation.return_at,
        pickup_location: reservation.pickup_location.clone(),
        return_location: reservation.return_location.clone(),
        vehicle_count: reservation.vehicle_count,
        coupon_code: reservation.coupon_code.clone(),
        breakdown: reservation
            .breakdown
            .as_ref()
            .and_then(|b| serde_json::to_value(b).ok())
            .unwrap_or(serde_json::Value::Null),
        timestamp: Utc::now().timestamp(),
    }
}
