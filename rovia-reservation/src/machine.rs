use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

use rovia_coupon::CouponError;

use crate::models::{IdentityDetails, Reservation, ReservationStatus, Step, TripDetails};
use crate::repository::ReservationRepository;

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Reservation not found: {0}")]
    NotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Step {submitted} submitted while the workflow expects step {expected}")]
    OutOfOrder { expected: Step, submitted: Step },

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("Coupon was exhausted before redemption could complete")]
    RedemptionConflict,

    #[error("Storage failure: {0}")]
    Storage(String),
}

pub(crate) fn storage(e: Box<dyn Error + Send + Sync>) -> ReservationError {
    ReservationError::Storage(e.to_string())
}

/// Drives the four-step workflow up to (but not including) the
/// confirmation commit. Every accepted submission is persisted before
/// the cursor is considered advanced; a storage failure surfaces to the
/// caller with the stored record untouched.
pub struct ReservationFlow {
    repo: Arc<dyn ReservationRepository>,
}

impl ReservationFlow {
    pub fn new(repo: Arc<dyn ReservationRepository>) -> Self {
        Self { repo }
    }

    /// Step 0: open a draft from validated trip details.
    pub async fn start(&self, details: TripDetails) -> Result<Reservation, ReservationError> {
        validate_trip_details(&details)?;

        let reservation = Reservation::new(details);
        self.repo.create(&reservation).await.map_err(storage)?;

        tracing::info!(reservation_id = %reservation.id, "Reservation draft opened");
        Ok(reservation)
    }

    /// Step 0 resubmission after a step-back.
    pub async fn resubmit_trip_details(
        &self,
        id: Uuid,
        details: TripDetails,
    ) -> Result<Reservation, ReservationError> {
        let mut reservation = self.load_draft(id).await?;
        ensure_step(&reservation, Step::TripDetails)?;
        validate_trip_details(&details)?;

        reservation.apply_trip_details(details);
        reservation.step = Step::Extras;
        self.repo.save_trip_details(&reservation).await.map_err(storage)?;

        Ok(reservation)
    }

    /// Step 1: persist the extras selection.
    pub async fn submit_extras(
        &self,
        id: Uuid,
        extras: HashMap<String, u32>,
    ) -> Result<Reservation, ReservationError> {
        let mut reservation = self.load_draft(id).await?;
        ensure_step(&reservation, Step::Extras)?;

        reservation.extras = extras;
        reservation.step = Step::Identity;
        self.repo.save_extras(&reservation).await.map_err(storage)?;

        Ok(reservation)
    }

    /// Step 2: persist the identity fields. No hard validation - the
    /// fields are free-form and may stay empty.
    pub async fn submit_identity(
        &self,
        id: Uuid,
        identity: IdentityDetails,
    ) -> Result<Reservation, ReservationError> {
        let mut reservation = self.load_draft(id).await?;
        ensure_step(&reservation, Step::Identity)?;

        reservation.identity = identity;
        reservation.step = Step::Confirm;
        self.repo.save_identity(&reservation).await.map_err(storage)?;

        Ok(reservation)
    }

    /// Backward transition (n -> n-1) for editing an earlier step.
    pub async fn step_back(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        let mut reservation = self.load_draft(id).await?;

        let previous = reservation
            .step
            .back()
            .ok_or_else(|| ReservationError::Validation("Already at the first step".to_string()))?;

        reservation.step = previous;
        self.repo.save_step(id, previous).await.map_err(storage)?;

        Ok(reservation)
    }

    /// Abandoning is implicit, but an explicit cancel is available from
    /// any pre-fulfilment state.
    pub async fn cancel(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        let mut reservation = self.load(id).await?;

        match reservation.status {
            ReservationStatus::Draft | ReservationStatus::PendingPayment => {
                reservation.status = ReservationStatus::Cancelled;
                self.repo
                    .set_status(id, ReservationStatus::Cancelled)
                    .await
                    .map_err(storage)?;
                tracing::info!(reservation_id = %id, "Reservation cancelled");
                Ok(reservation)
            }
            status => Err(ReservationError::InvalidTransition {
                from: status.to_string(),
                to: ReservationStatus::Cancelled.to_string(),
            }),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        self.load(id).await
    }

    async fn load(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        self.repo
            .get(id)
            .await
            .map_err(storage)?
            .ok_or(ReservationError::NotFound(id))
    }

    async fn load_draft(&self, id: Uuid) -> Result<Reservation, ReservationError> {
        let reservation = self.load(id).await?;
        if reservation.status != ReservationStatus::Draft {
            return Err(ReservationError::InvalidTransition {
                from: reservation.status.to_string(),
                to: ReservationStatus::Draft.to_string(),
            });
        }
        Ok(reservation)
    }
}

fn ensure_step(reservation: &Reservation, submitted: Step) -> Result<(), ReservationError> {
    if reservation.step != submitted {
        return Err(ReservationError::OutOfOrder {
            expected: reservation.step,
            submitted,
        });
    }
    Ok(())
}

fn validate_trip_details(details: &TripDetails) -> Result<(), ReservationError> {
    let required = [
        ("name", &details.contact.name),
        ("email", &details.contact.email),
        ("phone", &details.contact.phone),
        ("pickup location", &details.pickup_location),
        ("return location", &details.return_location),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ReservationError::Validation(format!("{} is required", field)));
        }
    }

    if details.return_at <= details.pickup_at {
        return Err(ReservationError::Validation(
            "Return time must be strictly after pickup time".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryReservationStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rovia_shared::Contact;
    use std::sync::atomic::{AtomicBool, Ordering};

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

    fn flow() -> (ReservationFlow, Arc<MemoryReservationStore>) {
        let store = Arc::new(MemoryReservationStore::new());
        (ReservationFlow::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_forward_walk_through_all_steps() {
        let (flow, _store) = flow();

        let r = flow.start(trip_details()).await.unwrap();
        assert_eq!(r.step, Step::Extras);

        let mut extras = HashMap::new();
        extras.insert("Cooler Box".to_string(), 2);
        let r = flow.submit_extras(r.id, extras).await.unwrap();
        assert_eq!(r.step, Step::Identity);
        assert_eq!(r.extras.get("Cooler Box"), Some(&2));

        let identity = IdentityDetails {
            holder_name: "Jane Doe".to_string(),
            license_number: "D123-456".to_string(),
            ..IdentityDetails::default()
        };
        let r = flow.submit_identity(r.id, identity).await.unwrap();
        assert_eq!(r.step, Step::Confirm);
        assert_eq!(r.status, ReservationStatus::Draft);
    }

    #[tokio::test]
    async fn test_skip_forward_is_rejected() {
        let (flow, _store) = flow();
        let r = flow.start(trip_details()).await.unwrap();

        let err = flow
            .submit_identity(r.id, IdentityDetails::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReservationError::OutOfOrder { expected: Step::Extras, submitted: Step::Identity }
        ));
    }

    #[tokio::test]
    async fn test_equal_instants_rejected_at_step_zero() {
        let (flow, store) = flow();
        let mut details = trip_details();
        details.return_at = details.pickup_at;

        let err = flow.start(details).await.unwrap_err();

        assert!(matches!(err, ReservationError::Validation(_)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_missing_required_field_rejected() {
        let (flow, _store) = flow();
        let mut details = trip_details();
        details.contact.email = "   ".to_string();

        let err = flow.start(details).await.unwrap_err();
        assert!(matches!(err, ReservationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_step_back_allows_editing_trip_details() {
        let (flow, _store) = flow();
        let r = flow.start(trip_details()).await.unwrap();

        let r = flow.step_back(r.id).await.unwrap();
        assert_eq!(r.step, Step::TripDetails);

        let mut edited = trip_details();
        edited.vehicle_count = 2;
        let r = flow.resubmit_trip_details(r.id, edited).await.unwrap();

        assert_eq!(r.vehicle_count, 2);
        assert_eq!(r.step, Step::Extras);
    }

    #[tokio::test]
    async fn test_step_back_stops_at_first_step() {
        let (flow, _store) = flow();
        let r = flow.start(trip_details()).await.unwrap();

        flow.step_back(r.id).await.unwrap();
        let err = flow.step_back(r.id).await.unwrap_err();

        assert!(matches!(err, ReservationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancel_is_terminal() {
        let (flow, _store) = flow();
        let r = flow.start(trip_details()).await.unwrap();

        let r = flow.cancel(r.id).await.unwrap();
        assert_eq!(r.status, ReservationStatus::Cancelled);

        let err = flow.cancel(r.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::InvalidTransition { .. }));

        let err = flow.submit_extras(r.id, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ReservationError::InvalidTransition { .. }));
    }

    /// Delegates to the in-memory store but fails every step write,
    /// to exercise the persist-before-advance guarantee.
    struct FlakyStore {
        inner: MemoryReservationStore,
        failing: AtomicBool,
    }

    #[async_trait]
    impl ReservationRepository for FlakyStore {
        async fn create(&self, r: &Reservation) -> Result<Uuid, Box<dyn Error + Send + Sync>> {
            self.inner.create(r).await
        }

        async fn get(&self, id: Uuid) -> Result<Option<Reservation>, Box<dyn Error + Send + Sync>> {
            self.inner.get(id).await
        }

        async fn save_trip_details(&self, r: &Reservation) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.inner.save_trip_details(r).await
        }

        async fn save_extras(&self, r: &Reservation) -> Result<(), Box<dyn Error + Send + Sync>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err("write timed out".into());
            }
            self.inner.save_extras(r).await
        }

        async fn save_identity(&self, r: &Reservation) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.inner.save_identity(r).await
        }

        async fn save_step(&self, id: Uuid, step: Step) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.inner.save_step(id, step).await
        }

        async fn set_status(
            &self,
            id: Uuid,
            status: ReservationStatus,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.inner.set_status(id, status).await
        }

        async fn save_confirmation(&self, r: &Reservation) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.inner.save_confirmation(r).await
        }
    }

    #[tokio::test]
    async fn test_failed_persistence_does_not_advance_the_cursor() {
        let store = Arc::new(FlakyStore {
            inner: MemoryReservationStore::new(),
            failing: AtomicBool::new(true),
        });
        let flow = ReservationFlow::new(store.clone());

        let r = flow.start(trip_details()).await.unwrap();
        let err = flow.submit_extras(r.id, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ReservationError::Storage(_)));

        let stored = flow.get(r.id).await.unwrap();
        assert_eq!(stored.step, Step::Extras);
        assert!(stored.extras.is_empty());

        // The retry goes through once the store recovers.
        store.failing.store(false, Ordering::SeqCst);
        let r = flow.submit_extras(r.id, HashMap::new()).await.unwrap();
        assert_eq!(r.step, Step::Identity);
    }
}
