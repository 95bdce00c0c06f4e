use async_trait::async_trait;
use std::error::Error;
use uuid::Uuid;

use crate::models::{Reservation, ReservationStatus, Step};

/// Durable record store for reservations. Each workflow step writes its
/// own slice of the record before the cursor advances; a failed write
/// leaves the stored cursor where it was.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn create(&self, reservation: &Reservation) -> Result<Uuid, Box<dyn Error + Send + Sync>>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, Box<dyn Error + Send + Sync>>;

    /// Persist the step-0 fields plus the cursor.
    async fn save_trip_details(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Persist the extras selection plus the cursor.
    async fn save_extras(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Persist the identity fields plus the cursor.
    async fn save_identity(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Move the cursor without touching step data (backward editing).
    async fn save_step(&self, id: Uuid, step: Step) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn set_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Persist the confirmation commit in one write: coupon code,
    /// breakdown snapshot, and the PENDING_PAYMENT status.
    async fn save_confirmation(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
