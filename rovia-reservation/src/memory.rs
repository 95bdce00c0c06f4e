use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Reservation, ReservationStatus, Step};
use crate::repository::ReservationRepository;

/// HashMap-backed store for tests and single-process runs.
pub struct MemoryReservationStore {
    reservations: Mutex<HashMap<Uuid, Reservation>>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self { reservations: Mutex::new(HashMap::new()) }
    }

    pub async fn len(&self) -> usize {
        self.reservations.lock().await.len()
    }
}

impl Default for MemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservationStore {
    async fn create(&self, reservation: &Reservation) -> Result<Uuid, Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation.id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, Box<dyn Error + Send + Sync>> {
        let reservations = self.reservations.lock().await;
        Ok(reservations.get(&id).cloned())
    }

    async fn save_trip_details(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        let stored = reservations
            .get_mut(&reservation.id)
            .ok_or("reservation not found")?;
        stored.contact = reservation.contact.clone();
        stored.pickup_at = reservation.pickup_at;
        stored.return_at = reservation.return_at;
        stored.pickup_location = reservation.pickup_location.clone();
        stored.return_location = reservation.return_location.clone();
        stored.vehicle_count = reservation.vehicle_count;
        stored.license_count = reservation.license_count;
        stored.step = reservation.step;
        Ok(())
    }

    async fn save_extras(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        let stored = reservations
            .get_mut(&reservation.id)
            .ok_or("reservation not found")?;
        stored.extras = reservation.extras.clone();
        stored.step = reservation.step;
        Ok(())
    }

    async fn save_identity(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        let stored = reservations
            .get_mut(&reservation.id)
            .ok_or("reservation not found")?;
        stored.identity = reservation.identity.clone();
        stored.step = reservation.step;
        Ok(())
    }

    async fn save_step(&self, id: Uuid, step: Step) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        let stored = reservations.get_mut(&id).ok_or("reservation not found")?;
        stored.step = step;
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        let stored = reservations.get_mut(&id).ok_or("reservation not found")?;
        stored.status = status;
        Ok(())
    }

    async fn save_confirmation(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut reservations = self.reservations.lock().await;
        let stored = reservations
            .get_mut(&reservation.id)
            .ok_or("reservation not found")?;
        stored.coupon_code = reservation.coupon_code.clone();
        stored.breakdown = reservation.breakdown.clone();
        stored.status = reservation.status;
        Ok(())
    }
}
