use async_trait::async_trait;
use sqlx::PgPool;
use std::error::Error;
use uuid::Uuid;

use rovia_reservation::models::{Reservation, ReservationStatus, Step};
use rovia_reservation::repository::ReservationRepository;
use rovia_shared::Contact;

pub struct StoreReservationRepository {
    pool: PgPool,
}

impl StoreReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    pickup_at: chrono::DateTime<chrono::Utc>,
    return_at: chrono::DateTime<chrono::Utc>,
    pickup_location: String,
    return_location: String,
    vehicle_count: i32,
    license_count: i32,
    extras: serde_json::Value,
    identity: serde_json::Value,
    coupon_code: Option<String>,
    breakdown: Option<serde_json::Value>,
    status: String,
    step: i16,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl ReservationRow {
    fn into_reservation(self) -> Result<Reservation, Box<dyn Error + Send + Sync>> {
        let status = ReservationStatus::parse(&self.status)
            .ok_or_else(|| format!("Unknown reservation status: {}", self.status))?;
        let step = Step::from_index(self.step as u8)
            .ok_or_else(|| format!("Unknown workflow step: {}", self.step))?;

        Ok(Reservation {
            id: self.id,
            contact: Contact {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            pickup_at: self.pickup_at,
            return_at: self.return_at,
            pickup_location: self.pickup_location,
            return_location: self.return_location,
            vehicle_count: self.vehicle_count.max(0) as u32,
            license_count: self.license_count.max(0) as u32,
            extras: serde_json::from_value(self.extras)?,
            identity: serde_json::from_value(self.identity)?,
            coupon_code: self.coupon_code,
            breakdown: self.breakdown.map(serde_json::from_value).transpose()?,
            status,
            step,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl ReservationRepository for StoreReservationRepository {
    async fn create(&self, reservation: &Reservation) -> Result<Uuid, Box<dyn Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, customer_name, customer_email, customer_phone, pickup_at, return_at,
                 pickup_location, return_location, vehicle_count, license_count, extras,
                 identity, coupon_code, breakdown, status, step, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(reservation.id)
        .bind(&reservation.contact.name)
        .bind(&reservation.contact.email)
        .bind(&reservation.contact.phone)
        .bind(reservation.pickup_at)
        .bind(reservation.return_at)
        .bind(&reservation.pickup_location)
        .bind(&reservation.return_location)
        .bind(reservation.vehicle_count as i32)
        .bind(reservation.license_count as i32)
        .bind(serde_json::to_value(&reservation.extras)?)
        .bind(serde_json::to_value(&reservation.identity)?)
        .bind(&reservation.coupon_code)
        .bind(reservation.breakdown.as_ref().map(serde_json::to_value).transpose()?)
        .bind(reservation.status.as_str())
        .bind(reservation.step.index() as i16)
        .bind(reservation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(reservation.id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, Box<dyn Error + Send + Sync>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            "SELECT id, customer_name, customer_email, customer_phone, pickup_at, return_at, \
             pickup_location, return_location, vehicle_count, license_count, extras, identity, \
             coupon_code, breakdown, status, step, created_at \
             FROM reservations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ReservationRow::into_reservation).transpose()
    }

    async fn save_trip_details(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET customer_name = $1, customer_email = $2, customer_phone = $3,
                pickup_at = $4, return_at = $5, pickup_location = $6, return_location = $7,
                vehicle_count = $8, license_count = $9, step = $10, updated_at = NOW()
            WHERE id = $11
            "#,
        )
        .bind(&reservation.contact.name)
        .bind(&reservation.contact.email)
        .bind(&reservation.contact.phone)
        .bind(reservation.pickup_at)
        .bind(reservation.return_at)
        .bind(&reservation.pickup_location)
        .bind(&reservation.return_location)
        .bind(reservation.vehicle_count as i32)
        .bind(reservation.license_count as i32)
        .bind(reservation.step.index() as i16)
        .bind(reservation.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_extras(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query(
            "UPDATE reservations SET extras = $1, step = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(serde_json::to_value(&reservation.extras)?)
        .bind(reservation.step.index() as i16)
        .bind(reservation.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_identity(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query(
            "UPDATE reservations SET identity = $1, step = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(serde_json::to_value(&reservation.identity)?)
        .bind(reservation.step.index() as i16)
        .bind(reservation.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_step(&self, id: Uuid, step: Step) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query("UPDATE reservations SET step = $1, updated_at = NOW() WHERE id = $2")
            .bind(step.index() as i16)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query("UPDATE reservations SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_confirmation(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        sqlx::query(
            r#"
            UPDATE reservations
            SET coupon_code = $1, breakdown = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&reservation.coupon_code)
        .bind(reservation.breakdown.as_ref().map(serde_json::to_value).transpose()?)
        .bind(reservation.status.as_str())
        .bind(reservation.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
