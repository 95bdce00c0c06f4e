use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use rovia_catalog::pricing::BillingBreakdown;
use rovia_reservation::{IdentityDetails, Reservation, ReservationStatus, TripDetails};
use rovia_shared::Contact;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TripDetailsRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pickup_at: chrono::DateTime<chrono::Utc>,
    pub return_at: chrono::DateTime<chrono::Utc>,
    pub pickup_location: String,
    pub return_location: String,
    pub vehicle_count: u32,
    #[serde(default)]
    pub license_count: u32,
}

impl TripDetailsRequest {
    fn into_details(self) -> TripDetails {
        TripDetails {
            contact: Contact { name: self.name, email: self.email, phone: self.phone },
            pickup_at: self.pickup_at,
            return_at: self.return_at,
            pickup_location: self.pickup_location,
            return_location: self.return_location,
            vehicle_count: self.vehicle_count,
            license_count: self.license_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtrasRequest {
    pub extras: HashMap<String, u32>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub coupon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub status: ReservationStatus,
    pub step: u8,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pickup_at: chrono::DateTime<chrono::Utc>,
    pub return_at: chrono::DateTime<chrono::Utc>,
    pub pickup_location: String,
    pub return_location: String,
    pub vehicle_count: u32,
    pub license_count: u32,
    pub extras: HashMap<String, u32>,
    pub identity: IdentityDetails,
    pub coupon_code: Option<String>,
    pub breakdown: Option<BillingBreakdown>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            status: r.status,
            step: r.step.index(),
            name: r.contact.name,
            email: r.contact.email,
            phone: r.contact.phone,
            pickup_at: r.pickup_at,
            return_at: r.return_at,
            pickup_location: r.pickup_location,
            return_location: r.return_location,
            vehicle_count: r.vehicle_count,
            license_count: r.license_count,
            extras: r.extras,
            identity: r.identity,
            coupon_code: r.coupon_code,
            breakdown: r.breakdown,
            created_at: r.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/reservations
/// Step 0: open a draft from trip details.
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<TripDetailsRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.start(req.into_details()).await?;
    Ok(Json(reservation.into()))
}

/// GET /v1/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.get(id).await?;
    Ok(Json(reservation.into()))
}

/// PUT /v1/reservations/{id}/trip
/// Step 0 resubmission after stepping back.
pub async fn update_trip_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TripDetailsRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.resubmit_trip_details(id, req.into_details()).await?;
    Ok(Json(reservation.into()))
}

/// PUT /v1/reservations/{id}/extras
/// Step 1: persist the add-on selection.
pub async fn update_extras(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExtrasRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.submit_extras(id, req.extras).await?;
    Ok(Json(reservation.into()))
}

/// PUT /v1/reservations/{id}/identity
/// Step 2: persist the licensing/identity fields.
pub async fn update_identity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(identity): Json<IdentityDetails>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.submit_identity(id, identity).await?;
    Ok(Json(reservation.into()))
}

/// POST /v1/reservations/{id}/confirm
/// Step 3: the commit with side effects. Idempotent against re-issue.
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.orchestrator.confirm(id, req.coupon_code).await?;
    Ok(Json(reservation.into()))
}

/// POST /v1/reservations/{id}/back
/// Backward transition for editing an earlier step.
pub async fn step_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.step_back(id).await?;
    Ok(Json(reservation.into()))
}

/// POST /v1/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.flow.cancel(id).await?;
    Ok(Json(reservation.into()))
}

/// GET /v1/reservations/{id}/quote?coupon=CODE
/// Recomputed on every view; an invalid coupon is priced as none.
pub async fn quote_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<BillingBreakdown>, AppError> {
    let breakdown = state.orchestrator.quote(id, query.coupon.as_deref()).await?;
    Ok(Json(breakdown))
}
