use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use rovia_catalog::extras::ExtraItem;
use rovia_catalog::locations::Location;
use rovia_catalog::pricing::DiscountKind;
use rovia_coupon::{validate_coupon, CouponError};

use crate::error::AppError;
use crate::state::AppState;

/// GET /v1/catalog/locations
pub async fn list_locations(State(state): State<AppState>) -> Json<Vec<Location>> {
    Json(state.locations.all().to_vec())
}

/// GET /v1/catalog/extras
pub async fn list_extras(State(state): State<AppState>) -> Json<Vec<ExtraItem>> {
    Json(state.extras.all().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateCouponResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscountKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// POST /v1/coupons/validate
/// Side-effect-free dry run, safe to call on every keystroke of the
/// code field. A rejection carries no reason.
pub async fn validate_coupon_code(
    State(state): State<AppState>,
    Json(req): Json<ValidateCouponRequest>,
) -> Result<Json<ValidateCouponResponse>, AppError> {
    let today = chrono::Utc::now().date_naive();

    match validate_coupon(&req.code, state.ledger.as_ref(), today).await {
        Ok(coupon) => Ok(Json(ValidateCouponResponse {
            valid: true,
            kind: Some(coupon.kind),
            value: Some(coupon.value),
        })),
        Err(CouponError::Invalid) => {
            Ok(Json(ValidateCouponResponse { valid: false, kind: None, value: None }))
        }
        Err(err @ CouponError::Ledger(_)) => Err(err.into()),
    }
}
