use chrono::NaiveDate;

use crate::ledger::CouponLedger;
use crate::models::Coupon;

#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    /// Deliberately generic: the rejection never says which predicate
    /// failed, so valid codes cannot be enumerated by probing.
    #[error("Coupon code is not valid")]
    Invalid,

    #[error("Coupon ledger unavailable: {0}")]
    Ledger(String),
}

/// Checks a code against the ledger: case-insensitive match, active
/// flag, validity window (inclusive), and remaining capacity. Safe to
/// call repeatedly - it reads, never writes; redemption is a separate
/// step at confirmation time.
pub async fn validate_coupon(
    code: &str,
    ledger: &dyn CouponLedger,
    today: NaiveDate,
) -> Result<Coupon, CouponError> {
    let record = ledger
        .find_by_code(code)
        .await
        .map_err(|e| CouponError::Ledger(e.to_string()))?;

    match record {
        Some(coupon) if coupon.is_live(today) && coupon.has_capacity() => Ok(coupon),
        _ => Err(CouponError::Invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryCouponLedger;
    use rovia_catalog::pricing::DiscountKind;
    use uuid::Uuid;

    fn ledger_with(coupon: Coupon) -> MemoryCouponLedger {
        MemoryCouponLedger::new(vec![coupon])
    }

    fn coupon() -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SUMMER10".to_string(),
            kind: DiscountKind::Percentage,
            value: 10.0,
            is_active: true,
            starts_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
            current_users: 0,
            max_users: 100,
        }
    }

    fn mid_season() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    #[tokio::test]
    async fn test_valid_code_passes_case_insensitively() {
        let ledger = ledger_with(coupon());

        let found = validate_coupon("summer10", &ledger, mid_season()).await.unwrap();
        assert_eq!(found.code, "SUMMER10");
    }

    #[tokio::test]
    async fn test_unknown_code_is_rejected() {
        let ledger = ledger_with(coupon());

        let err = validate_coupon("NOPE", &ledger, mid_season()).await.unwrap_err();
        assert!(matches!(err, CouponError::Invalid));
    }

    #[tokio::test]
    async fn test_expired_window_is_rejected() {
        let ledger = ledger_with(coupon());
        let after_season = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let err = validate_coupon("SUMMER10", &ledger, after_season).await.unwrap_err();
        assert!(matches!(err, CouponError::Invalid));
    }

    #[tokio::test]
    async fn test_exhausted_coupon_is_rejected_despite_valid_dates() {
        let mut c = coupon();
        c.current_users = c.max_users;
        let ledger = ledger_with(c);

        let err = validate_coupon("SUMMER10", &ledger, mid_season()).await.unwrap_err();
        assert!(matches!(err, CouponError::Invalid));
    }

    #[tokio::test]
    async fn test_rejection_reason_is_generic() {
        let mut c = coupon();
        c.is_active = false;
        let ledger = ledger_with(c);

        let err = validate_coupon("SUMMER10", &ledger, mid_season()).await.unwrap_err();
        assert_eq!(err.to_string(), "Coupon code is not valid");
    }
}
