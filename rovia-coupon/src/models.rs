use chrono::NaiveDate;
use rovia_catalog::pricing::{Discount, DiscountKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A redeemable discount code. Immutable except for `current_users`,
/// which only the confirmation commit may move, through the ledger's
/// conditional increment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    pub is_active: bool,
    /// Validity window, both endpoints inclusive.
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub current_users: i32,
    pub max_users: i32,
}

impl Coupon {
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }

    pub fn is_live(&self, today: NaiveDate) -> bool {
        self.is_active && self.starts_on <= today && today <= self.ends_on
    }

    pub fn has_capacity(&self) -> bool {
        self.current_users < self.max_users
    }

    pub fn discount(&self) -> Discount {
        Discount { kind: self.kind, value: self.value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_code_match_is_case_insensitive() {
        let c = coupon();

        assert!(c.matches_code("summer10"));
        assert!(c.matches_code(" SUMMER10 "));
        assert!(!c.matches_code("WINTER10"));
    }

    #[test]
    fn test_window_endpoints_are_inclusive() {
        let c = coupon();

        assert!(c.is_live(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(c.is_live(NaiveDate::from_ymd_opt(2024, 8, 31).unwrap()));
        assert!(!c.is_live(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()));
        assert!(!c.is_live(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()));
    }

    #[test]
    fn test_inactive_coupon_is_never_live() {
        let mut c = coupon();
        c.is_active = false;

        assert!(!c.is_live(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    }
}
