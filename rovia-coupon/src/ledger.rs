use async_trait::async_trait;
use std::error::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::Coupon;

/// Data access for the shared coupon ledger. Many concurrent
/// confirmations may race on the same code, so the redemption increment
/// must be conditional at the storage layer - a plain read-then-write
/// is only acceptable for side-effect-free validation reads.
#[async_trait]
pub trait CouponLedger: Send + Sync {
    /// Case-insensitive lookup. The first matching record wins; the
    /// ledger is expected to keep codes unique upstream.
    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn Error + Send + Sync>>;

    /// Atomic conditional increment of the usage counter: succeeds only
    /// while `current_users < max_users` still holds at write time.
    /// Returns whether this call won a slot.
    async fn try_redeem(&self, id: Uuid) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

/// Mutex-guarded ledger for tests and single-process runs. The check
/// and the increment happen under one lock acquisition, which is the
/// in-memory equivalent of the store's conditional UPDATE.
pub struct MemoryCouponLedger {
    coupons: Mutex<Vec<Coupon>>,
}

impl MemoryCouponLedger {
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons: Mutex::new(coupons) }
    }

    pub async fn usage(&self, id: Uuid) -> Option<i32> {
        let coupons = self.coupons.lock().await;
        coupons.iter().find(|c| c.id == id).map(|c| c.current_users)
    }
}

#[async_trait]
impl CouponLedger for MemoryCouponLedger {
    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn Error + Send + Sync>> {
        let coupons = self.coupons.lock().await;
        Ok(coupons.iter().find(|c| c.matches_code(code)).cloned())
    }

    async fn try_redeem(&self, id: Uuid) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut coupons = self.coupons.lock().await;
        match coupons.iter_mut().find(|c| c.id == id) {
            Some(coupon) if coupon.has_capacity() => {
                coupon.current_users += 1;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rovia_catalog::pricing::DiscountKind;
    use std::sync::Arc;

    fn coupon(max_users: i32) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "LAST-SLOTS".to_string(),
            kind: DiscountKind::Fixed,
            value: 15.0,
            is_active: true,
            starts_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            current_users: 0,
            max_users,
        }
    }

    #[tokio::test]
    async fn test_redeem_stops_at_capacity() {
        let c = coupon(2);
        let id = c.id;
        let ledger = MemoryCouponLedger::new(vec![c]);

        assert!(ledger.try_redeem(id).await.unwrap());
        assert!(ledger.try_redeem(id).await.unwrap());
        assert!(!ledger.try_redeem(id).await.unwrap());
        assert_eq!(ledger.usage(id).await, Some(2));
    }

    #[tokio::test]
    async fn test_redeem_unknown_id_fails() {
        let ledger = MemoryCouponLedger::new(vec![coupon(1)]);

        assert!(!ledger.try_redeem(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_redemptions_never_overrun_capacity() {
        let c = coupon(3);
        let id = c.id;
        let ledger = Arc::new(MemoryCouponLedger::new(vec![c]));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.try_redeem(id).await.unwrap()
            }));
        }

        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap() {
                won += 1;
            }
        }

        assert_eq!(won, 3);
        assert_eq!(ledger.usage(id).await, Some(3));
    }
}
