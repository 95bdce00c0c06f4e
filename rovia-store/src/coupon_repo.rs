use async_trait::async_trait;
use sqlx::PgPool;
use std::error::Error;
use uuid::Uuid;

use rovia_catalog::pricing::DiscountKind;
use rovia_coupon::{Coupon, CouponLedger};

pub struct StoreCouponLedger {
    pool: PgPool,
}

impl StoreCouponLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    kind: String,
    value: f64,
    is_active: bool,
    starts_on: chrono::NaiveDate,
    ends_on: chrono::NaiveDate,
    current_users: i32,
    max_users: i32,
}

impl CouponRow {
    fn into_coupon(self) -> Result<Coupon, Box<dyn Error + Send + Sync>> {
        let kind = match self.kind.as_str() {
            "PERCENTAGE" => DiscountKind::Percentage,
            "FIXED" => DiscountKind::Fixed,
            other => return Err(format!("Unknown discount kind: {}", other).into()),
        };

        Ok(Coupon {
            id: self.id,
            code: self.code,
            kind,
            value: self.value,
            is_active: self.is_active,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            current_users: self.current_users,
            max_users: self.max_users,
        })
    }
}

#[async_trait]
impl CouponLedger for StoreCouponLedger {
    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Coupon>, Box<dyn Error + Send + Sync>> {
        let row: Option<CouponRow> = sqlx::query_as(
            "SELECT id, code, kind, value, is_active, starts_on, ends_on, current_users, \
             max_users FROM coupons WHERE LOWER(code) = LOWER($1) LIMIT 1",
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CouponRow::into_coupon).transpose()
    }

    async fn try_redeem(&self, id: Uuid) -> Result<bool, Box<dyn Error + Send + Sync>> {
        // Conditional increment in a single statement: the row-level
        // lock makes the capacity check and the write atomic, so
        // concurrent confirmations can never push past max_users.
        let result = sqlx::query(
            "UPDATE coupons SET current_users = current_users + 1 \
             WHERE id = $1 AND current_users < max_users",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
