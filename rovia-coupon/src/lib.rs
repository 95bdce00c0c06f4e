pub mod ledger;
pub mod models;
pub mod validate;

pub use ledger::{CouponLedger, MemoryCouponLedger};
pub use models::Coupon;
pub use validate::{validate_coupon, CouponError};
