pub mod extras;
pub mod locations;
pub mod pricing;

pub use extras::{BillingUnit, ExtraItem, ExtrasCatalog};
pub use locations::{Location, LocationCatalog};
pub use pricing::{BillingBreakdown, Discount, DiscountKind, PricingConfig, PricingEngine, QuoteInput, RateTier};
