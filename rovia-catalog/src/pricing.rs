use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::extras::ExtrasCatalog;
use crate::locations::LocationCatalog;

/// One row of the long-stay rate table: rentals of `min_days` or more
/// pay `daily_rate` per vehicle per day, until a higher tier applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateTier {
    pub min_days: u32,
    pub daily_rate: f64,
}

/// Pricing inputs. Always passed in explicitly; the engine never reads
/// ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Long-stay tiers. Sorted descending by threshold on engine
    /// construction; rates must decrease as thresholds grow.
    pub day_tiers: Vec<RateTier>,
    /// Flat fee per additional driving license on the booking.
    pub license_rate: f64,
    /// Refundable deposit, added to every quote.
    pub deposit: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            day_tiers: vec![
                RateTier { min_days: 1, daily_rate: 55.0 },
                RateTier { min_days: 5, daily_rate: 50.0 },
                RateTier { min_days: 9, daily_rate: 46.0 },
                RateTier { min_days: 16, daily_rate: 42.0 },
                RateTier { min_days: 20, daily_rate: 38.0 },
                RateTier { min_days: 36, daily_rate: 33.0 },
                RateTier { min_days: 91, daily_rate: 29.0 },
                RateTier { min_days: 121, daily_rate: 25.0 },
            ],
            license_rate: 20.0,
            deposit: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// A discount already validated against the coupon ledger. The engine
/// only applies it; validation lives with the coupon protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    pub kind: DiscountKind,
    pub value: f64,
}

/// Trip parameters the engine prices. Built from the reservation draft
/// on every quote.
#[derive(Debug, Clone)]
pub struct QuoteInput {
    pub pickup_at: DateTime<Utc>,
    pub return_at: DateTime<Utc>,
    pub pickup_location: String,
    pub return_location: String,
    pub vehicle_count: u32,
    pub license_count: u32,
    pub extras: HashMap<String, u32>,
}

/// Itemized computation backing the final total. Derived state: amounts
/// stay unrounded here and are formatted only at presentation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingBreakdown {
    pub rental_days: u32,
    pub per_day_rate: f64,
    pub rental_subtotal: f64,
    pub per_license_rate: f64,
    pub license_subtotal: f64,
    pub extras_subtotal: f64,
    pub pickup_surcharge: f64,
    pub return_surcharge: f64,
    pub deposit: f64,
    pub subtotal: f64,
    pub discount_applied: f64,
    pub total: f64,
}

/// Pure quote computation over the catalog tables and an optional
/// validated discount.
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        let mut config = config;
        config.day_tiers.sort_by(|a, b| b.min_days.cmp(&a.min_days));
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Whole days between the pickup and return dates plus one, floored
    /// to a single day. A same-day rental counts as one day; inverted
    /// windows are rejected upstream at step 0 and only clamped here.
    pub fn rental_days(pickup_at: DateTime<Utc>, return_at: DateTime<Utc>) -> u32 {
        let span = return_at
            .date_naive()
            .signed_duration_since(pickup_at.date_naive())
            .num_days();
        (span + 1).max(1) as u32
    }

    /// Descending threshold scan: the first tier at or below the day
    /// count wins, so a tie resolves to the larger threshold.
    pub fn daily_rate(&self, rental_days: u32) -> f64 {
        self.config
            .day_tiers
            .iter()
            .find(|tier| tier.min_days <= rental_days)
            .map(|tier| tier.daily_rate)
            .unwrap_or(0.0)
    }

    pub fn quote(
        &self,
        input: &QuoteInput,
        locations: &LocationCatalog,
        extras: &ExtrasCatalog,
        discount: Option<&Discount>,
    ) -> BillingBreakdown {
        let rental_days = Self::rental_days(input.pickup_at, input.return_at);
        let per_day_rate = self.daily_rate(rental_days);
        let rental_subtotal = per_day_rate * rental_days as f64 * input.vehicle_count as f64;
        let license_subtotal = self.config.license_rate * input.license_count as f64;
        let extras_subtotal = extras.subtotal(&input.extras);
        let pickup_surcharge = locations.surcharge_for(&input.pickup_location);
        let return_surcharge = locations.surcharge_for(&input.return_location);

        let subtotal = rental_subtotal
            + license_subtotal
            + extras_subtotal
            + pickup_surcharge
            + return_surcharge
            + self.config.deposit;

        // The deposit sits inside the discounted subtotal; see DESIGN.md.
        let raw_discount = match discount {
            Some(d) => match d.kind {
                DiscountKind::Percentage => subtotal * d.value / 100.0,
                DiscountKind::Fixed => d.value,
            },
            None => 0.0,
        };
        let discount_applied = raw_discount.min(subtotal).max(0.0);

        BillingBreakdown {
            rental_days,
            per_day_rate,
            rental_subtotal,
            per_license_rate: self.config.license_rate,
            license_subtotal,
            extras_subtotal,
            pickup_surcharge,
            return_surcharge,
            deposit: self.config.deposit,
            subtotal,
            discount_applied,
            total: subtotal - discount_applied,
        }
    }
}
