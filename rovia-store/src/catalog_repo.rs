use sqlx::PgPool;

use rovia_catalog::extras::{default_extras, BillingUnit, ExtraItem, ExtrasCatalog};
use rovia_catalog::locations::{default_locations, Location, LocationCatalog};

/// Loads the read-only catalog tables once at startup. Empty tables
/// fall back to the built-in defaults so a fresh database still serves
/// quotes.
pub struct StoreCatalogRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    name: String,
    surcharge: f64,
}

#[derive(sqlx::FromRow)]
struct ExtraRow {
    name: String,
    unit_price: f64,
    billing_unit: String,
}

impl StoreCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn load_locations(&self) -> Result<LocationCatalog, sqlx::Error> {
        let rows: Vec<LocationRow> =
            sqlx::query_as("SELECT name, surcharge FROM catalog_locations ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        if rows.is_empty() {
            tracing::info!("Location table is empty, serving built-in defaults");
            return Ok(LocationCatalog::new(default_locations()));
        }

        Ok(LocationCatalog::new(
            rows.into_iter()
                .map(|row| Location { name: row.name, surcharge: row.surcharge })
                .collect(),
        ))
    }

    pub async fn load_extras(&self) -> Result<ExtrasCatalog, sqlx::Error> {
        let rows: Vec<ExtraRow> =
            sqlx::query_as("SELECT name, unit_price, billing_unit FROM catalog_extras ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        if rows.is_empty() {
            tracing::info!("Extras table is empty, serving built-in defaults");
            return Ok(ExtrasCatalog::new(default_extras()));
        }

        Ok(ExtrasCatalog::new(
            rows.into_iter()
                .map(|row| ExtraItem {
                    name: row.name,
                    unit_price: row.unit_price,
                    billing_unit: match row.billing_unit.as_str() {
                        "PER_DAY" => BillingUnit::PerDay,
                        _ => BillingUnit::PerRental,
                    },
                })
                .collect(),
        ))
    }
}
