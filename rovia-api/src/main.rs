use std::net::SocketAddr;
use std::sync::Arc;

use rovia_api::{app, worker, AppState};
use rovia_catalog::pricing::PricingEngine;
use rovia_core::LogNotifier;
use rovia_coupon::CouponLedger;
use rovia_reservation::{NotificationDispatcher, ReservationRepository};
use rovia_store::{DbClient, StoreCatalogRepository, StoreCouponLedger, StoreReservationRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rovia_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = rovia_store::app_config::Config::load()?;
    tracing::info!("Starting Rovia API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;

    // Catalog tables are read-only reference data, fetched once.
    let catalog_repo = StoreCatalogRepository::new(db.pool.clone());
    let locations = Arc::new(catalog_repo.load_locations().await?);
    let extras = Arc::new(catalog_repo.load_extras().await?);

    let repo: Arc<dyn ReservationRepository> =
        Arc::new(StoreReservationRepository::new(db.pool.clone()));
    let ledger: Arc<dyn CouponLedger> = Arc::new(StoreCouponLedger::new(db.pool.clone()));
    let pricing = Arc::new(PricingEngine::new(config.pricing.to_pricing_config()));

    let state = AppState::new(repo, ledger, pricing, locations, extras);

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(LogNotifier),
        config.notifier.ops_recipient.clone(),
        config.notifier.send_attempts,
    ));
    tokio::spawn(worker::start_notification_worker(state.subscribe(), dispatcher));

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
