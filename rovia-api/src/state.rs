use std::sync::Arc;
use tokio::sync::broadcast;

use rovia_catalog::extras::ExtrasCatalog;
use rovia_catalog::locations::LocationCatalog;
use rovia_catalog::pricing::PricingEngine;
use rovia_coupon::CouponLedger;
use rovia_reservation::{ConfirmationOrchestrator, ReservationFlow, ReservationRepository};
use rovia_shared::models::events::ReservationConfirmedEvent;

#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<ReservationFlow>,
    pub orchestrator: Arc<ConfirmationOrchestrator>,
    pub ledger: Arc<dyn CouponLedger>,
    pub locations: Arc<LocationCatalog>,
    pub extras: Arc<ExtrasCatalog>,
    events_tx: broadcast::Sender<ReservationConfirmedEvent>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn ReservationRepository>,
        ledger: Arc<dyn CouponLedger>,
        pricing: Arc<PricingEngine>,
        locations: Arc<LocationCatalog>,
        extras: Arc<ExtrasCatalog>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(64);

        let flow = Arc::new(ReservationFlow::new(repo.clone()));
        let orchestrator = Arc::new(ConfirmationOrchestrator::new(
            repo,
            ledger.clone(),
            pricing,
            locations.clone(),
            extras.clone(),
            events_tx.clone(),
        ));

        Self { flow, orchestrator, ledger, locations, extras, events_tx }
    }

    /// Subscribe a notification worker to the confirmed-reservation
    /// stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ReservationConfirmedEvent> {
        self.events_tx.subscribe()
    }
}
