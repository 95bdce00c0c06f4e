use axum::{
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod catalog;
pub mod error;
pub mod reservations;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/v1/reservations", post(reservations::create_reservation))
        .route("/v1/reservations/{id}", get(reservations::get_reservation))
        .route("/v1/reservations/{id}/trip", put(reservations::update_trip_details))
        .route("/v1/reservations/{id}/extras", put(reservations::update_extras))
        .route("/v1/reservations/{id}/identity", put(reservations::update_identity))
        .route("/v1/reservations/{id}/confirm", post(reservations::confirm_reservation))
        .route("/v1/reservations/{id}/back", post(reservations::step_back))
        .route("/v1/reservations/{id}/cancel", post(reservations::cancel_reservation))
        .route("/v1/reservations/{id}/quote", get(reservations::quote_reservation))
        .route("/v1/catalog/locations", get(catalog::list_locations))
        .route("/v1/catalog/extras", get(catalog::list_extras))
        .route("/v1/coupons/validate", post(catalog::validate_coupon_code))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
