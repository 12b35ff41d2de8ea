pub mod bookings;
pub mod calendar;
pub mod health;
pub mod invoices;
pub mod schedule;
pub mod settings;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/bookings", get(bookings::list_bookings))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/api/bookings/:id/reschedule",
            post(bookings::reschedule_booking),
        )
        .route(
            "/api/bookings/:id/directions",
            get(bookings::get_directions),
        )
        .route(
            "/api/bookings/:id/calendar.ics",
            get(calendar::download_ics),
        )
        .route("/api/bookings/:id/invoice", post(invoices::generate_invoice))
        .route("/api/schedule/dates", get(schedule::get_dates))
        .route("/api/schedule/slots", get(schedule::get_slots))
        .route("/api/invoices", get(invoices::list_invoices))
        .route(
            "/api/invoices/:number",
            get(invoices::download_invoice).delete(invoices::delete_invoice),
        )
        .route(
            "/api/settings/invoice-folder",
            get(settings::get_invoice_folder).post(settings::set_invoice_folder),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
