use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    Booking, BookingDetails, BookingStatus, Coordinates, LineItem, Route, Spa, Therapist,
};
use crate::services::bookings;
use crate::services::slots::parse_slot_time;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    service_name: String,
    spa_name: String,
    status: BookingStatus,
    date: String,
    time_range: String,
    price: f64,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        let time_range = b.time_range();
        Self {
            id: b.id,
            service_name: b.service_name,
            spa_name: b.spa_name,
            status: b.status,
            date: b.date.format("%Y-%m-%d").to_string(),
            time_range,
            price: b.price,
        }
    }
}

#[derive(Serialize)]
pub struct PaymentResponse {
    items: Vec<LineItem>,
    gross: f64,
    discount: f64,
    method: String,
}

#[derive(Serialize)]
pub struct BookingDetailsResponse {
    #[serde(flatten)]
    booking: BookingResponse,
    spa: Spa,
    therapist: Therapist,
    payment: PaymentResponse,
    notes: Option<String>,
}

impl From<BookingDetails> for BookingDetailsResponse {
    fn from(d: BookingDetails) -> Self {
        let gross = d.payment.gross();
        Self {
            booking: d.booking.into(),
            spa: d.spa,
            therapist: d.therapist,
            payment: PaymentResponse {
                items: d.payment.items,
                gross,
                discount: d.payment.discount,
                method: d.payment.method,
            },
            notes: d.notes,
        }
    }
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let status = match query.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(s) => Some(
            BookingStatus::try_parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status: {s}")))?,
        ),
    };

    let bookings = {
        let db = state.db()?;
        queries::list_bookings(&db, status)?
    };

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetailsResponse>, AppError> {
    let details = {
        let db = state.db()?;
        queries::get_booking_details(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    Ok(Json(details.into()))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = {
        let db = state.db()?;
        bookings::cancel_booking(&db, &id)?
    };
    Ok(Json(booking.into()))
}

// POST /api/bookings/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
    pub time: String,
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let time = parse_slot_time(&req.time)
        .ok_or_else(|| AppError::BadRequest(format!("invalid time: {}", req.time)))?;
    let today = Local::now().date_naive();

    let booking = {
        let db = state.db()?;
        bookings::reschedule_booking(&db, &id, today, req.date, time)?
    };
    Ok(Json(booking.into()))
}

// GET /api/bookings/:id/directions
#[derive(Deserialize)]
pub struct DirectionsQuery {
    pub lat: f64,
    pub lng: f64,
}

pub async fn get_directions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DirectionsQuery>,
) -> Result<Json<Route>, AppError> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lng) {
        return Err(AppError::BadRequest("coordinates out of range".to_string()));
    }

    let destination = {
        let db = state.db()?;
        let booking = queries::get_booking_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
        queries::get_spa(&db, &booking.spa_id)?
            .ok_or_else(|| AppError::NotFound(format!("spa {}", booking.spa_id)))?
            .coordinates()
    };
    let origin = Coordinates {
        latitude: query.lat,
        longitude: query.lng,
    };

    let route = state
        .directions
        .route(origin, destination)
        .await
        .map_err(|e| AppError::Directions(e.to_string()))?;

    tracing::info!(
        booking_id = %id,
        distance_meters = route.distance_meters,
        duration_seconds = route.duration_seconds,
        "route resolved"
    );
    Ok(Json(route))
}
