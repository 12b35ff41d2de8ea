use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /api/bookings/:id/calendar.ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Response, AppError> {
    let details = {
        let db = state.db()?;
        queries::get_booking_details(&db, &booking_id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    let ics = generate_ics(&details);
    let disposition = format!("attachment; filename=\"booking-{booking_id}.ics\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        ics,
    )
        .into_response())
}
