use axum::extract::Query;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::services::date_window::generate_date_window;
use crate::services::slots::{format_slot, generate_time_slots};

#[derive(Serialize)]
pub struct DateOption {
    date: NaiveDate,
    weekday: String,
    label: String,
}

// GET /api/schedule/dates
pub async fn get_dates() -> Json<Vec<DateOption>> {
    let today = Local::now().date_naive();
    let dates = generate_date_window(today)
        .into_iter()
        .map(|date| DateOption {
            date,
            weekday: date.format("%a").to_string(),
            label: date.format("%b %-d").to_string(),
        })
        .collect();
    Json(dates)
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct SlotOption {
    time: String,
    label: String,
}

// GET /api/schedule/slots
pub async fn get_slots(Query(query): Query<SlotsQuery>) -> Json<Vec<SlotOption>> {
    let day = query.date.unwrap_or_else(|| Local::now().date_naive());
    let slots = generate_time_slots(day)
        .into_iter()
        .map(|slot| SlotOption {
            time: slot.format("%H:%M").to_string(),
            label: format_slot(slot.time()),
        })
        .collect();
    Json(slots)
}
