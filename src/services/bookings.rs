use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Booking, BookingStatus};
use crate::services::date_window::generate_date_window;
use crate::services::slots::{format_slot, is_valid_slot, FIRST_SLOT_HOUR, LAST_SLOT_HOUR};

#[derive(Debug)]
pub enum BookingError {
    NotFound(String),
    NotModifiable { status: BookingStatus },
    DateOutsideWindow { first: NaiveDate, last: NaiveDate },
    InvalidSlot { time: NaiveTime },
    Storage(anyhow::Error),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::NotFound(id) => write!(f, "booking {id} not found"),
            BookingError::NotModifiable { status } => {
                write!(f, "A {} booking can no longer be changed.", status.as_str())
            }
            BookingError::DateOutsideWindow { first, last } => write!(
                f,
                "Please pick a date between {} and {}.",
                first.format("%B %-d"),
                last.format("%B %-d")
            ),
            BookingError::InvalidSlot { time } => write!(
                f,
                "{} is not an available slot. Slots run every 15 minutes from {FIRST_SLOT_HOUR}:00 AM to {}:00 PM.",
                format_slot(*time),
                LAST_SLOT_HOUR - 12
            ),
            BookingError::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        BookingError::Storage(err)
    }
}

fn load_active(conn: &Connection, id: &str) -> Result<Booking, BookingError> {
    let booking = queries::get_booking_by_id(conn, id)?
        .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
    if !booking.status.is_active() {
        return Err(BookingError::NotModifiable {
            status: booking.status,
        });
    }
    Ok(booking)
}

pub fn cancel_booking(conn: &Connection, id: &str) -> Result<Booking, BookingError> {
    let booking = load_active(conn, id)?;
    queries::update_booking_status(conn, id, BookingStatus::Cancelled)?;
    tracing::info!(booking_id = %id, previous = booking.status.as_str(), "booking cancelled");

    queries::get_booking_by_id(conn, id)?.ok_or_else(|| BookingError::NotFound(id.to_string()))
}

/// Moves an upcoming booking to another slot inside the current date window.
/// The booking keeps its length and goes back to `pending` until the spa
/// confirms the new time.
pub fn reschedule_booking(
    conn: &Connection,
    id: &str,
    today: NaiveDate,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Booking, BookingError> {
    let booking = load_active(conn, id)?;

    let window = generate_date_window(today);
    if !window.contains(&date) {
        let first = window.first().copied().unwrap_or(today);
        let last = window.last().copied().unwrap_or(today);
        return Err(BookingError::DateOutsideWindow { first, last });
    }

    if !is_valid_slot(&date.and_time(time)) {
        return Err(BookingError::InvalidSlot { time });
    }

    let (end_time, wrapped) = time.overflowing_add_signed(booking.duration());
    if wrapped != 0 {
        return Err(BookingError::InvalidSlot { time });
    }

    queries::reschedule_booking(conn, id, date, time, end_time, BookingStatus::Pending)?;
    tracing::info!(
        booking_id = %id,
        from = %booking.starts_at(),
        to = %date.and_time(time),
        "booking rescheduled"
    );

    queries::get_booking_by_id(conn, id)?.ok_or_else(|| BookingError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::tests::{sample_details, sample_spa, setup_db};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn seeded(status: BookingStatus) -> Connection {
        let conn = setup_db();
        let spa = sample_spa("spa-1", false);
        queries::upsert_spa(&conn, &spa).unwrap();
        let d = sample_details("bk-1", &spa, "2026-10-20", "10:00", "11:30", status);
        queries::create_booking(&conn, &d).unwrap();
        conn
    }

    #[test]
    fn test_cancel_confirmed_booking() {
        let conn = seeded(BookingStatus::Confirmed);
        let b = cancel_booking(&conn, "bk-1").unwrap();
        assert_eq!(b.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_cancel_twice_is_rejected() {
        let conn = seeded(BookingStatus::Pending);
        cancel_booking(&conn, "bk-1").unwrap();
        let err = cancel_booking(&conn, "bk-1").unwrap_err();
        assert!(matches!(
            err,
            BookingError::NotModifiable {
                status: BookingStatus::Cancelled
            }
        ));
    }

    #[test]
    fn test_cancel_completed_is_rejected() {
        let conn = seeded(BookingStatus::Completed);
        assert!(matches!(
            cancel_booking(&conn, "bk-1").unwrap_err(),
            BookingError::NotModifiable { .. }
        ));
    }

    #[test]
    fn test_cancel_unknown_booking() {
        let conn = seeded(BookingStatus::Confirmed);
        assert!(matches!(
            cancel_booking(&conn, "ghost").unwrap_err(),
            BookingError::NotFound(_)
        ));
    }

    #[test]
    fn test_reschedule_keeps_duration_and_resets_to_pending() {
        let conn = seeded(BookingStatus::Confirmed);
        let b = reschedule_booking(
            &conn,
            "bk-1",
            day("2026-10-16"),
            day("2026-10-29"),
            time("16:45"),
        )
        .unwrap();
        assert_eq!(b.date, day("2026-10-29"));
        assert_eq!(b.start_time, time("16:45"));
        assert_eq!(b.end_time, time("18:15"));
        assert_eq!(b.status, BookingStatus::Pending);
    }

    #[test]
    fn test_reschedule_into_next_month_spillover() {
        let conn = seeded(BookingStatus::Pending);
        let b = reschedule_booking(
            &conn,
            "bk-1",
            day("2026-10-27"),
            day("2026-11-05"),
            time("08:00"),
        )
        .unwrap();
        assert_eq!(b.date, day("2026-11-05"));
    }

    #[test]
    fn test_reschedule_outside_window() {
        let conn = seeded(BookingStatus::Confirmed);
        let err = reschedule_booking(
            &conn,
            "bk-1",
            day("2026-10-16"),
            day("2026-11-02"),
            time("10:00"),
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::DateOutsideWindow { .. }));

        let err = reschedule_booking(
            &conn,
            "bk-1",
            day("2026-10-16"),
            day("2026-10-15"),
            time("10:00"),
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::DateOutsideWindow { .. }));
    }

    #[test]
    fn test_reschedule_off_grid_time() {
        let conn = seeded(BookingStatus::Confirmed);
        for t in ["07:45", "10:10", "20:15"] {
            let err = reschedule_booking(
                &conn,
                "bk-1",
                day("2026-10-16"),
                day("2026-10-20"),
                time(t),
            )
            .unwrap_err();
            assert!(matches!(err, BookingError::InvalidSlot { .. }));
        }
    }

    #[test]
    fn test_reschedule_error_message() {
        let err = BookingError::InvalidSlot { time: time("07:45") };
        assert_eq!(
            err.to_string(),
            "7:45 AM is not an available slot. Slots run every 15 minutes from 8:00 AM to 8:00 PM."
        );
    }
}
