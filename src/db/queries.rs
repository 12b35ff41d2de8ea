use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    Booking, BookingDetails, BookingStatus, LineItem, PaymentBreakdown, Spa, Therapist,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

fn now_str() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

// ── Spas ──

pub fn upsert_spa(conn: &Connection, spa: &Spa) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO spas (id, name, address, phone, latitude, longitude, vat_registered, tin)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           address = excluded.address,
           phone = excluded.phone,
           latitude = excluded.latitude,
           longitude = excluded.longitude,
           vat_registered = excluded.vat_registered,
           tin = excluded.tin",
        params![
            spa.id,
            spa.name,
            spa.address,
            spa.phone,
            spa.latitude,
            spa.longitude,
            spa.vat_registered as i32,
            spa.tin,
        ],
    )?;
    Ok(())
}

pub fn get_spa(conn: &Connection, id: &str) -> anyhow::Result<Option<Spa>> {
    let spa = conn
        .query_row(
            "SELECT id, name, address, phone, latitude, longitude, vat_registered, tin
             FROM spas WHERE id = ?1",
            params![id],
            |row| {
                Ok(Spa {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                    phone: row.get(3)?,
                    latitude: row.get(4)?,
                    longitude: row.get(5)?,
                    vat_registered: row.get::<_, i32>(6)? != 0,
                    tin: row.get(7)?,
                })
            },
        )
        .optional()?;
    Ok(spa)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "b.id, b.service_name, b.spa_id, s.name, b.status, b.date, b.start_time, b.end_time, b.price, b.created_at, b.updated_at";

pub fn create_booking(conn: &Connection, details: &BookingDetails) -> anyhow::Result<()> {
    let booking = &details.booking;
    anyhow::ensure!(
        details.payment.items.iter().all(|item| item.unit_price >= 0.0),
        "line item unit prices must not be negative (booking {})",
        booking.id
    );
    let line_items = serde_json::to_string(&details.payment.items)?;

    conn.execute(
        "INSERT INTO bookings (id, service_name, spa_id, status, date, start_time, end_time, price,
                               therapist_name, therapist_specialty, therapist_rating,
                               payment_method, discount, line_items, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            booking.id,
            booking.service_name,
            booking.spa_id,
            booking.status.as_str(),
            booking.date.format(DATE_FORMAT).to_string(),
            booking.start_time.format(TIME_FORMAT).to_string(),
            booking.end_time.format(TIME_FORMAT).to_string(),
            booking.price,
            details.therapist.name,
            details.therapist.specialty,
            details.therapist.rating,
            details.payment.method,
            details.payment.discount,
            line_items,
            details.notes,
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_bookings(
    conn: &Connection,
    status_filter: Option<BookingStatus>,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings b JOIN spas s ON s.id = b.spa_id
         WHERE (?1 IS NULL OR b.status = ?1)
         ORDER BY b.date ASC, b.start_time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![status_filter.map(|s| s.as_str())], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings b JOIN spas s ON s.id = b.spa_id WHERE b.id = ?1"
    );
    let result = conn
        .query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
        .optional()?;
    result.transpose()
}

pub fn get_booking_details(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingDetails>> {
    let Some(booking) = get_booking_by_id(conn, id)? else {
        return Ok(None);
    };
    let Some(spa) = get_spa(conn, &booking.spa_id)? else {
        return Ok(None);
    };

    let extras = conn.query_row(
        "SELECT therapist_name, therapist_specialty, therapist_rating, payment_method, discount, line_items, notes
         FROM bookings WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                Therapist {
                    name: row.get(0)?,
                    specialty: row.get(1)?,
                    rating: row.get(2)?,
                },
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        },
    )?;
    let (therapist, method, discount, line_items_json, notes) = extras;
    let items: Vec<LineItem> = serde_json::from_str(&line_items_json)?;

    Ok(Some(BookingDetails {
        booking,
        spa,
        therapist,
        payment: PaymentBreakdown {
            items,
            discount,
            method,
        },
        notes,
    }))
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;
    Ok(count > 0)
}

pub fn reschedule_booking(
    conn: &Connection,
    id: &str,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET date = ?1, start_time = ?2, end_time = ?3, status = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            date.format(DATE_FORMAT).to_string(),
            start_time.format(TIME_FORMAT).to_string(),
            end_time.format(TIME_FORMAT).to_string(),
            status.as_str(),
            now_str(),
            id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(5)?;
    let start_str: String = row.get(6)?;
    let end_str: String = row.get(7)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Booking {
        id: row.get(0)?,
        service_name: row.get(1)?,
        spa_id: row.get(2)?,
        spa_name: row.get(3)?,
        status: BookingStatus::parse(&row.get::<_, String>(4)?),
        date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)?,
        start_time: NaiveTime::parse_from_str(&start_str, TIME_FORMAT)?,
        end_time: NaiveTime::parse_from_str(&end_str, TIME_FORMAT)?,
        price: row.get(8)?,
        created_at,
        updated_at,
    })
}

// ── Key-value store ──

pub fn get_kv(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_kv(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now_str()],
    )?;
    Ok(())
}

pub fn delete_kv(conn: &Connection, key: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
    Ok(count > 0)
}
