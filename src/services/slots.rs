use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const FIRST_SLOT_HOUR: u32 = 8;
pub const LAST_SLOT_HOUR: u32 = 20;
pub const SLOT_INTERVAL_MINUTES: i64 = 15;

/// Bookable start times for `day`: every 15 minutes from 08:00 through 20:00,
/// both ends included.
pub fn generate_time_slots(day: NaiveDate) -> Vec<NaiveDateTime> {
    let mut slots = Vec::new();
    let (Some(mut current), Some(last)) = (
        day.and_hms_opt(FIRST_SLOT_HOUR, 0, 0),
        day.and_hms_opt(LAST_SLOT_HOUR, 0, 0),
    ) else {
        return slots;
    };

    while current <= last {
        slots.push(current);
        current += Duration::minutes(SLOT_INTERVAL_MINUTES);
    }
    slots
}

pub fn is_valid_slot(dt: &NaiveDateTime) -> bool {
    let minutes_since_open = (dt.hour() as i64 - FIRST_SLOT_HOUR as i64) * 60 + dt.minute() as i64;
    dt.second() == 0
        && dt.nanosecond() == 0
        && dt.hour() >= FIRST_SLOT_HOUR
        && (dt.hour() < LAST_SLOT_HOUR || (dt.hour() == LAST_SLOT_HOUR && dt.minute() == 0))
        && minutes_since_open % SLOT_INTERVAL_MINUTES == 0
}

/// `8:00 AM` style label.
pub fn format_slot(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Accepts `14:30` as well as `2:30 PM`.
pub fn parse_slot_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&s.to_uppercase(), "%I:%M %p"))
        .ok()
}
