use crate::models::BookingDetails;

fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

pub fn generate_ics(details: &BookingDetails) -> String {
    let booking = &details.booking;
    let dtstart = booking.starts_at().format("%Y%m%dT%H%M%S").to_string();
    let dtend = booking.ends_at().format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = booking.updated_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@spabook", booking.id);

    let summary = escape_text(&format!("{} at {}", booking.service_name, booking.spa_name));
    let location = escape_text(&details.spa.address);
    let description = escape_text(&format!(
        "Therapist: {}\n{}",
        details.therapist.name,
        details.notes.as_deref().unwrap_or("No additional notes")
    ));

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Spabook//Bookings//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         DESCRIPTION:{description}\r\n\
         GEO:{};{}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n",
        details.spa.latitude, details.spa.longitude
    )
}
