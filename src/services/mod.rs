pub mod bookings;
pub mod calendar;
pub mod date_window;
pub mod directions;
pub mod invoice;
pub mod invoice_pdf;
pub mod invoice_store;
pub mod slots;
