pub mod booking;
pub mod directions;
pub mod invoice;
pub mod spa;

pub use booking::{Booking, BookingDetails, BookingStatus};
pub use directions::{Coordinates, Route};
pub use invoice::{
    InvoiceData, InvoiceRecord, LineItem, NonVatBreakdown, PaymentBreakdown, TaxBreakdown,
    VatBreakdown,
};
pub use spa::{Spa, Therapist};
