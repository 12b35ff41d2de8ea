use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    BookingDetails, InvoiceData, LineItem, NonVatBreakdown, TaxBreakdown, VatBreakdown,
};

pub const DEFAULT_VAT_RATE: f64 = 0.12;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits a VAT-inclusive amount into its taxable base and tax portion.
///
/// Both components are rounded on their own, so `vatable_sales + vat_amount`
/// can land one cent away from `total_amount_due`.
pub fn calculate_vat(total_sales: f64, vat_rate: f64, discount: f64) -> VatBreakdown {
    let net = total_sales - discount;
    let base = net / (1.0 + vat_rate);

    VatBreakdown {
        total_sales: round2(total_sales),
        discount: round2(discount),
        vat_rate,
        vatable_sales: round2(base),
        vat_amount: round2(net - base),
        total_amount_due: round2(net),
    }
}

pub fn calculate_non_vat(total_sales: f64, discount: f64) -> NonVatBreakdown {
    NonVatBreakdown {
        total_sales: round2(total_sales),
        discount: round2(discount),
        total_amount_due: round2(total_sales - discount),
    }
}

/// `INV-<unix millis>-<4 hex chars>`.
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect();
    format!("INV-{}-{}", now.timestamp_millis(), suffix.to_uppercase())
}

pub fn invoice_file_name(invoice_number: &str, now: DateTime<Utc>) -> String {
    format!("Invoice_{}_{}.pdf", invoice_number, now.timestamp_millis())
}

pub fn build_invoice(details: &BookingDetails, now: DateTime<Utc>, vat_rate: f64) -> InvoiceData {
    let line_items = if details.payment.items.is_empty() {
        vec![LineItem {
            description: details.booking.service_name.clone(),
            quantity: 1,
            unit_price: details.booking.price,
        }]
    } else {
        details.payment.items.clone()
    };

    let total_sales: f64 = line_items.iter().map(LineItem::amount).sum();
    let discount = details.payment.discount;

    let tax = if details.spa.vat_registered {
        TaxBreakdown::Vat(calculate_vat(total_sales, vat_rate, discount))
    } else {
        TaxBreakdown::NonVat(calculate_non_vat(total_sales, discount))
    };

    InvoiceData {
        invoice_number: generate_invoice_number(now),
        issued_at: now.naive_utc(),
        details: details.clone(),
        line_items,
        tax,
    }
}
