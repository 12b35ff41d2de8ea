use std::io::BufWriter;

use anyhow::anyhow;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::models::{InvoiceData, TaxBreakdown};

fn money(value: f64) -> String {
    format!("PHP {value:.2}")
}

/// Renders a single A4 page invoice. Returns PDF bytes.
pub fn render_invoice_pdf(invoice: &InvoiceData) -> anyhow::Result<Vec<u8>> {
    let title = format!("Invoice {}", invoice.invoice_number);
    let (doc, page1, layer1) = PdfDocument::new(&title, Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;

    let details = &invoice.details;
    let booking = &details.booking;
    let mut y = Mm(280.0);

    layer.use_text(&details.spa.name, 16.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(&details.spa.address, 9.0, Mm(20.0), y, &font);
    y -= Mm(4.5);
    if let Some(phone) = &details.spa.phone {
        layer.use_text(phone, 9.0, Mm(20.0), y, &font);
        y -= Mm(4.5);
    }
    if let Some(tin) = &details.spa.tin {
        layer.use_text(format!("TIN: {tin}"), 9.0, Mm(20.0), y, &font);
        y -= Mm(4.5);
    }

    y -= Mm(6.0);
    layer.use_text("SERVICE INVOICE", 13.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        format!("Invoice No.: {}", invoice.invoice_number),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    layer.use_text(
        format!("Issued: {}", invoice.issued_at.format("%B %-d, %Y %H:%M")),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    layer.use_text(format!("Booking: {}", booking.id), 9.0, Mm(20.0), y, &font);
    y -= Mm(4.5);
    layer.use_text(
        format!(
            "Appointment: {} {}",
            booking.date.format("%B %-d, %Y"),
            booking.time_range()
        ),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    layer.use_text(
        format!("Therapist: {}", details.therapist.name),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    layer.use_text(
        format!("Payment method: {}", details.payment.method),
        9.0,
        Mm(20.0),
        y,
        &font,
    );

    y -= Mm(10.0);
    layer.use_text("DESCRIPTION", 9.0, Mm(20.0), y, &bold);
    layer.use_text("QTY", 9.0, Mm(120.0), y, &bold);
    layer.use_text("PRICE", 9.0, Mm(140.0), y, &bold);
    layer.use_text("AMOUNT", 9.0, Mm(170.0), y, &bold);
    y -= Mm(6.0);
    for item in &invoice.line_items {
        layer.use_text(&item.description, 9.0, Mm(20.0), y, &font);
        layer.use_text(item.quantity.to_string(), 9.0, Mm(120.0), y, &font);
        layer.use_text(format!("{:.2}", item.unit_price), 9.0, Mm(140.0), y, &font);
        layer.use_text(format!("{:.2}", item.amount()), 9.0, Mm(170.0), y, &font);
        y -= Mm(5.0);
    }

    y -= Mm(6.0);
    let rows: Vec<(String, f64)> = match &invoice.tax {
        TaxBreakdown::Vat(v) => vec![
            ("Total Sales (VAT inclusive)".to_string(), v.total_sales),
            ("Less: Discount".to_string(), v.discount),
            ("VATable Sales".to_string(), v.vatable_sales),
            (format!("VAT ({:.0}%)", v.vat_rate * 100.0), v.vat_amount),
        ],
        TaxBreakdown::NonVat(n) => vec![
            ("Total Sales".to_string(), n.total_sales),
            ("Less: Discount".to_string(), n.discount),
        ],
    };
    for (label, value) in rows {
        layer.use_text(label, 9.0, Mm(110.0), y, &font);
        layer.use_text(money(value), 9.0, Mm(165.0), y, &font);
        y -= Mm(5.0);
    }
    layer.use_text("TOTAL AMOUNT DUE", 10.0, Mm(110.0), y, &bold);
    layer.use_text(money(invoice.tax.total_amount_due()), 10.0, Mm(165.0), y, &bold);

    if matches!(invoice.tax, TaxBreakdown::NonVat(_)) {
        y -= Mm(10.0);
        layer.use_text(
            "This document is not valid for claim of input tax.",
            8.0,
            Mm(20.0),
            y,
            &font,
        );
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| anyhow!("PDF save error: {e}"))?;
    buf.into_inner()
        .map_err(|e| anyhow!("PDF buffer error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Booking, BookingDetails, BookingStatus, LineItem, PaymentBreakdown, Spa, Therapist,
    };
    use crate::services::invoice::{build_invoice, DEFAULT_VAT_RATE};
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    fn sample_details(vat_registered: bool) -> BookingDetails {
        let at = NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        BookingDetails {
            booking: Booking {
                id: "bk-9".to_string(),
                service_name: "Foot Reflexology".to_string(),
                spa_id: "spa-2".to_string(),
                spa_name: "Bamboo Retreat".to_string(),
                status: BookingStatus::Completed,
                date: NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
                start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                price: 650.0,
                created_at: at,
                updated_at: at,
            },
            spa: Spa {
                id: "spa-2".to_string(),
                name: "Bamboo Retreat".to_string(),
                address: "88 Palm Ave".to_string(),
                phone: Some("+63 2 555 0101".to_string()),
                latitude: 14.6,
                longitude: 121.0,
                vat_registered,
                tin: Some("123-456-789-000".to_string()),
            },
            therapist: Therapist {
                name: "Ana".to_string(),
                specialty: Some("Reflexology".to_string()),
                rating: Some(4.8),
            },
            payment: PaymentBreakdown {
                items: vec![LineItem {
                    description: "Foot Reflexology".to_string(),
                    quantity: 1,
                    unit_price: 650.0,
                }],
                discount: 50.0,
                method: "gcash".to_string(),
            },
            notes: None,
        }
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        for vat in [true, false] {
            let invoice = build_invoice(&sample_details(vat), now, DEFAULT_VAT_RATE);
            let bytes = render_invoice_pdf(&invoice).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
    }
}
