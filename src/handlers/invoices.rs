use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingStatus, InvoiceRecord, LineItem, TaxBreakdown};
use crate::services::{invoice, invoice_pdf, invoice_store};
use crate::state::AppState;

#[derive(Serialize)]
pub struct InvoiceResponse {
    invoice_number: String,
    booking_id: String,
    line_items: Vec<LineItem>,
    tax: TaxBreakdown,
    #[serde(flatten)]
    record: InvoiceRecord,
}

// POST /api/bookings/:id/invoice
pub async fn generate_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let (details, folder) = {
        let db = state.db()?;
        let details = queries::get_booking_details(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
        let folder = invoice_store::storage_folder(&db, &state.config.invoice_dir)?;
        (details, folder)
    };

    if details.booking.status == BookingStatus::Cancelled {
        return Err(AppError::Conflict(
            "A cancelled booking has no invoice.".to_string(),
        ));
    }

    let now = Utc::now();
    let invoice = invoice::build_invoice(&details, now, state.config.vat_rate);
    let pdf = invoice_pdf::render_invoice_pdf(&invoice)?;

    let record = {
        let db = state.db()?;
        invoice_store::save_invoice(&db, &folder, &invoice, &pdf, now)?
    };

    Ok(Json(InvoiceResponse {
        invoice_number: invoice.invoice_number,
        booking_id: id,
        line_items: invoice.line_items,
        tax: invoice.tax,
        record,
    }))
}

#[derive(Serialize)]
pub struct InvoiceListEntry {
    invoice_number: String,
    #[serde(flatten)]
    record: InvoiceRecord,
}

// GET /api/invoices
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InvoiceListEntry>>, AppError> {
    let registry = {
        let db = state.db()?;
        invoice_store::load_registry(&db)?
    };

    let mut entries: Vec<InvoiceListEntry> = registry
        .into_iter()
        .map(|(invoice_number, record)| InvoiceListEntry {
            invoice_number,
            record,
        })
        .collect();
    entries.sort_by(|a, b| b.record.download_date.cmp(&a.record.download_date));

    Ok(Json(entries))
}

// GET /api/invoices/:number
pub async fn download_invoice(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Response, AppError> {
    let record = {
        let db = state.db()?;
        invoice_store::get_invoice(&db, &number)?
    }
    .ok_or_else(|| AppError::NotFound(format!("invoice {number}")))?;

    let path = invoice_store::record_path(&record);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                invoice_number = %number,
                path = %path.display(),
                "invoice file missing"
            );
            return Err(AppError::NotFound(format!("file for invoice {number}")));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", record.file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

// DELETE /api/invoices/:number
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = {
        let db = state.db()?;
        invoice_store::remove_invoice(&db, &number)?
    };

    match removed {
        Some(_) => Ok(Json(serde_json::json!({ "ok": true }))),
        None => Err(AppError::NotFound(format!("invoice {number}"))),
    }
}
