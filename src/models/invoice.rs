use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::BookingDetails;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl LineItem {
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub items: Vec<LineItem>,
    pub discount: f64,
    pub method: String,
}

impl PaymentBreakdown {
    pub fn gross(&self) -> f64 {
        self.items.iter().map(LineItem::amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatBreakdown {
    pub total_sales: f64,
    pub discount: f64,
    pub vat_rate: f64,
    pub vatable_sales: f64,
    pub vat_amount: f64,
    pub total_amount_due: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonVatBreakdown {
    pub total_sales: f64,
    pub discount: f64,
    pub total_amount_due: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaxBreakdown {
    Vat(VatBreakdown),
    NonVat(NonVatBreakdown),
}

impl TaxBreakdown {
    pub fn total_amount_due(&self) -> f64 {
        match self {
            TaxBreakdown::Vat(v) => v.total_amount_due,
            TaxBreakdown::NonVat(n) => n.total_amount_due,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceData {
    pub invoice_number: String,
    pub issued_at: NaiveDateTime,
    #[serde(flatten)]
    pub details: BookingDetails,
    pub line_items: Vec<LineItem>,
    pub tax: TaxBreakdown,
}

/// One entry of the stored invoice registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub uri: String,
    pub file_name: String,
    pub download_date: String,
    pub folder_uri: String,
}
