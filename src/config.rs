use std::env;

use crate::services::invoice::DEFAULT_VAT_RATE;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub migrations_dir: String,
    /// App-private invoice folder, used until the user picks one.
    pub invoice_dir: String,
    /// User-chosen invoice folders must live under this directory.
    pub storage_root: String,
    pub directions_url: String,
    pub vat_rate: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "spabook.db".to_string()),
            migrations_dir: env::var("MIGRATIONS_DIR")
                .unwrap_or_else(|_| crate::db::DEFAULT_MIGRATIONS_DIR.to_string()),
            invoice_dir: env::var("INVOICE_DIR").unwrap_or_else(|_| "invoices".to_string()),
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".to_string()),
            directions_url: env::var("DIRECTIONS_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".to_string()),
            vat_rate: env::var("VAT_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|rate: &f64| (0.0..1.0).contains(rate))
                .unwrap_or(DEFAULT_VAT_RATE),
        }
    }
}
