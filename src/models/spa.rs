use serde::{Deserialize, Serialize};

use crate::models::Coordinates;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spa {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// VAT-registered spas issue VAT-inclusive invoices.
    pub vat_registered: bool,
    pub tin: Option<String>,
}

impl Spa {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Therapist {
    pub name: String,
    pub specialty: Option<String>,
    pub rating: Option<f64>,
}
