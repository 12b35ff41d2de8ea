use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::invoice_store;
use crate::state::AppState;

#[derive(Serialize)]
pub struct InvoiceFolderResponse {
    folder: Option<String>,
    default_folder: String,
}

// GET /api/settings/invoice-folder
pub async fn get_invoice_folder(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InvoiceFolderResponse>, AppError> {
    let folder = {
        let db = state.db()?;
        invoice_store::get_folder(&db)?
    };
    Ok(Json(InvoiceFolderResponse {
        folder,
        default_folder: state.config.invoice_dir.clone(),
    }))
}

#[derive(Deserialize)]
pub struct InvoiceFolderRequest {
    pub folder: Option<String>,
}

// POST /api/settings/invoice-folder
pub async fn set_invoice_folder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvoiceFolderRequest>,
) -> Result<Json<InvoiceFolderResponse>, AppError> {
    let requested = req.folder.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
    let root = Path::new(&state.config.storage_root);

    let folder = {
        let db = state.db()?;
        match &requested {
            Some(f) => {
                let resolved = invoice_store::set_folder(&db, root, f)
                    .map_err(|e| AppError::BadRequest(format!("{e:#}")))?;
                Some(resolved.display().to_string())
            }
            None => {
                invoice_store::clear_folder(&db)?;
                None
            }
        }
    };

    Ok(Json(InvoiceFolderResponse {
        folder,
        default_folder: state.config.invoice_dir.clone(),
    }))
}
