use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{InvoiceData, InvoiceRecord};
use crate::services::invoice::invoice_file_name;

pub const INVOICE_REGISTRY_KEY: &str = "invoice_registry";
pub const INVOICE_FOLDER_KEY: &str = "invoice_folder_uri";

/// Invoice number → stored file.
pub type InvoiceRegistry = BTreeMap<String, InvoiceRecord>;

pub fn load_registry(conn: &Connection) -> anyhow::Result<InvoiceRegistry> {
    let Some(raw) = queries::get_kv(conn, INVOICE_REGISTRY_KEY)? else {
        return Ok(InvoiceRegistry::new());
    };

    match serde_json::from_str(&raw) {
        Ok(registry) => Ok(registry),
        Err(e) => {
            tracing::warn!(error = %e, "invoice registry is unreadable, starting empty");
            Ok(InvoiceRegistry::new())
        }
    }
}

fn save_registry(conn: &Connection, registry: &InvoiceRegistry) -> anyhow::Result<()> {
    let raw = serde_json::to_string(registry)?;
    queries::set_kv(conn, INVOICE_REGISTRY_KEY, &raw)
}

pub fn get_folder(conn: &Connection) -> anyhow::Result<Option<String>> {
    queries::get_kv(conn, INVOICE_FOLDER_KEY)
}

/// Maps a user-chosen folder onto `root`. Only plain relative paths are
/// accepted, so a client can never point the service outside `root`.
pub fn resolve_folder(root: &Path, folder: &str) -> anyhow::Result<PathBuf> {
    let relative = Path::new(folder);
    let plain = relative.components().all(|c| matches!(c, Component::Normal(_)));
    anyhow::ensure!(
        plain && relative.components().next().is_some(),
        "invoice folder must be a relative path without '..' ({folder})"
    );
    Ok(root.join(relative))
}

/// Remembers a user-chosen folder under `root` and returns where it lives.
/// The folder is created if needed so a bad path fails here instead of on
/// the next download.
pub fn set_folder(conn: &Connection, root: &Path, folder: &str) -> anyhow::Result<PathBuf> {
    let resolved = resolve_folder(root, folder)?;
    fs::create_dir_all(&resolved)
        .with_context(|| format!("failed to prepare invoice folder {}", resolved.display()))?;
    let stored = resolved.display().to_string();
    queries::set_kv(conn, INVOICE_FOLDER_KEY, &stored)?;
    tracing::info!(folder = %stored, "invoice folder saved");
    Ok(resolved)
}

pub fn clear_folder(conn: &Connection) -> anyhow::Result<bool> {
    queries::delete_kv(conn, INVOICE_FOLDER_KEY)
}

/// The saved folder when one was chosen, otherwise the app-private default.
pub fn storage_folder(conn: &Connection, default_dir: &str) -> anyhow::Result<PathBuf> {
    let folder = get_folder(conn)?.unwrap_or_else(|| default_dir.to_string());
    Ok(PathBuf::from(folder))
}

/// Writes `pdf` into `folder` and records it in the registry.
pub fn save_invoice(
    conn: &Connection,
    folder: &Path,
    invoice: &InvoiceData,
    pdf: &[u8],
    now: DateTime<Utc>,
) -> anyhow::Result<InvoiceRecord> {
    fs::create_dir_all(folder)
        .with_context(|| format!("failed to create invoice folder {}", folder.display()))?;

    let file_name = invoice_file_name(&invoice.invoice_number, now);
    let path = folder.join(&file_name);
    fs::write(&path, pdf).with_context(|| format!("failed to write {}", path.display()))?;

    let absolute = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    let record = InvoiceRecord {
        uri: format!("file://{}", absolute.display()),
        file_name,
        download_date: now.to_rfc3339(),
        folder_uri: folder.display().to_string(),
    };

    let mut registry = load_registry(conn)?;
    registry.insert(invoice.invoice_number.clone(), record.clone());
    save_registry(conn, &registry)?;

    tracing::info!(
        invoice_number = %invoice.invoice_number,
        path = %path.display(),
        bytes = pdf.len(),
        "invoice saved"
    );
    Ok(record)
}

pub fn get_invoice(
    conn: &Connection,
    invoice_number: &str,
) -> anyhow::Result<Option<InvoiceRecord>> {
    Ok(load_registry(conn)?.remove(invoice_number))
}

pub fn record_path(record: &InvoiceRecord) -> PathBuf {
    Path::new(&record.folder_uri).join(&record.file_name)
}

/// Drops the registry entry and deletes its file if it is still there.
pub fn remove_invoice(
    conn: &Connection,
    invoice_number: &str,
) -> anyhow::Result<Option<InvoiceRecord>> {
    let mut registry = load_registry(conn)?;
    let Some(record) = registry.remove(invoice_number) else {
        return Ok(None);
    };
    save_registry(conn, &registry)?;

    let path = record_path(&record);
    match fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to delete invoice file")
        }
    }
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::tests::{sample_details, sample_spa, setup_db};
    use crate::models::BookingStatus;
    use crate::services::invoice::{build_invoice, DEFAULT_VAT_RATE};
    use chrono::TimeZone;

    fn invoice() -> InvoiceData {
        let spa = sample_spa("spa-1", true);
        let details = sample_details(
            "bk-1",
            &spa,
            "2026-10-20",
            "10:00",
            "11:00",
            BookingStatus::Completed,
        );
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        build_invoice(&details, now, DEFAULT_VAT_RATE)
    }

    #[test]
    fn test_save_and_lookup() {
        let conn = setup_db();
        let dir = tempfile::tempdir().unwrap();
        let inv = invoice();
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();

        let record = save_invoice(&conn, dir.path(), &inv, b"%PDF-1.3 test", now).unwrap();
        assert_eq!(
            record.file_name,
            format!("Invoice_{}_{}.pdf", inv.invoice_number, now.timestamp_millis())
        );
        assert!(record.uri.starts_with("file://"));
        assert!(record_path(&record).exists());

        let loaded = get_invoice(&conn, &inv.invoice_number).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_registry_document_uses_camel_case() {
        let conn = setup_db();
        let dir = tempfile::tempdir().unwrap();
        let inv = invoice();
        save_invoice(&conn, dir.path(), &inv, b"%PDF", Utc::now()).unwrap();

        let raw = queries::get_kv(&conn, INVOICE_REGISTRY_KEY).unwrap().unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &doc[&inv.invoice_number];
        assert!(entry["fileName"].is_string());
        assert!(entry["downloadDate"].is_string());
        assert!(entry["folderUri"].is_string());
        assert!(entry["uri"].is_string());
    }

    #[test]
    fn test_corrupt_registry_reads_as_empty() {
        let conn = setup_db();
        queries::set_kv(&conn, INVOICE_REGISTRY_KEY, "{not json").unwrap();
        assert!(load_registry(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_remove_deletes_file() {
        let conn = setup_db();
        let dir = tempfile::tempdir().unwrap();
        let inv = invoice();
        let record = save_invoice(&conn, dir.path(), &inv, b"%PDF", Utc::now()).unwrap();

        let removed = remove_invoice(&conn, &inv.invoice_number).unwrap();
        assert_eq!(removed, Some(record.clone()));
        assert!(!record_path(&record).exists());
        assert!(load_registry(&conn).unwrap().is_empty());
        assert_eq!(remove_invoice(&conn, &inv.invoice_number).unwrap(), None);
    }

    #[test]
    fn test_saved_folder_overrides_default() {
        let conn = setup_db();
        let dir = tempfile::tempdir().unwrap();
        let chosen = dir.path().join("Downloads");

        assert_eq!(storage_folder(&conn, "invoices").unwrap(), PathBuf::from("invoices"));
        let saved = set_folder(&conn, dir.path(), "Downloads").unwrap();
        assert_eq!(saved, chosen);
        assert!(chosen.is_dir());
        assert_eq!(storage_folder(&conn, "invoices").unwrap(), chosen);

        assert!(clear_folder(&conn).unwrap());
        assert_eq!(get_folder(&conn).unwrap(), None);
    }

    #[test]
    fn test_folder_outside_root_rejected() {
        let conn = setup_db();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("storage");

        for folder in ["/etc/spabook", "../outside", "Documents/../../outside", "./", ""] {
            let err = set_folder(&conn, &root, folder).unwrap_err();
            assert!(err.to_string().contains("relative path"), "{folder}: {err}");
        }
        assert!(!dir.path().join("outside").exists());
        assert_eq!(get_folder(&conn).unwrap(), None);
    }

    #[test]
    fn test_resolve_nested_folder() {
        let root = Path::new("/srv/spabook");
        assert_eq!(
            resolve_folder(root, "Documents/Spa").unwrap(),
            PathBuf::from("/srv/spabook/Documents/Spa")
        );
    }
}
