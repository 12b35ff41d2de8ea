use anyhow::Context;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Applies every `*.sql` file in `dir` that is not yet recorded in
/// `_migrations`, in file name order.
pub fn run_migrations(conn: &Connection, dir: &Path) -> anyhow::Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "migrations directory not found, skipping");
        return Ok(0);
    }

    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read migrations directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "sql"))
        .collect();

    entries.sort_by_key(|e| e.file_name());

    let mut applied = 0;
    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();

        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [&name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        let sql = fs::read_to_string(entry.path())
            .with_context(|| format!("failed to read migration file: {name}"))?;

        let tx = conn
            .unchecked_transaction()
            .context("failed to start migration transaction")?;
        tx.execute_batch(&sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;
        tx.execute("INSERT INTO _migrations (name) VALUES (?1)", [&name])
            .with_context(|| format!("failed to record migration: {name}"))?;
        tx.commit()
            .with_context(|| format!("failed to commit migration: {name}"))?;

        tracing::info!(migration = %name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
