//! CSV import glue: load a directory of extracted IPEDS CSV files into
//! the warehouse, one table per file.
//!
//! NCES distributes the files with uppercase names (HD2020.csv); the table
//! name is the lowercased file stem, which is the stored-case convention
//! the whole registry matches against. Imports are recorded in a log table
//! so a rerun over the same directory only picks up new files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use duckdb::{params, Connection};
use glob::glob;
use serde::Serialize;
use tracing::{info, warn};

/// Bookkeeping table recording every imported file.
pub const IMPORT_LOG_TABLE: &str = "ipeds_imports";

#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub table: String,
    pub file: PathBuf,
    pub rows: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub imported: Vec<ImportOutcome>,
    /// File names skipped because an earlier run already imported them.
    pub skipped: Vec<String>,
}

fn ensure_import_log(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (
            file_name VARCHAR NOT NULL,
            table_name VARCHAR NOT NULL,
            row_count BIGINT NOT NULL,
            imported_at TIMESTAMP NOT NULL DEFAULT now()
        );",
        IMPORT_LOG_TABLE
    ))
    .context("creating import log table")?;
    Ok(())
}

fn already_imported(conn: &Connection, file_name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM \"{}\" WHERE file_name = ?",
            IMPORT_LOG_TABLE
        ),
        params![file_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Table name for a CSV file: lowercased stem, dashes normalized so the
/// name is a plain SQL identifier.
fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase().replace('-', "_"))
}

/// Import one CSV file as its own table, replacing any previous load of
/// the same table.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportOutcome> {
    let table = table_name_for(path)
        .with_context(|| format!("no usable file stem in {:?}", path))?;
    let file_path = path.to_string_lossy().replace('\'', "''");

    conn.execute_batch(&format!(
        "CREATE OR REPLACE TABLE \"{}\" AS SELECT * FROM read_csv_auto('{}');",
        table, file_path
    ))
    .with_context(|| format!("importing {:?}", path))?;

    let rows: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM \"{}\"", table),
        [],
        |row| row.get(0),
    )?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    conn.execute(
        &format!(
            "INSERT INTO \"{}\" (file_name, table_name, row_count) VALUES (?, ?, ?)",
            IMPORT_LOG_TABLE
        ),
        params![file_name, table, rows],
    )?;

    info!(table = %table, rows, "imported");
    Ok(ImportOutcome {
        table,
        file: path.to_path_buf(),
        rows,
    })
}

/// Import every `.csv` under `dir` (recursively) that has not been
/// imported before.
pub fn import_dir(conn: &Connection, dir: &Path) -> Result<ImportSummary> {
    ensure_import_log(conn)?;

    // 1) Gather CSV files, either extension case, in a stable order.
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in ["**/*.csv", "**/*.CSV"] {
        let full = format!("{}/{}", dir.display(), pattern);
        for entry in glob(&full).with_context(|| format!("globbing {}", full))? {
            match entry {
                Ok(path) => files.push(path),
                Err(e) => warn!(error = %e, "unreadable path while scanning csv dir"),
            }
        }
    }
    files.sort();
    files.dedup();

    // 2) Import each new file; previously seen ones are skipped.
    let mut summary = ImportSummary::default();
    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if already_imported(conn, &file_name)? {
            info!(file = %file_name, "already imported, skipping");
            summary.skipped.push(file_name);
            continue;
        }
        summary.imported.push(import_csv(conn, &path)?);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, DuckCatalog};
    use std::fs;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn imports_lowercase_stems_and_counts_rows() -> Result<()> {
        let dir = tempdir()?;
        write_csv(
            dir.path(),
            "HD2020.csv",
            "UNITID,INSTNM\n100654,Alabama A & M University\n100663,UAB\n",
        );
        write_csv(dir.path(), "SAL2020_IS.csv", "UNITID,ARANK\n100654,1\n");

        let conn = Connection::open_in_memory()?;
        let summary = import_dir(&conn, dir.path())?;

        assert_eq!(summary.imported.len(), 2);
        assert!(summary.skipped.is_empty());
        let by_table: Vec<(&str, i64)> = summary
            .imported
            .iter()
            .map(|o| (o.table.as_str(), o.rows))
            .collect();
        assert!(by_table.contains(&("hd2020", 2)));
        assert!(by_table.contains(&("sal2020_is", 1)));

        let names = DuckCatalog::new(&conn).table_names().unwrap();
        assert!(names.contains(&"hd2020".to_string()));
        assert!(names.contains(&"sal2020_is".to_string()));
        Ok(())
    }

    #[test]
    fn rerun_skips_already_imported_files() -> Result<()> {
        let dir = tempdir()?;
        write_csv(dir.path(), "EF2019A.csv", "UNITID,EFTOTLT\n100654,5000\n");

        let conn = Connection::open_in_memory()?;
        let first = import_dir(&conn, dir.path())?;
        assert_eq!(first.imported.len(), 1);

        let second = import_dir(&conn, dir.path())?;
        assert!(second.imported.is_empty());
        assert_eq!(second.skipped, vec!["EF2019A.csv".to_string()]);
        Ok(())
    }

    #[test]
    fn new_files_are_picked_up_by_later_runs() -> Result<()> {
        let dir = tempdir()?;
        write_csv(dir.path(), "GR2019.csv", "UNITID,GRTOTLT\n100654,300\n");

        let conn = Connection::open_in_memory()?;
        import_dir(&conn, dir.path())?;

        // A new survey year is published.
        write_csv(dir.path(), "GR2020.csv", "UNITID,GRTOTLT\n100654,320\n");
        let rerun = import_dir(&conn, dir.path())?;
        assert_eq!(rerun.imported.len(), 1);
        assert_eq!(rerun.imported[0].table, "gr2020");
        assert_eq!(rerun.skipped.len(), 1);
        Ok(())
    }
}
