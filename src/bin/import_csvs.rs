use anyhow::{bail, Result};
use duckdb::Connection;
use ipedsduck::ingest;
use std::{env, path::Path};
use tracing_subscriber::{fmt, EnvFilter};

/// Bulk-import a directory of extracted IPEDS CSV files into a DuckDB
/// warehouse. Already-imported files are skipped.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let mut args = env::args().skip(1);
    let (Some(db_path), Some(csv_dir)) = (args.next(), args.next()) else {
        bail!("usage: import_csvs <db_path> <csv_dir>");
    };

    let conn = Connection::open(&db_path)?;
    let summary = ingest::import_dir(&conn, Path::new(&csv_dir))?;

    println!(
        "imported {} file(s), skipped {}",
        summary.imported.len(),
        summary.skipped.len()
    );
    for outcome in &summary.imported {
        println!(
            "  {} <- {} ({} rows)",
            outcome.table,
            outcome.file.display(),
            outcome.rows
        );
    }
    Ok(())
}
