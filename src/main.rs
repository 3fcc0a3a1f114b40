use anyhow::Result;
use ipedsduck::{ingest, IpedsDb, YearRange};
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ipedsduck=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let db_path = env::args()
        .nth(1)
        .or_else(|| env::var("IPEDS_DB").ok())
        .unwrap_or_else(|| "ipeds.duckdb".to_string());
    let csv_dir = env::var("IPEDS_CSV_DIR").ok().map(PathBuf::from);

    // ─── 3) open the warehouse ───────────────────────────────────────
    let db = IpedsDb::open(&db_path)?;
    info!(db = %db_path, surveys = db.registry().len(), "opened warehouse");

    // ─── 4) optional CSV ingest ──────────────────────────────────────
    if let Some(dir) = &csv_dir {
        let summary = ingest::import_dir(db.conn(), dir)?;
        info!(
            imported = summary.imported.len(),
            skipped = summary.skipped.len(),
            "ingest complete"
        );
    }

    // ─── 5) refresh consolidated views, one per survey ───────────────
    for def in db.registry().defs() {
        let rel = db.consolidated(&def.id, YearRange::any())?;
        for (table, reason) in &rel.skipped {
            warn!(survey = %def.id, table = %table, reason = %reason, "table skipped");
        }
        for drift in &rel.drift {
            warn!(survey = %def.id, column = %drift.column, occurrences = drift.types.len(),
                  "column type drifts across years");
        }
        if rel.is_empty() {
            info!(survey = %def.id, "no tables yet");
            continue;
        }

        let view = format!("{}_all", def.id);
        db.materialize(&rel, &view)?;
        info!(
            survey = %def.id,
            view = %view,
            tables = rel.sources.len(),
            columns = rel.columns.len(),
            rows = db.row_count(&rel)?,
            "consolidated"
        );
    }

    info!("all done");
    Ok(())
}
