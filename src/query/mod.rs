//! The query façade: one entry point tying the registry, the resolver and
//! the reconciler to a live DuckDB connection.
//!
//! Every call re-resolves against the catalog. New survey years are
//! published incrementally through the year and imported by an external
//! process, so a cached answer can silently miss the newest table.

use std::path::Path;

use duckdb::Connection;
use tracing::info;

use crate::catalog::DuckCatalog;
use crate::consolidate::{reconcile, ConsolidatedRelation};
use crate::error::Result;
use crate::registry::Registry;
use crate::resolve::{resolve_survey, TableHandle};

/// An optional year window. Bounded ranges exclude tables whose name
/// carries no year; the unbounded range includes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearRange {
    pub min: Option<u16>,
    pub max: Option<u16>,
}

impl YearRange {
    /// No bounds: every table, dated or not.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn since(min: u16) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn through(max: u16) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: u16, max: u16) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    fn admits(&self, year: Option<u16>) -> bool {
        match year {
            None => !self.is_bounded(),
            Some(y) => self.min.map_or(true, |lo| y >= lo) && self.max.map_or(true, |hi| y <= hi),
        }
    }
}

/// Handle to an IPEDS DuckDB warehouse.
pub struct IpedsDb {
    conn: Connection,
    registry: Registry,
}

impl IpedsDb {
    /// Open (or create) the database file with the built-in registry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_registry(
            Connection::open(path)?,
            Registry::builtin(),
        ))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::with_registry(
            Connection::open_in_memory()?,
            Registry::builtin(),
        ))
    }

    /// Wrap an existing connection with an explicit registry.
    pub fn with_registry(conn: Connection, registry: Registry) -> Self {
        Self { conn, registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// The survey's tables currently in the catalog, filtered to `years`.
    pub fn tables(&self, survey_id: &str, years: YearRange) -> Result<Vec<TableHandle>> {
        let def = self.registry.get(survey_id)?;
        let handles = resolve_survey(&DuckCatalog::new(&self.conn), def)?;
        Ok(handles
            .into_iter()
            .filter(|h| years.admits(h.year))
            .collect())
    }

    /// The survey's tables unioned into one relation, NULL-padded across
    /// schema drift, with a synthesized `YEAR` column.
    pub fn consolidated(&self, survey_id: &str, years: YearRange) -> Result<ConsolidatedRelation> {
        let handles = self.tables(survey_id, years)?;
        Ok(reconcile(&DuckCatalog::new(&self.conn), &handles))
    }

    /// Materialize a relation as a view. Returns `false` (and creates
    /// nothing) when the relation is empty.
    pub fn materialize(&self, rel: &ConsolidatedRelation, view_name: &str) -> Result<bool> {
        let Some(sql) = &rel.sql else {
            return Ok(false);
        };
        let quoted = format!("\"{}\"", view_name.replace('"', "\"\""));
        self.conn
            .execute_batch(&format!("CREATE OR REPLACE VIEW {} AS {}", quoted, sql))?;
        info!(view = view_name, sources = rel.sources.len(), "materialized view");
        Ok(true)
    }

    /// Total rows across the relation; 0 when it is empty.
    pub fn row_count(&self, rel: &ConsolidatedRelation) -> Result<i64> {
        let Some(sql) = &rel.sql else {
            return Ok(0);
        };
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}
