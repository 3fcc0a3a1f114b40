//! Schema reconciliation: stitch a survey family's per-year tables into
//! one relation even though the column set drifts across years.
//!
//! The union schema keeps first-seen column order. Each table is projected
//! onto it, with a typed NULL standing in for every column the table does
//! not have, plus a synthesized `YEAR` column, and the projections are
//! concatenated with UNION ALL. No rows are filtered or deduplicated here;
//! the consolidated row count is exactly the sum of the inputs.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::catalog::{Catalog, Column};
use crate::resolve::TableHandle;

/// Name of the synthesized per-row survey-year column.
pub const YEAR_COLUMN: &str = "YEAR";

/// One column of the union schema, carrying the declared type of the
/// first table it was seen in. That type also types the NULL padding for
/// tables that lack the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionColumn {
    pub name: String,
    pub ty: String,
}

/// A same-named column declared with different types in different years.
/// Matched by name anyway; the engine's UNION ALL coercion is the only
/// unification that happens, and the drift is surfaced here instead of
/// being silently papered over.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDrift {
    pub column: String,
    /// Every (table, declared type) occurrence of the column.
    pub types: Vec<(String, String)>,
}

/// What to select for one output column of one table's projection.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnExpr {
    /// The table's own column, verbatim.
    Source(String),
    /// Typed NULL padding for a column the table does not have.
    Null { ty: String },
    /// The synthesized survey year.
    Year(Option<u16>),
}

impl ColumnExpr {
    fn render(&self) -> String {
        match self {
            ColumnExpr::Source(name) => quote_ident(name),
            // Declared types come from the engine's own catalog, never
            // from callers.
            ColumnExpr::Null { ty } => format!("CAST(NULL AS {})", ty),
            ColumnExpr::Year(Some(year)) => format!("CAST({} AS INTEGER)", year),
            ColumnExpr::Year(None) => "CAST(NULL AS INTEGER)".to_string(),
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn render_select(table: &str, projection: &[(String, ColumnExpr)]) -> String {
    let cols = projection
        .iter()
        .map(|(alias, expr)| format!("{} AS {}", expr.render(), quote_ident(alias)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {} FROM {}", cols, quote_ident(table))
}

/// A survey family unioned across years: the union-schema column list, the
/// contributing tables, and the SQL that produces the rows. Derived on
/// demand from the live catalog and never cached.
#[derive(Debug, Clone)]
pub struct ConsolidatedRelation {
    /// Output column names in order, `YEAR` last when synthesized.
    pub columns: Vec<String>,
    /// Tables that contributed, ascending by year.
    pub sources: Vec<TableHandle>,
    /// The UNION ALL select; `None` when nothing was usable.
    pub sql: Option<String>,
    /// Tables that were listed but could not be introspected, with the
    /// reason each was skipped.
    pub skipped: Vec<(String, String)>,
    /// Cross-year declared-type drift, surfaced for the caller.
    pub drift: Vec<TypeDrift>,
}

impl ConsolidatedRelation {
    pub fn is_empty(&self) -> bool {
        self.sql.is_none()
    }
}

/// Build a [`ConsolidatedRelation`] from a family of table handles.
///
/// A handle whose metadata cannot be read (dropped mid-operation, broken
/// permissions) is skipped with a warning rather than poisoning the whole
/// multi-year view; the relation is built from whatever remains. All
/// handles failing yields an empty relation, not an error.
pub fn reconcile<C: Catalog>(catalog: &C, handles: &[TableHandle]) -> ConsolidatedRelation {
    // 1) One metadata call per table; failures degrade to skips.
    let mut introspected: Vec<(TableHandle, Vec<Column>)> = Vec::new();
    let mut skipped: Vec<(String, String)> = Vec::new();
    for handle in handles {
        match catalog.columns(&handle.name) {
            Ok(cols) => introspected.push((handle.clone(), cols)),
            Err(e) => {
                warn!(table = %handle.name, error = %e, "skipping table during consolidation");
                skipped.push((handle.name.clone(), e.to_string()));
            }
        }
    }

    // 2) Union schema in first-seen order, tracking every declared type
    //    per column name for drift detection.
    let mut union: Vec<UnionColumn> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut occurrences: HashMap<String, Vec<(String, String)>> = HashMap::new();
    for (handle, cols) in &introspected {
        for col in cols {
            occurrences
                .entry(col.name.clone())
                .or_default()
                .push((handle.name.clone(), col.ty.clone()));
            if seen_names.insert(col.name.clone()) {
                union.push(UnionColumn {
                    name: col.name.clone(),
                    ty: col.ty.clone(),
                });
            }
        }
    }

    let mut drift: Vec<TypeDrift> = Vec::new();
    for uc in &union {
        let seen = &occurrences[&uc.name];
        let distinct: HashSet<&str> = seen.iter().map(|(_, ty)| ty.as_str()).collect();
        if distinct.len() > 1 {
            warn!(column = %uc.name, types = ?seen, "declared type drifts across years");
            drift.push(TypeDrift {
                column: uc.name.clone(),
                types: seen.clone(),
            });
        }
    }

    // A source table already named a column YEAR: it wins, and no second
    // year column is synthesized.
    let synthesize_year = !seen_names.contains(YEAR_COLUMN);
    if !synthesize_year {
        warn!("a source table already has a YEAR column; not synthesizing one");
    }

    // 3) Project every table onto the union schema and concatenate.
    let mut selects: Vec<String> = Vec::new();
    for (handle, cols) in &introspected {
        let present: HashSet<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        let mut projection: Vec<(String, ColumnExpr)> = union
            .iter()
            .map(|uc| {
                let expr = if present.contains(uc.name.as_str()) {
                    ColumnExpr::Source(uc.name.clone())
                } else {
                    ColumnExpr::Null { ty: uc.ty.clone() }
                };
                (uc.name.clone(), expr)
            })
            .collect();
        if synthesize_year {
            projection.push((YEAR_COLUMN.to_string(), ColumnExpr::Year(handle.year)));
        }
        selects.push(render_select(&handle.name, &projection));
    }

    // An empty `selects` means an empty `union` too, so the column list
    // stays empty for an empty relation.
    let mut columns: Vec<String> = union.into_iter().map(|uc| uc.name).collect();
    if synthesize_year && !selects.is_empty() {
        columns.push(YEAR_COLUMN.to_string());
    }

    ConsolidatedRelation {
        columns,
        sources: introspected.into_iter().map(|(h, _)| h).collect(),
        sql: if selects.is_empty() {
            None
        } else {
            Some(selects.join("\nUNION ALL\n"))
        },
        skipped,
        drift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::StaticCatalog;

    fn handle(name: &str, year: Option<u16>) -> TableHandle {
        TableHandle {
            name: name.to_string(),
            year,
        }
    }

    #[test]
    fn union_schema_keeps_first_seen_order_and_pads_with_null() {
        let cat = StaticCatalog::new(vec![
            ("t2015", vec![("A", "INTEGER"), ("B", "VARCHAR")]),
            ("t2020", vec![("A", "INTEGER"), ("C", "DOUBLE")]),
        ]);
        let rel = reconcile(
            &cat,
            &[handle("t2015", Some(2015)), handle("t2020", Some(2020))],
        );

        assert_eq!(rel.columns, vec!["A", "B", "C", "YEAR"]);
        let sql = rel.sql.unwrap();
        let selects: Vec<&str> = sql.split("\nUNION ALL\n").collect();
        assert_eq!(selects.len(), 2);
        // t2015 has no C, t2020 has no B; both get typed NULLs.
        assert!(selects[0].contains(r#"CAST(NULL AS DOUBLE) AS "C""#));
        assert!(selects[1].contains(r#"CAST(NULL AS VARCHAR) AS "B""#));
        assert!(selects[0].contains(r#"CAST(2015 AS INTEGER) AS "YEAR""#));
        assert!(selects[1].contains(r#"CAST(2020 AS INTEGER) AS "YEAR""#));
        assert!(selects[0].contains(r#"FROM "t2015""#));
    }

    #[test]
    fn year_less_tables_get_a_null_year() {
        let cat = StaticCatalog::new(vec![("cip_lookup", vec![("CIPCODE", "VARCHAR")])]);
        let rel = reconcile(&cat, &[handle("cip_lookup", None)]);
        assert!(rel
            .sql
            .unwrap()
            .contains(r#"CAST(NULL AS INTEGER) AS "YEAR""#));
    }

    #[test]
    fn unreadable_tables_are_skipped_with_a_warning_record() {
        let cat = StaticCatalog::new(vec![("t2015", vec![("A", "INTEGER")])]);
        let rel = reconcile(
            &cat,
            &[handle("t2015", Some(2015)), handle("t2020", Some(2020))],
        );

        assert_eq!(rel.sources.len(), 1);
        assert_eq!(rel.sources[0].name, "t2015");
        assert_eq!(rel.skipped.len(), 1);
        assert_eq!(rel.skipped[0].0, "t2020");
        assert!(!rel.is_empty());
    }

    #[test]
    fn all_tables_unreadable_yields_an_empty_relation() {
        let cat = StaticCatalog::new(vec![]);
        let rel = reconcile(&cat, &[handle("t2015", Some(2015))]);
        assert!(rel.is_empty());
        assert!(rel.columns.is_empty());
        assert_eq!(rel.skipped.len(), 1);
    }

    #[test]
    fn no_handles_yields_an_empty_relation() {
        let cat = StaticCatalog::new(vec![]);
        let rel = reconcile(&cat, &[]);
        assert!(rel.is_empty());
        assert!(rel.skipped.is_empty());
    }

    #[test]
    fn type_drift_is_surfaced_not_unified() {
        let cat = StaticCatalog::new(vec![
            ("t2015", vec![("SAEQ9AT", "VARCHAR")]),
            ("t2020", vec![("SAEQ9AT", "BIGINT")]),
        ]);
        let rel = reconcile(
            &cat,
            &[handle("t2015", Some(2015)), handle("t2020", Some(2020))],
        );

        assert_eq!(rel.drift.len(), 1);
        assert_eq!(rel.drift[0].column, "SAEQ9AT");
        assert_eq!(rel.drift[0].types.len(), 2);
        // The first-seen declared type still wins the union schema, and
        // consolidation itself goes ahead.
        assert!(!rel.is_empty());
        assert_eq!(rel.columns, vec!["SAEQ9AT", "YEAR"]);
    }

    #[test]
    fn source_year_column_wins_over_the_synthesized_one() {
        let cat = StaticCatalog::new(vec![("t2015", vec![("YEAR", "INTEGER"), ("A", "VARCHAR")])]);
        let rel = reconcile(&cat, &[handle("t2015", Some(2015))]);
        assert_eq!(rel.columns, vec!["YEAR", "A"]);
        assert!(!rel.sql.unwrap().contains("CAST(2015 AS INTEGER)"));
    }
}
