// src/catalog/duck.rs

use duckdb::Connection;
use tracing::debug;

use super::{Catalog, Column};
use crate::error::{Error, Result};

/// [`Catalog`] over a live DuckDB connection, answered from
/// `information_schema`. Every call goes back to the engine; the catalog
/// grows as new survey years are imported and stale answers are worse
/// than slow ones here.
pub struct DuckCatalog<'a> {
    conn: &'a Connection,
}

impl<'a> DuckCatalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl Catalog for DuckCatalog<'_> {
    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = names.len(), "listed catalog tables");
        Ok(names)
    }

    fn columns(&self, table: &str) -> Result<Vec<Column>> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = 'main' AND table_name = ? \
             ORDER BY ordinal_position",
        )?;
        let cols = stmt
            .query_map([table], |row| {
                Ok(Column {
                    name: row.get(0)?,
                    ty: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Every real table has at least one column, so an empty answer
        // means the table is gone.
        if cols.is_empty() {
            return Err(Error::TableNotFound(table.to_string()));
        }
        Ok(cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_db() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn lists_tables_in_stored_case() {
        let conn = mem_db();
        conn.execute_batch(
            "CREATE TABLE sal2015_is (unitid INTEGER); \
             CREATE TABLE hd2020 (unitid INTEGER);",
        )
        .unwrap();

        let names = DuckCatalog::new(&conn).table_names().unwrap();
        assert_eq!(names, vec!["hd2020".to_string(), "sal2015_is".to_string()]);
    }

    #[test]
    fn columns_in_declared_order_with_types() {
        let conn = mem_db();
        conn.execute_batch("CREATE TABLE hd2020 (UNITID INTEGER, INSTNM VARCHAR);")
            .unwrap();

        let cols = DuckCatalog::new(&conn).columns("hd2020").unwrap();
        assert_eq!(
            cols,
            vec![
                Column::new("UNITID", "INTEGER"),
                Column::new("INSTNM", "VARCHAR"),
            ]
        );
    }

    #[test]
    fn missing_table_is_table_not_found() {
        let conn = mem_db();
        match DuckCatalog::new(&conn).columns("gone2015") {
            Err(Error::TableNotFound(name)) => assert_eq!(name, "gone2015"),
            other => panic!("expected TableNotFound, got {:?}", other),
        }
    }
}
