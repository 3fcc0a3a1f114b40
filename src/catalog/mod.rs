//! The storage-engine seam. The rest of the crate only ever asks the
//! catalog two things: which tables exist, and what columns a table has.

mod duck;

pub use duck::DuckCatalog;

use serde::Serialize;

use crate::error::Result;

/// One column of a stored table, with the type the engine declares for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub ty: String,
}

impl Column {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }
}

/// Live table/column introspection.
///
/// Implementations must report names exactly as stored; callers depend on
/// case-exact matching against them. The catalog may be mutated by an
/// external import process between calls, so nothing derived from these
/// answers should be cached.
pub trait Catalog {
    /// All table names currently present, exact stored case.
    fn table_names(&self) -> Result<Vec<String>>;

    /// Columns of `table` in declared order.
    /// Fails with [`crate::Error::TableNotFound`] if the table is gone.
    fn columns(&self, table: &str) -> Result<Vec<Column>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Catalog, Column};
    use crate::error::{Error, Result};

    /// Fixed in-memory catalog for unit tests that don't need a database.
    pub struct StaticCatalog {
        pub tables: Vec<(String, Vec<Column>)>,
    }

    impl StaticCatalog {
        pub fn new(tables: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
            Self {
                tables: tables
                    .into_iter()
                    .map(|(name, cols)| {
                        (
                            name.to_string(),
                            cols.into_iter().map(|(n, t)| Column::new(n, t)).collect(),
                        )
                    })
                    .collect(),
            }
        }
    }

    impl Catalog for StaticCatalog {
        fn table_names(&self) -> Result<Vec<String>> {
            Ok(self.tables.iter().map(|(n, _)| n.clone()).collect())
        }

        fn columns(&self, table: &str) -> Result<Vec<Column>> {
            self.tables
                .iter()
                .find(|(n, _)| n == table)
                .map(|(_, cols)| cols.clone())
                .ok_or_else(|| Error::TableNotFound(table.to_string()))
        }
    }
}
