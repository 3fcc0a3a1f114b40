pub mod catalog;
pub mod consolidate;
pub mod error;
pub mod ingest;
pub mod query;
pub mod registry;
pub mod resolve;

pub use catalog::{Catalog, Column, DuckCatalog};
pub use consolidate::{reconcile, ConsolidatedRelation, TypeDrift};
pub use error::{Error, Result};
pub use query::{IpedsDb, YearRange};
pub use registry::{Era, FormatChange, Registry, SurveyDefinition, TablePattern};
pub use resolve::{resolve, resolve_survey, year_from_name, TableHandle};
