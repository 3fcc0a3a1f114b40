//! Survey registry: the canonical mapping from a survey id to its table
//! name pattern, documentation, and format-change history.
//!
//! The registry is built once ([`Registry::builtin`]) and passed explicitly
//! to whatever needs it. Patterns are matched against table names exactly
//! as stored (lowercase in this warehouse); nothing here ever case-folds.

mod surveys;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};

/// A span of survey years with one table naming format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Era {
    /// Years strictly before the given year.
    Before(u16),
    /// The given year and everything after it.
    From(u16),
    /// An inclusive year range.
    Between(u16, u16),
}

impl Era {
    pub fn contains(&self, year: u16) -> bool {
        match *self {
            Era::Before(y) => year < y,
            Era::From(y) => year >= y,
            Era::Between(a, b) => (a..=b).contains(&year),
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Era::Before(y) => write!(f, "pre-{}", y),
            Era::From(y) => write!(f, "{}+", y),
            Era::Between(a, b) => write!(f, "{}-{}", a, b),
        }
    }
}

/// How a survey family's tables are named in the catalog.
///
/// Most families use one pattern for their whole run. A few moved between
/// source files over the years (admissions lived inside the IC files until
/// 2014), which `ByEra` models directly: each era carries its own pattern,
/// and a matched table only counts when its extracted year falls inside
/// that era.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TablePattern {
    Uniform(String),
    ByEra(Vec<(Era, String)>),
}

impl TablePattern {
    pub fn uniform(pattern: &str) -> Self {
        TablePattern::Uniform(pattern.to_string())
    }

    /// All (era, pattern) pairs; a uniform pattern has no era restriction.
    pub fn parts(&self) -> Vec<(Option<Era>, &str)> {
        match self {
            TablePattern::Uniform(p) => vec![(None, p.as_str())],
            TablePattern::ByEra(eras) => {
                eras.iter().map(|(era, p)| (Some(*era), p.as_str())).collect()
            }
        }
    }
}

impl fmt::Display for TablePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TablePattern::Uniform(p) => f.write_str(p),
            TablePattern::ByEra(eras) => {
                let mut first = true;
                for (era, p) in eras {
                    if !first {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{} ({})", p, era)?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

/// One documented schema break within a survey family.
#[derive(Debug, Clone, Serialize)]
pub struct FormatChange {
    pub era: Era,
    pub description: String,
}

impl FormatChange {
    pub fn new(era: Era, description: &str) -> Self {
        Self {
            era,
            description: description.to_string(),
        }
    }
}

/// One logical IPEDS survey family.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyDefinition {
    /// Unique slug, e.g. `"salaries"`.
    pub id: String,
    /// Case-sensitive pattern over stored (lowercase) table names.
    pub pattern: TablePattern,
    pub description: String,
    /// Template of the per-year table name, e.g. `"sal{yyyy}_is"`.
    pub table_format: String,
    /// Schema breaks across the family's run, oldest first.
    pub format_changes: Vec<FormatChange>,
}

/// Immutable collection of survey definitions, looked up by id and
/// iterated in insertion order.
#[derive(Debug, Clone)]
pub struct Registry {
    defs: Vec<SurveyDefinition>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry from the given definitions. A duplicate id keeps
    /// the first definition and logs the collision.
    pub fn new(defs: Vec<SurveyDefinition>) -> Self {
        let mut kept = Vec::with_capacity(defs.len());
        let mut index = HashMap::with_capacity(defs.len());
        for def in defs {
            if index.contains_key(&def.id) {
                warn!(id = %def.id, "duplicate survey id, keeping first definition");
                continue;
            }
            index.insert(def.id.clone(), kept.len());
            kept.push(def);
        }
        Self { defs: kept, index }
    }

    /// The built-in IPEDS survey families.
    pub fn builtin() -> Self {
        Self::new(surveys::builtin_definitions())
    }

    /// Look up a survey definition by id.
    pub fn get(&self, id: &str) -> Result<&SurveyDefinition> {
        self.index
            .get(id)
            .map(|&i| &self.defs[i])
            .ok_or_else(|| Error::UnknownSurvey(id.to_string()))
    }

    /// The table pattern for a survey id.
    pub fn pattern(&self, id: &str) -> Result<&TablePattern> {
        self.get(id).map(|def| &def.pattern)
    }

    /// All definitions, in insertion order.
    pub fn defs(&self) -> impl Iterator<Item = &SurveyDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_deterministic() {
        let reg = Registry::builtin();
        let first = format!("{}", reg.pattern("salaries").unwrap());
        let second = format!("{}", reg.pattern("salaries").unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_survey_is_an_error() {
        let reg = Registry::builtin();
        match reg.get("unknown_survey") {
            Err(Error::UnknownSurvey(id)) => assert_eq!(id, "unknown_survey"),
            other => panic!("expected UnknownSurvey, got {:?}", other),
        }
    }

    #[test]
    fn iteration_order_is_stable() {
        let a: Vec<String> = Registry::builtin().defs().map(|d| d.id.clone()).collect();
        let b: Vec<String> = Registry::builtin().defs().map(|d| d.id.clone()).collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn builtin_patterns_all_compile() {
        for def in Registry::builtin().defs() {
            for (_, pattern) in def.pattern.parts() {
                regex::Regex::new(pattern)
                    .unwrap_or_else(|e| panic!("bad pattern for `{}`: {}", def.id, e));
            }
        }
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mk = |id: &str, desc: &str| SurveyDefinition {
            id: id.to_string(),
            pattern: TablePattern::uniform("^x\\d{4}$"),
            description: desc.to_string(),
            table_format: "x{yyyy}".to_string(),
            format_changes: vec![],
        };
        let reg = Registry::new(vec![mk("a", "first"), mk("a", "second")]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("a").unwrap().description, "first");
    }

    #[test]
    fn era_bounds() {
        assert!(Era::Before(2014).contains(2013));
        assert!(!Era::Before(2014).contains(2014));
        assert!(Era::From(2014).contains(2014));
        assert!(!Era::From(2014).contains(2013));
        assert!(Era::Between(2008, 2011).contains(2008));
        assert!(Era::Between(2008, 2011).contains(2011));
        assert!(!Era::Between(2008, 2011).contains(2012));
    }
}
