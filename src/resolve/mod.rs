//! Table resolution: turn a name pattern into the concrete, ordered list
//! of tables currently in the catalog, with a survey year attached to
//! each name that carries one.
//!
//! Matching is case-exact in both directions. Table names come back from
//! the catalog exactly as stored and are matched verbatim; neither the
//! name nor the pattern is ever case-folded.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::registry::SurveyDefinition;

/// One physical table in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHandle {
    /// Exact stored name.
    pub name: String,
    /// Survey year derived from the name; `None` when the name carries no
    /// usable year (some lookup tables are not year-partitioned).
    pub year: Option<u16>,
}

/// Years this far outside the survey program's run are treated as
/// fiscal-span artifacts rather than calendar years: `f1920_f1a` is the
/// 2019-20 fiscal year, not 1920.
const YEAR_MIN: u16 = 1950;
const YEAR_MAX: u16 = 2050;

/// Derive the survey year from a table name.
///
/// The first digit run of length >= 4 is read as a 4-digit year when its
/// leading four digits are plausible (`sal2015_is` -> 2015). Otherwise the
/// leading two digits of the first run of length >= 2 are pivoted at 50:
/// values <= 50 land in the 2000s, the rest in the 1900s (`ef0910` -> 2009,
/// `sal9596_a` -> 1995). Names without at least two consecutive digits have
/// no year.
pub fn year_from_name(name: &str) -> Option<u16> {
    let mut runs: Vec<String> = Vec::new();
    let mut cur = String::new();
    for ch in name.chars() {
        if ch.is_ascii_digit() {
            cur.push(ch);
        } else if !cur.is_empty() {
            runs.push(std::mem::take(&mut cur));
        }
    }
    if !cur.is_empty() {
        runs.push(cur);
    }

    if let Some(run) = runs.iter().find(|r| r.len() >= 4) {
        let year: u16 = run[..4].parse().ok()?;
        if (YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Some(year);
        }
    }

    let run = runs.iter().find(|r| r.len() >= 2)?;
    let two: u16 = run[..2].parse().ok()?;
    Some(if two <= 50 { 2000 + two } else { 1900 + two })
}

fn sort_handles(handles: &mut [TableHandle]) {
    // Option's ordering puts year-less handles first, which is as good a
    // deterministic slot for them as any.
    handles.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.name.cmp(&b.name)));
}

/// List every table whose stored name matches `pattern`, ascending by
/// year with ties broken by name. Zero matches is a legitimate answer,
/// not an error.
pub fn resolve<C: Catalog>(catalog: &C, pattern: &str) -> Result<Vec<TableHandle>> {
    let re = Regex::new(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut handles: Vec<TableHandle> = catalog
        .table_names()?
        .into_iter()
        .filter(|name| re.is_match(name))
        .map(|name| TableHandle {
            year: year_from_name(&name),
            name,
        })
        .collect();
    sort_handles(&mut handles);
    debug!(pattern, matched = handles.len(), "resolved tables");
    Ok(handles)
}

/// Era-aware resolution for a survey definition.
///
/// Each era's pattern is resolved separately and a match only counts when
/// the table's year falls inside that era; a year-less table cannot be
/// attributed to an era and is dropped. Uniform patterns keep everything.
pub fn resolve_survey<C: Catalog>(
    catalog: &C,
    def: &SurveyDefinition,
) -> Result<Vec<TableHandle>> {
    let mut out: Vec<TableHandle> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (era, pattern) in def.pattern.parts() {
        for handle in resolve(catalog, pattern)? {
            let keep = match era {
                None => true,
                Some(era) => match handle.year {
                    Some(year) => era.contains(year),
                    None => {
                        debug!(survey = %def.id, table = %handle.name,
                               "dropping year-less table from era-split survey");
                        false
                    }
                },
            };
            if keep && seen.insert(handle.name.clone()) {
                out.push(handle);
            }
        }
    }

    sort_handles(&mut out);
    Ok(out)
}
