//! County selection: parameter resolution and filter predicates.
//!
//! The county parameter is one name or several joined by `;`. Tool UIs quote
//! names containing spaces (`'Box Elder';Cache`), so quote characters are
//! removed and whitespace trimmed before an exact lookup in the reference
//! table. Token order is preserved and duplicates are kept.

use serde::Serialize;
use std::fmt;
use tracing::debug;
use vc_common::{County, Error, Result};

const SEPARATOR: char = ';';

/// Boolean filter over the point source's county attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyFilter {
    pub field: String,
    pub ids: Vec<u8>,
}

impl CountyFilter {
    /// Does a row with this county value pass the filter?
    pub fn matches(&self, value: Option<i64>) -> bool {
        value.is_some_and(|v| self.ids.iter().any(|&id| i64::from(id) == v))
    }

    /// SQL-style where clause: `= N` for one id, `in (...)` for several.
    pub fn to_sql(&self) -> String {
        match self.ids.as_slice() {
            [single] => format!("{} = {}", self.field, single),
            ids => {
                let list: Vec<String> = ids.iter().map(u8::to_string).collect();
                format!("{} in ({})", self.field, list.join(","))
            }
        }
    }
}

impl fmt::Display for CountyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Resolved county parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountySelection {
    pub counties: Vec<County>,
    pub filter: CountyFilter,
}

impl CountySelection {
    /// Resolve a county parameter against the reference table.
    ///
    /// Fails on the first token that is not an exact county name.
    pub fn parse(input: &str, county_field: &str) -> Result<Self> {
        if normalize(input).is_empty() {
            return Err(Error::EmptySelection);
        }

        let tokens: Vec<&str> = if input.contains(SEPARATOR) {
            input.split(SEPARATOR).collect()
        } else {
            vec![input]
        };

        let counties = tokens
            .into_iter()
            .map(|token| {
                let name = normalize(token);
                County::lookup(&name).ok_or(Error::UnknownCounty { name })
            })
            .collect::<Result<Vec<_>>>()?;

        let ids = counties.iter().map(|c| c.id).collect();
        let selection = Self {
            counties,
            filter: CountyFilter {
                field: county_field.to_string(),
                ids,
            },
        };
        debug!(predicate = %selection.filter, "resolved county selection");
        Ok(selection)
    }

    pub fn ids(&self) -> &[u8] {
        &self.filter.ids
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.counties.iter().map(|c| c.name).collect()
    }
}

fn normalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| *c != '\'' && *c != '"')
        .collect::<String>()
        .trim()
        .to_string()
}
