//! SPARQL 1.1 query results, JSON serialization.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct SelectResults {
    #[serde(default)]
    pub head: Head,
    pub results: Bindings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, Term>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub datatype: Option<String>,
}

impl SelectResults {
    /// Values bound to `var`, in solution order. Unbound rows are skipped.
    pub fn values(&self, var: &str) -> Vec<String> {
        self.results
            .bindings
            .iter()
            .filter_map(|row| row.get(var).map(|term| term.value.clone()))
            .collect()
    }

    /// Reads the single integer an aggregate query such as `COUNT(*)` returns.
    /// No solution at all counts as zero.
    pub fn single_count(&self, var: &str) -> Result<u64> {
        let Some(row) = self.results.bindings.first() else {
            return Ok(0);
        };
        let Some(term) = row.get(var) else {
            return Ok(0);
        };
        parse_count(&term.value)
    }
}

fn parse_count(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Ok(value);
    }
    // Some engines type aggregate counts as xsd:decimal ("12.0").
    if let Some((whole, fraction)) = trimmed.split_once('.')
        && fraction.chars().all(|ch| ch == '0')
        && let Ok(value) = whole.parse::<u64>()
    {
        return Ok(value);
    }
    Err(GraphError::Decode(format!("expected a count, got {raw:?}")))
}
