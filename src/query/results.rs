//! SPARQL JSON results (`application/sparql-results+json`), read leniently.
//!
//! Anything unexpected degrades to an absent field instead of an error, so a
//! half-broken answer from the store still formats.

use std::collections::BTreeMap;

use serde_json::Value;

/// One bound cell of a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub value: String,
    /// `uri`, `literal` or `bnode` when the store says so.
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResults {
    /// Projection order from `head.vars`; may be empty.
    pub vars: Vec<String>,
    pub rows: Vec<BTreeMap<String, Binding>>,
}

impl QueryResults {
    pub fn from_json(doc: &Value) -> Self {
        let vars = doc
            .pointer("/head/vars")
            .and_then(Value::as_array)
            .map(|vars| vars.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        let rows = doc
            .pointer("/results/bindings")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(parse_row).collect())
            .unwrap_or_default();

        Self { vars, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Value of `var` in row `row`, if bound.
    pub fn value(&self, row: usize, var: &str) -> Option<&str> {
        self.rows.get(row)?.get(var).map(|b| b.value.as_str())
    }
}

fn parse_row(row: &Value) -> BTreeMap<String, Binding> {
    let Some(cells) = row.as_object() else {
        return BTreeMap::new();
    };
    cells
        .iter()
        .filter_map(|(var, cell)| {
            let value = match cell.get("value")? {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            let kind = cell.get("type").and_then(Value::as_str).map(str::to_string);
            Some((var.clone(), Binding { value, kind }))
        })
        .collect()
}
