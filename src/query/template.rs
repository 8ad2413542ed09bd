//! Parameterized SPARQL query templates.
//!
//! A template is a sequence of fragments. Plain fragments are always emitted;
//! a filter fragment belongs to one optional parameter and is emitted only
//! when that parameter has a value. Leaving an optional parameter out
//! therefore removes its whole clause, never half of it.

use tracing::warn;

use super::Slots;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Text(String),
    Filter { param: String, clause: String },
}

/// An immutable query template for one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    name: String,
    fragments: Vec<Fragment>,
    required: Vec<String>,
    optional: Vec<String>,
}

impl QueryTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragments: Vec::new(),
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    /// Append an always-emitted fragment. May reference required parameters.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(Fragment::Text(text.into()));
        self
    }

    /// Append a clause owned by the optional parameter `param`; declares
    /// `param` optional if it is not already.
    pub fn filter(mut self, param: impl Into<String>, clause: impl Into<String>) -> Self {
        let param = param.into();
        if !self.optional.contains(&param) {
            self.optional.push(param.clone());
        }
        self.fragments.push(Fragment::Filter { param, clause: clause.into() });
        self
    }

    pub fn required(mut self, param: impl Into<String>) -> Self {
        self.required.push(param.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_params(&self) -> &[String] {
        &self.required
    }

    pub fn optional_params(&self) -> &[String] {
        &self.optional
    }

    /// True when `param` is declared, required or optional.
    pub fn accepts(&self, param: &str) -> bool {
        self.required.iter().chain(&self.optional).any(|p| p == param)
    }

    /// Instantiate the template from `slots`.
    ///
    /// Returns `None` when any required parameter is missing or empty. Present
    /// optional parameters are substituted; absent ones drop their filter
    /// clauses. Values are escaped for use inside a SPARQL string literal and
    /// substitution is single-pass, so a value cannot introduce placeholders.
    pub fn build(&self, slots: &Slots) -> Option<String> {
        for param in &self.required {
            if slot_value(slots, param).is_none() {
                warn!(
                    entity = %param,
                    template = %self.name,
                    "missing required entity for query template"
                );
                return None;
            }
        }

        let mut query = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => self.render_into(text, slots, &mut query),
                Fragment::Filter { param, clause } => {
                    if slot_value(slots, param).is_some() {
                        self.render_into(clause, slots, &mut query);
                    }
                }
            }
        }
        Some(query)
    }

    /// Copy `text` into `out`, replacing `{param}` for declared parameters.
    /// An optional parameter with no value becomes an empty string here.
    fn render_into(&self, text: &str, slots: &Slots, out: &mut String) {
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let declared = after
                .find('}')
                .map(|close| (&after[..close], close))
                .filter(|(name, _)| self.accepts(name));
            match declared {
                Some((name, close)) => {
                    if let Some(value) = slot_value(slots, name) {
                        out.push_str(&escape_value(value));
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
    }
}

fn slot_value<'a>(slots: &'a Slots, name: &str) -> Option<&'a str> {
    slots.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// Escape a slot value for a double-quoted SPARQL string literal.
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}
