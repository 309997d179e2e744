//! WHERE-clause predicates.
//!
//! Predicates are SQL fragments assembled by the builders and the entity
//! security hooks. Identifiers are quoted with [`quote_ident`]; literals
//! either go through the gateway's escaping primitive or, for numbers,
//! through [`numeric_literal`], which re-renders the parsed value so no
//! client text ever reaches the statement verbatim.

use tablekit_proto::Value;

/// Tautology pushed by unrestricted security hooks.
pub const ALLOW_ALL: &str = "1=1";

/// Contradiction used wherever access must fail closed.
pub const DENY_ALL: &str = "1=0";

const CONJUNCTION: &str = "\n AND\n  ";

/// Ordered list of predicates joined with `AND`.
///
/// An empty list renders as [`DENY_ALL`]: a statement whose criteria were
/// never filled in matches no row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    predicates: Vec<String>,
}

impl Criteria {
    /// Create an empty predicate list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate.
    pub fn push(&mut self, predicate: impl Into<String>) {
        self.predicates.push(predicate.into());
    }

    /// Append the `1=1` tautology.
    pub fn allow_all(&mut self) {
        self.push(ALLOW_ALL);
    }

    /// Append the `1=0` contradiction.
    pub fn deny_all(&mut self) {
        self.push(DENY_ALL);
    }

    /// Append `column IN (...)` over integer ids; an empty list denies.
    pub fn push_in(&mut self, column: &str, ids: &[i64]) {
        if ids.is_empty() {
            self.deny_all();
            return;
        }
        let list = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.push(format!("{column} IN ({list})"));
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Check if no predicate was pushed.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Iterate over the predicates.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(String::as_str)
    }

    /// Render the WHERE clause body.
    pub fn to_where_clause(&self) -> String {
        if self.predicates.is_empty() {
            DENY_ALL.to_string()
        } else {
            self.predicates.join(CONJUNCTION)
        }
    }
}

/// Identifier restriction of a select.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum IdFilter<'a> {
    /// No restriction.
    #[default]
    All,
    /// A single identifier.
    One(&'a Value),
    /// A set of identifiers.
    Many(&'a [Value]),
}

impl IdFilter<'_> {
    /// Render the predicate on `column`, `None` for [`IdFilter::All`].
    ///
    /// A non-numeric identifier, or an empty set, renders `1=0`.
    pub fn predicate(&self, column: &str) -> Option<String> {
        match self {
            IdFilter::All => None,
            IdFilter::One(value) => Some(match numeric_literal(value) {
                Some(literal) => format!("{column}={literal}"),
                None => DENY_ALL.to_string(),
            }),
            IdFilter::Many(values) => {
                let literals: Option<Vec<String>> = values.iter().map(numeric_literal).collect();
                Some(match literals {
                    Some(literals) if !literals.is_empty() => {
                        format!("{column} IN ({})", literals.join(","))
                    }
                    _ => DENY_ALL.to_string(),
                })
            }
        }
    }
}

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote `alias.column`.
pub fn qualified(alias: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(alias), quote_ident(column))
}

/// Render a value as a numeric SQL literal, if it is a finite number or a
/// string holding one.
pub fn numeric_literal(value: &Value) -> Option<String> {
    match value {
        Value::Int64(i) => Some(i.to_string()),
        Value::Float64(f) if f.is_finite() => Some(f.to_string()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(i.to_string())
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.to_string())
            }
        }
        _ => None,
    }
}
