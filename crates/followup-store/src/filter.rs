//! Typed filter formula builder.
//!
//! Call sites compose predicates instead of concatenating formula strings,
//! so quoting/escaping lives in exactly one place.

/// A boolean predicate over record fields, rendered to the store's formula
/// language.
#[derive(Debug, Clone)]
pub enum Formula {
    /// `{field}='value'`
    Eq { field: String, value: String },
    /// `IS_BEFORE({field}, NOW())`
    IsBeforeNow { field: String },
    /// `{field}!=''` — the field is set and non-empty.
    NotEmpty { field: String },
    /// `AND(a, b, ...)`
    And(Vec<Formula>),
}

impl Formula {
    pub fn eq(field: &str, value: &str) -> Self {
        Self::Eq {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_before_now(field: &str) -> Self {
        Self::IsBeforeNow {
            field: field.to_string(),
        }
    }

    pub fn not_empty(field: &str) -> Self {
        Self::NotEmpty {
            field: field.to_string(),
        }
    }

    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Self {
        Self::And(parts.into_iter().collect())
    }

    /// Render to the formula string passed as `filterByFormula`.
    pub fn render(&self) -> String {
        match self {
            Self::Eq { field, value } => {
                format!("{{{field}}}='{}'", escape_value(value))
            }
            Self::IsBeforeNow { field } => format!("IS_BEFORE({{{field}}}, NOW())"),
            Self::NotEmpty { field } => format!("{{{field}}}!=''"),
            Self::And(parts) => match parts.len() {
                0 => "TRUE()".to_string(),
                1 => parts[0].render(),
                _ => {
                    let inner: Vec<String> = parts.iter().map(Formula::render).collect();
                    format!("AND({})", inner.join(", "))
                }
            },
        }
    }
}

/// Escape a value embedded in a single-quoted formula string.
fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
