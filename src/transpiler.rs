//! SQL rendering for CASE expressions.
//!
//! Statements are written left to right through a [`SqlWriter`], which
//! decides per placeholder whether to emit `?` or the literal text of the
//! next binding. Because the writer knows where every placeholder goes, a
//! `?` inside a raw condition or a rendered literal is never mistaken for
//! one.

use crate::value::Value;

/// Trait for converting expressions to SQL.
pub trait ToSql {
    /// Convert this node to a parameterized SQL string.
    fn to_sql(&self) -> String;
}

/// How placeholders are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholders {
    /// `?` for every binding.
    Positional,
    /// The literal text of each binding.
    Inline { allow_string_literals: bool },
}

/// Accumulates statement text, consuming one binding per placeholder.
pub(crate) struct SqlWriter<'a, I>
where
    I: Iterator<Item = &'a Value>,
{
    sql: String,
    bindings: I,
    mode: Placeholders,
}

impl<'a, I> SqlWriter<'a, I>
where
    I: Iterator<Item = &'a Value>,
{
    pub(crate) fn new(bindings: I, mode: Placeholders) -> Self {
        Self {
            sql: String::new(),
            bindings,
            mode,
        }
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn push_placeholder(&mut self) {
        match self.mode {
            Placeholders::Positional => self.sql.push('?'),
            Placeholders::Inline {
                allow_string_literals,
            } => {
                // Bindings are recorded alongside placeholders, so they never run out.
                let value = self.bindings.next().unwrap_or(&Value::Null);
                self.sql
                    .push_str(&inline_literal(value, allow_string_literals));
            }
        }
    }

    pub(crate) fn finish(self) -> String {
        self.sql
    }
}

/// Render a binding as an inline SQL literal.
///
/// Strings are only written out when `allow_string_literals` is set;
/// otherwise they collapse to `''` whatever their content, so a display
/// string can never smuggle caller text into SQL by accident. The same
/// applies to other textual values such as dates.
pub fn inline_literal(value: &Value, allow_string_literals: bool) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => {
            if allow_string_literals {
                format!("'{}'", escape_string(s))
            } else {
                "''".to_string()
            }
        }
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) if n.is_finite() => n.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::Date(_) | Value::DateTime(_) => {
            if allow_string_literals {
                format!("'{}'", value.to_string().replace('\'', "''"))
            } else {
                "''".to_string()
            }
        }
    }
}

/// Backslash-escape quotes, backslashes and NUL for a single-quoted literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\'' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}
