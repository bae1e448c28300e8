//! CASE WHEN expression builder.
//!
//! ```
//! use sqlcase::CaseBuilder;
//!
//! let (sql, bindings) = CaseBuilder::new()
//!     .when("age", ">", 18, "adult")
//!     .otherwise("minor")
//!     .alias("age_group")
//!     .to_statement_and_bindings();
//!
//! assert_eq!(sql, "CASE WHEN `age` > ? THEN ? ELSE ? END AS `age_group`");
//! assert_eq!(bindings.len(), 3);
//! ```

use crate::transpiler::{Placeholders, SqlWriter, ToSql};
use crate::value::{ScalarValue, Value};

/// A single WHEN branch.
#[derive(Debug, Clone, PartialEq)]
pub enum WhenClause {
    /// `` WHEN `column` <operator> ? THEN ? ``
    Compare { column: String, operator: String },
    /// `WHEN <condition> THEN ?`, condition written verbatim.
    Raw(String),
}

impl WhenClause {
    /// Number of bindings this clause consumes.
    pub fn binding_count(&self) -> usize {
        match self {
            WhenClause::Compare { .. } => 2,
            WhenClause::Raw(_) => 1,
        }
    }

    fn write<'a, I>(&self, out: &mut SqlWriter<'a, I>)
    where
        I: Iterator<Item = &'a Value>,
    {
        match self {
            WhenClause::Compare { column, operator } => {
                out.push_str("WHEN `");
                out.push_str(column);
                out.push_str("` ");
                out.push_str(operator);
                out.push_str(" ");
                out.push_placeholder();
            }
            WhenClause::Raw(condition) => {
                out.push_str("WHEN ");
                out.push_str(condition);
            }
        }
        out.push_str(" THEN ");
        out.push_placeholder();
    }
}

/// Builder for CASE expressions with positional bindings.
///
/// WHEN clauses are kept in insertion order, which is the order SQL
/// evaluates them in. `otherwise` and `alias` replace any earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseBuilder {
    clauses: Vec<WhenClause>,
    bindings: Vec<Value>,
    else_value: Option<Value>,
    alias: Option<String>,
}

impl CaseBuilder {
    /// Start an empty CASE expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an equality dispatch table on `column`.
    ///
    /// Each `(key, value)` pair becomes `` WHEN `column` = ? THEN ? `` in
    /// iteration order, so pass an ordered container.
    ///
    /// ```
    /// use sqlcase::CaseBuilder;
    ///
    /// let case = CaseBuilder::map_values("status", [("a", 1), ("b", 2)]);
    /// assert_eq!(
    ///     case.statement(),
    ///     "CASE WHEN `status` = ? THEN ? WHEN `status` = ? THEN ? END"
    /// );
    /// ```
    pub fn map_values<K, V>(column: &str, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: ScalarValue,
        V: ScalarValue,
    {
        values
            .into_iter()
            .fold(Self::new(), |builder, (case, then)| {
                builder.when(column, "=", case, then)
            })
    }

    /// Add a `` WHEN `column` <operator> ? THEN ? `` clause.
    ///
    /// The column is wrapped in backticks as given and the operator is
    /// inserted verbatim; neither is validated.
    pub fn when(
        mut self,
        column: &str,
        operator: &str,
        value: impl ScalarValue,
        then: impl ScalarValue,
    ) -> Self {
        self.clauses.push(WhenClause::Compare {
            column: column.to_string(),
            operator: operator.to_string(),
        });
        self.bindings.push(value.into_scalar());
        self.bindings.push(then.into_scalar());
        self
    }

    /// Add a `WHEN <raw> THEN ?` clause.
    ///
    /// `raw` is written into the statement unescaped and unparameterized.
    /// Never pass user input here.
    pub fn when_raw(mut self, raw: &str, then: impl ScalarValue) -> Self {
        self.clauses.push(WhenClause::Raw(raw.to_string()));
        self.bindings.push(then.into_scalar());
        self
    }

    /// Set the ELSE value. `Value::Null` (or `None`) gives an explicit `ELSE NULL`.
    pub fn otherwise(mut self, then: impl ScalarValue) -> Self {
        self.else_value = Some(then.into_scalar());
        self
    }

    /// Add alias (AS `name`)
    pub fn alias(mut self, name: &str) -> Self {
        self.alias = Some(name.to_string());
        self
    }

    /// The parameterized statement and its bindings, in placeholder order.
    pub fn to_statement_and_bindings(&self) -> (String, Vec<Value>) {
        (self.statement(), self.bindings())
    }

    /// The parameterized statement.
    pub fn statement(&self) -> String {
        self.render(Placeholders::Positional)
    }

    /// All bindings: clause bindings in order, then the ELSE value if set.
    pub fn bindings(&self) -> Vec<Value> {
        self.all_bindings().cloned().collect()
    }

    /// The statement with every placeholder replaced by its literal.
    ///
    /// Meant for logs and diagnostics. String values render as `''` unless
    /// `allow_string_literals` is set.
    pub fn to_inline_statement(&self, allow_string_literals: bool) -> String {
        self.render(Placeholders::Inline {
            allow_string_literals,
        })
    }

    /// Rendered `WHEN ... THEN ?` fragments, in order.
    pub fn clauses(&self) -> Vec<String> {
        self.clauses
            .iter()
            .map(|clause| {
                let mut out =
                    SqlWriter::new(std::iter::empty::<&Value>(), Placeholders::Positional);
                clause.write(&mut out);
                out.finish()
            })
            .collect()
    }

    /// Number of WHEN clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn has_else(&self) -> bool {
        self.else_value.is_some()
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn all_bindings(&self) -> impl Iterator<Item = &Value> {
        self.bindings.iter().chain(self.else_value.iter())
    }

    fn render(&self, mode: Placeholders) -> String {
        let mut out = SqlWriter::new(self.all_bindings(), mode);
        out.push_str("CASE");

        for clause in &self.clauses {
            out.push_str(" ");
            clause.write(&mut out);
        }

        if self.else_value.is_some() {
            out.push_str(" ELSE ");
            out.push_placeholder();
        }

        out.push_str(" END");

        if let Some(alias) = &self.alias {
            out.push_str(" AS `");
            out.push_str(alias);
            out.push_str("`");
        }

        let sql = out.finish();
        tracing::trace!(clauses = self.clauses.len(), ?mode, "rendered CASE expression");
        sql
    }
}

impl ToSql for CaseBuilder {
    fn to_sql(&self) -> String {
        self.statement()
    }
}

impl std::fmt::Display for CaseBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_inline_statement(false))
    }
}
