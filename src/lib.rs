//! # sqlcase — CASE WHEN expressions with bindings
//!
//! Build SQL `CASE WHEN ... THEN ... ELSE ... END` fragments with `?`
//! placeholders and the values to bind to them, ready to splice into a
//! larger query.
//!
//! ## Quick Example
//!
//! ```
//! use sqlcase::prelude::*;
//!
//! let case = CaseBuilder::new()
//!     .when("age", ">", 18, "adult")
//!     .otherwise("minor");
//!
//! let (sql, bindings) = case.to_statement_and_bindings();
//! assert_eq!(sql, "CASE WHEN `age` > ? THEN ? ELSE ? END");
//! assert_eq!(bindings, vec![Value::Int(18), "adult".into(), "minor".into()]);
//!
//! // For logs: strings stay hidden unless explicitly allowed
//! assert_eq!(case.to_inline_statement(false), "CASE WHEN `age` > 18 THEN '' ELSE '' END");
//! ```
//!
//! ## Statement Shape
//!
//! | Call                          | Fragment                        | Bindings |
//! |-------------------------------|---------------------------------|----------|
//! | `when(col, op, v, then)`      | ``WHEN `col` op ? THEN ?``      | 2        |
//! | `when_raw(cond, then)`        | `WHEN cond THEN ?`              | 1        |
//! | `otherwise(v)`                | `ELSE ?`                        | 1        |
//! | `alias(name)`                 | ``AS `name` ``                  | 0        |

pub mod builder;
pub mod config;
pub mod error;
pub mod parser;
pub mod transpiler;
pub mod value;

pub use builder::{CaseBuilder, WhenClause};
pub use error::{CaseError, CaseResult};
pub use value::{ScalarValue, Value};

pub mod prelude {
    pub use crate::builder::{CaseBuilder, WhenClause};
    pub use crate::config::{Config, OutputFormat, Overrides, Settings};
    pub use crate::error::*;
    pub use crate::parser::{parse_clause, parse_definition, parse_value};
    pub use crate::scalar_enum;
    pub use crate::transpiler::ToSql;
    pub use crate::value::{ScalarValue, Value};
}

/// Parse a multi-line clause definition into a builder.
///
/// # Example
///
/// ```
/// let case = sqlcase::parse("age > 18 => 'adult'\nelse 'minor'").unwrap();
/// assert_eq!(case.statement(), "CASE WHEN `age` > ? THEN ? ELSE ? END");
/// ```
pub fn parse(input: &str) -> CaseResult<CaseBuilder> {
    parser::parse_definition(input)
}
