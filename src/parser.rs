//! Clause notation parser using nom.
//!
//! A compact text form for CASE expressions, used by the CLI and by
//! definition files.
//!
//! # Syntax Overview
//!
//! ```text
//! age >= 65 => 'senior'
//! ─┬─ ─┬ ─┬─    ───┬────
//!  │   │  │        └── THEN value
//!  │   │  └── condition value (bound)
//!  │   └── operator
//!  └── column
//!
//! raw "deleted_at IS NOT NULL" => 'gone'
//! else 'unknown'
//! as label
//! ```
//!
//! Values are `null`, `true`, `false`, numbers, `'quoted'` strings (`''`
//! escapes a quote) or bare words, which are read as strings.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{anychar, char, digit1, multispace0, multispace1, none_of, satisfy},
    combinator::{map, not, opt, peek, recognize, value},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
};

use crate::builder::CaseBuilder;
use crate::error::{CaseError, CaseResult};
use crate::value::Value;

/// One parsed WHEN clause.
#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Compare {
        column: String,
        operator: String,
        value: Value,
        then: Value,
    },
    Raw {
        condition: String,
        then: Value,
    },
}

impl Clause {
    fn apply(self, builder: CaseBuilder) -> CaseBuilder {
        match self {
            Clause::Compare {
                column,
                operator,
                value,
                then,
            } => builder.when(&column, &operator, value, then),
            Clause::Raw { condition, then } => builder.when_raw(&condition, then),
        }
    }
}

/// A line of a definition.
#[derive(Debug, Clone, PartialEq)]
enum Line {
    When(Clause),
    Else(Value),
    As(String),
}

/// Parse a single literal value.
pub fn parse_value(input: &str) -> CaseResult<Value> {
    let (input, offset) = trimmed(input);
    run(input, offset, parse_literal, "a value")
}

/// Parse one WHEN clause and add it to `builder`.
///
/// # Example
///
/// ```
/// use sqlcase::{parser, CaseBuilder};
///
/// let case = parser::parse_clause(CaseBuilder::new(), "age > 18 => 'adult'").unwrap();
/// assert_eq!(case.statement(), "CASE WHEN `age` > ? THEN ? END");
/// ```
pub fn parse_clause(builder: CaseBuilder, input: &str) -> CaseResult<CaseBuilder> {
    let (input, offset) = trimmed(input);
    let clause = run(input, offset, parse_when, "a WHEN clause")?;
    Ok(clause.apply(builder))
}

/// Parse a `key=value` pair for an equality dispatch table.
pub fn parse_map_entry(input: &str) -> CaseResult<(Value, Value)> {
    let (input, offset) = trimmed(input);
    run(
        input,
        offset,
        |i| {
            tuple((
                parse_literal,
                delimited(multispace0, char('='), multispace0),
                parse_literal,
            ))(i)
            .map(|(rest, (key, _, then))| (rest, (key, then)))
        },
        "key=value",
    )
}

/// Parse a multi-line definition into a builder.
///
/// Blank lines and lines starting with `#` or `--` are ignored. Error
/// positions are byte offsets into `input`.
pub fn parse_definition(input: &str) -> CaseResult<CaseBuilder> {
    let mut builder = CaseBuilder::new();
    let mut offset = 0;

    for raw_line in input.split('\n') {
        let line_start = offset;
        offset += raw_line.len() + 1;

        let line = raw_line.trim_start();
        let indent = raw_line.len() - line.len();
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') || line.starts_with("--") {
            continue;
        }

        builder = match run(line, line_start + indent, parse_line, "a definition line")? {
            Line::When(clause) => clause.apply(builder),
            Line::Else(then) => builder.otherwise(then),
            Line::As(alias) => builder.alias(&alias),
        };
    }

    Ok(builder)
}

/// Trim `input`, returning the byte offset of the trimmed start.
fn trimmed(input: &str) -> (&str, usize) {
    let start = input.trim_start();
    (start.trim_end(), input.len() - start.len())
}

/// Run a parser over a whole input, mapping failures to positioned errors.
fn run<'a, T>(
    input: &'a str,
    offset: usize,
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
    expected: &str,
) -> CaseResult<T> {
    match parser(input) {
        Ok((rest, out)) => {
            let rest = rest.trim_end();
            if rest.is_empty() {
                Ok(out)
            } else {
                Err(CaseError::parse(
                    offset + input.len() - rest.trim_start().len(),
                    format!("Unexpected trailing content: '{}'", rest.trim_start()),
                ))
            }
        }
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => {
            let literal = e
                .input
                .split(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
                .next()
                .unwrap_or_default();
            Err(CaseError::InvalidValue(format!(
                "number out of range at position {}: {}",
                offset + input.len() - e.input.len(),
                literal
            )))
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(CaseError::parse(
            offset + input.len() - e.input.len(),
            format!("Expected {}", expected),
        )),
        Err(nom::Err::Incomplete(_)) => Err(CaseError::parse(
            offset + input.len(),
            format!("Incomplete input, expected {}", expected),
        )),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A keyword not followed by more identifier characters.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(word), not(peek(satisfy(is_ident_char))))
}

/// Parse an identifier (column name, alias).
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char)(input)
}

/// Parse a line: clause, `else <value>` or `as <alias>`.
fn parse_line(input: &str) -> IResult<&str, Line> {
    alt((
        map(
            preceded(pair(keyword("else"), multispace1), parse_literal),
            Line::Else,
        ),
        map(
            preceded(pair(keyword("as"), multispace1), parse_identifier),
            |alias| Line::As(alias.to_string()),
        ),
        map(parse_when, Line::When),
    ))(input)
}

/// Parse a WHEN clause.
fn parse_when(input: &str) -> IResult<&str, Clause> {
    alt((parse_raw_clause, parse_compare_clause))(input)
}

/// Parse `raw "<condition>" => value`.
fn parse_raw_clause(input: &str) -> IResult<&str, Clause> {
    let (input, _) = keyword("raw")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, condition) = parse_double_quoted(input)?;
    let (input, then) = parse_then(input)?;

    Ok((input, Clause::Raw { condition, then }))
}

/// Parse `column <op> value => value`.
fn parse_compare_clause(input: &str) -> IResult<&str, Clause> {
    let (input, column) = parse_identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, operator) = parse_operator(input)?;
    let (input, _) = multispace0(input)?;
    let (input, value) = parse_literal(input)?;
    let (input, then) = parse_then(input)?;

    Ok((
        input,
        Clause::Compare {
            column: column.to_string(),
            operator: operator.to_string(),
            value,
            then,
        },
    ))
}

/// Parse `=> value`.
fn parse_then(input: &str) -> IResult<&str, Value> {
    preceded(tuple((multispace0, tag("=>"), multispace0)), parse_literal)(input)
}

/// Parse a comparison operator. Keyword operators come back uppercased.
fn parse_operator(input: &str) -> IResult<&str, &'static str> {
    alt((
        value(">=", tag(">=")),
        value("<=", tag("<=")),
        value("<>", tag("<>")),
        value("!=", tag("!=")),
        value(">", char('>')),
        value("<", char('<')),
        // Not the start of `=>`
        value("=", terminated(char('='), not(peek(char('>'))))),
        value(
            "NOT LIKE",
            tuple((keyword("not"), multispace1, keyword("like"))),
        ),
        value("LIKE", keyword("like")),
    ))(input)
}

/// Parse a value.
fn parse_literal(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Null, keyword("null")),
        value(Value::Bool(true), keyword("true")),
        value(Value::Bool(false), keyword("false")),
        parse_number,
        map(parse_single_quoted, Value::String),
        // Bare word (treated as string)
        map(parse_identifier, |s| Value::String(s.to_string())),
    ))(input)
}

/// Parse a number (integer or float).
///
/// Integers must fit in an `i64` and floats must be finite; anything else
/// fails hard rather than falling back to a bare word.
fn parse_number(input: &str) -> IResult<&str, Value> {
    let start = input;
    let (input, num_str) = terminated(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        not(peek(satisfy(is_ident_char))),
    )(input)?;

    let too_large = || nom::Err::Failure(nom::error::Error::new(start, ErrorKind::TooLarge));

    let number = if num_str.contains('.') {
        match num_str.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Float(n),
            _ => return Err(too_large()),
        }
    } else {
        Value::Int(num_str.parse().map_err(|_| too_large())?)
    };

    Ok((input, number))
}

/// Parse a single-quoted string, `''` standing for one quote.
fn parse_single_quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('\''),
            many0(alt((value('\'', tag("''")), none_of("'")))),
            char('\''),
        ),
        |chars: Vec<char>| chars.into_iter().collect(),
    )(input)
}

/// Parse a double-quoted string with backslash escapes.
fn parse_double_quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('"'),
            many0(alt((preceded(char('\\'), anychar), none_of("\"\\")))),
            char('"'),
        ),
        |chars: Vec<char>| chars.into_iter().collect(),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_values() {
        assert_eq!(parse_value("null").unwrap(), Value::Null);
        assert_eq!(parse_value("TRUE").unwrap(), Value::Bool(true));
        assert_eq!(parse_value("-18").unwrap(), Value::Int(-18));
        assert_eq!(parse_value("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(
            parse_value("'it''s'").unwrap(),
            Value::String("it's".to_string())
        );
        assert_eq!(parse_value("''").unwrap(), Value::String(String::new()));
        assert_eq!(
            parse_value("nullable").unwrap(),
            Value::String("nullable".to_string())
        );
        assert_eq!(
            parse_value("18abc").unwrap(),
            Value::String("18abc".to_string())
        );
    }

    #[test]
    fn test_out_of_range_numbers() {
        let err = parse_value("99999999999999999999").unwrap_err();
        match err {
            CaseError::InvalidValue(message) => {
                assert!(message.contains("99999999999999999999"));
                assert!(message.contains("position 0"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let huge_float = format!("{}.5", "9".repeat(400));
        assert!(matches!(
            parse_value(&huge_float),
            Err(CaseError::InvalidValue(_))
        ));
        assert!(matches!(
            parse_clause(CaseBuilder::new(), "age > 1 => 99999999999999999999"),
            Err(CaseError::InvalidValue(_))
        ));
        assert_eq!(
            parse_value("9223372036854775807").unwrap(),
            Value::Int(i64::MAX)
        );
    }

    #[test]
    fn test_positions_count_leading_whitespace() {
        match parse_value("   1 x").unwrap_err() {
            CaseError::Parse { position, .. } => assert_eq!(position, 5),
            other => panic!("unexpected error: {other}"),
        }
        match parse_clause(CaseBuilder::new(), "  age > 18 => 'a' junk").unwrap_err() {
            CaseError::Parse { position, .. } => assert_eq!(position, 18),
            other => panic!("unexpected error: {other}"),
        }
        match parse_map_entry("\tkey = 1 2").unwrap_err() {
            CaseError::Parse { position, .. } => assert_eq!(position, 9),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compare_clause() {
        let case = parse_clause(CaseBuilder::new(), "age >= 65 => 'senior'").unwrap();
        assert_eq!(case.statement(), "CASE WHEN `age` >= ? THEN ? END");
        assert_eq!(
            case.bindings(),
            vec![Value::Int(65), Value::String("senior".to_string())]
        );
    }

    #[test]
    fn test_equals_without_spaces() {
        let case = parse_clause(CaseBuilder::new(), "status=1=>active").unwrap();
        assert_eq!(case.statement(), "CASE WHEN `status` = ? THEN ? END");
    }

    #[test]
    fn test_keyword_operators_are_uppercased() {
        let case = parse_clause(CaseBuilder::new(), "name not like 'a%' => 1").unwrap();
        assert_eq!(case.statement(), "CASE WHEN `name` NOT LIKE ? THEN ? END");
    }

    #[test]
    fn test_raw_clause() {
        let case = parse_clause(
            CaseBuilder::new(),
            r#"raw "name = \"x\" OR id IS NULL" => 'odd'"#,
        )
        .unwrap();
        assert_eq!(
            case.statement(),
            r#"CASE WHEN name = "x" OR id IS NULL THEN ? END"#
        );
        assert_eq!(case.bindings(), vec![Value::String("odd".to_string())]);
    }

    #[test]
    fn test_column_named_like_a_keyword() {
        let case = parse_clause(CaseBuilder::new(), "raw = 1 => 2").unwrap();
        assert_eq!(case.statement(), "CASE WHEN `raw` = ? THEN ? END");
    }

    #[test]
    fn test_map_entry() {
        assert_eq!(
            parse_map_entry("active = 1").unwrap(),
            (Value::String("active".to_string()), Value::Int(1))
        );
        assert!(parse_map_entry("active").is_err());
    }

    #[test]
    fn test_definition() {
        let input = "\
# age groups
age > 65 => 'senior'
age > 18 => 'adult'
-- fallback
else 'minor'
as age_group
";
        let case = parse_definition(input).unwrap();
        assert_eq!(
            case.statement(),
            "CASE WHEN `age` > ? THEN ? WHEN `age` > ? THEN ? ELSE ? END AS `age_group`"
        );
        assert_eq!(case.bindings().len(), 5);
    }

    #[test]
    fn test_definition_else_null() {
        let case = parse_definition("a = 1 => 'x'\nelse null").unwrap();
        assert!(case.has_else());
        assert_eq!(case.bindings().last(), Some(&Value::Null));
    }

    #[test]
    fn test_trailing_content_position() {
        let err = parse_definition("a = 1 => 2\n  b = 1 => 2 extra").unwrap_err();
        match err {
            CaseError::Parse { position, message } => {
                assert_eq!(position, 24);
                assert!(message.contains("extra"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_then_is_an_error() {
        assert!(matches!(
            parse_clause(CaseBuilder::new(), "age > 18"),
            Err(CaseError::Parse { .. })
        ));
    }
}
