//! Bind values and the scalar projection used to normalize them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without zone
    DateTime(NaiveDateTime),
}

impl Value {
    /// Whether this is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type label, used when listing bindings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

/// Projection of a bindable value onto its canonical scalar.
///
/// Plain scalars map onto the matching [`Value`] variant. Enums that stand
/// for a stored scalar (a status code, a tier name) implement this to hand
/// the builder their backing value instead of themselves; see
/// [`scalar_enum!`](crate::scalar_enum).
pub trait ScalarValue {
    fn into_scalar(self) -> Value;
}

impl ScalarValue for Value {
    fn into_scalar(self) -> Value {
        self
    }
}

impl<T: ScalarValue> ScalarValue for Option<T> {
    fn into_scalar(self) -> Value {
        match self {
            Some(v) => v.into_scalar(),
            None => Value::Null,
        }
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => |$v:ident| $body:expr;)+) => {
        $(
            impl ScalarValue for $ty {
                fn into_scalar(self) -> Value {
                    let $v = self;
                    $body
                }
            }

            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )+
    };
}

impl_scalar! {
    bool => |v| Value::Bool(v);
    i8 => |v| Value::Int(v as i64);
    i16 => |v| Value::Int(v as i64);
    i32 => |v| Value::Int(v as i64);
    i64 => |v| Value::Int(v);
    u8 => |v| Value::Int(v as i64);
    u16 => |v| Value::Int(v as i64);
    u32 => |v| Value::Int(v as i64);
    // Through the shortest decimal form, so 0.1f32 stays 0.1
    f32 => |v| Value::Float(v.to_string().parse().unwrap_or(v as f64));
    f64 => |v| Value::Float(v);
    char => |v| Value::String(v.to_string());
    &str => |v| Value::String(v.to_string());
    String => |v| Value::String(v);
    &String => |v| Value::String(v.clone());
    NaiveDate => |v| Value::Date(v);
    NaiveDateTime => |v| Value::DateTime(v);
}

/// Implement [`ScalarValue`] for a fieldless enum from a variant table.
///
/// ```
/// use sqlcase::{scalar_enum, ScalarValue, Value};
///
/// #[derive(Clone, Copy)]
/// enum Tier {
///     Gold,
///     Silver,
/// }
///
/// scalar_enum!(Tier {
///     Gold => "gold",
///     Silver => "silver",
/// });
///
/// assert_eq!(Tier::Gold.into_scalar(), Value::String("gold".into()));
/// ```
#[macro_export]
macro_rules! scalar_enum {
    ($ty:ident { $($variant:ident => $value:expr),+ $(,)? }) => {
        impl $crate::ScalarValue for $ty {
            fn into_scalar(self) -> $crate::Value {
                match self {
                    $($ty::$variant => $crate::ScalarValue::into_scalar($value),)+
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    enum Priority {
        Low,
        High,
    }

    scalar_enum!(Priority {
        Low => 1,
        High => 10,
    });

    #[test]
    fn test_primitives_pass_through() {
        assert_eq!(true.into_scalar(), Value::Bool(true));
        assert_eq!(42u8.into_scalar(), Value::Int(42));
        assert_eq!(1.5f64.into_scalar(), Value::Float(1.5));
        assert_eq!("adult".into_scalar(), Value::String("adult".to_string()));
        assert_eq!(Value::Int(7).into_scalar(), Value::Int(7));
    }

    #[test]
    fn test_option_maps_none_to_null() {
        assert_eq!(None::<i64>.into_scalar(), Value::Null);
        assert_eq!(Some("x").into_scalar(), Value::String("x".to_string()));
    }

    #[test]
    fn test_enum_projects_backing_value() {
        assert_eq!(Priority::Low.into_scalar(), Value::Int(1));
        assert_eq!(Priority::High.into_scalar(), Value::Int(10));
    }

    #[test]
    fn test_bindings_serialize_as_plain_json() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let values = vec![
            Value::Null,
            Value::Int(18),
            Value::String("adult".into()),
            Value::Date(date),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,18,"adult","2024-02-29"]"#);
    }

    #[test]
    fn test_f32_keeps_its_decimal_form() {
        assert_eq!(0.1f32.into_scalar(), Value::Float(0.1));
        assert_eq!(Value::from(2.5f32), Value::Float(2.5));
    }

    #[test]
    fn test_datetime_serializes_as_text() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap();
        let json = serde_json::to_string(&Value::DateTime(dt)).unwrap();
        assert_eq!(json, r#""2024-02-29T13:05:00""#);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Float(2.0).to_string(), "2");
        assert_eq!(Value::String("it's".into()).to_string(), "it's");
    }
}
