use std::{collections::HashMap, fmt};

use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A runtime value produced by evaluating an expression.
///
/// Integers and floats are kept apart so that an integer-typed header stays
/// integer-typed after `${header.count}++`.
///
/// # Examples
///
/// ```
/// use simple_lang::Value;
///
/// let count = Value::Integer(42);
/// assert_eq!(count.as_string(), "42");
/// assert!(count.is_truthy());
///
/// assert!(!Value::String("false".into()).is_truthy());
/// assert!(!Value::Null.is_truthy());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent value (a missing header, an empty body)
    #[default]
    Null,

    Boolean(bool),

    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    String(String),

    /// Ordered list of values
    Array(Vec<Value>),

    /// String-keyed map, also used for opaque structured bodies
    Object(HashMap<String, Value>),
}

impl Value {
    /// Boolean coercion used when a bare expression stands in for a predicate.
    ///
    /// True iff the value is present and, when textual, non-empty and not the
    /// literal `"false"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::String(s) => !s.is_empty() && s != "false",
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::String(s) => {
                let text = s.trim();
                if is_numeral(text) {
                    text.parse::<f64>().ok().filter(|n| n.is_finite())
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Get as integer. Strings must hold an integral numeral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Numeric view used by the comparison operators: integer first, then
    /// floating point. `None` when the value is not a number or numeral.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(n) => Some(Decimal::from(*n)),
            Value::Float(n) => Decimal::from_f64(*n),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// The textual form of the value. `Null` renders as the empty string so
    /// that a missing header concatenates to nothing.
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Returns a human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// Parses a numeral, integer first and floating point second.
///
/// `None` for words such as `inf` or `NaN`, and for numerals outside the
/// range of `Decimal`; see [`Value::as_float`] for those.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Decimal::from(n));
    }
    if !is_numeral(text) {
        return None;
    }
    text.parse::<Decimal>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(Decimal::from_f64))
}

/// Decimal or exponent notation with an optional sign: `-12`, `0.5`, `1.5E3`.
pub fn is_numeral(text: &str) -> bool {
    fn unsigned(text: &str) -> &str {
        text.strip_prefix(['-', '+']).unwrap_or(text)
    }

    let digits = unsigned(text);
    let (mantissa, exponent) = match digits.find(['e', 'E']) {
        Some(i) => (&digits[..i], Some(unsigned(&digits[i + 1..]))),
        None => (digits, None),
    };
    let mantissa_ok = mantissa.chars().any(|c| c.is_ascii_digit())
        && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
        && mantissa.matches('.').count() <= 1;
    let exponent_ok = exponent
        .is_none_or(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_digit()));
    mantissa_ok && exponent_ok
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Float(n) => write!(f, "{}", n),
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, map[key])?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Floats without a JSON form (`NaN`, infinities) become `null`.
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_textual_rules() {
        assert!(Value::String("yes".into()).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(!Value::String("false".into()).is_truthy());
        assert!(Value::String("FALSE".into()).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn decimal_parsing_is_integer_then_float() {
        assert_eq!(parse_decimal("-123"), Some(Decimal::from(-123)));
        assert_eq!(parse_decimal("0.02"), "0.02".parse::<Decimal>().ok());
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("100.200.3"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("-"), None);
        assert_eq!(parse_decimal("1.5E3"), Some(Decimal::from(1500)));
        assert_eq!(parse_decimal("1e"), None);
        assert_eq!(parse_decimal("e5"), None);
        assert_eq!(parse_decimal("1e40"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn null_is_empty_text() {
        assert_eq!(Value::Null.as_string(), "");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn object_display_is_sorted() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), Value::Integer(2));
        map.insert("a".to_string(), Value::Integer(1));
        assert_eq!(Value::Object(map).to_string(), "{a=1, b=2}");
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        use serde_json::json;

        assert_eq!(Value::from(json!(3)), Value::Integer(3));
        assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Float(u64::MAX as f64));
        assert_eq!(serde_json::Value::from(Value::Float(f64::NAN)), serde_json::Value::Null);
        assert_eq!(
            serde_json::Value::from(Value::from(vec![Value::Integer(1), Value::Null])),
            json!([1, null])
        );
    }
}
