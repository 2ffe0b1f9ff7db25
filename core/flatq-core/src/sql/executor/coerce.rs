//! Value coercion for comparisons.
//!
//! Stored cells are always text. Before a predicate compares two values both
//! sides pass through [`coerce`]: quoted literals are unquoted, then anything
//! that parses fully as a finite number becomes numeric.

use crate::storage::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// 비교용으로 정규화된 값
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<'a> {
    Null,
    Number(f64),
    Text(Cow<'a, str>),
}

impl Coerced<'_> {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Coerced::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Coerced::Null)
    }

    /// Native ordering for same-typed values; `None` when the types differ.
    pub fn partial_cmp_same_type(&self, other: &Coerced<'_>) -> Option<Ordering> {
        match (self, other) {
            (Coerced::Number(a), Coerced::Number(b)) => a.partial_cmp(b),
            (Coerced::Text(a), Coerced::Text(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Coerced::Null, Coerced::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// Coerce a stored or literal value.
pub fn coerce(value: &Value) -> Coerced<'_> {
    match value {
        Value::Null => Coerced::Null,
        Value::Number(n) => Coerced::Number(*n),
        Value::Text(s) => coerce_str(s),
    }
}

/// Coerce raw text: unquote, then try a number.
pub fn coerce_str(raw: &str) -> Coerced<'_> {
    let text = unquote(raw);
    match parse_number(text) {
        Some(n) => Coerced::Number(n),
        None => Coerced::Text(Cow::Borrowed(text)),
    }
}

/// Strip one pair of matching `'…'` or `"…"` quotes.
pub fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Parse trimmed text as a finite number. Empty/whitespace text is never a number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric view of a value, used by SUM/AVG/MIN/MAX.
pub fn as_number(value: &Value) -> Option<f64> {
    coerce(value).as_number()
}
