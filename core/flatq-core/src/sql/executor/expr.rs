//! WHERE predicate evaluation

use crate::error::{FlatqError, FlatqResult};
use crate::sql::executor::coerce::{Coerced, coerce, unquote};
use crate::sql::planner::{CompareOp, WhereClause};
use crate::storage::{Row, Value};
use regex::Regex;
use std::cmp::Ordering;

/// A WHERE clause ready for evaluation; a LIKE pattern is compiled once here.
#[derive(Debug, Clone)]
pub struct Predicate {
    clause: WhereClause,
    pattern: Option<Regex>,
}

impl Predicate {
    pub fn compile(clause: WhereClause) -> FlatqResult<Self> {
        let pattern = if clause.operator == CompareOp::Like && !clause.value.is_null() {
            Some(like_regex(unquote(&clause.value.to_string()))?)
        } else {
            None
        };
        Ok(Self { clause, pattern })
    }

    pub fn clause(&self) -> &WhereClause {
        &self.clause
    }

    /// Evaluate against a row. `default_table` lets `t.field` and `field`
    /// name the same key when `t` is the table being read.
    ///
    /// The clause field must resolve on the row; a present key holding an
    /// empty value is fine, an absent key is `InvalidField`.
    pub fn matches(&self, row: &Row, default_table: Option<&str>) -> FlatqResult<bool> {
        let clause = &self.clause;
        let stored = row
            .resolve(&clause.field, default_table)
            .ok_or_else(|| FlatqError::InvalidField(clause.field.clone()))?;

        if clause.operator == CompareOp::Like {
            return Ok(like(stored, self.pattern.as_ref()));
        }

        let left = coerce(stored);
        let right = coerce(&clause.value);

        if left.is_null() || right.is_null() {
            let both = left.is_null() && right.is_null();
            return Ok(match clause.operator {
                CompareOp::Eq => both,
                CompareOp::NotEq => !both,
                _ => false,
            });
        }

        Ok(compare(&left, clause.operator, &right))
    }
}

/// Compile every clause of an AND list.
pub fn compile_all(clauses: &[WhereClause]) -> FlatqResult<Vec<Predicate>> {
    clauses.iter().cloned().map(Predicate::compile).collect()
}

/// AND over all predicates; stops at the first false one.
pub fn matches_all(row: &Row, predicates: &[Predicate], default_table: Option<&str>) -> FlatqResult<bool> {
    for predicate in predicates {
        if !predicate.matches(row, default_table)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate one clause against a row, resolving the field by exact key.
pub fn evaluate(row: &Row, clause: &WhereClause) -> FlatqResult<bool> {
    Predicate::compile(clause.clone())?.matches(row, None)
}

fn compare(left: &Coerced<'_>, op: CompareOp, right: &Coerced<'_>) -> bool {
    match left.partial_cmp_same_type(right) {
        Some(ord) => match op {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::NotEq => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::GtEq => ord != Ordering::Less,
            CompareOp::LtEq => ord != Ordering::Greater,
            CompareOp::Like => false,
        },
        // number vs text
        None => op == CompareOp::NotEq,
    }
}

fn like(stored: &Value, pattern: Option<&Regex>) -> bool {
    let Some(re) = pattern else { return false };
    match stored {
        Value::Null => false,
        Value::Text(text) => re.is_match(text),
        other => re.is_match(&other.to_string()),
    }
}

/// Translate a LIKE pattern into an anchored, case-insensitive regex.
pub fn like_regex(pattern: &str) -> FlatqResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?is)^");
    let mut buf = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    expr.push('$');
    Ok(Regex::new(&expr)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::from_pairs([
            ("name", "Alice"),
            ("age", "30"),
            ("city", ""),
            ("code", "a.b*c"),
        ])
    }

    fn clause(field: &str, op: &str, value: &str) -> WhereClause {
        WhereClause::new(field, op, value).unwrap()
    }

    #[test]
    fn numeric_comparison_uses_coercion() {
        let row = row();
        assert!(evaluate(&row, &clause("age", "=", "30")).unwrap());
        assert!(evaluate(&row, &clause("age", "=", "30.0")).unwrap());
        assert!(evaluate(&row, &clause("age", ">", "9")).unwrap());
        assert!(evaluate(&row, &clause("age", "<=", "30")).unwrap());
        assert!(!evaluate(&row, &clause("age", "<", "30")).unwrap());
    }

    #[test]
    fn text_comparison_is_lexical() {
        let row = row();
        assert!(evaluate(&row, &clause("name", "=", "'Alice'")).unwrap());
        assert!(evaluate(&row, &clause("name", "<", "Bob")).unwrap());
        assert!(evaluate(&row, &clause("name", "<>", "Bob")).unwrap());
    }

    #[test]
    fn mixed_types_never_equal() {
        let row = row();
        assert!(!evaluate(&row, &clause("name", "=", "5")).unwrap());
        assert!(evaluate(&row, &clause("name", "!=", "5")).unwrap());
        assert!(!evaluate(&row, &clause("name", ">", "5")).unwrap());
    }

    #[test]
    fn absent_field_is_invalid_but_empty_is_not() {
        let row = row();
        let err = evaluate(&row, &clause("salary", "=", "1")).unwrap_err();
        assert!(matches!(err, FlatqError::InvalidField(f) if f == "salary"));
        assert!(evaluate(&row, &clause("city", "=", "''")).unwrap());
    }

    #[test]
    fn qualified_field_resolves_against_default_table() {
        let row = row();
        let age = Predicate::compile(clause("users.age", "=", "30")).unwrap();
        assert!(age.matches(&row, Some("users")).unwrap());
        // only the table being read may qualify a bare key
        assert!(matches!(
            age.matches(&row, Some("orders")),
            Err(FlatqError::InvalidField(f)) if f == "users.age"
        ));
        assert!(evaluate(&row, &clause("users.age", "=", "30")).is_err());
    }

    #[test]
    fn like_pattern_is_compiled_once_and_reused() {
        let predicate = Predicate::compile(clause("name", "LIKE", "%li%")).unwrap();
        assert!(predicate.pattern.is_some());
        let rows = [
            Row::from_pairs([("name", "Alice")]),
            Row::from_pairs([("name", "Bob")]),
            Row::from_pairs([("name", "Olive")]),
        ];
        let hits: Vec<bool> = rows
            .iter()
            .map(|r| predicate.matches(r, None).unwrap())
            .collect();
        assert_eq!(hits, vec![true, false, true]);
    }

    #[test]
    fn null_semantics() {
        let row = Row::from_pairs([("x", Value::Null)]);
        let is_null = WhereClause::new("x", "=", Value::Null).unwrap();
        let not_null = WhereClause::new("x", "!=", Value::Null).unwrap();
        assert!(evaluate(&row, &is_null).unwrap());
        assert!(!evaluate(&row, &not_null).unwrap());
        assert!(!evaluate(&row, &clause("x", "=", "1")).unwrap());
        assert!(evaluate(&row, &clause("x", "!=", "1")).unwrap());
        assert!(!evaluate(&row, &clause("x", ">", "1")).unwrap());
        assert!(!evaluate(&row, &clause("x", "LIKE", "%")).unwrap());
    }

    #[test]
    fn like_wildcards_and_case() {
        let row = row();
        assert!(evaluate(&row, &clause("name", "LIKE", "a%")).unwrap());
        assert!(evaluate(&row, &clause("name", "LIKE", "_LICE")).unwrap());
        assert!(!evaluate(&row, &clause("name", "LIKE", "Ali")).unwrap());
        assert!(evaluate(&row, &clause("city", "LIKE", "%")).unwrap());
        assert!(!evaluate(&row, &clause("city", "LIKE", "_")).unwrap());
    }

    #[test]
    fn like_escapes_regex_metacharacters() {
        let row = row();
        assert!(evaluate(&row, &clause("code", "LIKE", "a.b*c")).unwrap());
        assert!(!evaluate(&row, &clause("name", "LIKE", "A.*")).unwrap());
        assert!(evaluate(&row, &clause("code", "LIKE", "a_b%")).unwrap());
    }

    #[test]
    fn like_on_raw_value_does_not_coerce() {
        let row = Row::from_pairs([("zip", "00123")]);
        assert!(evaluate(&row, &clause("zip", "LIKE", "00%")).unwrap());
    }

    #[test]
    fn matches_all_is_conjunction() {
        let row = row();
        let all = |clauses: Vec<WhereClause>| {
            matches_all(&row, &compile_all(&clauses).unwrap(), None).unwrap()
        };
        assert!(all(vec![clause("age", ">", "18"), clause("name", "=", "Alice")]));
        // short-circuits before the absent field
        assert!(!all(vec![clause("age", ">", "40"), clause("missing", "=", "x")]));
        assert!(all(Vec::new()));
    }
}
