//! SQL 플래너 타입 정의
//!
//! QueryDescription, WhereClause, AggregateSpec 등 실행기가 소비하는 핵심 타입들을 정의합니다.

use crate::error::{FlatqError, FlatqResult};
use crate::storage::Value;
use std::fmt;

/// JOIN 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    /// Parse a join keyword (`INNER`, `LEFT`, `RIGHT`, any case).
    pub fn parse(kind: &str) -> FlatqResult<Self> {
        match kind.trim().to_uppercase().as_str() {
            "INNER" => Ok(JoinType::Inner),
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            other => Err(FlatqError::UnsupportedJoinType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        }
    }
}

/// `ON left = right`: left belongs to the main table, right to the joined table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub left: String,
    pub right: String,
}

impl JoinCondition {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// JOIN 절: 종류, 조인 테이블, 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub join_type: JoinType,
    pub table: String,
    pub condition: JoinCondition,
}

/// WHERE 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Like,
}

impl CompareOp {
    /// Parse operator text; anything outside the supported set is an
    /// `UnsupportedOperator` error.
    pub fn parse(op: &str) -> FlatqResult<Self> {
        match op.trim().to_uppercase().as_str() {
            "=" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::NotEq),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::GtEq),
            "<=" => Ok(CompareOp::LtEq),
            "LIKE" => Ok(CompareOp::Like),
            _ => Err(FlatqError::UnsupportedOperator(op.trim().to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::GtEq => ">=",
            CompareOp::LtEq => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WHERE 조건 하나: (필드, 연산자, 리터럴). 여러 개는 AND로 결합
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub field: String,
    pub operator: CompareOp,
    pub value: Value,
}

impl WhereClause {
    pub fn new(field: impl Into<String>, operator: &str, value: impl Into<Value>) -> FlatqResult<Self> {
        Ok(Self {
            field: field.into(),
            operator: CompareOp::parse(operator)?,
            value: value.into(),
        })
    }
}

/// 집계 함수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }
}

/// Argument of an aggregate: `*` or a (possibly qualified) field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateArg {
    Star,
    Field(String),
}

/// Parsed aggregate expression such as `SUM(price)`.
///
/// `label` is the expression text as written; it is the output column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub function: AggregateFunction,
    pub arg: AggregateArg,
    pub label: String,
}

impl AggregateSpec {
    /// Parse `FUNC(field)` or `FUNC(*)`. Anything else yields `None`.
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        let open = expr.find('(')?;
        let inner = expr[open + 1..].strip_suffix(')')?.trim();
        let function = AggregateFunction::parse(expr[..open].trim())?;

        let arg = if inner == "*" {
            AggregateArg::Star
        } else if !inner.is_empty()
            && inner
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            AggregateArg::Field(inner.to_string())
        } else {
            return None;
        };

        // Only COUNT accepts `*`.
        if arg == AggregateArg::Star && function != AggregateFunction::Count {
            return None;
        }

        Some(Self {
            function,
            arg,
            label: expr.to_string(),
        })
    }

    /// The data field this aggregate reads, if any.
    pub fn field(&self) -> Option<&str> {
        match &self.arg {
            AggregateArg::Star => None,
            AggregateArg::Field(f) => Some(f),
        }
    }
}

/// SELECT 목록의 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectField {
    /// `*`
    Wildcard,
    /// A plain (possibly qualified) field, or any expression kept as text.
    Column(String),
    Aggregate(AggregateSpec),
}

impl SelectField {
    /// Classify a select-list entry written as text.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == "*" {
            return SelectField::Wildcard;
        }
        match AggregateSpec::parse(text) {
            Some(spec) => SelectField::Aggregate(spec),
            None => SelectField::Column(text.to_string()),
        }
    }

    /// Output column name.
    pub fn label(&self) -> &str {
        match self {
            SelectField::Wildcard => "*",
            SelectField::Column(name) => name,
            SelectField::Aggregate(spec) => &spec.label,
        }
    }
}

/// ORDER BY 항목: (필드, 방향)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBySpec {
    pub field: String,
    pub asc: bool,
}

impl OrderBySpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            asc: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            asc: false,
        }
    }
}

/// Parsed SELECT statement, consumed once by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescription {
    pub fields: Vec<SelectField>,
    pub table: String,
    pub join: Option<JoinSpec>,
    pub where_clauses: Vec<WhereClause>,
    pub group_by: Option<Vec<String>>,
    pub order_by: Option<Vec<OrderBySpec>>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub distinct: bool,
}

impl QueryDescription {
    /// `SELECT <fields> FROM <table>` with every optional clause empty.
    pub fn new<I, S>(table: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|f| SelectField::parse(f.as_ref()))
                .collect(),
            table: table.into(),
            join: None,
            where_clauses: Vec::new(),
            group_by: None,
            order_by: None,
            limit: None,
            offset: 0,
            distinct: false,
        }
    }

    /// Aggregate expressions in select-list order.
    pub fn aggregates(&self) -> Vec<AggregateSpec> {
        self.fields
            .iter()
            .filter_map(|f| match f {
                SelectField::Aggregate(spec) => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_aggregates(&self) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f, SelectField::Aggregate(_)))
    }

    /// Aggregates present and no GROUP BY: the single-row global mode.
    pub fn has_aggregate_without_group_by(&self) -> bool {
        self.group_by.is_none() && self.has_aggregates()
    }

    pub fn has_wildcard(&self) -> bool {
        self.fields.iter().any(|f| matches!(f, SelectField::Wildcard))
    }

    /// Output column names in select-list order.
    pub fn field_labels(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.label().to_string()).collect()
    }

    /// Fields a join must carry into its output rows: selected columns,
    /// aggregate arguments, then GROUP BY, ORDER BY and WHERE fields.
    pub fn join_fields(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !out.iter().any(|existing| existing == name) {
                out.push(name.to_string());
            }
        };

        for field in &self.fields {
            match field {
                SelectField::Wildcard => {}
                SelectField::Column(name) => push(name),
                SelectField::Aggregate(spec) => {
                    if let Some(arg) = spec.field() {
                        push(arg);
                    }
                }
            }
        }
        for name in self.group_by.iter().flatten() {
            push(name);
        }
        for spec in self.order_by.iter().flatten() {
            push(&spec.field);
        }
        for clause in &self.where_clauses {
            push(&clause.field);
        }
        out
    }
}

/// Parsed INSERT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

/// Parsed DELETE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteQuery {
    pub table: String,
    pub where_clauses: Vec<WhereClause>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_spec_parse() {
        let spec = AggregateSpec::parse("SUM(salary)").unwrap();
        assert_eq!(spec.function, AggregateFunction::Sum);
        assert_eq!(spec.arg, AggregateArg::Field("salary".to_string()));
        assert_eq!(spec.label, "SUM(salary)");

        let count = AggregateSpec::parse("count(*)").unwrap();
        assert_eq!(count.function, AggregateFunction::Count);
        assert_eq!(count.arg, AggregateArg::Star);

        let qualified = AggregateSpec::parse("MAX(o.amount)").unwrap();
        assert_eq!(qualified.field(), Some("o.amount"));
    }

    #[test]
    fn aggregate_spec_rejects_malformed() {
        assert!(AggregateSpec::parse("SUM(*)").is_none());
        assert!(AggregateSpec::parse("SUM()").is_none());
        assert!(AggregateSpec::parse("MEDIAN(x)").is_none());
        assert!(AggregateSpec::parse("SUM(a + b)").is_none());
        assert!(AggregateSpec::parse("salary").is_none());
    }

    #[test]
    fn select_field_classification() {
        assert_eq!(SelectField::parse("*"), SelectField::Wildcard);
        assert_eq!(
            SelectField::parse("users.name"),
            SelectField::Column("users.name".to_string())
        );
        assert!(matches!(
            SelectField::parse("AVG(age)"),
            SelectField::Aggregate(_)
        ));
    }

    #[test]
    fn compare_op_parse() {
        assert_eq!(CompareOp::parse("<>").unwrap(), CompareOp::NotEq);
        assert_eq!(CompareOp::parse("like").unwrap(), CompareOp::Like);
        let err = CompareOp::parse("~=").unwrap_err();
        assert!(matches!(err, FlatqError::UnsupportedOperator(op) if op == "~="));
    }

    #[test]
    fn join_type_parse() {
        assert_eq!(JoinType::parse("left").unwrap(), JoinType::Left);
        assert!(matches!(
            JoinType::parse("FULL"),
            Err(FlatqError::UnsupportedJoinType(kind)) if kind == "FULL"
        ));
    }

    #[test]
    fn aggregate_without_group_by_flag() {
        let mut query = QueryDescription::new("t", ["dept", "COUNT(*)"]);
        assert!(query.has_aggregate_without_group_by());
        query.group_by = Some(vec!["dept".to_string()]);
        assert!(!query.has_aggregate_without_group_by());
        assert!(!QueryDescription::new("t", ["dept"]).has_aggregate_without_group_by());
    }

    #[test]
    fn join_fields_collects_downstream_references() {
        let mut query = QueryDescription::new("a", ["a.name", "SUM(b.amount)", "COUNT(*)"]);
        query.group_by = Some(vec!["a.name".to_string()]);
        query.order_by = Some(vec![OrderBySpec::desc("a.id")]);
        query.where_clauses = vec![WhereClause::new("b.kind", "=", "x").unwrap()];
        assert_eq!(
            query.join_fields(),
            vec!["a.name", "b.amount", "a.id", "b.kind"]
        );
    }
}
