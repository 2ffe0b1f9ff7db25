//! SQL 논리 플래너
//!
//! sqlparser AST → QueryDescription / InsertQuery / DeleteQuery 변환.
//! Table and field existence is never checked here.

use crate::error::{FlatqError, FlatqResult};
use crate::sql::parser::SqlParser;
use crate::sql::planner::types::*;
use crate::storage::Value;
use sqlparser::ast::{
    BinaryOperator as SqlBinaryOp, Distinct, Expr as SqlExpr, FromTable, GroupByExpr,
    JoinConstraint, JoinOperator, ObjectName, OrderByExpr as SqlOrderByExpr, Query, Select,
    SelectItem, SetExpr, Statement, TableFactor, TableWithJoins, UnaryOperator,
    Value as SqlValue,
};

fn not_supported(feature: impl Into<String>, hint: impl Into<String>) -> FlatqError {
    FlatqError::SqlNotSupported {
        feature: feature.into(),
        hint: hint.into(),
    }
}

/// SQL 비교 연산자 → CompareOp 텍스트
pub fn convert_compare_op(op: &SqlBinaryOp) -> FlatqResult<CompareOp> {
    match op {
        SqlBinaryOp::Eq => Ok(CompareOp::Eq),
        SqlBinaryOp::NotEq => Ok(CompareOp::NotEq),
        SqlBinaryOp::Lt => Ok(CompareOp::Lt),
        SqlBinaryOp::LtEq => Ok(CompareOp::LtEq),
        SqlBinaryOp::Gt => Ok(CompareOp::Gt),
        SqlBinaryOp::GtEq => Ok(CompareOp::GtEq),
        other => Err(FlatqError::UnsupportedOperator(other.to_string())),
    }
}

/// `5 < age` is planned as `age > 5`.
fn flip(op: CompareOp) -> CompareOp {
    match op {
        CompareOp::Gt => CompareOp::Lt,
        CompareOp::Lt => CompareOp::Gt,
        CompareOp::GtEq => CompareOp::LtEq,
        CompareOp::LtEq => CompareOp::GtEq,
        other => other,
    }
}

/// Extract a usize from a SQL literal expression (for LIMIT/OFFSET).
pub fn extract_usize(expr: &SqlExpr) -> FlatqResult<usize> {
    match expr {
        SqlExpr::Value(SqlValue::Number(n, _)) => {
            n.parse::<usize>().map_err(|_| FlatqError::SqlParse {
                message: format!("LIMIT/OFFSET value must be a non-negative integer, got: {n}"),
                sql: expr.to_string(),
            })
        }
        _ => Err(not_supported(
            format!("Non-literal LIMIT/OFFSET expression: {expr}"),
            "Use an integer literal",
        )),
    }
}

/// `users` / `db.users` → table name text
fn object_name(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|ident| ident.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// Field reference text for an identifier expression, if it is one.
fn column_name(expr: &SqlExpr) -> Option<String> {
    match expr {
        SqlExpr::Identifier(ident) => Some(ident.value.clone()),
        SqlExpr::CompoundIdentifier(idents) => Some(
            idents
                .iter()
                .map(|i| i.value.as_str())
                .collect::<Vec<_>>()
                .join("."),
        ),
        SqlExpr::Nested(inner) => column_name(inner),
        _ => None,
    }
}

/// Literal on the value side of a comparison or in a VALUES row.
///
/// Numbers stay text; coercion happens at comparison time.
fn literal(expr: &SqlExpr) -> FlatqResult<Value> {
    match expr {
        SqlExpr::Value(value) => Ok(match value {
            SqlValue::Null => Value::Null,
            SqlValue::Number(n, _) => Value::Text(n.clone()),
            SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
                Value::Text(s.clone())
            }
            SqlValue::Boolean(b) => Value::Text(b.to_string()),
            other => Value::Text(other.to_string()),
        }),
        SqlExpr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match inner.as_ref() {
            SqlExpr::Value(SqlValue::Number(n, _)) => Ok(Value::Text(format!("-{n}"))),
            _ => Err(not_supported(
                format!("expression as value: {expr}"),
                "Use a literal value",
            )),
        },
        SqlExpr::UnaryOp {
            op: UnaryOperator::Plus,
            expr: inner,
        } => literal(inner),
        // "text" parses as a quoted identifier in the generic dialect
        SqlExpr::Identifier(ident) if ident.quote_style == Some('"') => {
            Ok(Value::Text(ident.value.clone()))
        }
        SqlExpr::Nested(inner) => literal(inner),
        _ => Err(not_supported(
            format!("expression as value: {expr}"),
            "Use a literal value",
        )),
    }
}

/// Lower a WHERE expression into AND-combined clauses.
fn lower_where(expr: &SqlExpr, out: &mut Vec<WhereClause>) -> FlatqResult<()> {
    match expr {
        SqlExpr::Nested(inner) => lower_where(inner, out),
        SqlExpr::BinaryOp {
            left,
            op: SqlBinaryOp::And,
            right,
        } => {
            lower_where(left, out)?;
            lower_where(right, out)
        }
        SqlExpr::BinaryOp {
            op: SqlBinaryOp::Or,
            ..
        } => Err(not_supported(
            "OR in WHERE clause",
            "Only AND-combined comparisons are supported",
        )),
        SqlExpr::BinaryOp { left, op, right } => {
            let operator = convert_compare_op(op)?;
            let field_of = |e: &SqlExpr| column_name(e).filter(|_| !is_quoted_literal(e));
            let clause = if let Some(field) = field_of(left.as_ref()) {
                WhereClause {
                    field,
                    operator,
                    value: literal(right)?,
                }
            } else if let Some(field) = field_of(right.as_ref()) {
                WhereClause {
                    field,
                    operator: flip(operator),
                    value: literal(left)?,
                }
            } else {
                return Err(not_supported(
                    format!("comparison without a field: {expr}"),
                    "Compare a field with a literal (e.g. age > 30)",
                ));
            };
            out.push(clause);
            Ok(())
        }
        SqlExpr::Like {
            negated,
            expr: target,
            pattern,
            ..
        }
        | SqlExpr::ILike {
            negated,
            expr: target,
            pattern,
            ..
        } => {
            if *negated {
                return Err(FlatqError::UnsupportedOperator("NOT LIKE".to_string()));
            }
            let field = column_name(target).ok_or_else(|| {
                not_supported(format!("LIKE on expression: {target}"), "Use a field name")
            })?;
            out.push(WhereClause {
                field,
                operator: CompareOp::Like,
                value: literal(pattern)?,
            });
            Ok(())
        }
        SqlExpr::IsNull(target) | SqlExpr::IsNotNull(target) => {
            let field = column_name(target).ok_or_else(|| {
                not_supported(format!("IS NULL on expression: {target}"), "Use a field name")
            })?;
            let operator = if matches!(expr, SqlExpr::IsNull(_)) {
                CompareOp::Eq
            } else {
                CompareOp::NotEq
            };
            out.push(WhereClause {
                field,
                operator,
                value: Value::Null,
            });
            Ok(())
        }
        other => Err(FlatqError::UnsupportedOperator(other.to_string())),
    }
}

fn is_quoted_literal(expr: &SqlExpr) -> bool {
    matches!(expr, SqlExpr::Identifier(ident) if ident.quote_style == Some('"'))
}

fn plan_where(selection: Option<&SqlExpr>) -> FlatqResult<Vec<WhereClause>> {
    let mut clauses = Vec::new();
    if let Some(expr) = selection {
        lower_where(expr, &mut clauses)?;
    }
    Ok(clauses)
}

/// 논리 플래너: AST → 쿼리 설명 변환
pub struct QueryPlanner {
    parser: SqlParser,
}

impl QueryPlanner {
    pub fn new() -> Self {
        Self {
            parser: SqlParser::new(),
        }
    }

    /// SELECT 텍스트 → QueryDescription
    pub fn plan_select(&self, sql: &str) -> FlatqResult<QueryDescription> {
        match self.parser.parse_one(sql)? {
            Statement::Query(query) => self.plan_query(&query),
            _ => Err(expected("SELECT", sql)),
        }
    }

    /// INSERT 텍스트 → InsertQuery
    pub fn plan_insert(&self, sql: &str) -> FlatqResult<InsertQuery> {
        let Statement::Insert(insert) = self.parser.parse_one(sql)? else {
            return Err(expected("INSERT", sql));
        };

        let table = object_name(&insert.table_name);
        let columns: Vec<String> = insert.columns.iter().map(|c| c.value.clone()).collect();
        if columns.is_empty() {
            return Err(not_supported(
                "INSERT without a column list",
                "Name the columns: INSERT INTO t (a, b) VALUES (...)",
            ));
        }

        let rows = match insert.source.as_deref().map(|q| q.body.as_ref()) {
            Some(SetExpr::Values(values)) => &values.rows,
            Some(_) => {
                return Err(not_supported(
                    "INSERT with SELECT",
                    "Only INSERT INTO ... VALUES (...) is supported",
                ));
            }
            None => {
                return Err(not_supported(
                    "INSERT without VALUES",
                    "INSERT INTO ... VALUES (...) is required",
                ));
            }
        };
        let [row] = rows.as_slice() else {
            return Err(not_supported(
                "multi-row INSERT",
                "Insert one row per statement",
            ));
        };

        let values = row.iter().map(literal).collect::<FlatqResult<Vec<_>>>()?;
        if values.len() != columns.len() {
            return Err(FlatqError::SqlParse {
                message: format!(
                    "INSERT has {} columns but {} values",
                    columns.len(),
                    values.len()
                ),
                sql: sql.to_string(),
            });
        }

        Ok(InsertQuery {
            table,
            columns,
            values,
        })
    }

    /// DELETE 텍스트 → DeleteQuery
    pub fn plan_delete(&self, sql: &str) -> FlatqResult<DeleteQuery> {
        let Statement::Delete(delete) = self.parser.parse_one(sql)? else {
            return Err(expected("DELETE", sql));
        };

        let tables = match &delete.from {
            FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
        };
        let [table] = tables.as_slice() else {
            return Err(not_supported(
                "DELETE from several tables",
                "Delete from one table per statement",
            ));
        };
        if !table.joins.is_empty() {
            return Err(not_supported("DELETE with JOIN", "Delete from one table"));
        }

        Ok(DeleteQuery {
            table: self.plan_table(&table.relation)?,
            where_clauses: plan_where(delete.selection.as_ref())?,
        })
    }

    /// Query → QueryDescription 변환
    fn plan_query(&self, query: &Query) -> FlatqResult<QueryDescription> {
        if query.with.is_some() {
            return Err(not_supported("WITH clause", "Subqueries are not supported"));
        }
        let mut description = match query.body.as_ref() {
            SetExpr::Select(select) => self.plan_select_body(select)?,
            _ => {
                return Err(not_supported(
                    "Non-SELECT queries",
                    "Only plain SELECT queries are supported",
                ));
            }
        };

        // ORDER BY (lives on Query, not Select in sqlparser 0.52)
        if let Some(order_by) = &query.order_by {
            let specs: Vec<OrderBySpec> = order_by
                .exprs
                .iter()
                .map(|ob| self.plan_order_by_expr(ob))
                .collect();
            if !specs.is_empty() {
                description.order_by = Some(specs);
            }
        }

        // LIMIT / OFFSET
        if let Some(limit) = &query.limit {
            description.limit = Some(extract_usize(limit)?);
        }
        if let Some(offset) = &query.offset {
            description.offset = extract_usize(&offset.value)?;
        }

        Ok(description)
    }

    /// SELECT 본문 → QueryDescription
    fn plan_select_body(&self, select: &Select) -> FlatqResult<QueryDescription> {
        let distinct = match &select.distinct {
            None => false,
            Some(Distinct::Distinct) => true,
            Some(Distinct::On(_)) => {
                return Err(not_supported("DISTINCT ON", "Use plain DISTINCT"));
            }
        };
        if select.having.is_some() {
            return Err(not_supported("HAVING clause", "Filter with WHERE instead"));
        }

        let (table, join) = self.plan_from(&select.from)?;
        let fields = self.plan_projection(&select.projection)?;

        let group_by = match &select.group_by {
            GroupByExpr::Expressions(exprs, _) if exprs.is_empty() => None,
            GroupByExpr::Expressions(exprs, _) => Some(
                exprs
                    .iter()
                    .map(|e| column_name(e).unwrap_or_else(|| e.to_string()))
                    .collect(),
            ),
            GroupByExpr::All(_) => {
                return Err(not_supported("GROUP BY ALL", "List the grouping fields"));
            }
        };

        Ok(QueryDescription {
            fields,
            table,
            join,
            where_clauses: plan_where(select.selection.as_ref())?,
            group_by,
            order_by: None,
            limit: None,
            offset: 0,
            distinct,
        })
    }

    fn plan_order_by_expr(&self, ob: &SqlOrderByExpr) -> OrderBySpec {
        OrderBySpec {
            field: column_name(&ob.expr).unwrap_or_else(|| ob.expr.to_string()),
            asc: ob.asc.unwrap_or(true),
        }
    }

    fn plan_table(&self, relation: &TableFactor) -> FlatqResult<String> {
        match relation {
            TableFactor::Table { name, alias, .. } => {
                if alias.is_some() {
                    return Err(not_supported(
                        "Table aliases",
                        "Qualify fields with the table name instead",
                    ));
                }
                Ok(object_name(name))
            }
            _ => Err(not_supported(
                "Complex table expressions",
                "Use simple table names only",
            )),
        }
    }

    /// FROM 절 → (메인 테이블, JOIN)
    fn plan_from(&self, from: &[TableWithJoins]) -> FlatqResult<(String, Option<JoinSpec>)> {
        let [table_with_joins] = from else {
            return Err(if from.is_empty() {
                not_supported("SELECT without FROM", "FROM clause is required")
            } else {
                not_supported(
                    "Multiple tables in FROM clause",
                    "Use JOIN syntax or separate queries",
                )
            });
        };

        let table = self.plan_table(&table_with_joins.relation)?;
        let join = match table_with_joins.joins.as_slice() {
            [] => None,
            [join] => {
                let join_table = self.plan_table(&join.relation)?;
                let (join_type, constraint) = plan_join_operator(&join.join_operator)?;
                let condition = plan_join_condition(constraint, &join_table)?;
                Some(JoinSpec {
                    join_type,
                    table: join_table,
                    condition,
                })
            }
            _ => {
                return Err(not_supported(
                    "Multi-table joins",
                    "Join at most two tables per query",
                ));
            }
        };
        Ok((table, join))
    }

    /// SELECT 목록 → Vec<SelectField>
    fn plan_projection(&self, projection: &[SelectItem]) -> FlatqResult<Vec<SelectField>> {
        projection
            .iter()
            .map(|item| match item {
                SelectItem::Wildcard(_) => Ok(SelectField::Wildcard),
                SelectItem::UnnamedExpr(expr) => Ok(match column_name(expr) {
                    Some(name) => SelectField::Column(name),
                    // aggregates are recognized from their text, once
                    None => SelectField::parse(&expr.to_string()),
                }),
                SelectItem::ExprWithAlias { .. } => Err(not_supported(
                    "Column aliases",
                    "Remove the AS alias",
                )),
                SelectItem::QualifiedWildcard(..) => Err(not_supported(
                    "Qualified wildcard",
                    "Use * or list the fields",
                )),
            })
            .collect()
    }
}

impl Default for QueryPlanner {
    fn default() -> Self {
        Self::new()
    }
}

fn expected(kind: &str, sql: &str) -> FlatqError {
    FlatqError::SqlParse {
        message: format!("expected a {kind} statement"),
        sql: sql.to_string(),
    }
}

fn plan_join_operator(op: &JoinOperator) -> FlatqResult<(JoinType, &JoinConstraint)> {
    let (kind, constraint) = match op {
        JoinOperator::Inner(c) => ("INNER", c),
        JoinOperator::LeftOuter(c) => ("LEFT", c),
        JoinOperator::RightOuter(c) => ("RIGHT", c),
        other => {
            // FullOuter → FULL, CrossJoin → CROSS, LeftSemi(..) → LEFTSEMI
            let name = format!("{other:?}");
            let name = name.split('(').next().unwrap_or_default();
            let name = name.strip_suffix("Join").unwrap_or(name);
            let name = name.strip_suffix("Outer").unwrap_or(name);
            return Err(FlatqError::UnsupportedJoinType(name.to_uppercase()));
        }
    };
    Ok((JoinType::parse(kind)?, constraint))
}

/// `ON a.x = b.y` → JoinCondition, main-table side first.
fn plan_join_condition(constraint: &JoinConstraint, join_table: &str) -> FlatqResult<JoinCondition> {
    let expr = match constraint {
        JoinConstraint::On(expr) => expr,
        JoinConstraint::Using(_) => {
            return Err(not_supported(
                "JOIN USING clause",
                "Use ON clause instead (e.g., ON a.id = b.id)",
            ));
        }
        _ => {
            return Err(not_supported(
                "JOIN without ON condition",
                "Use ON clause (e.g., ON a.id = b.id)",
            ));
        }
    };

    let expr = match expr {
        SqlExpr::Nested(inner) => inner.as_ref(),
        other => other,
    };
    let SqlExpr::BinaryOp {
        left,
        op: SqlBinaryOp::Eq,
        right,
    } = expr
    else {
        return Err(not_supported(
            format!("JOIN condition: {expr}"),
            "Only single equality conditions are supported",
        ));
    };
    let (Some(left), Some(right)) = (column_name(left), column_name(right)) else {
        return Err(not_supported(
            format!("JOIN condition: {expr}"),
            "Compare two fields (e.g., ON a.id = b.id)",
        ));
    };

    let prefix = format!("{join_table}.");
    if left.starts_with(&prefix) && !right.starts_with(&prefix) {
        Ok(JoinCondition::new(right, left))
    } else {
        Ok(JoinCondition::new(left, right))
    }
}

/// SELECT 텍스트를 파싱해 QueryDescription 생성
pub fn parse_select_query(sql: &str) -> FlatqResult<QueryDescription> {
    QueryPlanner::new().plan_select(sql)
}

/// INSERT 텍스트를 파싱해 InsertQuery 생성
pub fn parse_insert_query(sql: &str) -> FlatqResult<InsertQuery> {
    QueryPlanner::new().plan_insert(sql)
}

/// DELETE 텍스트를 파싱해 DeleteQuery 생성
pub fn parse_delete_query(sql: &str) -> FlatqResult<DeleteQuery> {
    QueryPlanner::new().plan_delete(sql)
}
