use crate::error::{FlatqError, FlatqResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// SQL 파서: sqlparser-rs
pub struct SqlParser {
    dialect: GenericDialect,
}

impl SqlParser {
    /// 새 SQL 파서 생성
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
        }
    }

    /// SQL 문자열을 AST로 파싱
    pub fn parse(&self, sql: &str) -> FlatqResult<Vec<Statement>> {
        Parser::parse_sql(&self.dialect, sql).map_err(|e| FlatqError::SqlParse {
            message: e.to_string(),
            sql: sql.to_string(),
        })
    }

    /// Parse text that must hold exactly one statement.
    pub fn parse_one(&self, sql: &str) -> FlatqResult<Statement> {
        let mut statements = self.parse(sql)?;
        if statements.len() != 1 {
            return Err(FlatqError::SqlParse {
                message: format!("expected exactly one statement, found {}", statements.len()),
                sql: sql.to_string(),
            });
        }
        statements.pop().ok_or_else(|| FlatqError::SqlParse {
            message: "empty statement".to_string(),
            sql: sql.to_string(),
        })
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::{SelectItem, SetExpr};

    #[test]
    fn test_parse_simple_select() {
        let parser = SqlParser::new();
        let statements = parser.parse("SELECT * FROM users").unwrap();
        assert_eq!(statements.len(), 1);

        match &statements[0] {
            Statement::Query(query) => {
                if let SetExpr::Select(select) = query.body.as_ref() {
                    assert_eq!(select.projection.len(), 1);
                    assert!(matches!(select.projection[0], SelectItem::Wildcard(_)));
                }
            }
            _ => panic!("Expected Query"),
        }
    }

    #[test]
    fn test_parse_insert_and_delete() {
        let parser = SqlParser::new();
        let insert = parser
            .parse_one("INSERT INTO users (id, name) VALUES (4, 'Dana')")
            .unwrap();
        assert!(matches!(insert, Statement::Insert(_)));
        let delete = parser.parse_one("DELETE FROM users WHERE age > 30").unwrap();
        assert!(matches!(delete, Statement::Delete(_)));
    }

    #[test]
    fn test_parse_one_rejects_multiple_statements() {
        let parser = SqlParser::new();
        let err = parser
            .parse_one("SELECT * FROM a; SELECT * FROM b;")
            .unwrap_err();
        assert!(matches!(err, FlatqError::SqlParse { .. }));
    }

    #[test]
    fn test_parse_error_keeps_sql() {
        let parser = SqlParser::new();
        match parser.parse("SELEC * FROM users") {
            Err(FlatqError::SqlParse { sql, .. }) => assert_eq!(sql, "SELEC * FROM users"),
            other => panic!("Expected SqlParse, got {other:?}"),
        }
    }
}
