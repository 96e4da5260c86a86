//! Recursive-descent statement parser.
//!
//! Besides the AST the parser produces the statement's parameter list:
//! placeholder names in order of first appearance, with repeated names
//! referring to a single parameter.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{tokenize, Token};
use crate::{Result, Error, err::codes, types::{ColumnType, Number, Value}};

/// A statement parsed and ready for execution.
#[derive(Debug)]
pub(crate) struct ParsedStmt {
    pub stmt: Stmt,
    /// Placeholder names, uppercase, in order of first appearance
    pub params: Vec<String>,
    /// Indexes of the parameters named in RETURNING ... INTO
    pub out_params: Vec<usize>,
}

impl ParsedStmt {
    pub fn kind(&self) -> StmtKind {
        self.stmt.kind()
    }

    pub fn is_returning(&self) -> bool {
        self.stmt.returning().is_some()
    }
}

pub(crate) fn parse(sql: &str) -> Result<ParsedStmt> {
    let tokens = tokenize(sql)?;
    let mut parser = Parser { tokens, pos: 0, params: Vec::new(), idxs: HashMap::new() };
    let stmt = parser.statement()?;
    if parser.pos < parser.tokens.len() {
        return Err( Error::db(codes::COMMAND_NOT_ENDED, "SQL command not properly ended") );
    }
    let out_params = stmt.returning().map(|ret| ret.into.clone()).unwrap_or_default();
    Ok(ParsedStmt { stmt, params: parser.params, out_params })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    params: Vec<String>,
    idxs: HashMap<String, usize>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.next() {
            Some(tok) if tok == token => Ok(()),
            _ => Err( Error::db(codes::COMMAND_NOT_ENDED, "SQL command not properly ended") ),
        }
    }

    fn peek_kw(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == kw)
    }

    fn accept_kw(&mut self, kw: &str) -> bool {
        if self.peek_kw(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_kw(&mut self, kw: &str) -> Result<()> {
        if self.accept_kw(kw) {
            Ok(())
        } else {
            Err( Error::invalid_sql() )
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err( Error::invalid_sql() ),
        }
    }

    /// Registers a placeholder, deduplicating repeated names.
    fn param(&mut self, name: String) -> usize {
        if let Some(&ix) = self.idxs.get(&name) {
            ix
        } else {
            let ix = self.params.len();
            self.idxs.insert(name.clone(), ix);
            self.params.push(name);
            ix
        }
    }

    fn statement(&mut self) -> Result<Stmt> {
        match self.next() {
            Some(Token::Ident(kw)) => match kw.as_str() {
                "CREATE"   => self.create_table(),
                "DROP"     => self.drop_table(),
                "TRUNCATE" => self.truncate(),
                "INSERT"   => self.insert(),
                "UPDATE"   => self.update(),
                "DELETE"   => self.delete(),
                "SELECT"   => self.select(),
                _ => Err( Error::invalid_sql() ),
            },
            _ => Err( Error::invalid_sql() ),
        }
    }

    fn create_table(&mut self) -> Result<Stmt> {
        self.expect_kw("TABLE")?;
        let name = self.ident()?;
        self.expect(Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.column_def()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                _ => return Err( Error::invalid_sql() ),
            }
        }
        Ok(Stmt::CreateTable { name, columns })
    }

    fn column_def(&mut self) -> Result<ColumnDef> {
        let name = self.ident()?;
        let type_name = self.ident()?;
        let (ctype, size) = match type_name.as_str() {
            "NUMBER" | "INTEGER" | "INT" => {
                // precision and scale are accepted and ignored
                if self.peek() == Some(&Token::LParen) {
                    self.next();
                    self.size()?;
                    if self.peek() == Some(&Token::Comma) {
                        self.next();
                        self.size()?;
                    }
                    self.expect(Token::RParen)?;
                }
                (ColumnType::Number, 0)
            },
            "VARCHAR2" | "VARCHAR" => {
                self.expect(Token::LParen)?;
                let size = self.size()?;
                // an optional BYTE/CHAR length qualifier
                if self.peek_kw("BYTE") || self.peek_kw("CHAR") {
                    self.next();
                }
                self.expect(Token::RParen)?;
                (ColumnType::Varchar, size)
            },
            "RAW" => {
                self.expect(Token::LParen)?;
                let size = self.size()?;
                self.expect(Token::RParen)?;
                (ColumnType::Raw, size)
            },
            _ => return Err( Error::db(codes::INVALID_DATATYPE, "invalid datatype") ),
        };
        let not_null = if self.accept_kw("NOT") {
            self.expect_kw("NULL")?;
            true
        } else {
            false
        };
        Ok(ColumnDef { name, ctype, size, not_null })
    }

    fn size(&mut self) -> Result<usize> {
        match self.next() {
            Some(Token::Number(num)) => num.parse().map_err(|_| Error::invalid_sql()),
            _ => Err( Error::invalid_sql() ),
        }
    }

    fn drop_table(&mut self) -> Result<Stmt> {
        self.expect_kw("TABLE")?;
        let name = self.ident()?;
        Ok(Stmt::DropTable { name })
    }

    fn truncate(&mut self) -> Result<Stmt> {
        self.expect_kw("TABLE")?;
        let name = self.ident()?;
        Ok(Stmt::Truncate { name })
    }

    fn insert(&mut self) -> Result<Stmt> {
        self.expect_kw("INTO")?;
        let table = self.ident()?;
        let columns = if self.peek() == Some(&Token::LParen) {
            self.next();
            let mut cols = Vec::new();
            loop {
                cols.push(self.ident()?);
                match self.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RParen) => break,
                    _ => return Err( Error::invalid_sql() ),
                }
            }
            Some(cols)
        } else {
            None
        };
        self.expect_kw("VALUES")?;
        self.expect(Token::LParen)?;
        let mut values = Vec::new();
        loop {
            values.push(self.expr()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                _ => return Err( Error::invalid_sql() ),
            }
        }
        let returning = self.returning()?;
        Ok(Stmt::Insert { table, columns, values, returning })
    }

    fn update(&mut self) -> Result<Stmt> {
        let table = self.ident()?;
        self.expect_kw("SET")?;
        let mut set = Vec::new();
        loop {
            let column = self.ident()?;
            self.expect(Token::Eq)?;
            let value = self.expr()?;
            set.push((column, value));
            if self.peek() == Some(&Token::Comma) {
                self.next();
            } else {
                break;
            }
        }
        let filter = self.filter()?;
        let returning = self.returning()?;
        Ok(Stmt::Update { table, set, filter, returning })
    }

    fn delete(&mut self) -> Result<Stmt> {
        self.expect_kw("FROM")?;
        let table = self.ident()?;
        let filter = self.filter()?;
        let returning = self.returning()?;
        Ok(Stmt::Delete { table, filter, returning })
    }

    fn select(&mut self) -> Result<Stmt> {
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(&Token::Star) {
                self.next();
                items.push(SelectItem::Wildcard);
            } else {
                let expr = self.expr()?;
                let alias = if self.accept_kw("AS") {
                    Some(self.ident()?)
                } else if let Some(Token::Ident(name)) = self.peek() {
                    if name == "FROM" {
                        None
                    } else {
                        let name = name.clone();
                        self.next();
                        Some(name)
                    }
                } else {
                    None
                };
                items.push(SelectItem::Expr { expr, alias });
            }
            if self.peek() == Some(&Token::Comma) {
                self.next();
            } else {
                break;
            }
        }
        self.expect_kw("FROM")?;
        let table = self.ident()?;
        let filter = self.filter()?;
        let mut order = Vec::new();
        if self.accept_kw("ORDER") {
            self.expect_kw("BY")?;
            loop {
                let expr = self.expr()?;
                let desc = if self.accept_kw("DESC") {
                    true
                } else {
                    self.accept_kw("ASC");
                    false
                };
                order.push(OrderItem { expr, desc });
                if self.peek() == Some(&Token::Comma) {
                    self.next();
                } else {
                    break;
                }
            }
        }
        Ok(Stmt::Select { items, table, filter, order })
    }

    fn filter(&mut self) -> Result<Option<Expr>> {
        if self.accept_kw("WHERE") {
            Ok(Some(self.expr()?))
        } else {
            Ok(None)
        }
    }

    fn returning(&mut self) -> Result<Option<Returning>> {
        if !self.accept_kw("RETURNING") && !self.accept_kw("RETURN") {
            return Ok(None);
        }
        let mut exprs = Vec::new();
        loop {
            exprs.push(self.expr()?);
            if self.peek() == Some(&Token::Comma) {
                self.next();
            } else {
                break;
            }
        }
        self.expect_kw("INTO")?;
        let mut into = Vec::new();
        loop {
            match self.next() {
                Some(Token::Bind(name)) => into.push(self.param(name)),
                _ => return Err( Error::invalid_sql() ),
            }
            if self.peek() == Some(&Token::Comma) {
                self.next();
            } else {
                break;
            }
        }
        if into.len() < exprs.len() {
            return Err( Error::db(codes::NOT_ENOUGH_VALUES, "not enough values") );
        }
        if into.len() > exprs.len() {
            return Err( Error::db(codes::TOO_MANY_VALUES, "too many values") );
        }
        Ok(Some(Returning { exprs, into }))
    }

    // expression precedence, loosest first: OR, AND, NOT, comparison,
    // additive (+ - ||), multiplicative (* /), unary, primary

    fn expr(&mut self) -> Result<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.and_expr()?;
        while self.accept_kw("OR") {
            let rhs = self.and_expr()?;
            lhs = Expr::Binary { op: BinOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.not_expr()?;
        while self.accept_kw("AND") {
            let rhs = self.not_expr()?;
            lhs = Expr::Binary { op: BinOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.accept_kw("NOT") {
            let expr = self.not_expr()?;
            Ok(Expr::Not(Box::new(expr)))
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> Result<Expr> {
        let lhs = self.additive()?;
        if self.accept_kw("IS") {
            let negated = self.accept_kw("NOT");
            self.expect_kw("NULL")?;
            return Ok(Expr::IsNull { expr: Box::new(lhs), negated });
        }
        let op = match self.peek() {
            Some(Token::Eq) => BinOp::Eq,
            Some(Token::Ne) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.next();
        let rhs = self.additive()?;
        Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus)   => BinOp::Add,
                Some(Token::Minus)  => BinOp::Sub,
                Some(Token::Concat) => BinOp::Concat,
                _ => break,
            };
            self.next();
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star)  => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.next();
            let rhs = self.unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                let expr = self.unary()?;
                Ok(Expr::Neg(Box::new(expr)))
            },
            Some(Token::Plus) => {
                self.next();
                self.unary()
            },
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Number(num)) => {
                let num = Number::from_string(&num)?;
                Ok(Expr::Literal(Value::Number(num)))
            },
            Some(Token::Text(txt)) => Ok(Expr::Literal(Value::text(txt))),
            Some(Token::Bind(name)) => {
                let ix = self.param(name);
                Ok(Expr::Bind(ix))
            },
            Some(Token::LParen) => {
                let expr = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            },
            Some(Token::Ident(name)) => {
                if name == "NULL" {
                    return Ok(Expr::Null);
                }
                if self.peek() == Some(&Token::LParen) {
                    let (func, arity) = Func::lookup(&name)
                        .ok_or_else(|| Error::invalid_identifier(&name))?;
                    self.next();
                    let mut args = Vec::new();
                    loop {
                        args.push(self.expr()?);
                        match self.next() {
                            Some(Token::Comma) => continue,
                            Some(Token::RParen) => break,
                            _ => return Err( Error::invalid_sql() ),
                        }
                    }
                    if args.len() != arity {
                        return Err( Error::invalid_sql() );
                    }
                    Ok(Expr::Call { func, args })
                } else {
                    Ok(Expr::Column(name))
                }
            },
            _ => Err( Error::invalid_sql() ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_dedup_in_order() -> Result<()> {
        let parsed = parse("
            INSERT INTO locations (location_id, state_province, city, postal_code, street_address)
            VALUES (:id, :na, :na, :code, :na)
        ")?;
        assert_eq!(parsed.params, vec!["ID", "NA", "CODE"]);
        assert!(parsed.out_params.is_empty());
        assert_eq!(parsed.kind(), StmtKind::Dml);
        Ok(())
    }

    #[test]
    fn returning_into_marks_out_params() -> Result<()> {
        let parsed = parse("
            UPDATE emp SET salary = salary * :rate
             WHERE id = :id
            RETURNING id, salary INTO :out_id, :out_salary
        ")?;
        assert_eq!(parsed.params, vec!["RATE", "ID", "OUT_ID", "OUT_SALARY"]);
        assert_eq!(parsed.out_params, vec![2, 3]);
        assert!(parsed.is_returning());
        Ok(())
    }

    #[test]
    fn returning_arity_checked() {
        let err = parse("DELETE FROM t RETURNING a, b INTO :v").unwrap_err();
        assert_eq!(err.code(), Some(947));
        let err = parse("DELETE FROM t RETURNING a INTO :v, :w").unwrap_err();
        assert_eq!(err.code(), Some(913));
    }

    #[test]
    fn create_table_columns() -> Result<()> {
        let parsed = parse("
            CREATE TABLE test_log (
                id       NUMBER(9) NOT NULL,
                message  VARCHAR2(400),
                payload  RAW(16)
            )
        ")?;
        match parsed.stmt {
            Stmt::CreateTable { name, columns } => {
                assert_eq!(name, "TEST_LOG");
                assert_eq!(columns.len(), 3);
                assert_eq!(columns[0].name, "ID");
                assert!(columns[0].not_null);
                assert_eq!(columns[1].ctype, ColumnType::Varchar);
                assert_eq!(columns[1].size, 400);
                assert_eq!(columns[2].ctype, ColumnType::Raw);
            },
            _ => panic!("expected CREATE TABLE"),
        }
        Ok(())
    }

    #[test]
    fn rejects_unknown_statements_and_types() {
        assert_eq!(parse("GRANT ALL TO PUBLIC").unwrap_err().code(), Some(900));
        assert_eq!(parse("CREATE TABLE t (c BLOB)").unwrap_err().code(), Some(902));
        assert_eq!(parse("DROP TABLE t CASCADE EXTRA").unwrap_err().code(), Some(933));
    }

    #[test]
    fn expression_precedence() -> Result<()> {
        let parsed = parse("SELECT 1 + 2 * 3 FROM t")?;
        match parsed.stmt {
            Stmt::Select { items, .. } => {
                let rendered = match &items[0] {
                    SelectItem::Expr { expr, .. } => expr.to_string(),
                    _ => panic!("expected expression"),
                };
                assert_eq!(rendered, "1+2*3");
            },
            _ => panic!("expected SELECT"),
        }
        Ok(())
    }
}
