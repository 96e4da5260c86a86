//! Statement execution against the storage layer

use std::cmp::Ordering;

use crate::{Result, Error, Session, err::codes};
use crate::db::check_column_value;
use crate::sql::ParsedStmt;
use crate::sql::ast::{BinOp, ColumnDef, Expr, Func, OrderItem, Returning, SelectItem, Stmt};
use crate::stmt::bind::Params;
use crate::stmt::rows::ColumnMeta;
use crate::types::{Number, Value};

/// Expression evaluation context: the table schema, the current row
/// image (absent in VALUES lists), and the statement parameters.
struct EvalCtx<'x> {
    columns: &'x [ColumnDef],
    row: Option<&'x [Value]>,
    params: &'x Params,
}

impl EvalCtx<'_> {
    fn column_value(&self, name: &str) -> Result<Value> {
        let ix = self.columns.iter().position(|col| col.name == name)
            .ok_or_else(|| Error::invalid_identifier(name))?;
        match self.row {
            Some(row) => Ok( row[ix].clone() ),
            None => Err( Error::db(codes::COLUMN_NOT_ALLOWED, "column not allowed here") ),
        }
    }

    fn value(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Null => Ok( Value::Null ),
            Expr::Literal(val) => Ok( val.clone() ),
            Expr::Column(name) => self.column_value(name),
            Expr::Bind(ix) => self.params.in_value(*ix),
            Expr::Neg(inner) => match self.value(inner)?.as_number()? {
                Some(num) => Ok( Value::Number(num.neg()) ),
                None => Ok( Value::Null ),
            },
            Expr::Binary { op, lhs, rhs } => match op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                    let lhs = self.value(lhs)?.as_number()?;
                    let rhs = self.value(rhs)?.as_number()?;
                    match (lhs, rhs) {
                        (Some(lhs), Some(rhs)) => {
                            let num = match op {
                                BinOp::Add => lhs.add(&rhs)?,
                                BinOp::Sub => lhs.sub(&rhs)?,
                                BinOp::Mul => lhs.mul(&rhs)?,
                                _          => lhs.div(&rhs)?,
                            };
                            Ok( Value::Number(num) )
                        }
                        // NULL propagates through arithmetic
                        _ => Ok( Value::Null ),
                    }
                }
                BinOp::Concat => {
                    // NULL concatenates as the empty string
                    let mut txt = self.value(lhs)?.as_text().unwrap_or_default();
                    if let Some(tail) = self.value(rhs)?.as_text() {
                        txt.push_str(&tail);
                    }
                    Ok( Value::text(txt) )
                }
                _ => Err( Error::new("a condition is not allowed here") ),
            },
            Expr::Call { func, args } => self.call(*func, args),
            Expr::Not(_) | Expr::IsNull { .. } => Err( Error::new("a condition is not allowed here") ),
        }
    }

    fn call(&self, func: Func, args: &[Expr]) -> Result<Value> {
        match func {
            Func::ToChar => Ok( match self.value(&args[0])?.as_text() {
                Some(txt) => Value::text(txt),
                None => Value::Null,
            }),
            Func::Nvl => {
                let val = self.value(&args[0])?;
                if val.is_null() {
                    self.value(&args[1])
                } else {
                    Ok(val)
                }
            }
            Func::Length => Ok( match self.value(&args[0])?.as_text() {
                Some(txt) => Value::Number(Number::from_int(txt.chars().count())),
                None => Value::Null,
            }),
            Func::Upper => Ok( match self.value(&args[0])?.as_text() {
                Some(txt) => Value::text(txt.to_uppercase()),
                None => Value::Null,
            }),
            Func::Lower => Ok( match self.value(&args[0])?.as_text() {
                Some(txt) => Value::text(txt.to_lowercase()),
                None => Value::Null,
            }),
            Func::Abs => Ok( match self.value(&args[0])?.as_number()? {
                Some(num) => Value::Number(num.abs()),
                None => Value::Null,
            }),
        }
    }

    /// Three-valued truth of a predicate. `None` is "unknown"; rows for
    /// which a filter is unknown do not match.
    fn truth(&self, expr: &Expr) -> Result<Option<bool>> {
        match expr {
            Expr::Binary { op: BinOp::And, lhs, rhs } => {
                let lhs = self.truth(lhs)?;
                let rhs = self.truth(rhs)?;
                Ok( match (lhs, rhs) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                })
            }
            Expr::Binary { op: BinOp::Or, lhs, rhs } => {
                let lhs = self.truth(lhs)?;
                let rhs = self.truth(rhs)?;
                Ok( match (lhs, rhs) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let ord = compare_values(self.value(lhs)?, self.value(rhs)?)?;
                Ok( ord.map(|ord| match op {
                    BinOp::Eq => ord == Ordering::Equal,
                    BinOp::Ne => ord != Ordering::Equal,
                    BinOp::Lt => ord == Ordering::Less,
                    BinOp::Le => ord != Ordering::Greater,
                    BinOp::Gt => ord == Ordering::Greater,
                    _         => ord != Ordering::Less,
                }))
            }
            Expr::Not(inner) => Ok( self.truth(inner)?.map(|val| !val) ),
            Expr::IsNull { expr, negated } => {
                let is_null = self.value(expr)?.is_null();
                Ok( Some(is_null != *negated) )
            }
            _ => Err( Error::new("expression is not a condition") ),
        }
    }
}

/// Comparison with implicit numeric conversion of mixed operands.
/// NULL compares as unknown.
fn compare_values(lhs: Value, rhs: Value) -> Result<Option<Ordering>> {
    if lhs.is_null() || rhs.is_null() {
        return Ok(None);
    }
    match (&lhs, &rhs) {
        (Value::Varchar(lhs), Value::Varchar(rhs)) => Ok( Some(lhs.cmp(rhs)) ),
        (Value::Raw(lhs), Value::Raw(rhs)) => Ok( Some(lhs.cmp(rhs)) ),
        _ => match (lhs.as_number()?, rhs.as_number()?) {
            (Some(lhs), Some(rhs)) => Ok( Some(lhs.compare(&rhs)) ),
            _ => Ok(None),
        }
    }
}

/// Executes DML or DDL. Returns the number of affected rows.
pub(crate) fn execute_stmt(session: &Session, parsed: &ParsedStmt, params: &mut Params) -> Result<usize> {
    match &parsed.stmt {
        Stmt::CreateTable { name, columns } => {
            session.end_transaction();
            session.database().create_table(name, columns.clone())?;
            Ok(0)
        }
        Stmt::DropTable { name } => {
            session.end_transaction();
            session.database().drop_table(name)?;
            Ok(0)
        }
        Stmt::Truncate { name } => {
            session.end_transaction();
            session.database().write(name, |table| {
                table.rows.clear();
                Ok(())
            })?;
            Ok(0)
        }
        Stmt::Insert { table, columns, values, returning } => {
            insert(session, params, table, columns.as_deref(), values, returning.as_ref())
        }
        Stmt::Update { table, set, filter, returning } => {
            update(session, params, table, set, filter.as_ref(), returning.as_ref())
        }
        Stmt::Delete { table, filter, returning } => {
            delete(session, params, table, filter.as_ref(), returning.as_ref())
        }
        Stmt::Select { .. } => Err( Error::new("Use `query` to execute SELECT") ),
    }
}

fn insert(
    session: &Session, params: &mut Params, table_name: &str,
    columns: Option<&[String]>, values: &[Expr], returning: Option<&Returning>,
) -> Result<usize> {
    session.database().write(table_name, |table| {
        let target_ixs: Vec<usize> = match columns {
            Some(cols) => cols.iter().map(|name| table.column_index(name)).collect::<Result<_>>()?,
            None => (0..table.columns.len()).collect(),
        };
        if values.len() > target_ixs.len() {
            return Err( Error::db(codes::TOO_MANY_VALUES, "too many values") );
        }
        if values.len() < target_ixs.len() {
            return Err( Error::db(codes::NOT_ENOUGH_VALUES, "not enough values") );
        }
        let mut new_row = vec![Value::Null; table.columns.len()];
        {
            let ctx = EvalCtx { columns: &table.columns, row: None, params: &*params };
            for (expr, &col_ix) in values.iter().zip(target_ixs.iter()) {
                new_row[col_ix] = ctx.value(expr)?;
            }
        }
        for (col_ix, col) in table.columns.iter().enumerate() {
            new_row[col_ix] = check_column_value(table_name, col, &new_row[col_ix])?;
        }
        let mut captures = Vec::new();
        if let Some(ret) = returning {
            let ctx = EvalCtx { columns: &table.columns, row: Some(&new_row), params: &*params };
            for (expr, &into_ix) in ret.exprs.iter().zip(ret.into.iter()) {
                captures.push((into_ix, ctx.value(expr)?));
            }
        }
        for (into_ix, val) in captures {
            params.capture(into_ix, val)?;
        }
        session.save_restore_point(table_name, &table.rows);
        table.rows.push(new_row);
        Ok(1)
    })
}

fn update(
    session: &Session, params: &mut Params, table_name: &str,
    set: &[(String, Expr)], filter: Option<&Expr>, returning: Option<&Returning>,
) -> Result<usize> {
    session.database().write(table_name, |table| {
        let set_ixs: Vec<usize> = set.iter()
            .map(|(name, _)| table.column_index(name))
            .collect::<Result<_>>()?;
        let mut planned: Vec<(usize, Vec<Value>)> = Vec::new();
        let mut captures: Vec<(usize, Value)> = Vec::new();
        for (row_ix, row) in table.rows.iter().enumerate() {
            let ctx = EvalCtx { columns: &table.columns, row: Some(row), params: &*params };
            let matches = match filter {
                Some(pred) => ctx.truth(pred)? == Some(true),
                None => true,
            };
            if !matches {
                continue;
            }
            // SET expressions see the pre-update row image
            let mut new_row = row.to_vec();
            for ((_, expr), &col_ix) in set.iter().zip(set_ixs.iter()) {
                let val = ctx.value(expr)?;
                new_row[col_ix] = check_column_value(table_name, &table.columns[col_ix], &val)?;
            }
            // RETURNING sees the post-update image
            if let Some(ret) = returning {
                let ctx = EvalCtx { columns: &table.columns, row: Some(&new_row), params: &*params };
                for (expr, &into_ix) in ret.exprs.iter().zip(ret.into.iter()) {
                    captures.push((into_ix, ctx.value(expr)?));
                }
            }
            planned.push((row_ix, new_row));
        }
        for (into_ix, val) in captures {
            params.capture(into_ix, val)?;
        }
        if planned.is_empty() {
            return Ok(0);
        }
        session.save_restore_point(table_name, &table.rows);
        let num_rows = planned.len();
        for (row_ix, new_row) in planned {
            table.rows[row_ix] = new_row;
        }
        Ok(num_rows)
    })
}

fn delete(
    session: &Session, params: &mut Params, table_name: &str,
    filter: Option<&Expr>, returning: Option<&Returning>,
) -> Result<usize> {
    session.database().write(table_name, |table| {
        let mut doomed: Vec<usize> = Vec::new();
        let mut captures: Vec<(usize, Value)> = Vec::new();
        for (row_ix, row) in table.rows.iter().enumerate() {
            let ctx = EvalCtx { columns: &table.columns, row: Some(row), params: &*params };
            let matches = match filter {
                Some(pred) => ctx.truth(pred)? == Some(true),
                None => true,
            };
            if !matches {
                continue;
            }
            if let Some(ret) = returning {
                for (expr, &into_ix) in ret.exprs.iter().zip(ret.into.iter()) {
                    captures.push((into_ix, ctx.value(expr)?));
                }
            }
            doomed.push(row_ix);
        }
        for (into_ix, val) in captures {
            params.capture(into_ix, val)?;
        }
        if doomed.is_empty() {
            return Ok(0);
        }
        session.save_restore_point(table_name, &table.rows);
        let num_rows = doomed.len();
        let mut row_ix = 0;
        table.rows.retain(|_| {
            let keep = doomed.binary_search(&row_ix).is_err();
            row_ix += 1;
            keep
        });
        Ok(num_rows)
    })
}

/// Executes a SELECT. Returns the column metadata and the result rows.
pub(crate) fn execute_query(session: &Session, parsed: &ParsedStmt, params: &Params) -> Result<(Vec<ColumnMeta>, Vec<Vec<Value>>)> {
    let (items, table_name, filter, order) = match &parsed.stmt {
        Stmt::Select { items, table, filter, order } => (items, table, filter, order),
        _ => return Err( Error::new("Use `execute` to run DML and DDL statements") ),
    };
    session.database().read(table_name, |table| {
        enum Proj<'x> {
            Col(usize),
            Expr(&'x Expr),
        }
        let mut metas = Vec::new();
        let mut projs = Vec::new();
        for item in items {
            match item {
                SelectItem::Wildcard => {
                    for (col_ix, col) in table.columns.iter().enumerate() {
                        metas.push(ColumnMeta { name: col.name.clone(), ctype: Some(col.ctype) });
                        projs.push(Proj::Col(col_ix));
                    }
                }
                SelectItem::Expr { expr, alias } => {
                    if let Expr::Column(name) = expr {
                        let col_ix = table.column_index(name)?;
                        metas.push(ColumnMeta {
                            name: alias.clone().unwrap_or_else(|| name.clone()),
                            ctype: Some(table.columns[col_ix].ctype),
                        });
                        projs.push(Proj::Col(col_ix));
                    } else {
                        metas.push(ColumnMeta {
                            name: alias.clone().unwrap_or_else(|| expr.to_string()),
                            ctype: None,
                        });
                        projs.push(Proj::Expr(expr));
                    }
                }
            }
        }
        let mut selected: Vec<(Vec<Value>, Vec<Value>)> = Vec::new();
        for row in &table.rows {
            let ctx = EvalCtx { columns: &table.columns, row: Some(row), params: &*params };
            let matches = match filter {
                Some(pred) => ctx.truth(pred)? == Some(true),
                None => true,
            };
            if !matches {
                continue;
            }
            let mut out = Vec::with_capacity(projs.len());
            for proj in &projs {
                match proj {
                    Proj::Col(col_ix) => out.push(row[*col_ix].clone()),
                    Proj::Expr(expr) => out.push(ctx.value(expr)?),
                }
            }
            let mut keys = Vec::with_capacity(order.len());
            for item in order {
                keys.push(ctx.value(&item.expr)?);
            }
            selected.push((out, keys));
        }
        if !order.is_empty() {
            selected.sort_by(|lhs, rhs| order_cmp(&lhs.1, &rhs.1, order));
        }
        let rows = selected.into_iter().map(|(row, _)| row).collect();
        Ok((metas, rows))
    })
}

fn order_cmp(lhs: &[Value], rhs: &[Value], order: &[OrderItem]) -> Ordering {
    for (key_ix, item) in order.iter().enumerate() {
        let ord = sort_cmp(&lhs[key_ix], &rhs[key_ix]);
        let ord = if item.desc { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

// NULL sorts as the largest value: last ascending, first descending.
fn sort_cmp(lhs: &Value, rhs: &Value) -> Ordering {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(lhs), Value::Number(rhs)) => lhs.compare(rhs),
        (Value::Varchar(lhs), Value::Varchar(rhs)) => lhs.cmp(rhs),
        (Value::Raw(lhs), Value::Raw(rhs)) => lhs.cmp(rhs),
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Ok(Some(lhs)), Ok(Some(rhs))) => lhs.compare(&rhs),
            _ => lhs.as_text().cmp(&rhs.as_text()),
        }
    }
}
