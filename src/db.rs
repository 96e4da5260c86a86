//! In-memory table storage

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{Result, Error, err::codes};
use crate::sql::ast::ColumnDef;
use crate::types::{ColumnType, Value};

pub(crate) struct Table {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns.iter().position(|col| col.name == name)
            .ok_or_else(|| Error::invalid_identifier(name))
    }
}

/// Coerces a value to the column type and enforces the column constraints.
pub(crate) fn check_column_value(table: &str, col: &ColumnDef, val: &Value) -> Result<Value> {
    let val = val.coerce_to(col.ctype)?;
    if val.is_null() {
        if col.not_null {
            return Err( Error::db(
                codes::CANNOT_INSERT_NULL,
                format!("cannot insert NULL into (\"{}\".\"{}\")", table, col.name)
            ));
        }
        return Ok(Value::Null);
    }
    match col.ctype {
        ColumnType::Varchar | ColumnType::Raw if col.size > 0 && val.byte_len() > col.size => {
            Err( Error::db(
                codes::VALUE_TOO_LARGE,
                format!(
                    "value too large for column \"{}\".\"{}\" (actual: {}, maximum: {})",
                    table, col.name, val.byte_len(), col.size
                )
            ))
        }
        _ => Ok(val),
    }
}

/// A named collection of tables shared by the sessions attached to it.
pub(crate) struct Database {
    name: String,
    tables: RwLock<HashMap<String, Table>>,
}

impl Database {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), tables: RwLock::new(HashMap::new()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_table(&self, name: &str, columns: Vec<ColumnDef>) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err( Error::db(codes::NAME_IN_USE, "name is already used by an existing object") );
        }
        tables.insert(name.to_string(), Table { columns, rows: Vec::new() });
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.remove(name).is_none() {
            return Err( Error::table_not_found() );
        }
        Ok(())
    }

    pub fn read<R>(&self, name: &str, action: impl FnOnce(&Table) -> Result<R>) -> Result<R> {
        let tables = self.tables.read();
        let table = tables.get(name).ok_or_else(Error::table_not_found)?;
        action(table)
    }

    pub fn write<R>(&self, name: &str, action: impl FnOnce(&mut Table) -> Result<R>) -> Result<R> {
        let mut tables = self.tables.write();
        let table = tables.get_mut(name).ok_or_else(Error::table_not_found)?;
        action(table)
    }

    /// Puts back rows saved before a transaction's first write to the table.
    /// A table dropped since then has nothing to restore into.
    pub fn restore(&self, name: &str, rows: Vec<Vec<Value>>) {
        let mut tables = self.tables.write();
        if let Some(table) = tables.get_mut(name) {
            table.rows = rows;
        }
    }
}
