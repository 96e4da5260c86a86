//! Rows (result set) of a query

use std::sync::Arc;

use parking_lot::Mutex;

use super::Position;
use super::fromsql::FromSql;
use crate::{Result, Error, types::{ColumnType, Value}};

/// Metadata of a single select-list column.
#[derive(Debug, Clone)]
pub(crate) struct ColumnMeta {
    pub name: String,
    pub ctype: Option<ColumnType>,
}

/// Describes a column of the executed query.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    name: String,
    ctype: Option<ColumnType>,
}

impl ColumnInfo {
    pub(crate) fn new(meta: &ColumnMeta) -> Self {
        Self { name: meta.name.clone(), ctype: meta.ctype }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The column data type, when the select list item maps directly to
    /// a table column.
    pub fn data_type(&self) -> Option<ColumnType> {
        self.ctype
    }
}

/// Result set of a query.
///
/// `Rows` is a "streaming iterator": rows are surrendered one at a time
/// via [`next`](Rows::next).
#[derive(Debug)]
pub struct Rows {
    columns: Arc<Vec<ColumnMeta>>,
    rows: Mutex<std::vec::IntoIter<Vec<Value>>>,
}

impl Rows {
    pub(crate) fn new(columns: Arc<Vec<ColumnMeta>>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows: Mutex::new(rows.into_iter()) }
    }

    /**
        Returns the next row in the result set, or `None` when the result
        set is exhausted.

        # Example

        ```
        # let oracle = pythia::env()?;
        # let session = oracle.connect("sandbox", "rows_doc", "")?;
        # session.prepare("CREATE TABLE towns (name VARCHAR2(30), population NUMBER)")?.execute(())?;
        # session.prepare("INSERT INTO towns VALUES ('Delphi', 1500)")?.execute(())?;
        # session.prepare("INSERT INTO towns VALUES ('Dodona', 800)")?.execute(())?;
        let stmt = session.prepare("
            SELECT name, population FROM towns
             WHERE population >= :p
             ORDER BY name
        ")?;
        let rows = stmt.query(500)?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            let name : &str = row.get(0)?;
            let population : u32 = row.get("POPULATION")?;
            names.push(format!("{} ({})", name, population));
        }
        assert_eq!(names, vec!["Delphi (1500)", "Dodona (800)"]);
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn next(&self) -> Result<Option<Row>> {
        let row = self.rows.lock().next();
        Ok( row.map(|values| Row { columns: self.columns.clone(), values }) )
    }
}

/// A single row of the result set.
pub struct Row {
    columns: Arc<Vec<ColumnMeta>>,
    values: Vec<Value>,
}

impl Row {
    fn column_index(&self, pos: impl Position) -> Result<usize> {
        if let Some(ix) = pos.index() {
            return if ix < self.values.len() {
                Ok(ix)
            } else {
                Err( Error::msg(format!("Row has no column at position {}", ix)) )
            };
        }
        if let Some(name) = pos.name() {
            let ix = self.columns.iter().position(|col| col.name == name)
                .or_else(|| {
                    let name = name.to_uppercase();
                    self.columns.iter().position(|col| col.name == name)
                });
            return ix.ok_or_else(|| Error::msg(format!("Row has no column {}", name)));
        }
        Err( Error::new("Column not found.") )
    }

    /**
        Returns the value of the specified column. Use an `Option` to
        retrieve a value that might be NULL.
    */
    pub fn get<'r, T: FromSql<'r>>(&'r self, pos: impl Position) -> Result<T> {
        let ix = self.column_index(pos)?;
        T::value(&self.values[ix])
    }

    /// Checks whether the value of the specified column is NULL.
    pub fn is_null(&self, pos: impl Position) -> Result<bool> {
        let ix = self.column_index(pos)?;
        Ok( self.values[ix].is_null() )
    }
}
