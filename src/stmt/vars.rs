//! Output variables for DML RETURNING

use std::sync::Arc;

use parking_lot::RwLock;

use super::fromsql::FromSql;
use crate::{Result, Error, err::codes, types::{ColumnType, Value}};

struct Inner {
    ctype: ColumnType,
    /// Maximum byte size of a captured Varchar/Raw value
    size: usize,
    /// Declared bind-array capacity: the number of execution iterations
    /// the variable can collect batches for
    capacity: usize,
    /// One batch of captured values per execution iteration
    batches: Vec<Vec<Value>>,
}

/// A buffer that captures the values a RETURNING clause produces.
///
/// A `Variable` is bound to a statement parameter like any other argument
/// and filled in by the engine during execution. Each execution call
/// replaces its content: `execute` records a single batch with one value
/// per affected row, `execute_many` records one such batch per iteration.
///
/// # Example
///
/// ```
/// use pythia::Variable;
///
/// # let oracle = pythia::env()?;
/// # let session = oracle.connect("sandbox", "vars_doc", "")?;
/// # session.prepare("CREATE TABLE tasks (id NUMBER(9), title VARCHAR2(50))")?.execute(())?;
/// # session.prepare("INSERT INTO tasks VALUES (1, 'one')")?.execute(())?;
/// # session.prepare("INSERT INTO tasks VALUES (2, 'two')")?.execute(())?;
/// let stmt = session.prepare("
///     UPDATE tasks SET title = UPPER(title)
///     RETURNING id, title INTO :ids, :titles
/// ")?;
/// let ids = Variable::number();
/// let titles = Variable::varchar(50);
/// let count = stmt.execute((("IDS", &ids), ("TITLES", &titles)))?;
///
/// assert_eq!(count, 2);
/// assert_eq!(ids.values::<i32>()?, vec![1, 2]);
/// assert_eq!(titles.values::<String>()?, vec!["ONE", "TWO"]);
/// # Ok::<(),pythia::Error>(())
/// ```
#[derive(Clone)]
pub struct Variable {
    inner: Arc<RwLock<Inner>>,
}

impl Variable {
    fn new(ctype: ColumnType, size: usize) -> Self {
        let inner = Inner { ctype, size, capacity: 1, batches: Vec::new() };
        Self { inner: Arc::new(RwLock::new(inner)) }
    }

    /// Creates a NUMBER output variable.
    pub fn number() -> Self {
        Self::new(ColumnType::Number, 0)
    }

    /// Creates a VARCHAR2 output variable with the specified maximum
    /// byte size per captured value.
    pub fn varchar(size: usize) -> Self {
        Self::new(ColumnType::Varchar, size)
    }

    /// Creates a RAW output variable with the specified maximum byte
    /// size per captured value.
    pub fn raw(size: usize) -> Self {
        Self::new(ColumnType::Raw, size)
    }

    /// Declares the bind-array capacity. Array executions with more
    /// iterations than the variable can hold are rejected.
    pub fn with_capacity(self, capacity: usize) -> Self {
        self.inner.write().capacity = capacity.max(1);
        self
    }

    pub fn data_type(&self) -> ColumnType {
        self.inner.read().ctype
    }

    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    /// Validates and converts a value the engine is about to capture.
    pub(crate) fn check_capture(&self, val: Value) -> Result<Value> {
        let inner = self.inner.read();
        let val = val.coerce_to(inner.ctype)?;
        match inner.ctype {
            ColumnType::Varchar | ColumnType::Raw if val.byte_len() > inner.size => {
                Err( Error::db(codes::VALUE_ERROR, "numeric or value error: character string buffer too small") )
            }
            _ => Ok(val),
        }
    }

    pub(crate) fn replace(&self, batches: Vec<Vec<Value>>) {
        self.inner.write().batches = batches;
    }

    /// Total number of rows captured by the most recent execution.
    pub fn rows_returned(&self) -> usize {
        self.inner.read().batches.iter().map(|batch| batch.len()).sum()
    }

    /// Reports whether the most recent execution captured no usable value.
    pub fn is_null(&self) -> bool {
        !self.inner.read().batches.iter().any(|batch| batch.iter().any(|val| !val.is_null()))
    }

    /// The first captured value, if there is one and it is not NULL.
    pub fn value<T>(&self) -> Result<Option<T>> where T: for<'v> FromSql<'v> {
        let inner = self.inner.read();
        match inner.batches.iter().flatten().next() {
            None | Some(Value::Null) => Ok(None),
            Some(val) => T::value(val).map(Some),
        }
    }

    /// All captured values across iterations, in capture order.
    pub fn values<T>(&self) -> Result<Vec<T>> where T: for<'v> FromSql<'v> {
        let inner = self.inner.read();
        inner.batches.iter().flatten().map(|val| T::value(val)).collect()
    }

    /// Captured values grouped by execution iteration: `execute` produces
    /// a single batch, `execute_many` one batch per input row.
    pub fn batches<T>(&self) -> Result<Vec<Vec<T>>> where T: for<'v> FromSql<'v> {
        let inner = self.inner.read();
        inner.batches.iter()
            .map(|batch| batch.iter().map(|val| T::value(val)).collect())
            .collect()
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Variable")
            .field("data_type", &inner.ctype)
            .field("capacity", &inner.capacity)
            .field("rows", &inner.batches.iter().map(|batch| batch.len()).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::number::IntoNumber;

    #[test]
    fn captures_are_size_checked() {
        let var = Variable::varchar(2);
        assert!(var.check_capture(Value::text("OK")).is_ok());
        let err = var.check_capture(Value::text("three")).unwrap_err();
        assert_eq!(err.code(), Some(6502));
    }

    #[test]
    fn values_flatten_batches() -> Result<()> {
        let var = Variable::number().with_capacity(2);
        var.replace(vec![
            vec![Value::number(1.into_number())],
            vec![Value::number(2.into_number()), Value::number(3.into_number())],
        ]);
        assert_eq!(var.rows_returned(), 3);
        assert_eq!(var.values::<i32>()?, vec![1, 2, 3]);
        assert_eq!(var.batches::<i32>()?, vec![vec![1], vec![2, 3]]);
        assert_eq!(var.value::<i32>()?, Some(1));
        Ok(())
    }

    #[test]
    fn no_rows_is_null() {
        let var = Variable::number();
        var.replace(vec![Vec::new()]);
        assert!(var.is_null());
        assert_eq!(var.rows_returned(), 0);
        assert_eq!(var.values::<i32>().unwrap(), Vec::<i32>::new());
        assert_eq!(var.batches::<i32>().unwrap(), vec![Vec::<i32>::new()]);
    }
}
