//! SQL statement

pub mod args;
pub mod bind;
pub mod fromsql;
pub mod rows;
pub mod vars;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

pub use args::ToSql;
pub use rows::{ColumnInfo, Row, Rows};
pub use vars::Variable;

use bind::Params;
use rows::ColumnMeta;
use crate::{Result, Error, Session, exec, err::codes};
use crate::sql::{self, ParsedStmt};
use crate::sql::ast::StmtKind;

/// Identifies a parameter or a column either by a 0-based position
/// or by name.
pub trait Position {
    fn name(&self) -> Option<&str> {
        None
    }
    fn index(&self) -> Option<usize> {
        None
    }
}

impl Position for usize {
    fn index(&self) -> Option<usize> {
        Some(*self)
    }
}

impl Position for &str {
    fn name(&self) -> Option<&str> {
        Some(*self)
    }
}

/// Represents a prepared for execution SQL statement
pub struct Statement<'a> {
    session:  &'a Session<'a>,
    parsed:   ParsedStmt,
    params:   RwLock<Params>,
    cols:     OnceCell<Arc<Vec<ColumnMeta>>>,
    num_rows: AtomicUsize,
}

impl<'a> Statement<'a> {
    /// Creates a new statement
    pub(crate) fn new(sql: &str, session: &'a Session<'a>) -> Result<Self> {
        let parsed = sql::parse(sql)?;
        let params = Params::new(parsed.params.clone(), parsed.out_params.clone());
        Ok(Self {
            session,
            parsed,
            params: RwLock::new(params),
            cols: OnceCell::new(),
            num_rows: AtomicUsize::new(0),
        })
    }

    /**
        Executes the prepared statement. Returns the number of rows affected.

        Arguments bind positionally, or by name via `("NAME", value)` pairs.
        A `&mut` reference argument receives the value a single-row RETURNING
        clause produces for it; a [`Variable`] collects RETURNING values of
        any number of rows.

        # Example

        ```
        # let oracle = pythia::env()?;
        # let session = oracle.connect("sandbox", "stmt_exec_doc", "")?;
        # session.prepare("CREATE TABLE depts (id NUMBER(4), name VARCHAR2(30), loc NUMBER(4))")?.execute(())?;
        # session.prepare("INSERT INTO depts VALUES (120, 'Treasury', 1700)")?.execute(())?;
        let stmt = session.prepare("
            UPDATE depts
               SET loc = :loc
             WHERE id = :id
        ")?;
        let num_updated_rows = stmt.execute((
            ("ID",  120),
            ("LOC", 1800),
        ))?;
        assert_eq!(num_updated_rows, 1);
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn execute(&self, mut args: impl ToSql) -> Result<usize> {
        if self.parsed.kind() == StmtKind::Query {
            return Err( Error::new("Use `query` to execute SELECT") );
        }
        let mut params = self.params.write();
        args.bind_to(0, &mut params)?;
        params.check_out_binds()?;
        params.reset_out();
        params.begin_iteration();
        let num_rows = exec::execute_stmt(self.session, &self.parsed, &mut params)?;
        params.finish_execution();
        args.update_from_bind(0, &params);
        self.num_rows.store(num_rows, Ordering::Relaxed);
        log::debug!("executed: {} row(s)", num_rows);
        Ok(num_rows)
    }

    /**
        Executes the prepared DML statement once per element of `batch`.
        Returns the total number of rows affected across all iterations.

        IN values bind per iteration from the batch elements; the RETURNING
        output variables are bound once, via `out_args`, and collect one
        batch of values per iteration. Pass `()` for `out_args` when the
        statement has no RETURNING clause.

        Every bound output [`Variable`] must declare a capacity of at least
        the number of iterations.

        # Example

        ```
        use pythia::Variable;

        # let oracle = pythia::env()?;
        # let session = oracle.connect("sandbox", "stmt_many_doc", "")?;
        # session.prepare("CREATE TABLE events (id NUMBER(9), descr VARCHAR2(80))")?.execute(())?;
        let stmt = session.prepare("
            INSERT INTO events VALUES (:id, :descr)
            RETURNING id INTO :new_ids
        ")?;
        let new_ids = Variable::number().with_capacity(3);
        let data = [
            (("ID", 1), ("DESCR", "first")),
            (("ID", 2), ("DESCR", "second")),
            (("ID", 3), ("DESCR", "third")),
        ];
        let count = stmt.execute_many(data, ("NEW_IDS", &new_ids))?;

        assert_eq!(count, 3);
        assert_eq!(new_ids.values::<i32>()?, vec![1, 2, 3]);
        assert_eq!(new_ids.batches::<i32>()?, vec![vec![1], vec![2], vec![3]]);
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn execute_many<I>(&self, batch: I, mut out_args: impl ToSql) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: ToSql,
    {
        match self.parsed.kind() {
            StmtKind::Query => return Err( Error::new("Use `query` to execute SELECT") ),
            StmtKind::Ddl => return Err( Error::new("Array execution is only valid for INSERT, UPDATE, and DELETE") ),
            StmtKind::Dml => {}
        }
        let batch: Vec<I::Item> = batch.into_iter().collect();
        let mut params = self.params.write();
        out_args.bind_to(0, &mut params)?;
        params.check_out_binds()?;
        if self.parsed.is_returning() {
            if let Some(name) = params.scalar_out_name() {
                return Err( Error::msg(format!(
                    "Array DML RETURNING requires a Variable bind for :{}", name
                )));
            }
            for (name, var) in params.bound_vars() {
                if var.capacity() < batch.len() {
                    return Err( Error::db(codes::ARRAY_DML_ERRORS, format!(
                        "error(s) in array DML: the variable bound to :{} holds {} batches, {} iterations requested",
                        name, var.capacity(), batch.len()
                    )));
                }
            }
        }
        params.reset_out();
        let mut total = 0;
        for mut item in batch {
            item.bind_to(0, &mut params)?;
            params.begin_iteration();
            total += exec::execute_stmt(self.session, &self.parsed, &mut params)?;
        }
        params.finish_execution();
        out_args.update_from_bind(0, &params);
        self.num_rows.store(total, Ordering::Relaxed);
        log::debug!("array executed: {} row(s)", total);
        Ok(total)
    }

    /**
        Executes the prepared statement. Returns "streaming iterator" over
        the returned rows.

        # Example

        ```
        # let oracle = pythia::env()?;
        # let session = oracle.connect("sandbox", "stmt_query_doc", "")?;
        # session.prepare("CREATE TABLE emps (id NUMBER(6), last_name VARCHAR2(30), manager_id NUMBER(6))")?.execute(())?;
        # session.prepare("INSERT INTO emps VALUES (104, 'Ernst', 103)")?.execute(())?;
        # session.prepare("INSERT INTO emps VALUES (105, 'Austin', 103)")?.execute(())?;
        # session.prepare("INSERT INTO emps VALUES (108, 'Greenberg', 101)")?.execute(())?;
        let stmt = session.prepare("
            SELECT id, last_name
              FROM emps
             WHERE manager_id = :id
          ORDER BY id
        ")?;
        let rows = stmt.query(("ID", 103))?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            let name : &str = row.get("LAST_NAME")?;
            names.push(name.to_string());
        }
        assert_eq!(stmt.row_count()?, 2);
        assert_eq!(names, vec!["Ernst", "Austin"]);
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn query(&self, mut args: impl ToSql) -> Result<Rows> {
        if self.parsed.kind() != StmtKind::Query {
            return Err( Error::new("Use `execute` to run DML and DDL statements") );
        }
        let mut params = self.params.write();
        args.bind_to(0, &mut params)?;
        let (cols, data) = exec::execute_query(self.session, &self.parsed, &params)?;
        let cols = self.cols.get_or_init(|| Arc::new(cols)).clone();
        self.num_rows.store(data.len(), Ordering::Relaxed);
        log::debug!("query: {} row(s)", data.len());
        Ok( Rows::new(cols, data) )
    }

    /**
        Executes the query and returns its first row, if there is one.

        # Example

        ```
        # let oracle = pythia::env()?;
        # let session = oracle.connect("sandbox", "stmt_single_doc", "")?;
        # session.prepare("CREATE TABLE emps (id NUMBER(6), last_name VARCHAR2(30))")?.execute(())?;
        # session.prepare("INSERT INTO emps VALUES (107, 'Lorentz')")?.execute(())?;
        let stmt = session.prepare("SELECT last_name FROM emps WHERE id = :id")?;
        let row = stmt.query_single(107)?.expect("one row");
        let name : &str = row.get(0)?;
        assert_eq!(name, "Lorentz");
        assert!(stmt.query_single(99)?.is_none());
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn query_single(&self, args: impl ToSql) -> Result<Option<Row>> {
        let rows = self.query(args)?;
        rows.next()
    }

    /**
        Returns the number of rows processed by the most recent execution
        of this statement: rows affected for INSERT, UPDATE, and DELETE -
        summed over the iterations of an array execution - and rows
        produced for SELECT.
    */
    pub fn row_count(&self) -> Result<usize> {
        Ok( self.num_rows.load(Ordering::Relaxed) )
    }

    /**
        Checks whether the value returned for the output parameter is NULL.
    */
    pub fn is_null(&self, pos: impl Position) -> Result<bool> {
        self.params.read().is_null(pos)
    }

    /// Returns the number of columns in the select-list of this statement.
    /// The columns are known after the first execution of the query.
    pub fn column_count(&self) -> usize {
        self.cols.get().map(|cols| cols.len()).unwrap_or(0)
    }

    /// Returns `pos` column meta data. `pos` is 0-based. Returns None if
    /// `pos` is greater than the number of columns in the query or if the
    /// prepared statement is not a SELECT and has no columns.
    pub fn column(&self, pos: usize) -> Option<ColumnInfo> {
        self.cols.get().and_then(|cols| cols.get(pos)).map(ColumnInfo::new)
    }
}
