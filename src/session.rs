//! User session

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Result, Environment, Statement, db::Database, types::Value};

/// Represents a user session attached to one of the environment databases.
///
/// A session tracks its own transaction restore points. Note that the
/// engine provides no isolation: uncommitted changes are immediately
/// visible to other sessions of the same database.
pub struct Session<'a> {
    env: &'a Environment,
    db: Arc<Database>,
    user: String,
    undo: Mutex<HashMap<String, Vec<Vec<Value>>>>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(env: &'a Environment, db: Arc<Database>, user: &str) -> Self {
        Self { env, db, user: user.to_string(), undo: Mutex::new(HashMap::new()) }
    }

    pub(crate) fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the environment this session is attached to.
    pub fn environment(&self) -> &'a Environment {
        self.env
    }

    /// Saves the pre-transaction image of a table before its first
    /// modification since the last commit.
    pub(crate) fn save_restore_point(&self, table: &str, rows: &[Vec<Value>]) {
        let mut undo = self.undo.lock();
        undo.entry(table.to_string()).or_insert_with(|| rows.to_vec());
    }

    /// DDL ends the open transaction.
    pub(crate) fn end_transaction(&self) {
        self.undo.lock().clear();
    }

    /**
        Prepares an SQL statement for execution.

        # Example

        ```
        # let oracle = pythia::env()?;
        # let session = oracle.connect("sandbox", "tester", "")?;
        # session.prepare("CREATE TABLE nums (n NUMBER)")?.execute(())?;
        let stmt = session.prepare("INSERT INTO nums VALUES (:n)")?;
        let count = stmt.execute(42)?;
        assert_eq!(count, 1);
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        log::debug!("prepare: {}", sql.trim());
        Statement::new(sql, self)
    }

    /// Makes the changes of the current transaction permanent.
    pub fn commit(&self) -> Result<()> {
        self.undo.lock().clear();
        Ok(())
    }

    /// Undoes the changes of the current transaction.
    pub fn rollback(&self) -> Result<()> {
        let undo: Vec<_> = self.undo.lock().drain().collect();
        for (table, rows) in undo {
            self.db.restore(&table, rows);
        }
        Ok(())
    }

    pub fn user_name(&self) -> &str {
        &self.user
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}
