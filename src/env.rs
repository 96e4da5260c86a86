//! Engine environment

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Result, Error, Session, db::Database};

/// Represents the engine environment: the registry of the in-memory
/// databases this process knows about.
///
/// While there can be multiple environments, most applications most likely
/// will need only one, created either in `main` or statically:
///
/// ```
/// use pythia::{Environment, Result};
/// use once_cell::sync::OnceCell;
///
/// fn engine() -> Result<&'static Environment> {
///     static ENV: OnceCell<Environment> = OnceCell::new();
///     ENV.get_or_try_init(||
///         Environment::new()
///     )
/// }
///
/// fn main() -> Result<()> {
///     let oracle = engine()?;
///     let session = oracle.connect("sandbox", "tester", "")?;
///     assert_eq!(session.database_name(), "SANDBOX");
///     Ok(())
/// }
/// ```
pub struct Environment {
    databases: RwLock<HashMap<String, Arc<Database>>>,
}

impl Environment {
    pub fn new() -> Result<Self> {
        Ok(Self { databases: RwLock::new(HashMap::new()) })
    }

    /**
        Attaches a new session to the named database, creating the database
        on first use. Sessions connected to the same name share tables.

        The password is accepted for call-site compatibility with server
        bound code and is not examined.

        # Example

        ```
        let oracle = pythia::env()?;
        let session = oracle.connect("sandbox", "tester", "secret")?;

        assert_eq!(session.user_name(), "TESTER");
        # Ok::<(),pythia::Error>(())
        ```
    */
    pub fn connect(&self, dbname: &str, user: &str, _password: &str) -> Result<Session> {
        if dbname.is_empty() {
            return Err( Error::new("database name is required") );
        }
        if user.is_empty() {
            return Err( Error::new("user name is required") );
        }
        let dbname = dbname.to_uppercase();
        let db = {
            let databases = self.databases.read();
            databases.get(&dbname).cloned()
        };
        let db = match db {
            Some(db) => db,
            None => {
                let mut databases = self.databases.write();
                databases.entry(dbname.clone())
                    .or_insert_with(|| Arc::new(Database::new(&dbname)))
                    .clone()
            }
        };
        Ok( Session::new(self, db, &user.to_uppercase()) )
    }
}
