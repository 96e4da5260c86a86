/*!
An embedded, in-memory SQL engine that emulates the Oracle dialect and the
API shape of an OCI-style driver, so code written against Oracle semantics
can be exercised in tests without a running server.

The headline feature is DML RETURNING: INSERT, UPDATE, and DELETE
statements can return column values of the affected rows into bound output
variables, including array (batch) executions where every iteration
returns its own set of rows. Engine errors carry the numeric codes of the
emulated dialect (`ORA-NNNNN`), so error assertions port over unchanged.

# Example

```
use pythia::Variable;

let oracle = pythia::env()?;
let session = oracle.connect("sandbox", "intro", "")?;

let stmt = session.prepare("
    CREATE TABLE parcels (
        id      NUMBER(9) NOT NULL,
        label   VARCHAR2(40)
    )
")?;
stmt.execute(())?;

let stmt = session.prepare("
    INSERT INTO parcels VALUES (:id, :label)
    RETURNING id, label INTO :out_id, :out_label
")?;
let out_id = Variable::number();
let out_label = Variable::varchar(40);
let count = stmt.execute((
    ("ID",        17),
    ("LABEL",     "fragile"),
    ("OUT_ID",    &out_id),
    ("OUT_LABEL", &out_label),
))?;
assert_eq!(count, 1);
assert_eq!(out_id.values::<i32>()?, vec![17]);
assert_eq!(out_label.values::<String>()?, vec!["fragile"]);

session.commit()?;
# Ok::<(),pythia::Error>(())
```

Sessions attached to the same database name share its tables. The engine
keeps everything in memory; nothing survives the process.
*/

mod db;
mod env;
mod err;
mod exec;
mod session;
mod sql;
mod stmt;
mod types;
pub mod test_env;

pub use env::Environment;
pub use err::Error;
pub use session::Session;
pub use stmt::{ColumnInfo, Position, Row, Rows, Statement, ToSql, Variable};
pub use stmt::fromsql::FromSql;
pub use types::{ColumnType, Number, Value, Varchar};
pub use types::number::{FromNumber, Integer, IntoNumber, Real};

pub type Result<T> = std::result::Result<T, Error>;

/**
    Returns a new engine environment.

    While there can be multiple environments, most applications most
    likely will need only one:

    ```
    use pythia as oracle; // pun intended :)

    fn main() -> oracle::Result<()> {
        let oracle = oracle::env()?;
        let session = oracle.connect("sandbox", "app", "")?;
        // ...
        # drop(session);
        Ok(())
    }
    ```
*/
pub fn env() -> Result<Environment> {
    Environment::new()
}
