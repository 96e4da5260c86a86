//! Shared environment for the crate's test suites.

use once_cell::sync::OnceCell;

use crate::{Environment, Result, Session};

/// Returns the shared engine environment.
pub fn get_env() -> Result<&'static Environment> {
    static ENV: OnceCell<Environment> = OnceCell::new();
    ENV.get_or_try_init(Environment::new)
}

/// Connects a new session to the shared test database.
///
/// Tests that modify data should create their own tables - sessions of
/// the shared database see each other's uncommitted changes.
pub fn get_session() -> Result<Session<'static>> {
    let env = get_env()?;
    env.connect("sandbox", "pythia", "")
}
