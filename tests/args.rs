//! Statement argument binding.

use pythia::Result;

#[test]
fn positional_args() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_pos (id NUMBER(9), city VARCHAR2(30), code VARCHAR2(12))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO args_pos VALUES (:1, :2, :3)")?;
    let count = stmt.execute((3333, "Oxford", "OX9 9ZB"))?;
    assert_eq!(count, 1);

    let stmt = session.prepare("SELECT city, code FROM args_pos WHERE id = :id")?;
    let row = stmt.query_single(3333)?.expect("inserted row");
    let city : &str = row.get(0)?;
    let code : &str = row.get(1)?;
    assert_eq!(city, "Oxford");
    assert_eq!(code, "OX9 9ZB");
    Ok(())
}

#[test]
fn dup_args() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_dup (id NUMBER(9), state VARCHAR2(30), city VARCHAR2(30), addr VARCHAR2(30))")?.execute(())?;

    // a repeated placeholder is a single parameter
    let stmt = session.prepare("
        INSERT INTO args_dup (id, state, city, addr)
        VALUES (:id, :na, :na, :na)
    ")?;
    let count = stmt.execute((("ID", 1), ("NA", "N/A")))?;
    assert_eq!(count, 1);

    let stmt = session.prepare("SELECT state, city, addr FROM args_dup WHERE id = 1")?;
    let row = stmt.query_single(())?.expect("inserted row");
    for col in 0..3 {
        let val : &str = row.get(col)?;
        assert_eq!(val, "N/A");
    }
    Ok(())
}

#[test]
fn no_colon_arg_names() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_sal (id NUMBER(9), salary NUMBER(8))")?.execute(())?;
    session.prepare("INSERT INTO args_sal VALUES (107, 4200)")?.execute(())?;

    let stmt = session.prepare("
        UPDATE args_sal
           SET salary = salary * :rate
         WHERE id = :id
        RETURN salary INTO :new_salary
    ")?;
    let mut new_salary = 0u16;
    let num_updated = stmt.execute((
        ("ID",         107             ),
        ("RATE",       1.5             ),
        ("NEW_SALARY", &mut new_salary ),
    ))?;

    assert_eq!(num_updated, 1);
    assert!(!stmt.is_null("NEW_SALARY")?);
    assert_eq!(new_salary, 6300);

    let num_updated = stmt.execute((
        ("ID",         99              ),
        ("RATE",       1.03            ),
        ("NEW_SALARY", &mut new_salary ),
    ))?;

    assert_eq!(num_updated, 0);
    assert!(stmt.is_null("NEW_SALARY")?);
    // the bind target keeps its previous content
    assert_eq!(new_salary, 6300);
    Ok(())
}

#[test]
fn unbound_parameter_is_an_error() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_unbound (id NUMBER(9))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO args_unbound VALUES (:id)")?;
    let err = stmt.execute(()).unwrap_err();
    assert_eq!(err.code(), Some(1008));
    Ok(())
}

#[test]
fn unknown_placeholder_is_an_error() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_unknown (id NUMBER(9))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO args_unknown VALUES (:id)")?;
    let err = stmt.execute(("MISSING", 1)).unwrap_err();
    assert!(matches!(err, pythia::Error::Interface(_)));
    Ok(())
}

#[test]
fn option_binds_null() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_opt (id NUMBER(9), descr VARCHAR2(30))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO args_opt VALUES (:id, :descr)")?;
    stmt.execute((("ID", 1), ("DESCR", Some("present"))))?;
    stmt.execute((("ID", 2), ("DESCR", None::<&str>)))?;

    let stmt = session.prepare("SELECT descr FROM args_opt WHERE id = :id")?;
    let row = stmt.query_single(1)?.expect("first row");
    let descr : Option<&str> = row.get(0)?;
    assert_eq!(descr, Some("present"));

    let row = stmt.query_single(2)?.expect("second row");
    let descr : Option<&str> = row.get(0)?;
    assert!(descr.is_none());
    assert!(row.is_null(0)?);
    Ok(())
}

#[test]
fn in_values_persist_between_executions() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE args_persist (id NUMBER(9), descr VARCHAR2(30))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO args_persist VALUES (:id, :descr)")?;
    stmt.execute((("ID", 1), ("DESCR", "shared")))?;
    // rebind only the parameter that changed
    stmt.execute(("ID", 2))?;

    let stmt = session.prepare("SELECT descr FROM args_persist WHERE id = :id")?;
    let row = stmt.query_single(2)?.expect("second row");
    let descr : &str = row.get(0)?;
    assert_eq!(descr, "shared");
    Ok(())
}
