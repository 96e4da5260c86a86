//! SELECT execution and row retrieval.

use pythia::{ColumnType, Number, Result};

fn setup_towns(session: &pythia::Session, table: &str) -> Result<()> {
    session.prepare(&format!("CREATE TABLE {} (name VARCHAR2(30), region VARCHAR2(30), population NUMBER)", table))?.execute(())?;
    let stmt = session.prepare(&format!("INSERT INTO {} VALUES (:1, :2, :3)", table))?;
    stmt.execute(("Delphi",  "Phocis",  1500))?;
    stmt.execute(("Dodona",  "Epirus",  800))?;
    stmt.execute(("Cumae",   "Campania", 2300))?;
    stmt.execute((("1", "Claros"), ("2", None::<&str>), ("3", 650)))?;
    Ok(())
}

#[test]
fn where_and_order_by() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns")?;

    let stmt = session.prepare("
        SELECT name, population
          FROM q_towns
         WHERE population >= :p
      ORDER BY population DESC
    ")?;
    let rows = stmt.query(("P", 1000))?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        let name : String = row.get("NAME")?;
        let population : u32 = row.get("POPULATION")?;
        names.push((name, population));
    }
    assert_eq!(stmt.row_count()?, 2);
    assert_eq!(names, vec![("Cumae".to_string(), 2300), ("Delphi".to_string(), 1500)]);
    Ok(())
}

#[test]
fn wildcard_and_column_info() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns_wild")?;

    let stmt = session.prepare("SELECT * FROM q_towns_wild WHERE name = :n")?;
    let row = stmt.query_single(("N", "Delphi"))?.expect("one row");
    let name : &str = row.get(0)?;
    let region : &str = row.get(1)?;
    let population : i64 = row.get(2)?;
    assert_eq!((name, region, population), ("Delphi", "Phocis", 1500));

    assert_eq!(stmt.column_count(), 3);
    let col = stmt.column(0).expect("name column");
    assert_eq!(col.name(), "NAME");
    assert_eq!(col.data_type(), Some(ColumnType::Varchar));
    let col = stmt.column(2).expect("population column");
    assert_eq!(col.data_type(), Some(ColumnType::Number));
    assert!(stmt.column(3).is_none());
    Ok(())
}

#[test]
fn expressions_and_aliases() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns_expr")?;

    let stmt = session.prepare("
        SELECT UPPER(name) AS loud_name,
               population * 2 doubled,
               NVL(region, 'unknown') region
          FROM q_towns_expr
         WHERE name = 'Claros'
    ")?;
    let row = stmt.query_single(())?.expect("one row");
    let loud : &str = row.get("LOUD_NAME")?;
    let doubled : i32 = row.get("DOUBLED")?;
    let region : &str = row.get("REGION")?;
    assert_eq!((loud, doubled, region), ("CLAROS", 1300, "unknown"));

    let col = stmt.column(0).expect("aliased column");
    assert_eq!(col.name(), "LOUD_NAME");
    assert!(col.data_type().is_none());
    Ok(())
}

#[test]
fn null_sorts_last_ascending() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns_nulls")?;

    let stmt = session.prepare("SELECT name FROM q_towns_nulls ORDER BY region")?;
    let rows = stmt.query(())?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get::<String>(0)?);
    }
    // Claros has no region and sorts last
    assert_eq!(names.last().map(String::as_str), Some("Claros"));
    Ok(())
}

#[test]
fn typed_gets() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns_typed")?;

    let stmt = session.prepare("SELECT population FROM q_towns_typed WHERE name = :n")?;
    let row = stmt.query_single(("N", "Dodona"))?.expect("one row");
    let as_int : i32 = row.get(0)?;
    let as_real : f64 = row.get(0)?;
    let as_num : Number = row.get(0)?;
    let as_text : String = row.get(0)?;
    assert_eq!(as_int, 800);
    assert_eq!(as_real, 800.0);
    assert_eq!(as_num.to_int::<i16>()?, 800);
    assert_eq!(as_text, "800");
    Ok(())
}

#[test]
fn statement_kind_guards() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns_guard")?;

    let stmt = session.prepare("SELECT name FROM q_towns_guard")?;
    assert!(stmt.execute(()).is_err());

    let stmt = session.prepare("INSERT INTO q_towns_guard VALUES ('Didyma', 'Ionia', 100)")?;
    assert!(stmt.query(()).is_err());
    Ok(())
}

#[test]
fn missing_table_and_column() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    setup_towns(&session, "q_towns_missing")?;

    let stmt = session.prepare("SELECT name FROM no_such_table")?;
    assert_eq!(stmt.query(()).unwrap_err().code(), Some(942));

    let stmt = session.prepare("SELECT no_such_column FROM q_towns_missing")?;
    assert_eq!(stmt.query(()).unwrap_err().code(), Some(904));
    Ok(())
}
