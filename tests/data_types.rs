//! Value semantics of the emulated dialect.

use pythia::Result;

#[test]
fn empty_string_is_null() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_empty (id NUMBER(9), descr VARCHAR2(30))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO dt_empty VALUES (:id, :descr)")?;
    stmt.execute((("ID", 1), ("DESCR", "")))?;

    let stmt = session.prepare("SELECT descr FROM dt_empty WHERE descr IS NULL")?;
    let row = stmt.query_single(())?.expect("the empty string matched IS NULL");
    assert!(row.is_null(0)?);
    Ok(())
}

#[test]
fn null_propagation() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_nulls (id NUMBER(9), n NUMBER, descr VARCHAR2(30))")?.execute(())?;
    session.prepare("INSERT INTO dt_nulls VALUES (1, NULL, NULL)")?.execute(())?;

    let stmt = session.prepare("
        SELECT n + 1, 'tag: ' || descr, LENGTH(descr), NVL(n, -1)
          FROM dt_nulls
         WHERE id = 1
    ")?;
    let row = stmt.query_single(())?.expect("one row");
    // arithmetic with NULL stays NULL
    assert!(row.is_null(0)?);
    // concatenation treats NULL as the empty string
    let tagged : &str = row.get(1)?;
    assert_eq!(tagged, "tag: ");
    assert!(row.is_null(2)?);
    let defaulted : i32 = row.get(3)?;
    assert_eq!(defaulted, -1);
    Ok(())
}

#[test]
fn comparisons_with_null_never_match() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_null_cmp (id NUMBER(9), n NUMBER)")?.execute(())?;
    session.prepare("INSERT INTO dt_null_cmp VALUES (1, NULL)")?.execute(())?;

    let stmt = session.prepare("SELECT id FROM dt_null_cmp WHERE n = n")?;
    assert!(stmt.query_single(())?.is_none());

    let stmt = session.prepare("SELECT id FROM dt_null_cmp WHERE n IS NULL")?;
    assert!(stmt.query_single(())?.is_some());
    Ok(())
}

#[test]
fn column_width_is_enforced() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_width (id NUMBER(9), code VARCHAR2(3))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO dt_width VALUES (:id, :code)")?;
    stmt.execute((("ID", 1), ("CODE", "abc")))?;
    let err = stmt.execute((("ID", 2), ("CODE", "abcd"))).unwrap_err();
    assert_eq!(err.code(), Some(12899));
    Ok(())
}

#[test]
fn not_null_is_enforced() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_notnull (id NUMBER(9) NOT NULL, descr VARCHAR2(30))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO dt_notnull VALUES (:id, :descr)")?;
    let err = stmt.execute((("ID", None::<i32>), ("DESCR", "x"))).unwrap_err();
    assert_eq!(err.code(), Some(1400));
    Ok(())
}

#[test]
fn implicit_conversion_into_number_column() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_conv (id NUMBER(9), n NUMBER)")?.execute(())?;

    let stmt = session.prepare("INSERT INTO dt_conv VALUES (:id, :n)")?;
    // text that looks like a number converts
    stmt.execute((("ID", 1), ("N", "41")))?;
    let row = session.prepare("SELECT n FROM dt_conv WHERE id = 1")?.query_single(())?.expect("row");
    let n : i32 = row.get(0)?;
    assert_eq!(n, 41);
    // text that does not is ORA-01722
    let err = stmt.execute((("ID", 2), ("N", "forty-one"))).unwrap_err();
    assert_eq!(err.code(), Some(1722));
    Ok(())
}

#[test]
fn number_stays_exact_for_integers() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_exact (big NUMBER)")?.execute(())?;

    let big = 9_007_199_254_740_993i64; // 2^53 + 1, not representable in f64
    session.prepare("INSERT INTO dt_exact VALUES (:big)")?.execute(("BIG", big))?;
    let row = session.prepare("SELECT big FROM dt_exact")?.query_single(())?.expect("row");
    let val : i64 = row.get(0)?;
    assert_eq!(val, big);
    Ok(())
}

#[test]
fn raw_values_round_trip() -> Result<()> {
    let session = pythia::test_env::get_session()?;
    session.prepare("CREATE TABLE dt_raw (id NUMBER(9), payload RAW(8))")?.execute(())?;

    let stmt = session.prepare("INSERT INTO dt_raw VALUES (:id, :payload)")?;
    stmt.execute((("ID", 1), ("PAYLOAD", &[0xDEu8, 0xAD, 0xBE, 0xEF][..])))?;

    let row = session.prepare("SELECT payload FROM dt_raw WHERE id = 1")?.query_single(())?.expect("row");
    let payload : Vec<u8> = row.get(0)?;
    assert_eq!(payload, vec![0xDE, 0xAD, 0xBE, 0xEF]);

    let err = stmt.execute((("ID", 2), ("PAYLOAD", &[0u8; 9][..]))).unwrap_err();
    assert_eq!(err.code(), Some(12899));
    Ok(())
}
