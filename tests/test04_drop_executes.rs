use sql_fluent::prelude::*;
use tempfile::tempdir;

fn count(db: &Database<'_>) -> Result<i64, SqlFluentError> {
    db.statement("SELECT count(*) FROM t")?.extract()
}

#[test]
fn dropped_insert_still_runs() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("drop.db");

    {
        let db = Database::open(&path)?;
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")?;
        // Never extracted: dropping the binder steps it to completion.
        db.statement("INSERT INTO t (id, name) VALUES (?, ?)")?
            .bind(1)?
            .bind("bob")?;
        let pending = db.statement("UPDATE t SET name = ? WHERE id = ?")?;
        let pending = pending.bind("robert")?.bind(1)?;
        drop(pending);
    }

    // Reopen to confirm the writes reached the file.
    let db = Database::open(&path)?;
    assert_eq!(count(&db)?, 1);
    let name: String = db.statement("SELECT name FROM t WHERE id = 1")?.extract()?;
    assert_eq!(name, "robert");
    Ok(())
}

#[test]
fn dropped_select_discards_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    db.execute("CREATE TABLE t (id INTEGER)")?;
    db.execute("INSERT INTO t (id) VALUES (1), (2), (3)")?;
    {
        let _unused = db.statement("SELECT id FROM t")?;
    }
    assert_eq!(count(&db)?, 3);
    assert_eq!(db.last_error(), "not an error");
    Ok(())
}

#[test]
fn failed_bind_still_drains_the_statement() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    db.execute("CREATE TABLE t (id INTEGER, name TEXT)")?;
    let result = db
        .statement("INSERT INTO t (id, name) VALUES (?, ?)")?
        .bind(1)?
        .bind("a")?
        .bind(3);
    assert!(matches!(
        result,
        Err(SqlFluentError::BindError { index: 3, .. })
    ));
    assert_ne!(db.last_error(), "not an error");

    // The values bound before the failure were still applied.
    assert_eq!(count(&db)?, 1);
    let name: String = db.statement("SELECT name FROM t WHERE id = 1")?.extract()?;
    assert_eq!(name, "a");
    Ok(())
}

#[test]
fn execute_surfaces_step_errors() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)")?;
    db.statement("INSERT INTO t (id) VALUES (?)")?.bind(1)?.execute()?;

    let err = db
        .statement("INSERT INTO t (id) VALUES (?)")?
        .bind(1)?
        .execute()
        .unwrap_err();
    assert!(matches!(err, SqlFluentError::StepError(_)));
    assert!(err.to_string().contains("UNIQUE constraint failed"), "{err}");
    assert!(db.last_error().contains("UNIQUE constraint failed"));
    assert_eq!(count(&db)?, 1);
    Ok(())
}

#[test]
fn drop_errors_are_recorded_as_last_error() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)")?;
    db.statement("INSERT INTO t (id) VALUES (1)")?.execute()?;
    assert_eq!(db.last_error(), "not an error");

    {
        let _dupe = db.statement("INSERT INTO t (id) VALUES (1)")?;
    }
    assert!(db.last_error().contains("UNIQUE constraint failed"));
    assert!(
        db.last_error_utf16()
            .to_string_lossy()
            .contains("UNIQUE constraint failed")
    );
    assert_eq!(count(&db)?, 1);
    Ok(())
}

#[test]
fn consumer_panic_does_not_rerun_the_statement() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)")?;

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = db
            .statement("INSERT INTO t (id) VALUES (1), (2) RETURNING id")
            .and_then(|b| b.for_each(|id: i32| assert!(id < 0, "consumer failed")));
    }));
    assert!(outcome.is_err());

    // Both rows went in exactly once and the connection is still usable.
    assert_eq!(count(&db)?, 2);
    assert_eq!(db.last_error(), "not an error");
    Ok(())
}

#[test]
fn unwinding_drop_still_runs_pending_statements() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)")?;
    db.execute("INSERT INTO t (id) VALUES (1)")?;

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
        || -> Result<(), SqlFluentError> {
            let _pending = db.statement("INSERT INTO t (id) VALUES (?)")?.bind(2)?;
            panic!("caller failed with a binder in scope");
        },
    ));
    assert!(outcome.is_err());
    assert_eq!(count(&db)?, 2);
    Ok(())
}
