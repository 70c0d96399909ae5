use sql_fluent::prelude::*;
use tempfile::tempdir;

#[test]
fn borrowed_wrappers_never_close_the_connection() -> Result<(), Box<dyn std::error::Error>> {
    let conn = rusqlite::Connection::open_in_memory()?;
    {
        let first = Database::borrowed(&conn);
        let second = Database::borrowed(&conn);
        assert!(first.is_connected());
        assert!(!first.is_owner());

        first.execute("CREATE TABLE t (id INTEGER)")?;
        second.statement("INSERT INTO t (id) VALUES (?)")?.bind(7)?.execute()?;
        let id: i32 = first.statement("SELECT id FROM t")?.extract()?;
        assert_eq!(id, 7);
    }

    // Both wrappers are gone; the connection still works.
    let id: i64 = conn.query_row("SELECT id FROM t", [], |row| row.get(0))?;
    assert_eq!(id, 7);
    Ok(())
}

#[test]
fn last_error_is_tracked_per_wrapper() -> Result<(), Box<dyn std::error::Error>> {
    let conn = rusqlite::Connection::open_in_memory()?;
    let first = Database::borrowed(&conn);
    let second = Database::borrowed(&conn);

    assert!(first.statement("SELEKT 1").is_err());
    assert!(first.last_error().contains("syntax error"));
    assert_eq!(second.last_error(), "not an error");

    assert!(second.execute("SELECT * FROM missing").is_err());
    assert!(second.last_error().contains("no such table"));
    assert!(first.last_error().contains("syntax error"));
    Ok(())
}

#[test]
fn closing_a_borrowed_wrapper_only_detaches() -> Result<(), Box<dyn std::error::Error>> {
    let conn = rusqlite::Connection::open_in_memory()?;
    let mut db = Database::borrowed(&conn);
    db.close()?;
    assert!(!db.is_connected());
    let n: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
    assert_eq!(n, 1);
    Ok(())
}

#[test]
fn owned_connection_closes_once() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::from_connection(rusqlite::Connection::open_in_memory()?);
    assert!(db.is_owner());
    assert!(db.is_connected());

    db.close()?;
    assert!(!db.is_connected());
    db.close()?;

    let err = db.statement("SELECT 1").unwrap_err();
    assert!(matches!(err, SqlFluentError::ConnectionError(_)));
    assert!(db.last_error().contains("database is closed"));
    Ok(())
}

#[test]
fn last_error_defaults_to_engine_text() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_in_memory()?;
    assert_eq!(db.last_error(), "not an error");
    assert_eq!(db.last_error_utf16(), Utf16String::from("not an error"));
    Ok(())
}

#[test]
fn utf16_sql_and_paths() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("wide.db");
    let wide_path = Utf16String::from(path.to_string_lossy().as_ref());

    {
        let db = Database::open_utf16(&wide_path)?;
        db.execute(Utf16String::from("CREATE TABLE t (name TEXT)"))?;
        let sql = Utf16String::from("INSERT INTO t (name) VALUES (?)");
        let binder = db.statement(&sql)?;
        assert_eq!(binder.sql_utf16(), &sql);
        assert_eq!(binder.sql(), "INSERT INTO t (name) VALUES (?)");
        binder.bind(Utf16String::from("żółw"))?.execute()?;
    }

    let db = Database::open(&path)?;
    let units: Vec<u16> = "SELECT name FROM t".encode_utf16().collect();
    let name: Utf16String = db.statement(units.as_slice())?.extract()?;
    assert_eq!(name.to_string_lossy(), "żółw");
    Ok(())
}

#[test]
fn options_open_with_pragmas() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("opts.db");

    let db = Database::builder(path.to_string_lossy().into_owned())
        .journal_mode(JournalMode::Wal)
        .busy_timeout_ms(2_500)
        .open()?;
    let mode: String = db.statement("PRAGMA journal_mode")?.extract()?;
    assert_eq!(mode.to_lowercase(), "wal");
    let timeout: i64 = db.statement("PRAGMA busy_timeout")?.extract()?;
    assert_eq!(timeout, 2_500);
    Ok(())
}

#[test]
fn options_load_from_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("cfg.db");
    let raw = serde_json::json!({
        "db_path": path.to_string_lossy(),
        "busy_timeout_ms": 100,
    });
    let opts: DatabaseOptions = serde_json::from_value(raw)?;
    assert!(opts.create_if_missing);
    assert_eq!(opts.journal_mode, None);

    let db = Database::open_with(&opts)?;
    db.execute("CREATE TABLE t (id INTEGER)")?;
    assert!(path.exists());
    Ok(())
}

#[test]
fn read_only_open_of_missing_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("absent.db");
    let err = Database::builder(path.to_string_lossy().into_owned())
        .read_only(true)
        .open()
        .err()
        .ok_or("read-only open of a missing file should fail")?;
    assert!(matches!(err, SqlFluentError::ConnectionError(_)));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn read_only_rejects_writes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("ro.db");
    Database::open(&path)?.execute("CREATE TABLE t (id INTEGER)")?;

    let db = Database::builder(path.to_string_lossy().into_owned())
        .read_only(true)
        .open()?;
    let err = db.execute("INSERT INTO t (id) VALUES (1)").unwrap_err();
    assert!(err.to_string().contains("readonly"), "{err}");
    Ok(())
}

#[test]
fn empty_path_is_a_config_error() {
    let err = Database::open_with(&DatabaseOptions::new(String::new()))
        .err()
        .map(|e| e.to_string());
    assert_eq!(
        err.as_deref(),
        Some("Configuration error: db_path must not be empty")
    );
}
