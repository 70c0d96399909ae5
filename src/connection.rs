use std::cell::RefCell;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::binder::Binder;
use crate::config::DatabaseOptions;
use crate::error::{Result, SqlFluentError};
use crate::types::{SqlText, Utf16String};

/// Path designator for a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// What `SQLite` reports when there has been no error.
const NO_ERROR: &str = "not an error";

/// Most recent engine diagnostic seen through one [`Database`].
#[derive(Debug, Default)]
pub(crate) struct LastError(RefCell<Option<String>>);

impl LastError {
    pub(crate) fn record(&self, err: SqlFluentError) -> SqlFluentError {
        let text = match err.engine_error() {
            Some(engine) => engine.to_string(),
            None => err.to_string(),
        };
        *self.0.borrow_mut() = Some(text);
        err
    }

    fn get(&self) -> String {
        self.0
            .borrow()
            .clone()
            .unwrap_or_else(|| NO_ERROR.to_string())
    }
}

enum Handle<'h> {
    Owned(Connection),
    Borrowed(&'h Connection),
    Closed,
}

/// An open `SQLite` connection, owned or borrowed, and the factory for [`Binder`]s.
///
/// A `Database` built by one of the `open` constructors or [`from_connection`] owns its handle
/// and closes it when dropped. One built with [`borrowed`] only references a connection owned
/// elsewhere and never closes it.
///
/// [`from_connection`]: Database::from_connection
/// [`borrowed`]: Database::borrowed
pub struct Database<'h> {
    handle: Handle<'h>,
    last_error: LastError,
}

impl Database<'static> {
    /// Open (creating if needed) the database file at `path`. Pass [`IN_MEMORY`] for a
    /// private in-memory database.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConnectionError` if `SQLite` cannot open the path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            SqlFluentError::ConnectionError(format!("failed to open {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "opened database");
        Ok(Self::from_connection(conn))
    }

    /// Open a database whose path is given as UTF-16.
    ///
    /// # Errors
    /// See [`open`](Database::open).
    pub fn open_utf16(path: &Utf16String) -> Result<Self> {
        Self::open(path.to_string_lossy())
    }

    /// # Errors
    /// See [`open`](Database::open).
    pub fn open_in_memory() -> Result<Self> {
        Self::open(IN_MEMORY)
    }

    /// Open according to `opts`, then apply its pragmas.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` for invalid options,
    /// `SqlFluentError::ConnectionError` if the open fails, and the engine's error if a pragma
    /// is rejected.
    pub fn open_with(opts: &DatabaseOptions) -> Result<Self> {
        opts.validate()?;

        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if opts.read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if opts.create_if_missing {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }

        let conn = Connection::open_with_flags(&opts.db_path, flags).map_err(|e| {
            SqlFluentError::ConnectionError(format!("failed to open {}: {e}", opts.db_path))
        })?;
        debug!(path = %opts.db_path, read_only = opts.read_only, "opened database");

        let db = Self::from_connection(conn);
        if let Some(ms) = opts.busy_timeout_ms {
            let applied: i64 = db
                .statement(format!("PRAGMA busy_timeout = {ms}"))?
                .extract()?;
            debug!(busy_timeout_ms = applied, "applied busy timeout");
        }
        if let Some(mode) = opts.journal_mode {
            let applied: String = db
                .statement(format!("PRAGMA journal_mode = {}", mode.as_str()))?
                .extract()?;
            debug!(journal_mode = %applied, "applied journal mode");
        }
        Ok(db)
    }

    /// Take ownership of an already open connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            handle: Handle::Owned(conn),
            last_error: LastError::default(),
        }
    }
}

impl<'h> Database<'h> {
    /// Reference a connection owned elsewhere. It is never closed through this wrapper, so any
    /// number of borrowed wrappers can share one connection.
    #[must_use]
    pub fn borrowed(conn: &'h Connection) -> Self {
        Self {
            handle: Handle::Borrowed(conn),
            last_error: LastError::default(),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !matches!(self.handle, Handle::Closed)
    }

    /// Whether dropping or closing this wrapper releases the connection.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        matches!(self.handle, Handle::Owned(_))
    }

    /// The underlying connection, if still open.
    #[must_use]
    pub fn connection(&self) -> Option<&Connection> {
        match &self.handle {
            Handle::Owned(conn) => Some(conn),
            Handle::Borrowed(conn) => Some(*conn),
            Handle::Closed => None,
        }
    }

    /// Prepare `sql` and return a binder for it. The text may be UTF-8 or UTF-16.
    ///
    /// # Errors
    /// Returns `SqlFluentError::PrepareError` when the engine rejects the text, or
    /// `SqlFluentError::ConnectionError` after [`close`](Database::close).
    pub fn statement(&self, sql: impl Into<SqlText>) -> Result<Binder<'_>> {
        let Some(conn) = self.connection() else {
            return Err(self
                .last_error
                .record(SqlFluentError::ConnectionError("database is closed".into())));
        };
        Binder::new(conn, sql.into(), &self.last_error)
    }

    /// Prepare and run `sql` to completion, discarding any rows.
    ///
    /// # Errors
    /// Returns any prepare, step or finalize error.
    pub fn execute(&self, sql: impl Into<SqlText>) -> Result<()> {
        self.statement(sql)?.execute()
    }

    /// The most recent engine diagnostic seen through this wrapper, or `"not an error"`.
    ///
    /// Tracked per wrapper, not per connection: two [`Database::borrowed`] wrappers over the same
    /// connection each report only the failures raised through themselves.
    #[must_use]
    pub fn last_error(&self) -> String {
        self.last_error.get()
    }

    #[must_use]
    pub fn last_error_utf16(&self) -> Utf16String {
        Utf16String::from(self.last_error.get())
    }

    /// Release the connection now. An owned connection is closed and any close error is
    /// returned; a borrowed one is only detached. Closing twice is a no-op.
    ///
    /// # Errors
    /// Returns the engine's error if `SQLite` refuses to close; the connection then stays open.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.handle, Handle::Closed) {
            Handle::Owned(conn) => {
                if let Err((conn, err)) = conn.close() {
                    self.handle = Handle::Owned(conn);
                    return Err(self.last_error.record(SqlFluentError::SqliteError(err)));
                }
                debug!("closed database");
                Ok(())
            }
            Handle::Borrowed(_) | Handle::Closed => Ok(()),
        }
    }
}
