use std::fmt;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::codec::{BindValue, ColumnValue, read_column};
use crate::connection::LastError;
use crate::error::{Result, SqlFluentError};
use crate::signature::{RowConsumer, RowSignature};
use crate::statement::StatementHandle;
use crate::types::{SqlText, Utf16String};

/// Fluent wrapper around one prepared statement.
///
/// Values are appended with [`bind`](Binder::bind) in placeholder order, then rows are routed
/// out with [`extract`](Binder::extract), [`extract_into`](Binder::extract_into) or
/// [`for_each`](Binder::for_each). [`execute`](Binder::execute) runs a statement whose rows are
/// not wanted.
///
/// Dropping a binder that was never extracted steps the statement to completion before
/// finalizing it, so an `INSERT` or `UPDATE` still takes effect:
/// ```rust
/// # use sql_fluent::prelude::*;
/// # fn demo() -> Result<(), SqlFluentError> {
/// let db = Database::open_in_memory()?;
/// db.execute("CREATE TABLE t (v INTEGER)")?;
/// db.statement("INSERT INTO t (v) VALUES (?)")?.bind(5)?;
/// let total: i64 = db.statement("SELECT sum(v) FROM t")?.extract()?;
/// assert_eq!(total, 5);
/// # Ok(())
/// # }
/// # demo().unwrap();
/// ```
/// Errors from that implicit path cannot be returned; they are logged and recorded as the
/// connection's last error. Call `execute` when the outcome matters.
pub struct Binder<'db> {
    handle: StatementHandle<'db>,
    next_index: usize,
    last_error: &'db LastError,
    /// Stepping has begun through an extraction, or the binder was abandoned. Drop then only
    /// releases the statement.
    started: bool,
}

impl<'db> Binder<'db> {
    pub(crate) fn new(
        conn: &'db Connection,
        sql: SqlText,
        last_error: &'db LastError,
    ) -> Result<Self> {
        let handle = StatementHandle::prepare(conn, sql).map_err(|e| last_error.record(e))?;
        Ok(Self {
            handle,
            next_index: 1,
            last_error,
            started: false,
        })
    }

    /// Bind `value` to the next placeholder.
    ///
    /// # Errors
    /// Returns `SqlFluentError::BindError` when the engine rejects the value, typically because
    /// there are more values than placeholders. The statement is still stepped to completion
    /// with the values bound so far, then finalized.
    pub fn bind<V: BindValue>(mut self, value: V) -> Result<Self> {
        match self.handle.bind(self.next_index, &value) {
            Ok(()) => {
                self.next_index += 1;
                Ok(self)
            }
            Err(err) => Err(self.abandon(err)),
        }
    }

    /// Read column 0 of the only row. No rows yields the zero value of `T`.
    ///
    /// # Errors
    /// Returns `SqlFluentError::CardinalityError` when the statement yields a second row, and
    /// the engine's error when stepping or finalizing fails.
    pub fn extract<T: ColumnValue>(self) -> Result<T> {
        let mut out = T::zero();
        self.extract_into(&mut out)?;
        Ok(out)
    }

    /// Like [`extract`](Binder::extract), but writes into `out`, which is left untouched when
    /// the statement yields no rows. On a `CardinalityError`, `out` already holds the first
    /// row's value.
    ///
    /// # Errors
    /// See [`extract`](Binder::extract).
    pub fn extract_into<T: ColumnValue>(mut self, out: &mut T) -> Result<()> {
        self.started = true;
        let mut seen = false;
        let outcome = self.handle.step_rows(|row| {
            if seen {
                return Err(SqlFluentError::CardinalityError);
            }
            seen = true;
            *out = read_column(row, 0)?;
            Ok(())
        });
        self.complete(outcome).map(|_| ())
    }

    /// Decode every row into the consumer's argument types and call it, in row order.
    ///
    /// The consumer's arguments decide how many columns are read and as which types; a closure
    /// needs its argument types written out:
    /// ```rust
    /// # use sql_fluent::prelude::*;
    /// # fn demo() -> Result<(), SqlFluentError> {
    /// let db = Database::open_in_memory()?;
    /// let mut seen = Vec::new();
    /// db.statement("SELECT 1, 'one' UNION ALL SELECT 2, 'two'")?
    ///     .for_each(|n: i32, word: String| seen.push((n, word)))?;
    /// assert_eq!(seen, vec![(1, "one".to_string()), (2, "two".to_string())]);
    /// # Ok(())
    /// # }
    /// # demo().unwrap();
    /// ```
    /// Returns the number of rows delivered.
    ///
    /// # Errors
    /// Returns the engine's error when stepping, reading a column, or finalizing fails. Rows
    /// delivered before the failure stay delivered.
    pub fn for_each<Args, F>(mut self, mut consumer: F) -> Result<usize>
    where
        Args: RowSignature,
        F: RowConsumer<Args>,
    {
        let signature = Args::signature();
        debug!(%signature, "routing rows into consumer");
        self.started = true;
        let outcome = self.handle.step_rows(|row| {
            consumer.consume(Args::decode_row(row)?);
            Ok(())
        });
        self.complete(outcome)
    }

    /// Step the statement to completion, discarding any rows, and finalize it.
    ///
    /// # Errors
    /// Returns the engine's error when stepping or finalizing fails.
    pub fn execute(mut self) -> Result<()> {
        self.started = true;
        let outcome = self.handle.step_rows(|_| Ok(()));
        self.complete(outcome).map(|_| ())
    }

    /// Placeholders in the prepared text.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.handle.parameter_count()
    }

    /// Values appended so far.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.handle.bound_count()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.handle.column_count()
    }

    #[must_use]
    pub fn sql(&self) -> String {
        self.handle.sql()
    }

    #[must_use]
    pub fn sql_utf16(&self) -> &Utf16String {
        self.handle.sql_utf16()
    }

    fn complete<R>(&mut self, outcome: Result<R>) -> Result<R> {
        let finalized = self.handle.finalize();
        match (outcome, finalized) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) | (Err(err), Ok(())) => Err(self.last_error.record(err)),
            (Err(err), Err(cleanup)) => {
                warn!(error = %cleanup, "finalize failed after an earlier error");
                Err(self.last_error.record(err))
            }
        }
    }

    fn abandon(&mut self, err: SqlFluentError) -> SqlFluentError {
        self.started = true;
        if let Err(cleanup) = self.handle.step_rows(|_| Ok(())) {
            warn!(error = %cleanup, "draining failed after an earlier error");
        }
        if let Err(cleanup) = self.handle.finalize() {
            warn!(error = %cleanup, "finalize failed after an earlier error");
        }
        self.last_error.record(err)
    }
}

impl fmt::Debug for Binder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("sql", &self.handle.sql())
            .field("next_index", &self.next_index)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Drop for Binder<'_> {
    fn drop(&mut self) {
        // A panicking consumer leaves `started` set: its statement was already reset by the
        // row loop and must not run again. The handle still finalizes when it drops.
        if self.started {
            return;
        }
        self.started = true;

        // Also runs while unwinding; the drain never calls back into caller code.
        if let Err(err) = self.handle.step_rows(|_| Ok(())) {
            warn!(error = %err, sql = %self.handle.sql(), "implicit execution on drop failed");
            self.last_error.record(err);
        }
        if let Err(err) = self.handle.finalize() {
            warn!(error = %err, "finalize on drop failed");
            self.last_error.record(err);
        }
    }
}
