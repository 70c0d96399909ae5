use std::fmt;

use rusqlite::{Connection, Row, Statement};
use tracing::{debug, trace};

use crate::codec::BindValue;
use crate::error::{Result, SqlFluentError};
use crate::types::{SqlText, Utf16String};

/// Lifecycle of a [`StatementHandle`].
///
/// `Prepared -> Finished -> Released`, with `Prepared -> Released` allowed when stepping is
/// abandoned. There is no way back to `Prepared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Prepared,
    Finished,
    Released,
}

/// Sole owner of one prepared `SQLite` statement.
///
/// The native statement is finalized at most once: explicitly through
/// [`finalize`](StatementHandle::finalize), or by `rusqlite` when the handle is dropped while
/// still live.
pub struct StatementHandle<'conn> {
    stmt: Option<Statement<'conn>>,
    sql: SqlText,
    bound: usize,
    rows_stepped: usize,
    state: StatementState,
}

impl<'conn> StatementHandle<'conn> {
    /// Prepare `sql` on `conn`.
    ///
    /// # Errors
    /// Returns `SqlFluentError::PrepareError` carrying the engine's message when the text does
    /// not compile.
    pub fn prepare(conn: &'conn Connection, sql: SqlText) -> Result<Self> {
        let text = sql.to_utf8();
        let stmt = conn
            .prepare(&text)
            .map_err(|source| SqlFluentError::PrepareError {
                sql: text.clone(),
                source,
            })?;
        debug!(sql = %text, params = stmt.parameter_count(), "prepared statement");
        Ok(Self {
            stmt: Some(stmt),
            sql,
            bound: 0,
            rows_stepped: 0,
            state: StatementState::Prepared,
        })
    }

    /// Bind `value` at the 1-based placeholder `index`.
    ///
    /// # Errors
    /// Returns `SqlFluentError::BindError` if the engine rejects the bind (index out of range,
    /// out of memory), or `StatementReleased` after finalize.
    pub fn bind<V: BindValue>(&mut self, index: usize, value: &V) -> Result<()> {
        let Some(stmt) = self.stmt.as_mut() else {
            return Err(SqlFluentError::StatementReleased);
        };
        stmt.raw_bind_parameter(index, value.encode())
            .map_err(|source| SqlFluentError::BindError { index, source })?;
        self.bound += 1;
        let kind = V::KIND;
        trace!(index, %kind, "bound parameter");
        Ok(())
    }

    /// Step until the engine reports done, handing each row to `on_row`.
    ///
    /// Stops at the first error from either the engine or `on_row`. On success the handle is
    /// `Finished` and the number of rows seen is returned. Finalizing is left to the caller.
    ///
    /// # Errors
    /// Returns `SqlFluentError::StepError` for engine failures and passes `on_row` errors
    /// through unchanged.
    pub fn step_rows<F>(&mut self, mut on_row: F) -> Result<usize>
    where
        F: FnMut(&Row<'_>) -> Result<()>,
    {
        let Some(stmt) = self.stmt.as_mut() else {
            return Err(SqlFluentError::StatementReleased);
        };
        let mut rows = stmt.raw_query();
        let mut seen = 0usize;
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    seen += 1;
                    self.rows_stepped += 1;
                    trace!(row = seen, "row available");
                    on_row(row)?;
                }
                Ok(None) => break,
                Err(e) => return Err(SqlFluentError::StepError(e)),
            }
        }
        drop(rows);
        self.state = StatementState::Finished;
        Ok(seen)
    }

    /// Release the native statement. Calling it again is a no-op.
    ///
    /// # Errors
    /// Returns `SqlFluentError::FinalizeError` if the engine reports a failure on release.
    pub fn finalize(&mut self) -> Result<()> {
        let Some(stmt) = self.stmt.take() else {
            return Ok(());
        };
        self.state = StatementState::Released;
        debug!(rows = self.rows_stepped, "finalizing statement");
        stmt.finalize().map_err(SqlFluentError::FinalizeError)
    }

    #[must_use]
    pub fn state(&self) -> StatementState {
        self.state
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.stmt.is_some()
    }

    /// Number of placeholders in the prepared text, `0` once released.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.stmt.as_ref().map_or(0, Statement::parameter_count)
    }

    /// Number of result columns, `0` once released.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.stmt.as_ref().map_or(0, Statement::column_count)
    }

    /// Values successfully bound so far.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bound
    }

    /// Rows stepped over the life of the handle.
    #[must_use]
    pub fn rows_stepped(&self) -> usize {
        self.rows_stepped
    }

    #[must_use]
    pub fn sql(&self) -> String {
        self.sql.to_utf8()
    }

    #[must_use]
    pub fn sql_utf16(&self) -> &Utf16String {
        self.sql.as_utf16()
    }
}

impl fmt::Debug for StatementHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementHandle")
            .field("sql", &self.sql())
            .field("state", &self.state)
            .field("bound", &self.bound)
            .field("rows_stepped", &self.rows_stepped)
            .finish()
    }
}
