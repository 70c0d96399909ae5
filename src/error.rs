use thiserror::Error;

/// Errors raised while preparing, binding, stepping, or releasing a statement.
///
/// Every variant that originates in `SQLite` carries the engine's own error so its message is
/// shown verbatim.
#[derive(Debug, Error)]
pub enum SqlFluentError {
    /// The engine refused to prepare the SQL text.
    #[error("{source}")]
    PrepareError {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The engine rejected a bind call (for example, more values than placeholders).
    #[error("parameter {index}: {source}")]
    BindError {
        /// 1-based placeholder position.
        index: usize,
        #[source]
        source: rusqlite::Error,
    },

    /// The engine reported a failure while advancing the statement or reading a column.
    #[error("{0}")]
    StepError(#[source] rusqlite::Error),

    /// Releasing the prepared statement failed.
    #[error("{0}")]
    FinalizeError(#[source] rusqlite::Error),

    /// A single-value extraction saw more than one row.
    #[error("not every row extracted")]
    CardinalityError,

    /// The statement was already finalized.
    #[error("statement already finalized")]
    StatementReleased,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),
}

impl SqlFluentError {
    /// The underlying engine error, when there is one.
    #[must_use]
    pub fn engine_error(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::PrepareError { source, .. } | Self::BindError { source, .. } => Some(source),
            Self::StepError(e) | Self::FinalizeError(e) | Self::SqliteError(e) => Some(e),
            Self::CardinalityError
            | Self::StatementReleased
            | Self::ConnectionError(_)
            | Self::ConfigError(_) => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SqlFluentError>;
