use serde::Deserialize;

use crate::connection::{Database, IN_MEMORY};
use crate::error::{Result, SqlFluentError};

/// `SQLite` journal modes accepted by [`DatabaseOptions::journal_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

/// Options for opening a [`Database`].
///
/// Deserializable so it can sit in an application's config file; missing fields take their
/// defaults:
/// ```rust
/// use sql_fluent::config::{DatabaseOptions, JournalMode};
///
/// let opts: DatabaseOptions =
///     serde_json::from_str(r#"{ "db_path": "app.db", "journal_mode": "wal" }"#).unwrap();
/// assert_eq!(opts.journal_mode, Some(JournalMode::Wal));
/// assert!(opts.create_if_missing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    pub db_path: String,
    /// Open read-only. Takes precedence over `create_if_missing`.
    pub read_only: bool,
    pub create_if_missing: bool,
    pub busy_timeout_ms: Option<u64>,
    pub journal_mode: Option<JournalMode>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self::new(IN_MEMORY.to_string())
    }
}

impl DatabaseOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            read_only: false,
            create_if_missing: true,
            busy_timeout_ms: None,
            journal_mode: None,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Check the options before opening.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` for an empty path or a busy timeout `SQLite`
    /// cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.db_path.trim().is_empty() {
            return Err(SqlFluentError::ConfigError("db_path must not be empty".into()));
        }
        if let Some(ms) = self.busy_timeout_ms
            && i32::try_from(ms).is_err()
        {
            return Err(SqlFluentError::ConfigError(format!(
                "busy_timeout_ms {ms} exceeds {}",
                i32::MAX
            )));
        }
        Ok(())
    }
}

/// Fluent builder for [`DatabaseOptions`].
#[derive(Debug, Clone)]
pub struct DatabaseOptionsBuilder {
    opts: DatabaseOptions,
}

impl DatabaseOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: DatabaseOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.opts.read_only = read_only;
        self
    }

    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.opts.create_if_missing = create;
        self
    }

    #[must_use]
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.opts.busy_timeout_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.opts.journal_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseOptions {
        self.opts
    }

    /// Open a [`Database`] with these options.
    ///
    /// # Errors
    /// See [`Database::open_with`].
    pub fn open(self) -> Result<Database<'static>> {
        Database::open_with(&self.finish())
    }
}

impl Database<'static> {
    #[must_use]
    pub fn builder(db_path: String) -> DatabaseOptionsBuilder {
        DatabaseOptionsBuilder::new(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_open_in_memory() {
        let opts = DatabaseOptions::default();
        assert_eq!(opts.db_path, IN_MEMORY);
        assert!(opts.create_if_missing);
        assert!(!opts.read_only);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = DatabaseOptions::new("  ".into()).validate().unwrap_err();
        assert!(matches!(err, SqlFluentError::ConfigError(_)));
    }

    #[test]
    fn oversized_busy_timeout_is_rejected() {
        let opts = DatabaseOptionsBuilder::new("x.db".into())
            .busy_timeout_ms(u64::from(u32::MAX))
            .finish();
        assert!(matches!(
            opts.validate(),
            Err(SqlFluentError::ConfigError(_))
        ));
    }

    #[test]
    fn builder_sets_every_field() {
        let opts = Database::builder("app.db".into())
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout_ms(250)
            .journal_mode(JournalMode::Wal)
            .finish();
        assert_eq!(
            opts,
            DatabaseOptions {
                db_path: "app.db".into(),
                read_only: true,
                create_if_missing: false,
                busy_timeout_ms: Some(250),
                journal_mode: Some(JournalMode::Wal),
            }
        );
    }
}
