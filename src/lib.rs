//! Typed, fluent parameter binding and row extraction for `SQLite` prepared statements.
//!
//! ```rust
//! use sql_fluent::prelude::*;
//!
//! # fn main() -> Result<(), SqlFluentError> {
//! let db = Database::open_in_memory()?;
//! db.execute("CREATE TABLE user (age INT, name TEXT, weight REAL)")?;
//!
//! db.statement("INSERT INTO user (age, name, weight) VALUES (?, ?, ?)")?
//!     .bind(20)?
//!     .bind(Utf16String::from("bob"))?
//!     .bind(83.25f32)?
//!     .execute()?;
//!
//! let mut names = Vec::new();
//! db.statement("SELECT age, name, weight FROM user WHERE age > ?")?
//!     .bind(18)?
//!     .for_each(|_age: i32, name: String, _weight: f64| names.push(name))?;
//! assert_eq!(names, vec!["bob".to_string()]);
//!
//! let count: i32 = db.statement("SELECT count(*) FROM user")?.extract()?;
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

pub mod binder;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod prelude;
mod real_text;
pub mod signature;
pub mod statement;
pub mod types;

pub use binder::Binder;
pub use codec::{BindValue, ColumnValue};
pub use config::{DatabaseOptions, DatabaseOptionsBuilder, JournalMode};
pub use connection::{Database, IN_MEMORY};
pub use error::{Result, SqlFluentError};
pub use signature::{RowConsumer, RowSignature, Signature};
pub use statement::{StatementHandle, StatementState};
pub use types::{SqlText, Utf16String, ValueKind};
