//! Convenient imports for common functionality.
//!
//! ```rust
//! use sql_fluent::prelude::*;
//! # let _ = Database::open_in_memory();
//! ```

pub use crate::binder::Binder;
pub use crate::config::{DatabaseOptions, DatabaseOptionsBuilder, JournalMode};
pub use crate::connection::{Database, IN_MEMORY};
pub use crate::error::SqlFluentError;
pub use crate::signature::{RowConsumer, RowSignature, Signature};
pub use crate::types::{SqlText, Utf16String, ValueKind};
