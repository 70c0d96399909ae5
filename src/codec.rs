//! Conversions between host values and `SQLite` storage classes.
//!
//! | Rust type       | bound as | read from                                   |
//! |-----------------|----------|---------------------------------------------|
//! | `i32`           | INTEGER  | any class, `SQLite` integer coercion, truncated |
//! | `i64`           | INTEGER  | any class, `SQLite` integer coercion        |
//! | `f32`           | REAL     | any class, read as REAL then narrowed       |
//! | `f64`           | REAL     | any class, `SQLite` real coercion           |
//! | `String`/`&str` | TEXT     | any class, numbers rendered as `SQLite` does |
//! | [`Utf16String`] | TEXT     | any class, transcoded from UTF-8            |
//!
//! NULL is read as the zero value of the target type (`0`, `0.0`, empty text). There is no
//! `Option` mapping; a NULL column and a missing row look the same to a single-value read.

use rusqlite::types::{ToSqlOutput, Value, ValueRef};

use crate::error::{Result, SqlFluentError};
use crate::real_text;
use crate::types::{Utf16String, ValueKind};

mod sealed {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
    impl Sealed for &str {}
    impl Sealed for crate::types::Utf16String {}
    impl Sealed for &crate::types::Utf16String {}
}

/// A value that can be appended as a positional parameter.
///
/// Sealed: only the codec's scalar types implement it, so binding anything else fails to
/// compile.
pub trait BindValue: sealed::Sealed {
    const KIND: ValueKind;

    /// Encode into the form handed to the engine's bind call.
    fn encode(&self) -> ToSqlOutput<'_>;
}

/// A value that can be decoded from a result column.
///
/// Sealed for the same reason as [`BindValue`].
pub trait ColumnValue: sealed::Sealed + Sized {
    const KIND: ValueKind;

    /// The value NULL decodes to.
    fn zero() -> Self;

    /// Decode a column applying `SQLite`'s type coercions.
    fn decode(value: ValueRef<'_>) -> Self;
}

impl BindValue for i32 {
    const KIND: ValueKind = ValueKind::Int32;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Owned(Value::Integer(i64::from(*self)))
    }
}

impl BindValue for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Owned(Value::Integer(*self))
    }
}

// There is no single precision wire path.
impl BindValue for f32 {
    const KIND: ValueKind = ValueKind::Float32;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Owned(Value::Real(f64::from(*self)))
    }
}

impl BindValue for f64 {
    const KIND: ValueKind = ValueKind::Float64;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Owned(Value::Real(*self))
    }
}

// Borrowed text is bound with SQLITE_TRANSIENT by rusqlite, so the engine copies it.
impl BindValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Borrowed(ValueRef::Text(self.as_bytes()))
    }
}

impl BindValue for &str {
    const KIND: ValueKind = ValueKind::Text;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Borrowed(ValueRef::Text(self.as_bytes()))
    }
}

impl BindValue for Utf16String {
    const KIND: ValueKind = ValueKind::Text16;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Owned(Value::Text(self.to_string_lossy()))
    }
}

impl BindValue for &Utf16String {
    const KIND: ValueKind = ValueKind::Text16;

    fn encode(&self) -> ToSqlOutput<'_> {
        ToSqlOutput::Owned(Value::Text(self.to_string_lossy()))
    }
}

impl ColumnValue for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn zero() -> Self {
        0
    }

    // `as` saturates and truncates toward zero, matching SQLite's REAL to INTEGER cast.
    #[allow(clippy::cast_possible_truncation)]
    fn decode(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => 0,
            ValueRef::Integer(i) => i,
            ValueRef::Real(f) => f as i64,
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => parse_int_prefix(bytes),
        }
    }
}

impl ColumnValue for i32 {
    const KIND: ValueKind = ValueKind::Int32;

    fn zero() -> Self {
        0
    }

    // Same narrowing as sqlite3_column_int: keep the low 32 bits.
    #[allow(clippy::cast_possible_truncation)]
    fn decode(value: ValueRef<'_>) -> Self {
        i64::decode(value) as i32
    }
}

impl ColumnValue for f64 {
    const KIND: ValueKind = ValueKind::Float64;

    fn zero() -> Self {
        0.0
    }

    #[allow(clippy::cast_precision_loss)]
    fn decode(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => 0.0,
            ValueRef::Integer(i) => i as f64,
            ValueRef::Real(f) => f,
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => parse_real_prefix(bytes),
        }
    }
}

impl ColumnValue for f32 {
    const KIND: ValueKind = ValueKind::Float32;

    fn zero() -> Self {
        0.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn decode(value: ValueRef<'_>) -> Self {
        f64::decode(value) as f32
    }
}

impl ColumnValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn zero() -> Self {
        String::new()
    }

    fn decode(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => String::new(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => real_text::render(f),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

impl ColumnValue for Utf16String {
    const KIND: ValueKind = ValueKind::Text16;

    fn zero() -> Self {
        Utf16String::new()
    }

    fn decode(value: ValueRef<'_>) -> Self {
        Utf16String::from(String::decode(value))
    }
}

/// Read column `idx` of the current row.
///
/// # Errors
/// Returns `SqlFluentError::StepError` when the engine rejects the column index.
pub(crate) fn read_column<T: ColumnValue>(row: &rusqlite::Row<'_>, idx: usize) -> Result<T> {
    let value = row.get_ref(idx).map_err(SqlFluentError::StepError)?;
    Ok(T::decode(value))
}

/// Leading-integer parse in the manner of `sqlite3Atoi64`: skip leading whitespace, accept a
/// sign and digits, stop at the first other byte, saturate on overflow.
fn parse_int_prefix(bytes: &[u8]) -> i64 {
    let text = trim_ascii_start(bytes);
    let (negative, digits) = match text.first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut acc: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i64::from(b - b'0');
        acc = match acc.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        }) {
            Some(v) => v,
            None => return if negative { i64::MIN } else { i64::MAX },
        };
    }
    acc
}

/// Longest numeric prefix parsed as a real, `0.0` when there is none.
fn parse_real_prefix(bytes: &[u8]) -> f64 {
    let text = trim_ascii_start(bytes);
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut valid_end = 0;

    while end < text.len() {
        let b = text[end];
        match b {
            b'0'..=b'9' => {
                seen_digit = true;
                valid_end = end + 1;
            }
            b'+' | b'-' if end == 0 || matches!(text[end - 1], b'e' | b'E') => {}
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end += 1;
    }

    std::str::from_utf8(&text[..valid_end])
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
