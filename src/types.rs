use std::fmt;

/// Semantic type of a bound parameter or an extracted column.
///
/// The set is closed: these are the only host types the codec maps to and from `SQLite` storage
/// classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 32-bit signed integer, stored as INTEGER
    Int32,
    /// 64-bit signed integer, stored as INTEGER
    Int64,
    /// Single precision float, widened to REAL
    Float32,
    /// Double precision float, stored as REAL
    Float64,
    /// UTF-8 text
    Text,
    /// UTF-16 text
    Text16,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Text => "text",
            Self::Text16 => "text16",
        };
        f.write_str(name)
    }
}

/// Owned UTF-16 text, the counterpart of `String` for callers working in 16-bit code units.
///
/// ```rust
/// use sql_fluent::Utf16String;
///
/// let name = Utf16String::from("bob");
/// assert_eq!(name.as_units().len(), 3);
/// assert_eq!(name.to_string_lossy(), "bob");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Utf16String(Vec<u16>);

impl Utf16String {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap raw code units. Unpaired surrogates are kept as-is and replaced only when the text
    /// is converted to UTF-8.
    #[must_use]
    pub fn from_units(units: Vec<u16>) -> Self {
        Self(units)
    }

    #[must_use]
    pub fn as_units(&self) -> &[u16] {
        &self.0
    }

    #[must_use]
    pub fn into_units(self) -> Vec<u16> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to UTF-8, replacing unpaired surrogates with U+FFFD.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }
}

impl From<&str> for Utf16String {
    fn from(value: &str) -> Self {
        Self(value.encode_utf16().collect())
    }
}

impl From<String> for Utf16String {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&[u16]> for Utf16String {
    fn from(value: &[u16]) -> Self {
        Self(value.to_vec())
    }
}

impl fmt::Display for Utf16String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// SQL text handed to [`Database::statement`](crate::Database::statement).
///
/// Accepted as UTF-8 or UTF-16 and always held as UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlText(Utf16String);

impl SqlText {
    #[must_use]
    pub fn as_utf16(&self) -> &Utf16String {
        &self.0
    }

    /// The text in the form `rusqlite` prepares from.
    #[must_use]
    pub fn to_utf8(&self) -> String {
        self.0.to_string_lossy()
    }
}

impl From<&str> for SqlText {
    fn from(value: &str) -> Self {
        Self(Utf16String::from(value))
    }
}

impl From<String> for SqlText {
    fn from(value: String) -> Self {
        Self(Utf16String::from(value))
    }
}

impl From<&String> for SqlText {
    fn from(value: &String) -> Self {
        Self(Utf16String::from(value.as_str()))
    }
}

impl From<Utf16String> for SqlText {
    fn from(value: Utf16String) -> Self {
        Self(value)
    }
}

impl From<&Utf16String> for SqlText {
    fn from(value: &Utf16String) -> Self {
        Self(value.clone())
    }
}

impl From<&[u16]> for SqlText {
    fn from(value: &[u16]) -> Self {
        Self(Utf16String::from(value))
    }
}
