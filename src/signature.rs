//! Compile-time description of a row consumer's argument list.
//!
//! A consumer's argument tuple is its type-list descriptor: `(i32, String, f64)` says "three
//! columns, read as i32, text and f64, in that order". [`RowSignature`] is implemented for
//! tuples of [`ColumnValue`]s up to twelve elements and [`RowConsumer`] for every `FnMut` of the
//! matching arity, so a closure with annotated arguments is enough for the compiler to pick the
//! descriptor:
//!
//! ```rust
//! use sql_fluent::{RowSignature, ValueKind};
//!
//! let sig = <(i32, String, f64)>::signature();
//! assert_eq!(sig.arity(), 3);
//! assert_eq!(sig.kinds(), &[ValueKind::Int32, ValueKind::Text, ValueKind::Float64]);
//! ```
//!
//! Any other argument type fails to compile because [`ColumnValue`] is sealed.

use std::fmt;

use rusqlite::Row;

use crate::codec::{ColumnValue, read_column};
use crate::error::Result;
use crate::types::ValueKind;

/// Runtime view of a consumer's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    kinds: Vec<ValueKind>,
}

impl Signature {
    #[must_use]
    pub fn new(kinds: Vec<ValueKind>) -> Self {
        Self { kinds }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn kinds(&self) -> &[ValueKind] {
        &self.kinds
    }

    /// Type of argument `idx`, counted from zero.
    #[must_use]
    pub fn kind(&self, idx: usize) -> Option<ValueKind> {
        self.kinds.get(idx).copied()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, kind) in self.kinds.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        f.write_str(")")
    }
}

/// An ordered list of column types decoded from columns `0..ARITY`.
pub trait RowSignature: Sized {
    const ARITY: usize;

    fn signature() -> Signature;

    /// Decode columns `0..ARITY` of the current row.
    ///
    /// # Errors
    /// Returns `SqlFluentError::StepError` if the engine rejects a column index.
    fn decode_row(row: &Row<'_>) -> Result<Self>;
}

/// Something that accepts one decoded row at a time.
pub trait RowConsumer<Args: RowSignature> {
    fn consume(&mut self, args: Args);
}

impl RowSignature for () {
    const ARITY: usize = 0;

    fn signature() -> Signature {
        Signature::new(Vec::new())
    }

    fn decode_row(_row: &Row<'_>) -> Result<Self> {
        Ok(())
    }
}

impl<Func> RowConsumer<()> for Func
where
    Func: FnMut(),
{
    fn consume(&mut self, (): ()) {
        (self)();
    }
}

macro_rules! impl_row_signature {
    ($count:literal; $($ty:ident $idx:tt),+) => {
        impl<$($ty: ColumnValue),+> RowSignature for ($($ty,)+) {
            const ARITY: usize = $count;

            fn signature() -> Signature {
                Signature::new(vec![$($ty::KIND),+])
            }

            fn decode_row(row: &Row<'_>) -> Result<Self> {
                Ok(($(read_column::<$ty>(row, $idx)?,)+))
            }
        }

        impl<Func, $($ty: ColumnValue),+> RowConsumer<($($ty,)+)> for Func
        where
            Func: FnMut($($ty),+),
        {
            fn consume(&mut self, args: ($($ty,)+)) {
                (self)($(args.$idx),+);
            }
        }
    };
}

impl_row_signature!(1; A 0);
impl_row_signature!(2; A 0, B 1);
impl_row_signature!(3; A 0, B 1, C 2);
impl_row_signature!(4; A 0, B 1, C 2, D 3);
impl_row_signature!(5; A 0, B 1, C 2, D 3, E 4);
impl_row_signature!(6; A 0, B 1, C 2, D 3, E 4, F 5);
impl_row_signature!(7; A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_row_signature!(8; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_row_signature!(9; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_row_signature!(10; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_row_signature!(11; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_row_signature!(12; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Utf16String;

    fn signature_of<Args: RowSignature, F: RowConsumer<Args>>(_consumer: &F) -> Signature {
        Args::signature()
    }

    #[test]
    fn closure_arguments_define_the_signature() {
        let consumer = |_age: i32, _name: String, _weight: f64| {};
        let sig = signature_of(&consumer);
        assert_eq!(sig.arity(), 3);
        assert_eq!(sig.kind(0), Some(ValueKind::Int32));
        assert_eq!(sig.kind(1), Some(ValueKind::Text));
        assert_eq!(sig.kind(2), Some(ValueKind::Float64));
        assert_eq!(sig.kind(3), None);
        assert_eq!(sig.to_string(), "(i32, text, f64)");
    }

    #[test]
    fn function_items_are_consumers() {
        fn wide(_a: i64, _b: f32, _c: Utf16String, _d: i32) {}
        let sig = signature_of(&wide);
        assert_eq!(
            sig.kinds(),
            &[
                ValueKind::Int64,
                ValueKind::Float32,
                ValueKind::Text16,
                ValueKind::Int32
            ]
        );
    }

    #[test]
    fn zero_arity_consumer() {
        let sig = signature_of(&|| {});
        assert_eq!(sig.arity(), 0);
        assert_eq!(<()>::ARITY, 0);
        assert_eq!(sig.to_string(), "()");
    }

    #[test]
    fn consume_passes_arguments_positionally() {
        let mut seen = Vec::new();
        let mut consumer = |a: i32, b: String| seen.push(format!("{a}:{b}"));
        RowConsumer::consume(&mut consumer, (7, "x".to_string()));
        RowConsumer::consume(&mut consumer, (8, "y".to_string()));
        assert_eq!(seen, vec!["7:x", "8:y"]);
    }
}
