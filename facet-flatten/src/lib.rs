#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

use facet_core::Facet;
use facet_value::VObject;

mod flattener;
mod leaf;
mod mapper;
mod node;
mod report;

pub use flattener::{ArrayPolicy, Flattener, NilLeaf};
pub use mapper::{FieldAliases, FieldMapper, RecordEntries, StructMapper};
pub use report::{FlattenError, Omission, OmissionReason};

/// Flattens `value` with the default [`Flattener`].
///
/// ```
/// use facet_value::value;
///
/// let nested = value!({"a": {"b": 1, "c": [true]}});
/// let flat = facet_flatten::flatten(&nested);
/// assert_eq!(flat.len(), 2);
/// assert!(flat.contains_key("a.b"));
/// assert!(flat.contains_key("a.c"));
/// ```
pub fn flatten<'a, T: Facet<'a> + ?Sized>(value: &T) -> VObject {
    Flattener::new().flatten(value)
}

/// Flattens `value` with the default [`Flattener`], prefixing every key with `prefix`.
pub fn flatten_prefixed<'a, T: Facet<'a> + ?Sized>(value: &T, prefix: &str) -> VObject {
    Flattener::new().flatten_prefixed(value, prefix)
}

/// Flattens `value` with the default [`Flattener`] into `target`.
pub fn flatten_into<'a, T: Facet<'a> + ?Sized>(value: &T, prefix: &str, target: &mut VObject) {
    Flattener::new().flatten_into(value, prefix, target);
}
