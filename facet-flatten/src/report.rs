//! Diagnostics for values that were left out of a flattened result.
//!
//! Flattening never fails by default: shapes that cannot be represented in a
//! flat map are dropped. [`Flattener::flatten_with_report`] and
//! [`Flattener::try_flatten`] surface those drops as [`Omission`]s.
//!
//! [`Flattener::flatten_with_report`]: crate::Flattener::flatten_with_report
//! [`Flattener::try_flatten`]: crate::Flattener::try_flatten

use alloc::string::String;
use alloc::vec::Vec;

/// A value that was dropped while flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Omission {
    /// Key path at which the value was found (empty for the root).
    pub path: String,
    /// Why the value was dropped.
    pub reason: OmissionReason,
}

impl Omission {
    pub(crate) fn new(path: &str, reason: OmissionReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// Why a value did not make it into the flat result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OmissionReason {
    /// A map whose keys are not strings. The whole map is dropped.
    NonStringKeys {
        /// Type of the map's keys.
        key_type: String,
    },

    /// A `None` or null element of a collection (elementwise policy only).
    NilElement {
        /// Position of the element in its collection.
        index: usize,
    },

    /// A collection element with no flat representation (elementwise policy only).
    UnrepresentableElement {
        /// Position of the element in its collection.
        index: usize,
        /// Type of the element.
        type_name: String,
    },

    /// A leaf value with no flat representation: no `Display`, no `Debug`.
    UnrepresentableLeaf {
        /// Type of the leaf.
        type_name: String,
    },

    /// An enum whose active variant could not be determined.
    UnknownVariant {
        /// Type of the enum.
        type_name: String,
    },

    /// A nil value reached with an empty key, so there is nowhere to put it.
    UnkeyedNil,

    /// A scalar reached with an empty key, so there is nowhere to put it.
    UnkeyedScalar,
}

impl core::fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OmissionReason::NonStringKeys { key_type } => {
                write!(f, "map keys of type {key_type} are not strings")
            }
            OmissionReason::NilElement { index } => {
                write!(f, "element {index} is nil")
            }
            OmissionReason::UnrepresentableElement { index, type_name } => {
                write!(f, "element {index} ({type_name}) has no flat representation")
            }
            OmissionReason::UnrepresentableLeaf { type_name } => {
                write!(f, "{type_name} has no flat representation")
            }
            OmissionReason::UnknownVariant { type_name } => {
                write!(f, "{type_name} has no readable active variant")
            }
            OmissionReason::UnkeyedNil => f.write_str("nil value has no key"),
            OmissionReason::UnkeyedScalar => f.write_str("scalar value has no key"),
        }
    }
}

impl core::fmt::Display for Omission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Returned by [`Flattener::try_flatten`](crate::Flattener::try_flatten) when
/// any part of the input had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenError {
    omissions: Vec<Omission>,
}

impl FlattenError {
    pub(crate) fn new(omissions: Vec<Omission>) -> Self {
        Self { omissions }
    }

    /// Every value that was dropped, in traversal order.
    pub fn omissions(&self) -> &[Omission] {
        &self.omissions
    }

    /// Consumes the error, returning the omissions.
    pub fn into_omissions(self) -> Vec<Omission> {
        self.omissions
    }
}

impl core::fmt::Display for FlattenError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.omissions.as_slice() {
            [] => f.write_str("nothing was omitted"),
            [only] => write!(f, "could not flatten {only}"),
            [first, rest @ ..] => write!(
                f,
                "could not flatten {first} (and {} more omissions)",
                rest.len()
            ),
        }
    }
}

impl core::error::Error for FlattenError {}
