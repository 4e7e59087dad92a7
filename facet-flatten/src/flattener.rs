//! The flattening walk.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Display;

use facet_core::{Facet, StructKind};
use facet_reflect::{HasFields as _, Peek};
use facet_value::{VArray, VObject, Value};
use tracing::{debug, trace};

use crate::leaf::leaf_value;
use crate::mapper::{FieldMapper, RecordEntries, StructMapper};
use crate::node::{Collection, Mapping, Node, Record, is_string_key, key_str};
use crate::report::{FlattenError, Omission, OmissionReason};

/// How collections (lists, arrays, sets, tuples) are folded into the flat result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayPolicy {
    /// Keep the collection as a single array under its own key. Each element
    /// is flattened on its own, starting from an empty prefix.
    ///
    /// `{"arr": [{"x": {"y": 1}}]}` becomes `{"arr": [{"x.y": 1}]}`.
    /// `None` elements are left out of the array.
    #[default]
    Elementwise,

    /// Merge elements into the parent key space, using their index as a key.
    ///
    /// `{"arr": [{"x": 1}, 2]}` becomes `{"arr.0.x": 1, "arr.1": 2}`.
    Indexed,
}

/// What a nil value (`()` or a null [`Value`]) becomes when it has a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NilLeaf {
    /// Write [`Value::NULL`].
    #[default]
    Null,
    /// Write an empty string.
    EmptyString,
}

impl NilLeaf {
    fn value(self) -> Value {
        match self {
            NilLeaf::Null => Value::NULL,
            NilLeaf::EmptyString => Value::from(""),
        }
    }
}

/// Flattens nested values into a single-level [`VObject`].
///
/// ```
/// use facet::Facet;
/// use facet_flatten::{ArrayPolicy, Flattener};
///
/// #[derive(Facet)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// #[derive(Facet)]
/// struct Shape {
///     name: String,
///     points: Vec<Point>,
/// }
///
/// let shape = Shape {
///     name: "line".into(),
///     points: vec![Point { x: 0, y: 0 }, Point { x: 3, y: 4 }],
/// };
///
/// let flat = Flattener::new()
///     .with_array_policy(ArrayPolicy::Indexed)
///     .flatten(&shape);
/// assert_eq!(flat.len(), 5);
/// assert_eq!(flat["points.1.y"].as_number().unwrap().to_i64(), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct Flattener<M = FieldMapper> {
    array_policy: ArrayPolicy,
    separator: String,
    nil_leaf: NilLeaf,
    mapper: M,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            array_policy: ArrayPolicy::default(),
            separator: ".".into(),
            nil_leaf: NilLeaf::default(),
            mapper: FieldMapper::default(),
        }
    }
}

impl Flattener {
    /// Create a flattener with the elementwise array policy, `.` as separator
    /// and declared field names.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: StructMapper> Flattener<M> {
    /// Set the array policy
    pub fn with_array_policy(mut self, policy: ArrayPolicy) -> Self {
        self.array_policy = policy;
        self
    }

    /// Set the string placed between the segments of a key
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set what keyed nil values become
    pub fn with_nil_leaf(mut self, nil_leaf: NilLeaf) -> Self {
        self.nil_leaf = nil_leaf;
        self
    }

    /// Use `mapper` to turn records into entries
    pub fn with_mapper<N: StructMapper>(self, mapper: N) -> Flattener<N> {
        Flattener {
            array_policy: self.array_policy,
            separator: self.separator,
            nil_leaf: self.nil_leaf,
            mapper,
        }
    }

    /// The array policy in use.
    pub fn array_policy(&self) -> ArrayPolicy {
        self.array_policy
    }

    /// The key separator in use.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// The struct mapper in use.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Flattens `value` with an empty prefix.
    ///
    /// A bare scalar or nil at the root has no key to live under, so the
    /// result is empty.
    pub fn flatten<'a, T: Facet<'a> + ?Sized>(&self, value: &T) -> VObject {
        self.flatten_peek(Peek::new(value), "")
    }

    /// Flattens `value`, prefixing every key with `prefix`.
    pub fn flatten_prefixed<'a, T: Facet<'a> + ?Sized>(&self, value: &T, prefix: &str) -> VObject {
        self.flatten_peek(Peek::new(value), prefix)
    }

    /// Flattens `value` into an existing result, so several values can
    /// accumulate into one map. Existing keys are overwritten.
    pub fn flatten_into<'a, T: Facet<'a> + ?Sized>(
        &self,
        value: &T,
        prefix: &str,
        target: &mut VObject,
    ) {
        self.flatten_peek_into(Peek::new(value), prefix, target);
    }

    /// Like [`Flattener::flatten_prefixed`], for an already reflected value.
    pub fn flatten_peek(&self, peek: Peek<'_, '_>, prefix: &str) -> VObject {
        let mut target = VObject::new();
        self.flatten_peek_into(peek, prefix, &mut target);
        target
    }

    /// Like [`Flattener::flatten_into`], for an already reflected value.
    pub fn flatten_peek_into(&self, peek: Peek<'_, '_>, prefix: &str, target: &mut VObject) {
        Walk::new(self, None).visit(peek, prefix, target);
    }

    /// Flattens `value` and also returns every value that was left out.
    ///
    /// The result is the same one [`Flattener::flatten_prefixed`] returns.
    pub fn flatten_with_report<'a, T: Facet<'a> + ?Sized>(
        &self,
        value: &T,
        prefix: &str,
    ) -> (VObject, Vec<Omission>) {
        let mut target = VObject::new();
        let mut omissions = Vec::new();
        Walk::new(self, Some(&mut omissions)).visit(Peek::new(value), prefix, &mut target);
        (target, omissions)
    }

    /// Flattens `value`, failing if anything had to be left out.
    pub fn try_flatten<'a, T: Facet<'a> + ?Sized>(
        &self,
        value: &T,
        prefix: &str,
    ) -> Result<VObject, FlattenError> {
        let (target, omissions) = self.flatten_with_report(value, prefix);
        if omissions.is_empty() {
            Ok(target)
        } else {
            Err(FlattenError::new(omissions))
        }
    }

    fn key(&self, prefix: &str, segment: impl Display) -> String {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}{}{segment}", self.separator)
        }
    }
}

/// State of a single flattening call.
struct Walk<'w, M> {
    flattener: &'w Flattener<M>,
    omissions: Option<&'w mut Vec<Omission>>,
}

impl<'w, M: StructMapper> Walk<'w, M> {
    fn new(flattener: &'w Flattener<M>, omissions: Option<&'w mut Vec<Omission>>) -> Self {
        Self {
            flattener,
            omissions,
        }
    }

    fn visit<'mem, 'facet>(
        &mut self,
        peek: Peek<'mem, 'facet>,
        prefix: &str,
        target: &mut VObject,
    ) {
        let node = Node::classify(peek);
        trace!(prefix, shape = %peek.shape(), kind = node.kind(), "visit");

        match node {
            Node::Nil => {
                if prefix.is_empty() {
                    self.omit(prefix, OmissionReason::UnkeyedNil);
                } else {
                    target.insert(prefix, self.flattener.nil_leaf.value());
                }
            }
            Node::NilReference => {
                if prefix.is_empty() {
                    self.omit(prefix, OmissionReason::UnkeyedNil);
                } else {
                    target.insert(prefix, Value::NULL);
                }
            }
            Node::Mapping(mapping) => self.mapping(mapping, prefix, target),
            Node::Record(record) => self.record(record, prefix, target),
            Node::Collection(collection) => match self.flattener.array_policy {
                ArrayPolicy::Elementwise => self.elementwise(collection, prefix, target),
                ArrayPolicy::Indexed => self.indexed(collection, prefix, target),
            },
            Node::Scalar(leaf) => {
                if prefix.is_empty() {
                    self.omit(prefix, OmissionReason::UnkeyedScalar);
                    return;
                }
                match leaf_value(leaf) {
                    Some(value) => {
                        target.insert(prefix, value);
                    }
                    None => self.omit(
                        prefix,
                        OmissionReason::UnrepresentableLeaf {
                            type_name: leaf.shape().to_string(),
                        },
                    ),
                }
            }
        }
    }

    fn mapping<'mem, 'facet>(
        &mut self,
        mapping: Mapping<'mem, 'facet>,
        prefix: &str,
        target: &mut VObject,
    ) {
        match mapping {
            Mapping::Map(map) => {
                if !is_string_key(map.def().k()) {
                    self.omit(
                        prefix,
                        OmissionReason::NonStringKeys {
                            key_type: map.def().k().to_string(),
                        },
                    );
                    return;
                }
                for (key, value) in map.iter() {
                    if let Some(key) = key_str(key) {
                        let key = self.flattener.key(prefix, key);
                        self.visit(value, &key, target);
                    }
                }
            }
            Mapping::Dynamic(object) => {
                for (key, value) in object.object_iter().into_iter().flatten() {
                    let key = self.flattener.key(prefix, key);
                    self.visit(value, &key, target);
                }
            }
        }
    }

    fn record<'mem, 'facet>(
        &mut self,
        record: Record<'mem, 'facet>,
        prefix: &str,
        target: &mut VObject,
    ) {
        match record {
            Record::Struct(struct_, owner) => {
                let entries = self
                    .flattener
                    .mapper
                    .map_fields(owner, struct_.fields_for_serialize());
                self.entries(entries, prefix, target);
            }
            Record::Variant(enum_, owner) => {
                let Ok(variant) = enum_.active_variant() else {
                    self.omit(
                        prefix,
                        OmissionReason::UnknownVariant {
                            type_name: owner.to_string(),
                        },
                    );
                    return;
                };
                let key = self.flattener.key(prefix, variant.effective_name());
                let mut entries = self
                    .flattener
                    .mapper
                    .map_fields(owner, enum_.fields_for_serialize());

                // A newtype variant is keyed by the variant name alone.
                let newtype = matches!(
                    variant.data.kind,
                    StructKind::Tuple | StructKind::TupleStruct
                ) && variant.data.fields.len() == 1;
                if newtype
                    && entries.len() == 1
                    && let Some((_, payload)) = entries.pop()
                {
                    self.visit(payload, &key, target);
                } else {
                    self.entries(entries, &key, target);
                }
            }
            Record::Result(result) => {
                let (name, inner) = if result.is_ok() {
                    ("Ok", result.ok())
                } else {
                    ("Err", result.err())
                };
                if let Some(inner) = inner {
                    let key = self.flattener.key(prefix, name);
                    self.visit(inner, &key, target);
                }
            }
        }
    }

    fn entries<'mem, 'facet>(
        &mut self,
        entries: RecordEntries<'mem, 'facet>,
        prefix: &str,
        target: &mut VObject,
    ) {
        for (name, value) in entries {
            let key = self.flattener.key(prefix, &name);
            self.visit(value, &key, target);
        }
    }

    fn elementwise<'mem, 'facet>(
        &mut self,
        collection: Collection<'mem, 'facet>,
        prefix: &str,
        target: &mut VObject,
    ) {
        let items = collection.items();
        let mut array = VArray::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            match Node::classify(item) {
                Node::Nil | Node::NilReference => {
                    self.omit(prefix, OmissionReason::NilElement { index });
                }
                Node::Scalar(leaf) => match leaf_value(leaf) {
                    Some(value) => array.push(value),
                    None => self.omit(
                        prefix,
                        OmissionReason::UnrepresentableElement {
                            index,
                            type_name: leaf.shape().to_string(),
                        },
                    ),
                },
                Node::Mapping(_) | Node::Record(_) | Node::Collection(_) => {
                    let mut element = VObject::new();
                    self.visit(item, "", &mut element);
                    array.push(element);
                }
            }
        }

        target.insert(prefix, array);
    }

    fn indexed<'mem, 'facet>(
        &mut self,
        collection: Collection<'mem, 'facet>,
        prefix: &str,
        target: &mut VObject,
    ) {
        for (index, item) in collection.items().into_iter().enumerate() {
            let key = self.flattener.key(prefix, index);
            self.visit(item, &key, target);
        }
    }

    fn omit(&mut self, path: &str, reason: OmissionReason) {
        debug!(path, %reason, "omitted from flat result");
        if let Some(omissions) = self.omissions.as_deref_mut() {
            omissions.push(Omission::new(path, reason));
        }
    }
}
