//! Classification of reflected values into the shapes the flattener handles.

use alloc::vec::Vec;

use facet_core::{Def, DynValueKind, ScalarType, Shape, StructKind};
use facet_reflect::{
    HasFields as _, Peek, PeekDynamicValue, PeekEnum, PeekListLike, PeekMap, PeekResult, PeekSet,
    PeekStruct,
};

/// What a value looks like to the flattener, decided once per visit.
pub(crate) enum Node<'mem, 'facet> {
    /// A null dynamic value or `()`.
    Nil,
    /// An `Option::None` reached while dereferencing.
    NilReference,
    /// A map-like value. Dropped unless its keys are strings.
    Mapping(Mapping<'mem, 'facet>),
    /// A value with named or positional fields, handed to the struct mapper.
    Record(Record<'mem, 'facet>),
    /// An ordered sequence of values.
    Collection(Collection<'mem, 'facet>),
    /// Anything else.
    Scalar(Peek<'mem, 'facet>),
}

pub(crate) enum Mapping<'mem, 'facet> {
    Map(PeekMap<'mem, 'facet>),
    Dynamic(PeekDynamicValue<'mem, 'facet>),
}

/// Records carry the shape of their owner for the struct mapper.
pub(crate) enum Record<'mem, 'facet> {
    Struct(PeekStruct<'mem, 'facet>, &'static Shape),
    Variant(PeekEnum<'mem, 'facet>, &'static Shape),
    Result(PeekResult<'mem, 'facet>),
}

pub(crate) enum Collection<'mem, 'facet> {
    List(PeekListLike<'mem, 'facet>),
    Set(PeekSet<'mem, 'facet>),
    Tuple(PeekStruct<'mem, 'facet>),
    Dynamic(PeekDynamicValue<'mem, 'facet>),
}

impl<'mem, 'facet> Node<'mem, 'facet> {
    /// Dereferences `peek`, then classifies what is left.
    ///
    /// Precedence: references, then records, then maps, collections and scalars.
    pub(crate) fn classify(peek: Peek<'mem, 'facet>) -> Self {
        let Some(peek) = deref(peek) else {
            return Node::NilReference;
        };

        if let Ok(dynamic) = peek.into_dynamic_value() {
            return match dynamic.kind() {
                DynValueKind::Null => Node::Nil,
                DynValueKind::Array => Node::Collection(Collection::Dynamic(dynamic)),
                DynValueKind::Object => Node::Mapping(Mapping::Dynamic(dynamic)),
                _ => Node::Scalar(peek),
            };
        }

        match peek.scalar_type() {
            Some(ScalarType::Unit) => return Node::Nil,
            Some(_) => return Node::Scalar(peek),
            None => {}
        }

        if let Ok(result) = peek.into_result() {
            return Node::Record(Record::Result(result));
        }

        if let Ok(struct_) = peek.into_struct() {
            return match struct_.ty().kind {
                StructKind::Tuple => Node::Collection(Collection::Tuple(struct_)),
                _ => Node::Record(Record::Struct(struct_, peek.shape())),
            };
        }

        if let Ok(enum_) = peek.into_enum() {
            return match enum_.active_variant() {
                Ok(variant) if !variant.data.fields.is_empty() => {
                    Node::Record(Record::Variant(enum_, peek.shape()))
                }
                _ => Node::Scalar(peek),
            };
        }

        if let Ok(map) = peek.into_map() {
            return Node::Mapping(Mapping::Map(map));
        }

        if matches!(peek.shape().def, Def::List(_) | Def::Array(_) | Def::Slice(_))
            && let Ok(list) = peek.into_list_like()
        {
            return Node::Collection(Collection::List(list));
        }

        if let Ok(set) = peek.into_set() {
            return Node::Collection(Collection::Set(set));
        }

        Node::Scalar(peek)
    }

    /// Short name for logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Nil => "nil",
            Node::NilReference => "nil reference",
            Node::Mapping(_) => "mapping",
            Node::Record(_) => "record",
            Node::Collection(_) => "collection",
            Node::Scalar(_) => "scalar",
        }
    }
}

impl<'mem, 'facet> Collection<'mem, 'facet> {
    /// The elements, in order.
    pub(crate) fn items(self) -> Vec<Peek<'mem, 'facet>> {
        match self {
            Collection::List(list) => list.iter().collect(),
            Collection::Set(set) => set.iter().collect(),
            Collection::Tuple(tuple) => tuple.fields().map(|(_, value)| value).collect(),
            Collection::Dynamic(dynamic) => dynamic
                .array_iter()
                .map(|items| items.collect::<Vec<_>>())
                .unwrap_or_default(),
        }
    }
}

/// Follows pointers, options and transparent wrappers down to the value they hold.
///
/// Returns `None` when an `Option` along the way is `None`.
pub(crate) fn deref<'mem, 'facet>(mut peek: Peek<'mem, 'facet>) -> Option<Peek<'mem, 'facet>> {
    loop {
        if let Ok(ptr) = peek.into_pointer()
            && let Some(target) = ptr.borrow_inner()
        {
            peek = target;
            continue;
        }

        if let Ok(option) = peek.into_option() {
            peek = option.value()?;
            continue;
        }

        let inner = peek.innermost_peek();
        if core::ptr::eq(inner.shape(), peek.shape()) {
            return Some(peek);
        }
        peek = inner;
    }
}

/// Whether map keys of this shape read as strings, looking through pointers
/// (`Arc<str>`, `Box<str>`) and transparent wrappers.
pub(crate) fn is_string_key(mut shape: &'static Shape) -> bool {
    loop {
        if matches!(
            ScalarType::try_from_shape(shape),
            Some(ScalarType::Str | ScalarType::String | ScalarType::CowStr)
        ) {
            return true;
        }
        let next = match shape.def {
            Def::Pointer(pointer) => pointer.pointee(),
            _ => shape.inner,
        };
        match next {
            Some(next) => shape = next,
            None => return false,
        }
    }
}

/// Reads a map key as a string, dereferencing it first if needed.
pub(crate) fn key_str<'mem>(key: Peek<'mem, '_>) -> Option<&'mem str> {
    key.as_str().or_else(|| deref(key)?.as_str())
}
