//! Turning records (structs and enum variants) into keyed entries.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use facet_core::Shape;
use facet_reflect::{FieldItem, Peek};

/// Keyed field values of a single record, in declaration order.
pub type RecordEntries<'mem, 'facet> = Vec<(String, Peek<'mem, 'facet>)>;

/// Converts the fields of a record into string-keyed entries.
///
/// The flattener calls [`StructMapper::map_fields`] exactly once for every
/// struct or enum variant it meets, after references have been dereferenced.
/// The returned entries are then flattened like the entries of a map.
pub trait StructMapper {
    /// Maps the fields of a record of type `owner` to keyed entries.
    ///
    /// `fields` yields the fields that take part in serialization: skipped
    /// fields are already filtered out, `#[facet(flatten)]` fields are
    /// already inlined.
    fn map_fields<'mem, 'facet>(
        &self,
        owner: &'static Shape,
        fields: impl Iterator<Item = (FieldItem, Peek<'mem, 'facet>)>,
    ) -> RecordEntries<'mem, 'facet>;
}

/// The default [`StructMapper`].
///
/// Each field is keyed by its declared name (so `#[facet(rename = "...")]` is
/// honored), unless [`FieldAliases`] has an entry for it.
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    aliases: FieldAliases,
}

impl FieldMapper {
    /// Create a mapper that uses declared field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `aliases` to override field names.
    pub fn with_aliases(mut self, aliases: FieldAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// The alias table in use.
    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }
}

impl StructMapper for FieldMapper {
    fn map_fields<'mem, 'facet>(
        &self,
        owner: &'static Shape,
        fields: impl Iterator<Item = (FieldItem, Peek<'mem, 'facet>)>,
    ) -> RecordEntries<'mem, 'facet> {
        fields
            .map(|(item, value)| {
                let declared = item.effective_name();
                let alias = item
                    .field
                    .as_ref()
                    .and_then(|field| self.aliases.resolve(owner, field.name))
                    .or_else(|| self.aliases.resolve(owner, declared));
                let key = match alias {
                    Some(alias) => alias.to_string(),
                    None => declared.to_string(),
                };
                (key, value)
            })
            .collect()
    }
}

/// Explicit field renames, consulted by [`FieldMapper`].
///
/// An alias can apply to a field name in every type, or only in the type with
/// a given [`Shape::type_identifier`]. Type-scoped aliases win.
///
/// ```
/// use facet_flatten::FieldAliases;
///
/// let aliases = FieldAliases::new()
///     .alias("id", "ID")
///     .alias_for("User", "id", "user_id");
/// assert!(!aliases.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAliases {
    any_type: BTreeMap<String, String>,
    by_type: BTreeMap<String, BTreeMap<String, String>>,
}

impl FieldAliases {
    /// An empty alias table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename `field` to `name` in every type.
    pub fn alias(mut self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.any_type.insert(field.into(), name.into());
        self
    }

    /// Rename `field` to `name` in the type whose identifier is `type_identifier`.
    pub fn alias_for(
        mut self,
        type_identifier: impl Into<String>,
        field: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.by_type
            .entry(type_identifier.into())
            .or_default()
            .insert(field.into(), name.into());
        self
    }

    /// Returns `true` if no alias is registered.
    pub fn is_empty(&self) -> bool {
        self.any_type.is_empty() && self.by_type.is_empty()
    }

    /// Looks up the alias for `field` of `owner`, if any.
    pub fn resolve(&self, owner: &Shape, field: &str) -> Option<&str> {
        self.by_type
            .get(owner.type_identifier)
            .and_then(|fields| fields.get(field))
            .or_else(|| self.any_type.get(field))
            .map(String::as_str)
    }
}
