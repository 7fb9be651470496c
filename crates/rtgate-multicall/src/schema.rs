//! Selector schemas mapping wire selectors onto record fields.
//!
//! A schema is an explicit lookup table built once per record kind. Each entry
//! carries a typed setter, so the field's value type is fixed by the setter
//! variant rather than discovered at runtime.

use std::collections::HashMap;
use std::fmt;

/// Value types a schema field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 64-bit signed integer.
    Int,
    /// UTF-8 string.
    Str,
}

impl ValueKind {
    /// Name used in decode errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Str => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field setter.
pub enum Setter<R> {
    /// Assigns an integer field.
    Int(fn(&mut R, i64)),
    /// Assigns a string field.
    Str(fn(&mut R, String)),
}

impl<R> Clone for Setter<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Setter<R> {}

impl<R> Setter<R> {
    /// Value type this setter accepts.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Str(_) => ValueKind::Str,
        }
    }
}

/// One `(selector, name, type)` entry of a schema.
pub struct Field<R> {
    selector: &'static str,
    name: &'static str,
    setter: Setter<R>,
}

impl<R> Field<R> {
    /// Integer field.
    #[must_use]
    pub const fn int(selector: &'static str, name: &'static str, set: fn(&mut R, i64)) -> Self {
        Self {
            selector,
            name,
            setter: Setter::Int(set),
        }
    }

    /// String field.
    #[must_use]
    pub const fn string(
        selector: &'static str,
        name: &'static str,
        set: fn(&mut R, String),
    ) -> Self {
        Self {
            selector,
            name,
            setter: Setter::Str(set),
        }
    }

    /// Wire selector, e.g. `d.hash=`.
    #[must_use]
    pub const fn selector(&self) -> &'static str {
        self.selector
    }

    /// JSON-facing field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Value type of the field.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.setter.kind()
    }

    /// Typed setter.
    #[must_use]
    pub const fn setter(&self) -> Setter<R> {
        self.setter
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("selector", &self.selector)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Immutable selector table for one record kind.
pub struct Schema<R> {
    entity: &'static str,
    call_scoped: usize,
    fields: Vec<Field<R>>,
    index: HashMap<&'static str, usize>,
}

impl<R> Schema<R> {
    /// Build a schema; selectors must be unique.
    ///
    /// # Panics
    ///
    /// Panics if two fields share a selector.
    #[must_use]
    pub fn new(entity: &'static str, call_scoped: usize, fields: Vec<Field<R>>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            let previous = index.insert(field.selector, position);
            assert!(
                previous.is_none(),
                "duplicate selector {} in {entity} schema",
                field.selector
            );
        }
        Self {
            entity,
            call_scoped,
            fields,
            index,
        }
    }

    /// Record kind this schema describes.
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    /// Number of leading positional arguments consumed by the remote call.
    #[must_use]
    pub const fn call_scoped(&self) -> usize {
        self.call_scoped
    }

    /// Resolve a selector by exact string equality.
    #[must_use]
    pub fn lookup(&self, selector: &str) -> Option<&Field<R>> {
        self.index
            .get(selector)
            .and_then(|position| self.fields.get(*position))
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    /// Selectors in declaration order.
    pub fn selectors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(Field::selector)
    }

    /// Number of distinct selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity", &self.entity)
            .field("call_scoped", &self.call_scoped)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// A flat record populated from one schema.
pub trait Record: Default + Sized + 'static {
    /// The process-wide schema for this record kind.
    fn schema() -> &'static Schema<Self>;
}

/// Records fetched through a `*.multicall` method.
pub trait EntityRecord: Record {
    /// Remote multicall method returning rows of this record.
    const MULTICALL_METHOD: &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        id: String,
        size: i64,
    }

    fn sample_schema() -> Schema<Sample> {
        Schema::new(
            "sample",
            2,
            vec![
                Field::string("x.id=", "id", |sample, value| sample.id = value),
                Field::int("x.size=", "size", |sample, value| sample.size = value),
            ],
        )
    }

    #[test]
    #[should_panic(expected = "duplicate selector x.id= in sample schema")]
    fn duplicate_selectors_are_rejected() {
        let _schema: Schema<Sample> = Schema::new(
            "sample",
            2,
            vec![
                Field::string("x.id=", "id", |sample, value| sample.id = value),
                Field::string("x.id=", "alias", |sample, value| sample.id = value),
            ],
        );
    }

    #[test]
    fn lookup_is_exact() {
        let schema = sample_schema();
        assert_eq!(schema.lookup("x.id=").map(Field::name), Some("id"));
        assert_eq!(schema.lookup("x.size=").map(Field::kind), Some(ValueKind::Int));
        assert!(schema.lookup("x.id").is_none());
        assert!(schema.lookup("X.ID=").is_none());
        assert_eq!(schema.call_scoped(), 2);
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn setters_assign_typed_values() {
        let schema = sample_schema();
        let mut record = Sample::default();
        for field in schema.fields() {
            match field.setter() {
                Setter::Int(set) => set(&mut record, 7),
                Setter::Str(set) => set(&mut record, "abc".to_string()),
            }
        }
        assert_eq!(record.id, "abc");
        assert_eq!(record.size, 7);
    }

    #[test]
    fn selectors_keep_declaration_order() {
        let schema = sample_schema();
        assert_eq!(schema.selectors().collect::<Vec<_>>(), vec!["x.id=", "x.size="]);
    }
}
