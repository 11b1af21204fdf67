use crate::{
    dict::Dict,
    error::ContainerError,
    field::Field,
    schema::Schema,
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// Container
///
/// One materialized record of a [`Schema`]. Owns one storage slot per
/// declared field, populated from the field defaults on construction, and
/// exclusively owns any nested containers and named collections stored in
/// those slots.
///
/// Instances are single-owner: the schema is shared read-only, but slot
/// mutation is not internally synchronized.
///

#[derive(Clone)]
pub struct Container {
    schema: Arc<Schema>,
    prefix: String,
    meta: Dict,
    slots: Vec<Value>,
}

impl Container {
    /// Construct a fully-defaulted instance. Every slot is an independent
    /// copy (or fresh factory product) of its field's default.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let slots = schema
            .fields()
            .iter()
            .map(|field| field.default.materialize())
            .collect();
        let prefix = schema.prefix().to_string();

        Self {
            schema,
            prefix,
            meta: Dict::new(),
            slots,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    // Not const: reading through the shared schema handle derefs the Arc.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.schema.type_name()
    }

    /// Column prefix used by `add_prefix` conversion; defaults to the
    /// schema prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Free-form metadata (e.g. output-file header keywords). Not part of
    /// the schema and not touched by conversion or reset.
    #[must_use]
    pub const fn meta(&self) -> &Dict {
        &self.meta
    }

    #[must_use]
    pub const fn meta_mut(&mut self) -> &mut Dict {
        &mut self.meta
    }

    /// Read a field's current value.
    pub fn get(&self, name: &str) -> Result<&Value, ContainerError> {
        let index = self.index_of(name)?;
        self.warn_if_deprecated(index);
        Ok(&self.slots[index])
    }

    /// Mutably borrow a field's current value.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value, ContainerError> {
        let index = self.index_of(name)?;
        self.warn_if_deprecated(index);
        Ok(&mut self.slots[index])
    }

    /// Assign a field. The value's shape is not validated against the
    /// default; fields are loosely typed by design.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ContainerError> {
        let index = self.index_of(name)?;
        self.warn_if_deprecated(index);
        self.slots[index] = value.into();
        Ok(())
    }

    /// Assign several fields at once; fails on the first unknown name.
    pub fn update<'a, V>(
        &mut self,
        values: impl IntoIterator<Item = (&'a str, V)>,
    ) -> Result<(), ContainerError>
    where
        V: Into<Value>,
    {
        for (name, value) in values {
            self.set(name, value)?;
        }
        Ok(())
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn items(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .map(|(field, value)| (field.name, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.schema.fields().iter().map(|field| field.name)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter()
    }

    /// Restore every field to its schema default. Named collections return
    /// to their default empty state, discarding all keyed entries. The
    /// instance itself is preserved; `meta` and `prefix` are untouched.
    pub fn reset(&mut self) {
        for (slot, field) in self.slots.iter_mut().zip(self.schema.fields()) {
            *slot = field.default.materialize();
        }
    }

    pub(crate) fn slots(&self) -> &[Value] {
        &self.slots
    }

    fn index_of(&self, name: &str) -> Result<usize, ContainerError> {
        self.schema
            .position(name)
            .ok_or_else(|| ContainerError::UnknownField {
                container: self.schema.type_name(),
                name: name.to_string(),
            })
    }

    fn warn_if_deprecated(&self, index: usize) {
        let field = &self.schema.fields()[index];
        if let Some(reason) = field.deprecated {
            tracing::warn!(
                container = self.schema.type_name(),
                field = field.name,
                reason,
                "deprecated field access"
            );
        }
    }

    fn display_field(f: &mut fmt::Formatter<'_>, field: &Field, value: &Value) -> fmt::Result {
        write!(f, "  {:>24}: {}", field.name, value)?;
        if let Some(unit) = field.unit {
            write!(f, " [{unit}]")?;
        }
        if !field.description.is_empty() {
            write!(f, "  # {}", field.description)?;
        }
        writeln!(f)
    }
}

// Equality is record equality: same type name, same slot values.
// Prefix and meta are presentation state and do not participate.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.schema.type_name() == other.schema.type_name() && self.slots == other.slots
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct(self.type_name());
        for (name, value) in self.items() {
            dbg.field(name, value);
        }
        dbg.finish()
    }
}

/// Human-readable per-field listing: name, value, unit, description.
/// Consumed by logging and REPL tooling only.
impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.type_name())?;
        for (field, value) in self.schema.fields().iter().zip(&self.slots) {
            Self::display_field(f, field, value)?;
        }
        Ok(())
    }
}
