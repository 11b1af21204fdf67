use crate::{container::Container, error::SchemaError, field::Field};
use convert_case::{Case, Casing};
use serde::Serialize;
use std::sync::Arc;

///
/// Schema
///
/// Per-record-type registry of field descriptors. Built once through
/// [`SchemaBuilder`] and shared read-only (`Arc`) by every instance of the
/// type. Field order is stable: inherited fields precede own fields, and
/// redeclaring an inherited name keeps its original position.
///

#[derive(Debug, Serialize)]
pub struct Schema {
    type_name: &'static str,
    prefix: String,
    fields: Vec<Field>,
}

impl Schema {
    #[must_use]
    pub fn builder(type_name: &'static str) -> SchemaBuilder {
        SchemaBuilder::new(type_name)
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Default column prefix used when converting with `add_prefix`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Ordered field list (authoritative for defaulting and flattening).
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Construct a fully-defaulted instance of this schema.
    #[must_use]
    pub fn instantiate(self: &Arc<Self>) -> Container {
        Container::new(self.clone())
    }

    // "EventContainer" -> "event", "TelescopeContainer" -> "telescope"
    fn default_prefix(type_name: &'static str) -> String {
        let snake = type_name.to_case(Case::Snake);
        snake
            .trim_end_matches("container")
            .trim_end_matches('_')
            .to_string()
    }
}

///
/// SchemaBuilder
///
/// Accumulates inherited and own field declarations. Inherited fields are
/// merged first; an own declaration that shadows an inherited name
/// overrides the descriptor in place. Redeclaring a name at the same level
/// is last-wins by default and an error under `strict()`.
///

#[derive(Debug)]
pub struct SchemaBuilder {
    type_name: &'static str,
    prefix: Option<String>,
    strict: bool,
    inherited: Vec<Field>,
    own: Vec<Field>,
    duplicate: Option<&'static str>,
}

impl SchemaBuilder {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            prefix: None,
            strict: false,
            inherited: Vec::new(),
            own: Vec::new(),
            duplicate: None,
        }
    }

    /// Inherit the parent's ordered field set. May be called more than
    /// once; a later parent's redeclarations override in place.
    #[must_use]
    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        for field in parent.fields() {
            Self::merge(&mut self.inherited, field.clone());
        }
        self
    }

    /// Declare one field. Shadowing an inherited name overrides its
    /// descriptor but keeps the inherited position.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        if self.own.iter().any(|f| f.name == field.name) && self.duplicate.is_none() {
            self.duplicate = Some(field.name);
        }
        Self::merge(&mut self.own, field);
        self
    }

    /// Override the derived column prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Turn same-level redeclaration into a build error.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        if self.strict
            && let Some(name) = self.duplicate
        {
            return Err(SchemaError::DuplicateFieldDeclaration {
                schema: self.type_name,
                name,
            });
        }

        let mut fields = self.inherited;
        for field in self.own {
            Self::merge(&mut fields, field);
        }

        let prefix = self
            .prefix
            .unwrap_or_else(|| Schema::default_prefix(self.type_name));

        tracing::debug!(
            schema = self.type_name,
            fields = fields.len(),
            "schema built"
        );

        Ok(Arc::new(Schema {
            type_name: self.type_name,
            prefix,
            fields,
        }))
    }

    // Override in place when the name exists, append otherwise.
    fn merge(fields: &mut Vec<Field>, field: Field) {
        match fields.iter().position(|f| f.name == field.name) {
            Some(index) => fields[index] = field,
            None => fields.push(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn event_schema() -> Arc<Schema> {
        Schema::builder("EventContainer")
            .field(Field::new("event_id", -1i64))
            .field(Field::new("tels_with_data", Vec::<Value>::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn declaration_order_is_preserved() {
        let schema = event_schema();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["event_id", "tels_with_data"]);
    }

    #[test]
    fn subclass_fields_follow_inherited_fields() {
        let base = event_schema();
        let sub = Schema::builder("SubEventContainer")
            .extends(&base)
            .field(Field::new("extra", 0.0f64))
            .build()
            .unwrap();

        let names: Vec<_> = sub.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["event_id", "tels_with_data", "extra"]);
    }

    #[test]
    fn shadowing_keeps_the_inherited_position() {
        let base = event_schema();
        let sub = Schema::builder("SubEventContainer")
            .extends(&base)
            .field(Field::new("extra", 0i64))
            .field(Field::new("event_id", 0i64).description("overridden"))
            .build()
            .unwrap();

        let names: Vec<_> = sub.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["event_id", "tels_with_data", "extra"]);
        assert_eq!(sub.field("event_id").unwrap().description, "overridden");
    }

    #[test]
    fn same_level_redeclaration_is_last_wins_by_default() {
        let schema = Schema::builder("EventContainer")
            .field(Field::new("event_id", -1i64))
            .field(Field::new("flag", false))
            .field(Field::new("event_id", 0i64).description("second"))
            .build()
            .unwrap();

        let names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["event_id", "flag"]);
        assert_eq!(schema.field("event_id").unwrap().description, "second");
    }

    #[test]
    fn strict_mode_rejects_same_level_redeclaration() {
        let err = Schema::builder("EventContainer")
            .strict()
            .field(Field::new("event_id", -1i64))
            .field(Field::new("event_id", 0i64))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::DuplicateFieldDeclaration {
                schema: "EventContainer",
                name: "event_id",
            }
        );
    }

    #[test]
    fn prefix_derivation_strips_the_container_suffix() {
        assert_eq!(Schema::default_prefix("EventContainer"), "event");
        assert_eq!(Schema::default_prefix("TelescopeContainer"), "telescope");
        assert_eq!(Schema::default_prefix("Hillas"), "hillas");
    }

    #[test]
    fn explicit_prefix_wins() {
        let schema = Schema::builder("EventContainer")
            .prefix("evt")
            .build()
            .unwrap();
        assert_eq!(schema.prefix(), "evt");
    }
}
