use crate::{container::Container, map::Map, schema::Schema, value::Value};
use serde::Serialize;
use std::{fmt, sync::Arc};

///
/// Unit
///
/// Opaque physical-unit tag attached to field metadata. The core never
/// interprets it; table writers use it to annotate output columns.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Unit(&'static str);

impl Unit {
    #[must_use]
    pub const fn new(symbol: &'static str) -> Self {
        Self(symbol)
    }

    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// FieldDefault
///
/// Source of the per-instance default value. `Value` defaults are cloned
/// fresh for every instance; `Factory` defaults are invoked fresh. Either
/// way no two instances ever share default storage.
///

#[derive(Clone)]
pub enum FieldDefault {
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
    Value(Value),
}

impl FieldDefault {
    /// Produce an independent value for one instance slot.
    #[must_use]
    pub fn materialize(&self) -> Value {
        match self {
            Self::Factory(f) => f(),
            Self::Value(v) => v.clone(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

///
/// Field
///
/// Immutable metadata for one named slot on a schema. Identity is by name
/// within the owning schema; declaration order is preserved by the schema.
///

#[derive(Clone, Debug, Serialize)]
pub struct Field {
    pub name: &'static str,

    #[serde(skip)]
    pub default: FieldDefault,

    pub description: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    /// Whether the field participates in flattened output.
    pub output: bool,

    /// Access to a deprecated field logs the given reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<&'static str>,
}

impl Field {
    /// Declare a field with a plain default value.
    #[must_use]
    pub fn new(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            default: FieldDefault::Value(default.into()),
            description: "",
            unit: None,
            output: true,
            deprecated: None,
        }
    }

    /// Declare a field whose default is produced fresh per instance.
    #[must_use]
    pub fn factory(name: &'static str, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self {
            name,
            default: FieldDefault::Factory(Arc::new(f)),
            description: "",
            unit: None,
            output: true,
            deprecated: None,
        }
    }

    /// Declare a nested-record field; every instance gets a fresh,
    /// fully-defaulted sub-container of `schema`.
    #[must_use]
    pub fn container(name: &'static str, schema: &Arc<Schema>) -> Self {
        let schema = schema.clone();
        Self::factory(name, move || Value::Container(Container::new(schema.clone())))
    }

    /// Declare a named-collection field, empty by default.
    #[must_use]
    pub fn map(name: &'static str) -> Self {
        Self::factory(name, || Value::Map(Map::new()))
    }

    #[must_use]
    pub const fn description(mut self, text: &'static str) -> Self {
        self.description = text;
        self
    }

    #[must_use]
    pub const fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Exclude the field from flattened output.
    #[must_use]
    pub const fn no_output(mut self) -> Self {
        self.output = false;
        self
    }

    #[must_use]
    pub const fn deprecated(mut self, reason: &'static str) -> Self {
        self.deprecated = Some(reason);
        self
    }
}
