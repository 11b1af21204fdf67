use crate::{container::Container, map::Map};
use serde::{Serialize, Serializer};
use std::fmt;

///
/// Value
///
/// Owned storage for one container slot.
///
/// Scalars and lists are leaf data; `Container` and `Map` carry nested
/// record structure and are the only variants the dict converter recurses
/// into. Cloning a `Value` is a deep copy, so two instances of the same
/// schema can never alias a mutable default.
///

#[derive(Clone, Debug, PartialEq)]
#[remain::sorted]
pub enum Value {
    Bool(bool),
    /// Single nested record ("has-a" composition).
    Container(Container),
    Float(f64),
    Int(i64),
    /// Ordered list of values, used for array-shaped fields.
    List(Vec<Self>),
    /// Keyed collection of sub-records with variable cardinality.
    Map(Map),
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    /// Returns true for leaf values the converter emits directly
    /// (everything except nested record structure).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Container(_) | Self::Map(_))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self { Some(*b) } else { None }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(i) = self { Some(*i) } else { None }
    }

    #[must_use]
    pub const fn as_uint(&self) -> Option<u64> {
        if let Self::Uint(u) = self { Some(*u) } else { None }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        if let Self::Float(x) = self { Some(*x) } else { None }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_container(&self) -> Option<&Container> {
        if let Self::Container(c) = self { Some(c) } else { None }
    }

    #[must_use]
    pub const fn as_container_mut(&mut self) -> Option<&mut Container> {
        if let Self::Container(c) = self { Some(c) } else { None }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        if let Self::Map(m) = self { Some(m) } else { None }
    }

    #[must_use]
    pub const fn as_map_mut(&mut self) -> Option<&mut Map> {
        if let Self::Map(m) = self { Some(m) } else { None }
    }

    /// Short shape label used in diagnostics and error messages.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Container(_) => "container",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Uint(_) => "uint",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Container(c) => write!(f, "<{}>", c.type_name()),
            Self::Float(x) => write!(f, "{x}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::List(xs) => {
                write!(f, "[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
            Self::Map(m) => write!(f, "<map[{}]>", m.len()),
            Self::Null => write!(f, "null"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Uint(u) => write!(f, "{u}"),
        }
    }
}

// Untagged serialization: scalars as themselves, containers and maps as
// their recursive dict form. Keeps converted output JSON-friendly.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Container(c) => c.serialize(serializer),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::List(xs) => xs.serialize(serializer),
            Self::Map(m) => m.serialize(serializer),
            Self::Null => serializer.serialize_unit(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Uint(u) => serializer.serialize_u64(*u),
        }
    }
}

#[macro_export]
macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool      => Bool,
    f32       => Float,
    f64       => Float,
    i8        => Int,
    i16       => Int,
    i32       => Int,
    i64       => Int,
    &str      => Text,
    String    => Text,
    u8        => Uint,
    u16       => Uint,
    u32       => Uint,
    u64       => Uint,
    Container => Container,
    Map       => Map,
}

impl From<Vec<Self>> for Value {
    fn from(vec: Vec<Self>) -> Self {
        Self::List(vec)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}
