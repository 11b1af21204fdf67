use crate::container::Container;
use derive_more::Deref;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::fmt;

///
/// MapKey
///
/// Key for one entry of a named collection; commonly an integer id
/// (e.g. a telescope id) or an algorithm name. Key value implies no
/// ordering — iteration order is insertion order.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum MapKey {
    Int(i64),
    Text(String),
    Uint(u64),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Uint(u) => write!(f, "{u}"),
        }
    }
}

macro_rules! impl_map_key_from {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for MapKey {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_map_key_from! {
    i8     => Int,
    i16    => Int,
    i32    => Int,
    i64    => Int,
    &str   => Text,
    String => Text,
    u8     => Uint,
    u16    => Uint,
    u32    => Uint,
    u64    => Uint,
}

///
/// Map
///
/// Insertion-order-preserving collection of keyed sub-containers, used as
/// a field *value* when the cardinality of sub-records varies per record
/// (e.g. one entry per triggered telescope).
///
/// Re-inserting an existing key overwrites in place and keeps the key's
/// original position. Lookup is a linear scan; entry counts are small and
/// insertion order is the authoritative order, so no key index is kept.
///

#[repr(transparent)]
#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Map(Vec<(MapKey, Container)>);

impl Map {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a collection from entries, keeping the last value per key.
    #[must_use]
    pub fn from_entries(entries: Vec<(MapKey, Container)>) -> Self {
        let mut map = Self::new();
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }

    /// Return the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace the entry for `key`, returning the old container
    /// if present. Replacement does not move the key's position.
    pub fn insert(&mut self, key: impl Into<MapKey>, value: Container) -> Option<Container> {
        let key = key.into();
        match self.find(&key) {
            Some(index) => Some(std::mem::replace(&mut self.0[index].1, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: impl Into<MapKey>) -> Option<&Container> {
        let key = key.into();
        self.find(&key).map(|index| &self.0[index].1)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: impl Into<MapKey>) -> Option<&mut Container> {
        let key = key.into();
        self.find(&key).map(|index| &mut self.0[index].1)
    }

    /// Remove the entry for `key`, returning its container if present.
    /// Remaining entries keep their relative order.
    pub fn remove(&mut self, key: impl Into<MapKey>) -> Option<Container> {
        let key = key.into();
        self.find(&key).map(|index| self.0.remove(index).1)
    }

    #[must_use]
    pub fn contains_key(&self, key: impl Into<MapKey>) -> bool {
        let key = key.into();
        self.find(&key).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &Container)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&MapKey, &mut Container)> {
        self.0.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Container> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.0.iter_mut().map(|(_, v)| v)
    }

    /// The first inserted entry, if any (the flattener's representative).
    #[must_use]
    pub fn first(&self) -> Option<(&MapKey, &Container)> {
        self.0.first().map(|(k, v)| (k, v))
    }

    /// Discard every entry.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn find(&self, key: &MapKey) -> Option<usize> {
        self.0.iter().position(|(candidate, _)| candidate == key)
    }
}

impl IntoIterator for Map {
    type Item = (MapKey, Container);
    type IntoIter = std::vec::IntoIter<(MapKey, Container)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a (MapKey, Container);
    type IntoIter = std::slice::Iter<'a, (MapKey, Container)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Serialized as a string-keyed map so converted output stays JSON-friendly.
impl Serialize for Map {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            state.serialize_entry(&key.to_string(), value)?;
        }
        state.end()
    }
}
