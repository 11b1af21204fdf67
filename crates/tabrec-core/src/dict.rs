use crate::{
    container::Container,
    error::ConvertError,
    field::Unit,
    value::Value,
};
use derive_more::Deref;
use serde::{Serialize, Serializer, ser::SerializeMap};

///
/// DictOptions
///
/// Conversion modes for [`Container::to_dict`]:
///
/// - default: shallow — own scalar/array fields only, nested records and
///   named collections omitted.
/// - `recursive()`: nested records become nested dicts; named collections
///   become dicts keyed by the display form of each entry key.
/// - `flatten()`: single-level dict with composed `parent_child` column
///   names (implies recursive).
/// - `add_prefix()`: prepend each container's instance prefix to its keys.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DictOptions {
    pub recursive: bool,
    pub flatten: bool,
    pub add_prefix: bool,
}

impl DictOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            recursive: false,
            flatten: false,
            add_prefix: false,
        }
    }

    #[must_use]
    pub const fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    #[must_use]
    pub const fn flatten(mut self) -> Self {
        self.recursive = true;
        self.flatten = true;
        self
    }

    #[must_use]
    pub const fn add_prefix(mut self) -> Self {
        self.add_prefix = true;
        self
    }
}

///
/// DictValue
///
/// One converted value: a leaf [`Value`] or a nested mapping (recursive
/// non-flattened mode only).
///

#[derive(Clone, Debug, PartialEq)]
pub enum DictValue {
    Dict(Dict),
    Value(Value),
}

impl DictValue {
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        if let Self::Value(v) = self { Some(v) } else { None }
    }

    #[must_use]
    pub const fn as_dict(&self) -> Option<&Dict> {
        if let Self::Dict(d) = self { Some(d) } else { None }
    }
}

impl From<Value> for DictValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Dict> for DictValue {
    fn from(dict: Dict) -> Self {
        Self::Dict(dict)
    }
}

impl Serialize for DictValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Dict(d) => d.serialize(serializer),
            Self::Value(v) => v.serialize(serializer),
        }
    }
}

///
/// Dict
///
/// Insertion-ordered string-keyed mapping produced by conversion. Key
/// order follows schema field order through the traversal, so converted
/// output is deterministic and round-trippable into column definitions.
///

#[repr(transparent)]
#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Dict(Vec<(String, DictValue)>);

impl Dict {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DictValue> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, v)| v)
    }

    /// Leaf value under `key`, if present and not a nested dict.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(DictValue::as_value)
    }

    /// Nested dict under `key`, if present.
    #[must_use]
    pub fn dict(&self, key: &str) -> Option<&Self> {
        self.get(key).and_then(DictValue::as_dict)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace in place, keeping an existing key's position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DictValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter().position(|(candidate, _)| *candidate == key) {
            Some(index) => self.0[index].1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    // Collision-checked insert used by the flattener.
    pub(crate) fn try_insert(&mut self, key: String, value: DictValue) -> Result<(), ConvertError> {
        if self.contains_key(&key) {
            return Err(ConvertError::DuplicateColumn { column: key });
        }
        self.0.push((key, value));
        Ok(())
    }
}

impl IntoIterator for Dict {
    type Item = (String, DictValue);
    type IntoIter = std::vec::IntoIter<(String, DictValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = &'a (String, DictValue);
    type IntoIter = std::slice::Iter<'a, (String, DictValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Dict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            state.serialize_entry(key, value)?;
        }
        state.end()
    }
}

///
/// Column
///
/// Per-column metadata for the table-writer boundary: the flattened column
/// name together with the owning field's unit and description.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Column {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    pub description: &'static str,
}

// Conversion is a pure read-only traversal of the instance in schema field
// order. No partial results: flatten-mode errors surface before a dict is
// returned.
impl Container {
    /// Convert the record into a [`Dict`] per [`DictOptions`].
    pub fn to_dict(&self, options: DictOptions) -> Result<Dict, ConvertError> {
        if options.recursive && options.flatten {
            let mut dict = Dict::new();
            let prefix = if options.add_prefix {
                self.prefix().to_string()
            } else {
                String::new()
            };
            self.flatten_into(&mut dict, &prefix)?;
            return Ok(dict);
        }

        if options.recursive {
            return Ok(self.recursive_dict(options.add_prefix));
        }

        Ok(self.shallow_dict(options.add_prefix))
    }

    /// Flattened column metadata for an external table writer, aligned
    /// with the key order of `to_dict(DictOptions::new().flatten())`.
    pub fn columns(&self) -> Result<Vec<Column>, ConvertError> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns, "")?;
        Ok(columns)
    }

    // Own scalar/array fields only; nested structure is omitted.
    fn shallow_dict(&self, add_prefix: bool) -> Dict {
        let mut dict = Dict::new();
        for (field, value) in self.schema().fields().iter().zip(self.slots()) {
            if !value.is_scalar() {
                continue;
            }
            dict.insert(self.key_for(field.name, add_prefix), value.clone());
        }
        dict
    }

    // Every field; nested records and collections become nested dicts.
    pub(crate) fn recursive_dict(&self, add_prefix: bool) -> Dict {
        let mut dict = Dict::new();
        for (field, value) in self.schema().fields().iter().zip(self.slots()) {
            let key = self.key_for(field.name, add_prefix);
            match value {
                Value::Container(sub) => {
                    dict.insert(key, sub.recursive_dict(add_prefix));
                }
                Value::Map(map) => {
                    let mut entries = Dict::new();
                    for (map_key, sub) in map.iter() {
                        entries.insert(map_key.to_string(), sub.recursive_dict(add_prefix));
                    }
                    dict.insert(key, entries);
                }
                value => dict.insert(key, value.clone()),
            }
        }
        dict
    }

    // Single-level dict with composed column names. A named collection is
    // represented by its first entry's structure (a flat table has a fixed
    // column set, while map keys vary per record); an empty collection
    // contributes nothing.
    fn flatten_into(&self, dict: &mut Dict, prefix: &str) -> Result<(), ConvertError> {
        for (field, value) in self.schema().fields().iter().zip(self.slots()) {
            if !field.output {
                continue;
            }
            let column = compose(prefix, field.name);
            match value {
                Value::Container(sub) => sub.flatten_into(dict, &column)?,
                Value::Map(map) => {
                    if let Some((_, first)) = map.first() {
                        first.flatten_into(dict, &column)?;
                    }
                }
                Value::List(items) if !list_is_flat(items) => {
                    return Err(ConvertError::UnsupportedValue {
                        column,
                        kind: "list containing nested records",
                    });
                }
                value => dict.try_insert(column, DictValue::Value(value.clone()))?,
            }
        }
        Ok(())
    }

    fn collect_columns(&self, out: &mut Vec<Column>, prefix: &str) -> Result<(), ConvertError> {
        for (field, value) in self.schema().fields().iter().zip(self.slots()) {
            if !field.output {
                continue;
            }
            let column = compose(prefix, field.name);
            match value {
                Value::Container(sub) => sub.collect_columns(out, &column)?,
                Value::Map(map) => {
                    if let Some((_, first)) = map.first() {
                        first.collect_columns(out, &column)?;
                    }
                }
                _ => {
                    if out.iter().any(|c| c.name == column) {
                        return Err(ConvertError::DuplicateColumn { column });
                    }
                    out.push(Column {
                        name: column,
                        unit: field.unit,
                        description: field.description,
                    });
                }
            }
        }
        Ok(())
    }

    fn key_for(&self, name: &str, add_prefix: bool) -> String {
        if add_prefix && !self.prefix().is_empty() {
            format!("{}_{name}", self.prefix())
        } else {
            name.to_string()
        }
    }
}

// Serialized form of a container is its recursive (non-flattened) dict.
impl Serialize for Container {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.recursive_dict(false).serialize(serializer)
    }
}

fn compose(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}_{name}")
    }
}

fn list_is_flat(items: &[Value]) -> bool {
    items.iter().all(|item| match item {
        Value::Container(_) | Value::Map(_) => false,
        Value::List(nested) => list_is_flat(nested),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::Field, schema::Schema};
    use std::sync::Arc;

    fn tel_schema() -> Arc<Schema> {
        Schema::builder("TelescopeContainer")
            .field(
                Field::new("image", Vec::<Value>::new())
                    .description("pixel amplitudes")
                    .unit(Unit::new("p.e.")),
            )
            .field(Field::new("peak_time", -1.0f64).unit(Unit::new("ns")))
            .build()
            .unwrap()
    }

    fn event_schema() -> Arc<Schema> {
        let tel = tel_schema();
        Schema::builder("EventContainer")
            .field(Field::new("event_id", -1i64).description("event identifier"))
            .field(Field::container("sub", &tel))
            .field(Field::map("tel"))
            .build()
            .unwrap()
    }

    fn populated_event() -> Container {
        let schema = event_schema();
        let mut event = schema.instantiate();
        event.set("event_id", 100i64).unwrap();

        let map = event.get_mut("tel").unwrap().as_map_mut().unwrap();
        for tel_id in [7, 2, 11] {
            let mut tel = tel_schema().instantiate();
            tel.set("peak_time", f64::from(tel_id)).unwrap();
            map.insert(i64::from(tel_id), tel);
        }
        event
    }

    #[test]
    fn shallow_omits_nested_structure() {
        let event = populated_event();
        let dict = event.to_dict(DictOptions::new()).unwrap();

        let keys: Vec<_> = dict.keys().collect();
        assert_eq!(keys, ["event_id"]);
        assert_eq!(dict.value("event_id").unwrap(), &Value::Int(100));
    }

    #[test]
    fn recursive_nests_instead_of_prefixing() {
        let event = event_schema().instantiate();
        let dict = event.to_dict(DictOptions::new().recursive()).unwrap();

        let sub = dict.dict("sub").unwrap();
        assert_eq!(sub.value("peak_time").unwrap(), &Value::Float(-1.0));
        assert!(!dict.contains_key("sub_peak_time"));
    }

    #[test]
    fn recursive_keys_maps_by_entry_key() {
        let event = populated_event();
        let dict = event.to_dict(DictOptions::new().recursive()).unwrap();

        let tels = dict.dict("tel").unwrap();
        let keys: Vec<_> = tels.keys().collect();
        assert_eq!(keys, ["7", "2", "11"]);
        assert_eq!(
            tels.dict("7").unwrap().value("peak_time").unwrap(),
            &Value::Float(7.0)
        );
    }

    #[test]
    fn flatten_composes_column_names() {
        let event = event_schema().instantiate();
        let dict = event.to_dict(DictOptions::new().flatten()).unwrap();

        assert!(dict.contains_key("sub_image"));
        assert!(dict.contains_key("sub_peak_time"));
        assert!(!dict.contains_key("sub"));
        assert!(!dict.contains_key("image"));
    }

    #[test]
    fn flatten_uses_first_map_entry_as_representative() {
        let event = populated_event();
        let dict = event.to_dict(DictOptions::new().flatten()).unwrap();

        // First inserted entry was tel_id 7 (peak_time 7.0); keys carry the
        // field name, never the entry key.
        assert_eq!(dict.value("tel_peak_time").unwrap(), &Value::Float(7.0));
        assert!(!dict.contains_key("tel_7_peak_time"));
        assert!(!dict.contains_key("7_peak_time"));
    }

    #[test]
    fn flatten_skips_empty_maps() {
        let event = event_schema().instantiate();
        let dict = event.to_dict(DictOptions::new().flatten()).unwrap();

        assert!(dict.keys().all(|k| !k.starts_with("tel_")));
    }

    #[test]
    fn flatten_detects_column_collisions() {
        let tel = tel_schema();
        let schema = Schema::builder("ClashContainer")
            .field(Field::container("tel", &tel))
            .field(Field::new("tel_image", 0i64))
            .build()
            .unwrap();

        let err = schema
            .instantiate()
            .to_dict(DictOptions::new().flatten())
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::DuplicateColumn {
                column: "tel_image".to_string(),
            }
        );
    }

    #[test]
    fn flatten_rejects_lists_of_records() {
        let tel = tel_schema();
        let schema = Schema::builder("BadContainer")
            .field(Field::new("entries", Vec::<Value>::new()))
            .build()
            .unwrap();

        let mut bad = schema.instantiate();
        bad.set(
            "entries",
            vec![Value::Container(tel.instantiate())],
        )
        .unwrap();

        let err = bad.to_dict(DictOptions::new().flatten()).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedValue { .. }));
    }

    #[test]
    fn no_output_fields_are_excluded_from_flatten_only() {
        let schema = Schema::builder("MixedContainer")
            .field(Field::new("kept", 1i64))
            .field(Field::new("internal", 2i64).no_output())
            .build()
            .unwrap();
        let instance = schema.instantiate();

        let flat = instance.to_dict(DictOptions::new().flatten()).unwrap();
        assert!(!flat.contains_key("internal"));

        let shallow = instance.to_dict(DictOptions::new()).unwrap();
        assert!(shallow.contains_key("internal"));
    }

    #[test]
    fn add_prefix_prepends_the_instance_prefix() {
        let event = populated_event();
        let dict = event
            .to_dict(DictOptions::new().add_prefix())
            .unwrap();

        assert!(dict.contains_key("event_event_id"));
        assert!(!dict.contains_key("event_id"));
    }

    #[test]
    fn columns_align_with_flattened_keys() {
        let event = populated_event();

        let dict = event.to_dict(DictOptions::new().flatten()).unwrap();
        let columns = event.columns().unwrap();

        let keys: Vec<_> = dict.keys().collect();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, names);

        let peak = columns.iter().find(|c| c.name == "tel_peak_time").unwrap();
        assert_eq!(peak.unit, Some(Unit::new("ns")));
    }

    #[test]
    fn flattened_dict_serializes_as_a_flat_json_object() {
        let event = populated_event();
        let dict = event.to_dict(DictOptions::new().flatten()).unwrap();
        let json = serde_json::to_value(&dict).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "event_id": 100,
                "sub_image": [],
                "sub_peak_time": -1.0,
                "tel_image": [],
                "tel_peak_time": 7.0,
            })
        );
    }

    #[test]
    fn conversion_is_deterministic() {
        let event = populated_event();
        let a = event.to_dict(DictOptions::new().flatten()).unwrap();
        let b = event.to_dict(DictOptions::new().flatten()).unwrap();
        assert_eq!(a, b);
    }
}
