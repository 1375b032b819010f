//! # Document Model
//!
//! A [`Document`] is the tree the normalizer and populator operate on. It
//! mirrors `serde_json::Value` with one extra leaf variant, [`Document::Date`],
//! produced by date coercion.
//!
//! Mappings keep insertion order. OpenTrials responses are consumed by
//! humans as often as by programs, and a normalizer that shuffled fields
//! would make diffs against the raw payload unreadable.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// A date leaf produced by coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// A timestamp that parsed successfully, normalized to UTC.
    Valid(DateTime<Utc>),
    /// The "not-a-date" marker. Carries the raw text of the original leaf
    /// so callers can report what failed to parse.
    Invalid(String),
}

impl DateValue {
    /// Returns the parsed instant, or `None` for an invalid date.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Valid(dt) => Some(dt),
            Self::Invalid(_) => None,
        }
    }

    /// Returns true if the date parsed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// ISO-8601 rendering with millisecond precision and `Z` suffix
    /// (`2020-01-01T00:00:00.000Z`), or `None` when invalid.
    pub fn to_iso8601(&self) -> Option<String> {
        self.as_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Insertion-ordered string-keyed mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping(Vec<(String, Document)>);

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a value by key for in-place mutation.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.0.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value. An existing key keeps its position and has its value
    /// replaced; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: Document) -> Option<Document> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Document);
    type IntoIter = std::vec::IntoIter<(String, Document)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Same semantics as repeated [`Mapping::insert`]: a repeated key keeps
/// its first position and takes the last value. Runs in linear time.
impl FromIterator<(String, Document)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Document)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut entries: Vec<(String, Document)> = Vec::with_capacity(iter.size_hint().0);
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            match positions.get(&k) {
                Some(&at) => entries[at].1 = v,
                None => {
                    positions.insert(k.clone(), entries.len());
                    entries.push((k, v));
                }
            }
        }
        Mapping(entries)
    }
}

/// A JSON-shaped tree with date leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateValue),
    Sequence(Vec<Document>),
    Mapping(Mapping),
}

impl Document {
    /// Scalars and dates are leaves. Containers are not, even when empty.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Field lookup on a mapping. Returns `None` for any other variant.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Self::Mapping(m) => m.get(key),
            _ => None,
        }
    }

    /// Mutable field lookup on a mapping.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        match self {
            Self::Mapping(m) => m.get_mut(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Document>> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Convert back to a plain JSON value.
    ///
    /// Valid dates become ISO-8601 strings; invalid dates become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Date(d) => d.to_iso8601().map_or(Value::Null, Value::String),
            Self::Sequence(items) => Value::Array(items.iter().map(Document::to_json).collect()),
            Self::Mapping(m) => Value::Object(
                m.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Document::from).collect()),
            // JSON object keys are already unique.
            Value::Object(map) => Self::Mapping(Mapping(
                map.into_iter().map(|(k, v)| (k, Document::from(v))).collect(),
            )),
        }
    }
}

impl From<DateValue> for Document {
    fn from(value: DateValue) -> Self {
        Self::Date(value)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(d) => match d.to_iso8601() {
                Some(s) => serializer.serialize_str(&s),
                None => serializer.serialize_unit(),
            },
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from)
    }
}
