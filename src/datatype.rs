// used for the array key index
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use core::hash::{BuildHasher, BuildHasherDefault};
use seahash::SeaHasher;

// used to recognize segments that address integer keys
use lazy_static::lazy_static;
use regex::Regex;

// used to print out readable forms of a value
use std::fmt;
// indexables and objects are shared, and compared by identity
use std::sync::Arc;

// used for JSON interchange
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{self, OptionalError};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    // the integer spellings that address integer keys, "01" and "+1" stay names
    static ref CANONICAL_INTEGER: Regex = Regex::new(r"^(0|-?[1-9][0-9]*)$").unwrap();
}

/// A value that a variant can validate.
///
/// The data model is closed to what the resolver knows how to descend into:
/// scalars, ordered keyed arrays, external containers exposing an offset
/// protocol, and property bags.
pub trait Variant: 'static + Send + Sync {
    // static stuff which needs to be implemented downstream
    const UID: u8;
    const VARIANT: &'static str;
    type Native;
    /// Never called with `Value::Null`.
    fn supports(value: &Value) -> bool;
    fn convert(value: &Value) -> Option<Self::Native>;
}

// ------------- Variants --------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anything;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boolean;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integer;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Float;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Text;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collection;

impl Variant for Anything {
    const UID: u8 = 1;
    const VARIANT: &'static str = "Anything";
    type Native = Value;
    fn supports(_value: &Value) -> bool {
        true
    }
    fn convert(value: &Value) -> Option<Value> {
        Some(value.clone())
    }
}
impl Variant for Boolean {
    const UID: u8 = 2;
    const VARIANT: &'static str = "Boolean";
    type Native = bool;
    fn supports(value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }
    fn convert(value: &Value) -> Option<bool> {
        value.as_bool()
    }
}
impl Variant for Integer {
    const UID: u8 = 3;
    const VARIANT: &'static str = "Integer";
    type Native = i64;
    fn supports(value: &Value) -> bool {
        matches!(value, Value::Int(_))
    }
    fn convert(value: &Value) -> Option<i64> {
        value.as_int()
    }
}
impl Variant for Float {
    const UID: u8 = 4;
    const VARIANT: &'static str = "Float";
    type Native = f64;
    fn supports(value: &Value) -> bool {
        matches!(value, Value::Float(_))
    }
    fn convert(value: &Value) -> Option<f64> {
        value.as_float()
    }
}
impl Variant for Text {
    const UID: u8 = 5;
    const VARIANT: &'static str = "Text";
    type Native = String;
    fn supports(value: &Value) -> bool {
        matches!(value, Value::Text(_))
    }
    fn convert(value: &Value) -> Option<String> {
        value.as_str().map(String::from)
    }
}
impl Variant for Collection {
    const UID: u8 = 6;
    const VARIANT: &'static str = "Collection";
    type Native = Value;
    fn supports(value: &Value) -> bool {
        value.is_accessible()
    }
    fn convert(value: &Value) -> Option<Value> {
        Self::supports(value).then(|| value.clone())
    }
}

// ------------- Key --------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Index(i64),
    Name(String),
}
impl Key {
    /// Segments spelling a canonical integer address integer keys.
    pub fn from_segment(segment: &str) -> Key {
        if CANONICAL_INTEGER.is_match(segment) {
            if let Ok(index) = segment.parse::<i64>() {
                return Key::Index(index);
            }
        }
        Key::Name(segment.to_string())
    }
}
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(n) => write!(f, "{}", n),
        }
    }
}
impl From<&str> for Key {
    fn from(segment: &str) -> Key {
        Key::from_segment(segment)
    }
}
impl From<String> for Key {
    fn from(segment: String) -> Key {
        Key::from_segment(&segment)
    }
}
impl From<i64> for Key {
    fn from(index: i64) -> Key {
        Key::Index(index)
    }
}
impl From<i32> for Key {
    fn from(index: i32) -> Key {
        Key::Index(index as i64)
    }
}

// ------------- Array --------------
/// Ordered keyed collection. Entries keep insertion order while a secondary
/// index gives constant time lookup, so both sides must be kept in step.
#[derive(Clone, Default)]
pub struct Array {
    entries: Vec<(Key, Value)>,
    lookup: HashMap<Key, usize, OtherHasher>,
    next_index: i64,
}
impl Array {
    pub fn new() -> Self {
        Self::default()
    }
    /// Appends under the next free integer key.
    ///
    /// Fails once `i64::MAX` is taken, since there is no free key left.
    pub fn push(&mut self, value: impl Into<Value>) -> error::Result<()> {
        let key = Key::Index(self.next_index);
        if self.lookup.contains_key(&key) {
            return Err(OptionalError::InvalidValue(format!(
                "cannot push, the next index {} is already occupied",
                self.next_index
            )));
        }
        self.insert(key, value);
        Ok(())
    }
    /// Overwrites in place when the key is already present.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Key::Index(index) = key {
            if index >= self.next_index {
                self.next_index = index.saturating_add(1);
            }
        }
        match self.lookup.entry(key) {
            Entry::Occupied(e) => {
                self.entries[*e.get()].1 = value;
            }
            Entry::Vacant(e) => {
                self.entries.push((e.key().clone(), value));
                e.insert(self.entries.len() - 1);
            }
        }
    }
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.lookup.get(key).map(|&i| &self.entries[i].1)
    }
    pub fn contains_key(&self, key: &Key) -> bool {
        self.lookup.contains_key(key)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
    /// True when the keys are exactly 0..len in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == Key::Index(i as i64))
    }
    /// Appends the other array: integer keys are renumbered, names overwrite.
    pub fn merge(&mut self, other: &Array) -> error::Result<()> {
        for (key, value) in other.iter() {
            match key {
                Key::Index(_) => self.push(value.clone())?,
                Key::Name(_) => self.insert(key.clone(), value.clone()),
            }
        }
        Ok(())
    }
}
impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut array = Array::new();
        for (index, value) in iter.into_iter().enumerate() {
            array.insert(Key::Index(index as i64), value);
        }
        array
    }
}
impl FromIterator<(Key, Value)> for Array {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

// ------------- Object --------------
/// A property bag, addressed by property name.
#[derive(Clone, Debug)]
pub struct Object {
    class: String,
    properties: Vec<(String, Value)>,
}
impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            properties: Vec::new(),
        }
    }
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(property) => property.1 = value,
            None => self.properties.push((name, value)),
        }
        self
    }
    pub fn class(&self) -> &str {
        &self.class
    }
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
    /// A property is set when it exists and is not null.
    pub fn isset(&self, name: &str) -> bool {
        self.property(name).is_some_and(|v| !v.is_null())
    }
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }
}

// ------------- Indexable --------------
/// An external container reachable through an offset protocol.
pub trait Indexable: fmt::Debug + Send + Sync {
    fn offset_exists(&self, key: &Key) -> bool;
    fn offset_get(&self, key: &Key) -> Option<Value>;
    /// Consulted when the offset is missing.
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }
    /// Used for rendering and serialization only.
    fn snapshot(&self) -> Option<Array> {
        None
    }
    fn type_name(&self) -> &str {
        "Indexable"
    }
}

impl<S: BuildHasher + Send + Sync> Indexable for HashMap<String, Value, S> {
    fn offset_exists(&self, key: &Key) -> bool {
        self.contains_key(&key.to_string())
    }
    fn offset_get(&self, key: &Key) -> Option<Value> {
        self.get(&key.to_string()).cloned()
    }
    fn snapshot(&self) -> Option<Array> {
        let mut names: Vec<&String> = self.keys().collect();
        names.sort();
        Some(
            names
                .into_iter()
                .map(|name| (Key::from_segment(name), self[name].clone()))
                .collect(),
        )
    }
    fn type_name(&self) -> &str {
        "HashMap"
    }
}

// ------------- Value --------------
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Array),
    Indexable(Arc<dyn Indexable>),
    Object(Arc<Object>),
}

impl Value {
    pub fn indexable(container: impl Indexable + 'static) -> Value {
        Value::Indexable(Arc::new(container))
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    /// Arrays and offset containers, the structures keys can be looked up in.
    pub fn is_accessible(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Indexable(_))
    }
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Array(_) => "array",
            Value::Indexable(_) => "indexable",
            Value::Object(_) => "object",
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

// strict equality, shared containers are only equal to themselves
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Indexable(a), Value::Indexable(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn write_listing<'a>(f: &mut fmt::Formatter, values: impl Iterator<Item = &'a Value>) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Array(a) => write_listing(f, a.values()),
            Value::Object(o) => write_listing(f, o.properties().map(|(_, v)| v)),
            Value::Indexable(c) => match c.snapshot() {
                Some(a) => write_listing(f, a.values()),
                None => write!(f, "{}", c.type_name()),
            },
        }
    }
}

// ------------- Conversions --------------
impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int(i as i64)
    }
}
impl From<u32> for Value {
    fn from(i: u32) -> Value {
        Value::Int(i as i64)
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Value {
        Value::Float(x)
    }
}
impl From<f32> for Value {
    fn from(x: f32) -> Value {
        Value::Float(x as f64)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}
impl From<Array> for Value {
    fn from(a: Array) -> Value {
        Value::Array(a)
    }
}
impl From<Object> for Value {
    fn from(o: Object) -> Value {
        Value::Object(Arc::new(o))
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Value {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        value.map_or(Value::Null, Into::into)
    }
}
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(members) => Value::Array(
                members
                    .into_iter()
                    .map(|(name, v)| (Key::from_segment(&name), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn serialize_array<S: Serializer>(array: &Array, serializer: S) -> Result<S::Ok, S::Error> {
    if array.is_list() {
        serializer.collect_seq(array.values())
    } else {
        serializer.collect_map(array.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(a) => serialize_array(a, serializer),
            Value::Object(o) => serializer.collect_map(o.properties()),
            Value::Indexable(c) => match c.snapshot() {
                Some(a) => serialize_array(&a, serializer),
                None => serializer.serialize_unit(),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
