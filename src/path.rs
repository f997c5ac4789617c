//! Dot path resolution into nested collections.
//!
//! A path such as `orders.*.lines.*.sku` is split into [`Segment`]s that are
//! consumed left to right. Literal segments descend one level; a wildcard fans
//! the remaining suffix out over every element of the current array and, when
//! the suffix still holds another wildcard, collapses the per element results
//! one level so repeated fan-outs yield a single list.
//!
//! ```
//! use typed_optional::datatype::Value;
//! use typed_optional::path::{resolve, PathSpec};
//!
//! let root = Value::from(serde_json::json!({"a": [{"x": 1}, {"x": 2}]}));
//! let leaves = resolve(&root, &PathSpec::parse("a.*.x"));
//! assert_eq!(leaves, Value::from(vec![1, 2]));
//! ```

use std::borrow::Cow;
use std::fmt;

use tracing::trace;

use crate::construct::{Optional, OptionalAny};
use crate::datatype::{Array, Collection, Indexable, Key, Object, Value};
use crate::error::Result;
use crate::settings::PathSettings;

// ------------- Segment -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Key(Key),
    Wildcard,
    /// Ends resolution, handing back whatever has been reached so far.
    Stop,
}
impl From<&str> for Segment {
    fn from(segment: &str) -> Segment {
        if segment == "*" {
            Segment::Wildcard
        } else {
            Segment::Key(Key::from_segment(segment))
        }
    }
}
impl From<Key> for Segment {
    fn from(key: Key) -> Segment {
        Segment::Key(key)
    }
}
impl From<i64> for Segment {
    fn from(index: i64) -> Segment {
        Segment::Key(Key::Index(index))
    }
}
impl<S: Into<Segment>> From<Option<S>> for Segment {
    fn from(segment: Option<S>) -> Segment {
        segment.map_or(Segment::Stop, Into::into)
    }
}

// ------------- PathSpec -------------
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSpec {
    segments: Vec<Segment>,
}
impl PathSpec {
    /// The empty path, which resolves to the root itself.
    pub fn root() -> Self {
        Self::default()
    }
    pub fn parse(path: &str) -> Self {
        Self::parse_with(path, &PathSettings::default())
    }
    pub fn parse_with(path: &str, settings: &PathSettings) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        let segments = path
            .split(settings.delimiter)
            .map(|segment| {
                if segment == settings.wildcard {
                    Segment::Wildcard
                } else {
                    Segment::Key(Key::from_segment(segment))
                }
            })
            .collect();
        Self { segments }
    }
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
    /// Joins the segments back with the configured delimiter and wildcard.
    ///
    /// A `Stop` has no spelling of its own and shows up as an empty segment,
    /// so `foo..bar` is for reading only and does not parse back to a `Stop`.
    pub fn render_with(&self, settings: &PathSettings) -> String {
        let mut s = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => s += &key.to_string(),
                Segment::Wildcard => s += &settings.wildcard,
                Segment::Stop => (),
            }
            s.push(settings.delimiter);
        }
        s.pop();
        s
    }
}
impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}
impl From<&PathSpec> for PathSpec {
    fn from(path: &PathSpec) -> Self {
        path.clone()
    }
}
impl<S: Into<Segment>> From<Vec<S>> for PathSpec {
    fn from(segments: Vec<S>) -> Self {
        segments.into_iter().collect()
    }
}
impl<S: Into<Segment>> FromIterator<S> for PathSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}
impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render_with(&PathSettings::default()))
    }
}

// ------------- Fallback -------------
/// What a miss resolves to. Suppliers run only on the miss path.
pub enum Fallback {
    Literal(Value),
    Supplier(Box<dyn Fn() -> Value + Send + Sync>),
}
impl Fallback {
    pub fn supplier(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Fallback::Supplier(Box::new(f))
    }
    fn produce(&self) -> Value {
        match self {
            Fallback::Literal(value) => value.clone(),
            Fallback::Supplier(f) => f(),
        }
    }
}
impl Default for Fallback {
    fn default() -> Self {
        Fallback::Literal(Value::Null)
    }
}
impl From<Value> for Fallback {
    fn from(value: Value) -> Self {
        Fallback::Literal(value)
    }
}
impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Fallback::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Fallback::Supplier(_) => f.write_str("Supplier"),
        }
    }
}

// ------------- Accessor -------------
// capability checks in priority order: keyed array, offset protocol, properties
enum Accessor<'a> {
    Keyed(&'a Array),
    Offset(&'a dyn Indexable),
    Properties(&'a Object),
    Opaque,
}
impl<'a> Accessor<'a> {
    fn of(target: &'a Value) -> Self {
        match target {
            Value::Array(array) => Accessor::Keyed(array),
            Value::Indexable(container) => Accessor::Offset(&**container),
            Value::Object(object) => Accessor::Properties(object),
            _ => Accessor::Opaque,
        }
    }
    fn get(self, key: &Key) -> Option<Cow<'a, Value>> {
        match self {
            Accessor::Keyed(array) => array.get(key).map(Cow::Borrowed),
            Accessor::Offset(container) => {
                if container.offset_exists(key) {
                    Some(Cow::Owned(container.offset_get(key).unwrap_or_default()))
                } else {
                    container
                        .property(&key.to_string())
                        .filter(|value| !value.is_null())
                        .map(Cow::Owned)
                }
            }
            Accessor::Properties(object) => {
                let name = key.to_string();
                if object.isset(&name) {
                    object.property(&name).map(Cow::Borrowed)
                } else {
                    None
                }
            }
            Accessor::Opaque => None,
        }
    }
}

fn step<'a>(target: Cow<'a, Value>, key: &Key) -> Option<Cow<'a, Value>> {
    match target {
        Cow::Borrowed(value) => Accessor::of(value).get(key),
        Cow::Owned(value) => Accessor::of(&value)
            .get(key)
            .map(|next| Cow::Owned(next.into_owned())),
    }
}

// ------------- Resolution -------------
/// Resolves with a null fallback.
pub fn resolve(root: &Value, path: &PathSpec) -> Value {
    resolve_or(root, path, &Fallback::default())
}

pub fn resolve_or(root: &Value, path: &PathSpec, fallback: &Fallback) -> Value {
    descend(Cow::Borrowed(root), path.segments(), fallback)
}

fn descend(mut target: Cow<'_, Value>, segments: &[Segment], fallback: &Fallback) -> Value {
    for (i, segment) in segments.iter().enumerate() {
        let rest = &segments[i + 1..];
        match segment {
            Segment::Stop => return target.into_owned(),
            Segment::Wildcard => {
                let Value::Array(items) = &*target else {
                    trace!(kind = target.kind(), "wildcard over a non array");
                    return fallback.produce();
                };
                trace!(elements = items.len(), remaining = rest.len(), "wildcard fan-out");
                // misses inside the fan-out stay null, the fallback is not forwarded
                let results: Array = items
                    .values()
                    .map(|item| descend(Cow::Borrowed(item), rest, &Fallback::default()))
                    .collect();
                if rest.contains(&Segment::Wildcard) {
                    return match collapse(&results) {
                        Ok(collapsed) => Value::Array(collapsed),
                        Err(e) => {
                            trace!(error = %e, "collapse failed");
                            fallback.produce()
                        }
                    };
                }
                return Value::Array(results);
            }
            Segment::Key(key) => match step(target, key) {
                Some(next) => target = next,
                None => {
                    trace!(%key, depth = i, "path segment missing");
                    return fallback.produce();
                }
            },
        }
    }
    target.into_owned()
}

// non array results are dropped, the rest are appended in order
fn collapse(results: &Array) -> Result<Array> {
    let mut collapsed = Array::new();
    for values in results.values() {
        if let Value::Array(values) = values {
            collapsed.merge(values)?;
        }
    }
    Ok(collapsed)
}

// ------------- OptionalArr -------------
impl Optional<Collection> {
    /// Present when `key` resolves to a non null value inside `input`.
    ///
    /// The optional holds `input` itself, not the resolved value; use
    /// [`Optional::extract`] to reach the value.
    pub fn array_key(input: impl Into<Value>, key: impl Into<PathSpec>) -> Result<Self> {
        let input = input.into();
        if resolve(&input, &key.into()).is_null() {
            return Ok(Self::of_empty());
        }
        Self::of(input)
    }

    pub fn extract(&self, path: impl Into<PathSpec>) -> Result<OptionalAny> {
        match self.get() {
            Ok(root) => OptionalAny::of_nullable(resolve(root, &path.into())),
            Err(_) => Ok(OptionalAny::of_empty()),
        }
    }
}
