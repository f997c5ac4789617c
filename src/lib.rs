//! Typed Optional – validated optional containers over dynamic values.
//!
//! The crate centers on the *optional*: a container that either holds exactly
//! one value or is empty, where:
//! * A [`datatype::Value`] is the dynamic value universe (scalars, keyed arrays,
//!   external indexable containers and property bags). `Value::Null` is the
//!   absent sentinel and is never held.
//! * A [`datatype::Variant`] names a closed family of values through a validity
//!   predicate (`supports`), checked once when a value enters a container.
//! * An [`construct::Optional`] couples a variant with at most one value and
//!   offers the chaining algebra (`map`, `flat_map`, `filter`, the `or_else`
//!   family, equality and rendering).
//!
//! Empty optionals are interned: exactly one empty instance exists per variant
//! for the lifetime of the process, so heavy chaining over absent values does
//! not allocate. Handles are immutable and cheap to clone; every chaining
//! operation hands back either the same handle or a new one.
//!
//! ## Modules
//! * [`construct`] – The [`construct::Optional`] container, its erased form and
//!   the keeper of interned empty instances.
//! * [`datatype`] – [`datatype::Value`], keys, arrays, objects, the
//!   [`datatype::Indexable`] protocol and the provided variants.
//! * [`path`] – Dot path resolution with wildcard fan-out, and the
//!   `array_key` factory of the collection optional.
//! * [`settings`] – Layered configuration for the resolver and the command line tool.
//!
//! ## Variants
//! [`datatype::Anything`] accepts every value; [`datatype::Boolean`],
//! [`datatype::Integer`], [`datatype::Float`] and [`datatype::Text`] accept one
//! scalar kind each; [`datatype::Collection`] accepts arrays and indexables.
//! Optionals of different variants are distinct types and never compare equal.
//!
//! ## Path Resolution
//! Paths such as `"orders.*.lines.*.sku"` descend through arrays, indexables
//! and object properties. A wildcard applies the rest of the path to every
//! element; when a further wildcard remains, per element results are collapsed
//! into one list.
//!
//! ## Quick Start
//! ```
//! use typed_optional::{OptionalArr, OptionalInt};
//! use typed_optional::datatype::Value;
//!
//! let doubled = OptionalInt::of(21).unwrap().map(|v| v.as_int().map(|i| i * 2)).unwrap();
//! assert_eq!(doubled.get().unwrap(), &Value::Int(42));
//! assert!(OptionalInt::of_empty().map(|_| 1).unwrap().is_empty());
//!
//! let input = Value::from(serde_json::json!({"foo": {"bar": "baz"}}));
//! assert!(OptionalArr::array_key(input.clone(), "foo.bar").unwrap().is_present());
//! assert!(OptionalArr::array_key(input, "foo.missing").unwrap().is_empty());
//! ```

pub mod construct;
pub mod datatype;
pub mod error;
pub mod path;
pub mod settings;

pub use construct::{
    ErasedOptional, Optional, OptionalAny, OptionalArr, OptionalBool, OptionalFloat,
    OptionalInt, OptionalString,
};
pub use error::{OptionalError, Result};
