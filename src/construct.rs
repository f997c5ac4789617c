use std::sync::{Arc, Mutex, PoisonError};

// empty slots are kept per variant, and variants are told apart by type
use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::marker::PhantomData;

// used to print out readable forms of a construct
use std::fmt;

use lazy_static::lazy_static;
use tracing::debug;

// our own stuff that we need
use crate::datatype::{
    Anything, Boolean, Collection, Float, Integer, OtherHasher, Text, Value, Variant,
};
use crate::error::{OptionalError, Result};

// a slot is never written after it has been created
type Slot = Arc<Option<Value>>;

pub type OptionalAny = Optional<Anything>;
pub type OptionalBool = Optional<Boolean>;
pub type OptionalInt = Optional<Integer>;
pub type OptionalFloat = Optional<Float>;
pub type OptionalString = Optional<Text>;
pub type OptionalArr = Optional<Collection>;

// ------------- EmptyKeeper -------------
#[derive(Debug, Default)]
struct EmptyKeeper {
    kept: HashMap<TypeId, Slot, OtherHasher>,
}
impl EmptyKeeper {
    fn keep<V: Variant>(&mut self) -> (Slot, bool) {
        let mut previously_kept = true;
        let kept = match self.kept.entry(TypeId::of::<V>()) {
            Entry::Vacant(e) => {
                previously_kept = false;
                e.insert(Arc::new(None))
            }
            Entry::Occupied(e) => e.into_mut(),
        };
        (Arc::clone(kept), previously_kept)
    }
}

lazy_static! {
    // one empty slot per variant for the lifetime of the process
    static ref EMPTY_KEEPER: Mutex<EmptyKeeper> = Mutex::new(EmptyKeeper::default());
}

// ------------- Optional -------------
/// A handle to an immutable slot holding at most one value valid for `V`.
///
/// Handles are cheap to clone and clones share identity, see [`Optional::ptr_eq`].
/// Empty handles of one variant all point at the same interned slot.
pub struct Optional<V: Variant> {
    slot: Slot,
    variant: PhantomData<fn() -> V>,
}

impl<V: Variant> Optional<V> {
    fn from_slot(slot: Slot) -> Self {
        Self {
            slot,
            variant: PhantomData,
        }
    }

    pub fn of(value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        if value.is_null() {
            return Err(OptionalError::InvalidValue(format!(
                "value for {} cannot be null, use of_nullable instead",
                V::VARIANT
            )));
        }
        let value = Self::validate(value)?;
        Ok(Self::from_slot(Arc::new(Some(value))))
    }

    pub fn of_nullable(value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        if value.is_null() {
            return Ok(Self::of_empty());
        }
        Self::of(value)
    }

    pub fn of_empty() -> Self {
        // the keeper is insert only, so a poisoned lock still holds valid slots
        let (slot, previously_kept) = EMPTY_KEEPER
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keep::<V>();
        if !previously_kept {
            debug!(variant = V::VARIANT, uid = V::UID, "interned empty optional");
        }
        Self::from_slot(slot)
    }

    // null passes through untouched
    fn validate(value: Value) -> Result<Value> {
        if !value.is_null() && !V::supports(&value) {
            debug!(variant = V::VARIANT, kind = value.kind(), "unsupported value rejected");
            return Err(OptionalError::Unsupported {
                variant: V::VARIANT,
                value: format!("{} ({})", value, value.kind()),
            });
        }
        Ok(value)
    }

    fn value(&self) -> Option<&Value> {
        self.slot.as_ref().as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.slot.is_some()
    }
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
    pub fn variant(&self) -> &'static str {
        V::VARIANT
    }

    /// Identity comparison, true when both handles share one slot.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.slot, &other.slot)
    }

    pub fn if_present<F: FnOnce(&Value)>(self, action: F) -> Self {
        if let Some(value) = self.value() {
            action(value);
        }
        self
    }

    // apply, if_absent and if_present_or_else end a chain on purpose
    pub fn apply<F: FnOnce(&Value)>(&self, action: F) {
        if let Some(value) = self.value() {
            action(value);
        }
    }
    pub fn if_absent<F: FnOnce()>(&self, empty_action: F) {
        if self.is_empty() {
            empty_action();
        }
    }
    pub fn if_present_or_else<F, G>(&self, action: F, empty_action: G)
    where
        F: FnOnce(&Value),
        G: FnOnce(),
    {
        match self.value() {
            Some(value) => action(value),
            None => empty_action(),
        }
    }

    /// A mapper returning null collapses to the empty optional.
    pub fn map<F, R>(&self, mapper: F) -> Result<Self>
    where
        F: FnOnce(&Value) -> R,
        R: Into<Value>,
    {
        match self.value() {
            Some(value) => Self::of_nullable(mapper(value)),
            None => Ok(Self::of_empty()),
        }
    }

    pub fn flat_map<F>(&self, mapper: F) -> Result<Self>
    where
        F: FnOnce(&Value) -> Result<Self>,
    {
        match self.value() {
            Some(value) => mapper(value),
            None => Ok(Self::of_empty()),
        }
    }

    /// Hands back this very handle unless a present value fails the predicate.
    pub fn filter<P: FnOnce(&Value) -> bool>(self, predicate: P) -> Self {
        if self.value().is_none_or(predicate) {
            self
        } else {
            Self::of_empty()
        }
    }

    /// Keeps this optional when present, otherwise the empty one.
    /// The value held by `_other` is never adopted.
    pub fn or(self, _other: &Self) -> Self {
        if self.is_present() {
            return self;
        }
        Self::of_empty()
    }

    /// The fallback is validated, a null fallback is handed back as is.
    pub fn or_else(&self, other: impl Into<Value>) -> Result<Value> {
        match self.value() {
            Some(value) => Ok(value.clone()),
            None => Self::validate(other.into()),
        }
    }

    pub fn or_else_get<F, R>(&self, supplier: F) -> Result<Value>
    where
        F: FnOnce() -> R,
        R: Into<Value>,
    {
        if let Some(value) = self.value() {
            return Ok(value.clone());
        }
        let value = supplier().into();
        if value.is_null() {
            return Err(OptionalError::InvalidValue(format!(
                "the value supplied to {}::or_else_get cannot be null",
                V::VARIANT
            )));
        }
        Self::validate(value)
    }

    pub fn or_else_throw<F, E>(&self, error_supplier: F) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> E,
    {
        match self.value() {
            Some(value) => Ok(value.clone()),
            None => Err(error_supplier()),
        }
    }

    pub fn or_else_optional<F>(self, supplier: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Self>,
    {
        if self.is_present() {
            return Ok(self);
        }
        supplier()
    }

    pub fn get(&self) -> Result<&Value> {
        self.value().ok_or(OptionalError::NoValuePresent(V::VARIANT))
    }

    /// The held value as the variant's native type.
    pub fn typed(&self) -> Result<V::Native> {
        let value = self.get()?;
        V::convert(value).ok_or_else(|| OptionalError::Unsupported {
            variant: V::VARIANT,
            value: value.to_string(),
        })
    }

    pub fn erase(&self) -> ErasedOptional {
        ErasedOptional {
            variant: TypeId::of::<V>(),
            name: V::VARIANT,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<V: Variant> Clone for Optional<V> {
    fn clone(&self) -> Self {
        Self::from_slot(Arc::clone(&self.slot))
    }
}
impl<V: Variant> PartialEq for Optional<V> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.value() == other.value()
    }
}
impl<V: Variant> PartialEq<ErasedOptional> for Optional<V> {
    fn eq(&self, other: &ErasedOptional) -> bool {
        self.erase() == *other
    }
}
impl<V: Variant> fmt::Debug for Optional<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple(V::VARIANT).field(&self.value()).finish()
    }
}
// diagnostic only, never parse this
impl<V: Variant> fmt::Display for Optional<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        render(f, self.value())
    }
}

fn render(f: &mut fmt::Formatter, value: Option<&Value>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "Optional[{}]", value),
        None => write!(f, "Optional[empty]"),
    }
}

// ------------- ErasedOptional -------------
/// An optional whose variant is only known at runtime.
#[derive(Clone)]
pub struct ErasedOptional {
    variant: TypeId,
    name: &'static str,
    slot: Slot,
}
impl ErasedOptional {
    pub fn variant(&self) -> &'static str {
        self.name
    }
    pub fn is<V: Variant>(&self) -> bool {
        self.variant == TypeId::of::<V>()
    }
    pub fn is_present(&self) -> bool {
        self.slot.is_some()
    }
    pub fn downcast<V: Variant>(self) -> Result<Optional<V>> {
        if !self.is::<V>() {
            return Err(OptionalError::InvalidValue(format!(
                "expected an optional of {} but found {}, must return correct variant",
                V::VARIANT,
                self.name
            )));
        }
        Ok(Optional::from_slot(self.slot))
    }
}
impl<V: Variant> From<Optional<V>> for ErasedOptional {
    fn from(optional: Optional<V>) -> Self {
        optional.erase()
    }
}
impl PartialEq for ErasedOptional {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && (Arc::ptr_eq(&self.slot, &other.slot) || self.slot == other.slot)
    }
}
impl fmt::Debug for ErasedOptional {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple(self.name).field(&self.slot.as_ref().as_ref()).finish()
    }
}
impl fmt::Display for ErasedOptional {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        render(f, self.slot.as_ref().as_ref())
    }
}
