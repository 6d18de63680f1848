//! Typed field accessors.
//!
//! A [`FieldSpec`] binds a (scope, name) pair to a compile-time field kind,
//! so application code can pull a statically typed value out of an [`Event`]
//! instead of matching on the dynamic [`Variant`] itself:
//!
//! ```
//! use ctfread::spec::IntegerSpec;
//! use ctfread::{Event, Field, FieldKind, Scope, Variant};
//! use ctfread::types::Integer;
//!
//! let size = IntegerSpec::new(Scope::EventFields, "size");
//!
//! let mut event = Event::default();
//! event.fields.insert(
//!     (Scope::EventFields, "size".to_string()),
//!     Field::new(
//!         "size",
//!         FieldKind::Integer,
//!         Variant::Integer(Integer::unsigned(128, 64, 10)),
//!     ),
//! );
//!
//! assert!(size.available_in(&event));
//! assert_eq!(size.interpret(&event).unwrap().as_u64(), Ok(128));
//! ```
//!
//! Specs are immutable and side-effect free; one spec can be reused across
//! any number of events.

use std::marker::PhantomData;

use crate::types::{Enumerator, Event, Field, FieldKind, Integer, SpecError, Scope, Variant};

mod sealed {
    pub trait Sealed {}
}

/// Maps a compile-time field kind to the host type a [`FieldSpec`] yields.
///
/// The mapping is fixed and total over the nine queryable field kinds;
/// [`FieldKind::Unknown`] deliberately has no marker.
pub trait FieldType: sealed::Sealed {
    /// The host type extracted from a matching field.
    type Value: ?Sized;

    /// The field kind this marker stands for.
    const KIND: FieldKind;

    /// Narrow the field's value. Returns `None` if the populated alternative
    /// does not match this kind.
    fn extract(field: &Field) -> Option<&Self::Value>;
}

macro_rules! field_type {
    ($(#[$doc:meta])* $marker:ident, $kind:expr, $value:ty, |$field:ident| $extract:expr) => {
        $(#[$doc])*
        pub enum $marker {}

        impl sealed::Sealed for $marker {}

        impl FieldType for $marker {
            type Value = $value;
            const KIND: FieldKind = $kind;

            fn extract($field: &Field) -> Option<&Self::Value> {
                $extract
            }
        }
    };
}

field_type!(
    /// Marker for integer fields, yielding [`Integer`].
    IntegerField,
    FieldKind::Integer,
    Integer,
    |field| field.as_integer()
);

field_type!(
    /// Marker for floating-point fields, yielding `f64`.
    FloatField,
    FieldKind::FloatingPoint,
    f64,
    |field| match field.value() {
        Variant::Float(v) => Some(v),
        _ => None,
    }
);

field_type!(
    /// Marker for enumeration fields, yielding [`Enumerator`].
    EnumField,
    FieldKind::Enumeration,
    Enumerator,
    |field| field.as_enumerator()
);

field_type!(
    /// Marker for string fields, yielding `str`.
    StringField,
    FieldKind::String,
    str,
    |field| field.as_str()
);

field_type!(
    /// Marker for structure fields, yielding the member values in
    /// declaration order.
    StructureField,
    FieldKind::Structure,
    [Variant],
    |field| field.as_collection()
);

field_type!(
    /// Marker for untagged variant fields, yielding the selected arm.
    UntaggedVariantField,
    FieldKind::UntaggedVariant,
    Variant,
    |field| field.selected()
);

field_type!(
    /// Marker for tagged variant fields, yielding the selected arm.
    VariantField,
    FieldKind::Variant,
    Variant,
    |field| field.selected()
);

field_type!(
    /// Marker for array fields, yielding the element values.
    ArrayField,
    FieldKind::Array,
    [Variant],
    |field| field.as_collection()
);

field_type!(
    /// Marker for sequence fields, yielding the element values.
    SequenceField,
    FieldKind::Sequence,
    [Variant],
    |field| field.as_collection()
);

/// A compile-time-typed handle onto one (scope, name) field of an event.
pub struct FieldSpec<T: FieldType> {
    scope: Scope,
    name: String,
    _type: PhantomData<fn() -> T>,
}

pub type IntegerSpec = FieldSpec<IntegerField>;
pub type FloatSpec = FieldSpec<FloatField>;
pub type EnumSpec = FieldSpec<EnumField>;
pub type StringSpec = FieldSpec<StringField>;
pub type StructureSpec = FieldSpec<StructureField>;
pub type UntaggedVariantSpec = FieldSpec<UntaggedVariantField>;
pub type VariantSpec = FieldSpec<VariantField>;
pub type ArraySpec = FieldSpec<ArrayField>;
pub type SequenceSpec = FieldSpec<SequenceField>;

impl<T: FieldType> FieldSpec<T> {
    /// A new spec bound to the given scope and field name.
    pub fn new(scope: Scope, name: impl Into<String>) -> Self {
        FieldSpec {
            scope,
            name: name.into(),
            _type: PhantomData,
        }
    }

    /// The scope this spec is bound to.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The field name this spec is bound to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the given event contains the field described by this spec,
    /// with the kind this spec expects. Never fails.
    pub fn available_in(&self, event: &Event) -> bool {
        event
            .field(self.scope, &self.name)
            .is_some_and(|field| field.is_a(T::KIND))
    }

    /// Interpret the field's value from the given event.
    ///
    /// Returns `None` exactly when [`available_in`](Self::available_in) is
    /// false.
    pub fn interpret<'e>(&self, event: &'e Event) -> Option<&'e T::Value> {
        let field = event.field(self.scope, &self.name)?;
        if !field.is_a(T::KIND) {
            return None;
        }
        T::extract(field)
    }

    /// Interpret the field's value from the given event, failing loudly.
    ///
    /// Distinguishes a missing key from a present field of the wrong kind.
    pub fn interpret_strict<'e>(&self, event: &'e Event) -> Result<&'e T::Value, SpecError> {
        let field = event
            .field(self.scope, &self.name)
            .ok_or_else(|| SpecError::KeyNotFound {
                scope: self.scope,
                name: self.name.clone(),
            })?;

        T::extract(field).ok_or_else(|| SpecError::TypeMismatch {
            scope: self.scope,
            name: self.name.clone(),
            expected: T::KIND,
            actual: field.kind(),
        })
    }
}

impl<T: FieldType> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        FieldSpec {
            scope: self.scope,
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: FieldType> std::fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("scope", &self.scope)
            .field("name", &self.name)
            .field("kind", &T::KIND)
            .finish()
    }
}
