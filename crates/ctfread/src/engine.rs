//! The contract between the typed event model and an external decode engine.
//!
//! The engine owns everything byte-level: the on-disk CTF layout, the TSDL
//! metadata, packet framing, bit-level field decoding. This crate only pulls
//! on three seams — a cursor over raw events, per-scope field positions, and
//! per-field value extraction — and assembles typed [`Event`]s from them.
//!
//! [`Event`]: crate::types::Event

use crate::types::{DecodeError, Enumerator, FieldKind, Integer, Scope};

/// A source of raw trace events.
///
/// Engines are single-pass by default. An engine able to re-read its
/// recording advertises that by returning `true` from
/// [`supports_rewind`](Self::supports_rewind) and implementing
/// [`rewind`](Self::rewind).
pub trait DecodeEngine {
    /// Advance to the next raw event.
    ///
    /// Returns `Ok(None)` once the recording is exhausted, which is a
    /// successful end of enumeration, not an error. The returned event
    /// borrows the engine; it is only valid until the next call.
    fn next_event(&mut self) -> Result<Option<Box<dyn RawEvent + '_>>, DecodeError>;

    /// Whether this engine can re-read the recording from the start.
    fn supports_rewind(&self) -> bool {
        false
    }

    /// Reset the engine to the start of the recording.
    fn rewind(&mut self) -> Result<(), DecodeError> {
        Err(DecodeError::RewindUnsupported)
    }
}

/// One raw, not yet assembled event held by a decode engine.
pub trait RawEvent: std::fmt::Debug {
    /// The name of the event. Empty if the trace omits it.
    fn name(&self) -> &str;

    /// The raw hardware counter timestamp, in cycles.
    fn cycles(&self) -> u64;

    /// The timestamp in nanoseconds since the epoch.
    fn timestamp_ns(&self) -> i64;

    /// Cursors for the field positions of one scope, in declaration order.
    /// A scope with no fields yields an empty list.
    fn scope_fields(&self, scope: Scope)
        -> Result<Vec<Box<dyn FieldCursor + '_>>, DecodeError>;
}

/// An opaque handle onto one schema-described field position.
///
/// Which extractors are meaningful depends on [`kind`](Self::kind); calling
/// one that does not apply reports an engine error. Extractor errors abort
/// assembly of the whole event.
pub trait FieldCursor {
    /// The schema-declared name of the field. Nested element positions may
    /// be anonymous.
    fn name(&self) -> &str;

    /// The declared kind of the field.
    fn kind(&self) -> FieldKind;

    /// Decode an integer value.
    fn integer(&self) -> Result<Integer, DecodeError> {
        Err(unsupported(self.name(), self.kind(), "integer"))
    }

    /// Decode a floating-point value.
    fn float(&self) -> Result<f64, DecodeError> {
        Err(unsupported(self.name(), self.kind(), "floating_point"))
    }

    /// Decode an enumerator. The label is advisory: an engine that cannot
    /// map the value back to a symbolic name supplies an empty label rather
    /// than failing.
    fn enumerator(&self) -> Result<Enumerator, DecodeError> {
        Err(unsupported(self.name(), self.kind(), "enumeration"))
    }

    /// Decode a string value.
    fn string(&self) -> Result<String, DecodeError> {
        Err(unsupported(self.name(), self.kind(), "string"))
    }

    /// The currently selected arm of a tagged or untagged variant field.
    fn selected(&self) -> Result<Box<dyn FieldCursor + '_>, DecodeError> {
        Err(unsupported(self.name(), self.kind(), "variant"))
    }

    /// Child cursors of a structure, array, or sequence field, in
    /// declaration order. Empty for an empty array or sequence instance.
    fn children(&self) -> Result<Vec<Box<dyn FieldCursor + '_>>, DecodeError> {
        Err(unsupported(self.name(), self.kind(), "structure"))
    }
}

fn unsupported(name: &str, kind: FieldKind, requested: &str) -> DecodeError {
    DecodeError::Engine(format!("field {name} is a {kind}, not a {requested} value"))
}
