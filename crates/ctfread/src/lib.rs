//! Typed data model and query layer for CTF trace recordings.
//!
//! This crate represents events recorded by Common Trace Format (CTF) style
//! tracers as named, typed, possibly-nested fields grouped into the six
//! well-known CTF scopes, and lets consumers query those fields with static
//! type safety without knowing the schema at compile time.
//!
//! Byte-level decoding of the CTF wire format and its TSDL metadata is not
//! done here; it is delegated to a decode engine implementing the traits in
//! [`engine`]. The crate ships one engine, [`replay::ReplayEngine`], which
//! serves pre-built in-memory events and is what tests and examples run
//! against.
//!
//! # Usage
//!
//! ```
//! use ctfread::replay::ReplayEngine;
//! use ctfread::spec::IntegerSpec;
//! use ctfread::types::Integer;
//! use ctfread::{EnumeratorReply, Event, Field, FieldKind, Scope, Trace, Variant};
//!
//! // A synthetic one-event trace; a real engine would decode events from
//! // a recording on disk instead.
//! let mut event = Event {
//!     name: "ust_libc:malloc".to_string(),
//!     ..Default::default()
//! };
//! event.fields.insert(
//!     (Scope::EventFields, "size".to_string()),
//!     Field::new(
//!         "size",
//!         FieldKind::Integer,
//!         Variant::Integer(Integer::unsigned(128, 64, 10)),
//!     ),
//! );
//!
//! let mut trace = Trace::new(ReplayEngine::from_events([event]));
//!
//! // Spec out the field we are interested in, then enumerate.
//! let size = IntegerSpec::new(Scope::EventFields, "size");
//! let mut total = 0;
//!
//! trace
//!     .for_each_event(|event| {
//!         if let Some(value) = size.interpret(event) {
//!             total += value.as_u64().unwrap_or(0);
//!         }
//!         EnumeratorReply::Ok
//!     })
//!     .unwrap();
//!
//! assert_eq!(total, 128);
//! ```

pub mod engine;
pub mod events;
pub mod replay;
pub mod spec;
pub mod types;

mod decode;
mod trace;

pub use decode::{assemble_event, decode_field};
pub use spec::FieldSpec;
pub use trace::{
    find_trace_root, EnumerationSummary, EnumeratorReply, Outcome, Trace,
};
pub use types::{
    DecodeError, Event, Field, FieldKind, OpenError, Scope, SpecError, Variant,
};
