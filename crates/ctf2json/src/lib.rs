//! Converts CTF trace events to JSON documents.
//!
//! This crate enumerates a trace (using `ctfread`) and produces one JSON
//! document per event, suitable for piping into `jq`, a document store, or
//! any log pipeline that speaks JSON.
//!
//! # Usage
//!
//! ```
//! use ctf2json::convert_trace;
//! use ctfread::replay::ReplayEngine;
//! use ctfread::{Event, Trace};
//!
//! let event = Event {
//!     name: "ust_libc:malloc".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut trace = Trace::new(ReplayEngine::from_events([event]));
//! let documents = convert_trace(&mut trace).unwrap();
//!
//! assert_eq!(documents.len(), 1);
//! assert_eq!(documents[0]["name"], "ust_libc:malloc");
//! ```

pub mod convert;

pub use convert::{convert_trace, event_to_json};
