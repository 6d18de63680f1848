//! Trace enumeration: drive a caller-supplied handler over every event of a
//! recording.
//!
//! The loop is a pull-to-push adaptation: the decode engine exposes a cursor
//! that advances one raw event at a time; [`Trace::for_each_event`]
//! assembles each raw event into a typed [`Event`], invokes the handler,
//! and obeys the handler's [`EnumeratorReply`] to decide whether to keep
//! going. Enumeration is single-threaded, synchronous, and cooperative;
//! cancellation is expressed only through the reply value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::decode::assemble_event;
use crate::engine::DecodeEngine;
use crate::types::{DecodeError, Event, OpenError};

/// Reply returned by an event handler to steer enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumeratorReply {
    /// Processing of the event went fine, keep going.
    Ok,
    /// Processing of the event went fine, but stop enumeration.
    Stop,
    /// Something went wrong while processing the event, stop.
    StopWithError,
    /// Something went wrong, keep going though.
    ContinueWithError,
}

impl EnumeratorReply {
    pub const ALL: [EnumeratorReply; 4] = [
        EnumeratorReply::Ok,
        EnumeratorReply::Stop,
        EnumeratorReply::StopWithError,
        EnumeratorReply::ContinueWithError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnumeratorReply::Ok => "ok",
            EnumeratorReply::Stop => "stop",
            EnumeratorReply::StopWithError => "stop_with_error",
            EnumeratorReply::ContinueWithError => "continue_with_error",
        }
    }
}

impl fmt::Display for EnumeratorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnumeratorReply {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(EnumeratorReply::Ok),
            "stop" => Ok(EnumeratorReply::Stop),
            "stop_with_error" => Ok(EnumeratorReply::StopWithError),
            "continue_with_error" => Ok(EnumeratorReply::ContinueWithError),
            _ => Err(()),
        }
    }
}

/// How a successful enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine ran out of events.
    Exhausted,
    /// The handler asked to stop.
    Stopped,
}

/// Counters describing one finished enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationSummary {
    pub outcome: Outcome,
    /// Number of events dispatched to the handler.
    pub dispatched: u64,
    /// Number of events for which the handler flagged a problem
    /// (`StopWithError` or `ContinueWithError`).
    pub flagged: u64,
}

/// One readable recording of events, backed by a decode engine.
///
/// A trace is single-pass unless its engine advertises rewind support.
pub struct Trace<E> {
    engine: E,
}

impl<E: DecodeEngine> Trace<E> {
    pub fn new(engine: E) -> Self {
        Trace { engine }
    }

    /// Whether the underlying engine can re-read the recording.
    pub fn supports_rewind(&self) -> bool {
        self.engine.supports_rewind()
    }

    /// Reset to the start of the recording, if the engine supports it.
    pub fn rewind(&mut self) -> Result<(), DecodeError> {
        self.engine.rewind()
    }

    /// Release the trace, handing back the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Iterate over this trace, invoking the given handler for every event.
    ///
    /// Events are delivered in engine-yield order and discarded after the
    /// handler returns. A decode failure terminates enumeration with an
    /// error; remaining events are not dispatched, and no partial event is
    /// ever surfaced. Exhausting the engine and being stopped by the
    /// handler are distinct successful outcomes.
    pub fn for_each_event<F>(&mut self, mut handler: F) -> Result<EnumerationSummary, DecodeError>
    where
        F: FnMut(&Event) -> EnumeratorReply,
    {
        let mut dispatched = 0u64;
        let mut flagged = 0u64;

        loop {
            let raw = match self.engine.next_event() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    log::debug!("trace exhausted after {dispatched} events");
                    return Ok(EnumerationSummary {
                        outcome: Outcome::Exhausted,
                        dispatched,
                        flagged,
                    });
                }
                Err(err) => {
                    log::warn!("aborting enumeration after {dispatched} events: {err}");
                    return Err(err);
                }
            };

            let event = match assemble_event(raw.as_ref()) {
                Ok(event) => event,
                Err(err) => {
                    log::warn!("aborting enumeration after {dispatched} events: {err}");
                    return Err(err);
                }
            };

            dispatched += 1;
            log::trace!("dispatching event {} ({dispatched})", event.name);

            match handler(&event) {
                EnumeratorReply::Ok => {}
                EnumeratorReply::ContinueWithError => flagged += 1,
                EnumeratorReply::Stop => {
                    return Ok(EnumerationSummary {
                        outcome: Outcome::Stopped,
                        dispatched,
                        flagged,
                    });
                }
                EnumeratorReply::StopWithError => {
                    flagged += 1;
                    return Ok(EnumerationSummary {
                        outcome: Outcome::Stopped,
                        dispatched,
                        flagged,
                    });
                }
            }
        }
    }
}

/// Find the first directory at or below `path` that contains a CTF
/// `metadata` file. That is the marker a decodable recording leaves on
/// disk; engines open the directory this returns.
pub fn find_trace_root(path: &Path) -> Result<PathBuf, OpenError> {
    if !path.exists() {
        return Err(OpenError::NotFound {
            path: path.to_path_buf(),
        });
    }

    match probe(path)? {
        Some(root) => {
            log::debug!("found ctf trace at {}", root.display());
            Ok(root)
        }
        None => Err(OpenError::NotFound {
            path: path.to_path_buf(),
        }),
    }
}

fn probe(dir: &Path) -> Result<Option<PathBuf>, OpenError> {
    if dir.join("metadata").exists() {
        return Ok(Some(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| OpenError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| OpenError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let candidate = entry.path();
        if candidate.is_dir() {
            if let Some(root) = probe(&candidate)? {
                return Ok(Some(root));
            }
        }
    }

    Ok(None)
}
