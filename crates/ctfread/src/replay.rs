//! An in-memory decode engine replaying pre-built events.
//!
//! `ReplayEngine` stands in for a real CTF decoding engine: events are
//! pushed in fully typed and served back through the same cursor contract a
//! real engine implements, so everything downstream of the engine seam —
//! assembly, enumeration, typed accessors — runs the exact code paths it
//! would against a real recording. Decode failures can be scripted at any
//! position, and the engine supports rewinding.

use crate::engine::{DecodeEngine, FieldCursor, RawEvent};
use crate::types::{DecodeError, Enumerator, Event, FieldKind, Integer, Scope, Variant};

enum Item {
    Event(Event),
    Failure(String),
}

/// A rewindable decode engine over a scripted list of events and failures.
#[derive(Default)]
pub struct ReplayEngine {
    items: Vec<Item>,
    pos: usize,
}

impl ReplayEngine {
    pub fn new() -> Self {
        ReplayEngine::default()
    }

    /// An engine serving the given events in order.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut engine = ReplayEngine::new();
        for event in events {
            engine.push_event(event);
        }
        engine
    }

    /// Append an event to the script.
    pub fn push_event(&mut self, event: Event) {
        self.items.push(Item::Event(event));
    }

    /// Append a decode failure to the script. Reading past this position
    /// reports `DecodeError::Engine` with the given reason.
    pub fn push_failure(&mut self, reason: impl Into<String>) {
        self.items.push(Item::Failure(reason.into()));
    }
}

impl DecodeEngine for ReplayEngine {
    fn next_event(&mut self) -> Result<Option<Box<dyn RawEvent + '_>>, DecodeError> {
        if self.pos >= self.items.len() {
            return Ok(None);
        }
        let idx = self.pos;
        self.pos += 1;
        match &self.items[idx] {
            Item::Failure(reason) => Err(DecodeError::Engine(reason.clone())),
            Item::Event(event) => Ok(Some(Box::new(ReplayEvent { event }))),
        }
    }

    fn supports_rewind(&self) -> bool {
        true
    }

    fn rewind(&mut self) -> Result<(), DecodeError> {
        self.pos = 0;
        Ok(())
    }
}

#[derive(Debug)]
struct ReplayEvent<'a> {
    event: &'a Event,
}

impl RawEvent for ReplayEvent<'_> {
    fn name(&self) -> &str {
        &self.event.name
    }

    fn cycles(&self) -> u64 {
        self.event.cycles
    }

    fn timestamp_ns(&self) -> i64 {
        self.event.timestamp_ns
    }

    fn scope_fields(
        &self,
        scope: Scope,
    ) -> Result<Vec<Box<dyn FieldCursor + '_>>, DecodeError> {
        Ok(self
            .event
            .fields
            .iter()
            .filter(|((field_scope, _), _)| *field_scope == scope)
            .map(|((_, name), field)| {
                Box::new(ReplayCursor {
                    name: name.as_str(),
                    kind: field.kind(),
                    value: field.value(),
                }) as Box<dyn FieldCursor + '_>
            })
            .collect())
    }
}

struct ReplayCursor<'a> {
    name: &'a str,
    kind: FieldKind,
    value: &'a Variant,
}

impl<'a> ReplayCursor<'a> {
    /// Nested positions carry no declared name of their own.
    fn nested(value: &'a Variant) -> Self {
        ReplayCursor {
            name: "",
            kind: kind_of(value),
            value,
        }
    }

    fn mismatch(&self, requested: &str) -> DecodeError {
        DecodeError::Engine(format!(
            "replayed field {} does not hold a {requested} value",
            self.name
        ))
    }
}

/// The field kind a real engine would report for a value shaped like this.
fn kind_of(value: &Variant) -> FieldKind {
    match value {
        Variant::Empty => FieldKind::Unknown,
        Variant::Integer(_) => FieldKind::Integer,
        Variant::Float(_) => FieldKind::FloatingPoint,
        Variant::Enumerator(_) => FieldKind::Enumeration,
        Variant::String(_) => FieldKind::String,
        Variant::Boxed(_) => FieldKind::Variant,
        Variant::Sequence(_) => FieldKind::Structure,
    }
}

impl FieldCursor for ReplayCursor<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> FieldKind {
        self.kind
    }

    fn integer(&self) -> Result<Integer, DecodeError> {
        match self.value {
            Variant::Integer(v) => Ok(*v),
            // The integer representation of an enumeration.
            Variant::Enumerator(e) => Ok(e.value),
            _ => Err(self.mismatch("integer")),
        }
    }

    fn float(&self) -> Result<f64, DecodeError> {
        match self.value {
            Variant::Float(v) => Ok(*v),
            _ => Err(self.mismatch("floating_point")),
        }
    }

    fn enumerator(&self) -> Result<Enumerator, DecodeError> {
        match self.value {
            Variant::Enumerator(e) => Ok(e.clone()),
            _ => Err(self.mismatch("enumeration")),
        }
    }

    fn string(&self) -> Result<String, DecodeError> {
        match self.value {
            Variant::String(s) => Ok(s.clone()),
            _ => Err(self.mismatch("string")),
        }
    }

    fn selected(&self) -> Result<Box<dyn FieldCursor + '_>, DecodeError> {
        match self.value {
            Variant::Boxed(inner) => Ok(Box::new(ReplayCursor::nested(inner))),
            _ => Err(self.mismatch("variant")),
        }
    }

    fn children(&self) -> Result<Vec<Box<dyn FieldCursor + '_>>, DecodeError> {
        match self.value {
            Variant::Sequence(values) => Ok(values
                .iter()
                .map(|value| {
                    Box::new(ReplayCursor::nested(value)) as Box<dyn FieldCursor + '_>
                })
                .collect()),
            _ => Err(self.mismatch("structure")),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::decode::assemble_event;
    use crate::types::Field;

    fn sample_event() -> Event {
        let mut event = Event {
            name: "sched_switch".to_string(),
            cycles: 77,
            timestamp_ns: 1_700_000_000_000,
            ..Default::default()
        };
        event.fields.insert(
            (Scope::EventFields, "prev_comm".to_string()),
            Field::new(
                "prev_comm",
                FieldKind::String,
                Variant::String("swapper/0".to_string()),
            ),
        );
        event.fields.insert(
            (Scope::EventFields, "prio".to_string()),
            Field::new(
                "prio",
                FieldKind::Integer,
                Variant::Integer(Integer::signed(-20, 32, 10)),
            ),
        );
        event.fields.insert(
            (Scope::StreamEventContext, "cpu_id".to_string()),
            Field::new(
                "cpu_id",
                FieldKind::Integer,
                Variant::Integer(Integer::unsigned(3, 32, 10)),
            ),
        );
        event
    }

    #[test]
    fn test_replayed_event_reassembles_equal() {
        let original = sample_event();
        let mut engine = ReplayEngine::from_events([original.clone()]);

        let raw = engine.next_event().unwrap().unwrap();
        let assembled = assemble_event(raw.as_ref()).unwrap();
        assert_eq!(assembled, original);
    }

    #[test]
    fn test_exhaustion_and_rewind() {
        let mut engine = ReplayEngine::from_events([sample_event()]);

        assert!(engine.next_event().unwrap().is_some());
        assert!(engine.next_event().unwrap().is_none());
        // Exhaustion is stable.
        assert!(engine.next_event().unwrap().is_none());

        assert!(engine.supports_rewind());
        engine.rewind().unwrap();
        assert!(engine.next_event().unwrap().is_some());
    }

    #[test]
    fn test_scripted_failure_surfaces_as_engine_error() {
        let mut engine = ReplayEngine::new();
        engine.push_event(sample_event());
        engine.push_failure("truncated packet");
        engine.push_event(sample_event());

        assert!(engine.next_event().unwrap().is_some());
        assert_matches!(
            engine.next_event(),
            Err(DecodeError::Engine(reason)) if reason == "truncated packet"
        );
        // The engine does not get stuck on the failed position.
        assert!(engine.next_event().unwrap().is_some());
    }

    #[test]
    fn test_nested_values_round_trip() {
        let mut event = Event {
            name: "net_dev_xmit".to_string(),
            ..Default::default()
        };
        event.fields.insert(
            (Scope::EventFields, "frame".to_string()),
            Field::new(
                "frame",
                FieldKind::Structure,
                Variant::Sequence(vec![
                    Variant::Sequence(vec![
                        Variant::Integer(Integer::unsigned(0xde, 8, 16)),
                        Variant::Integer(Integer::unsigned(0xad, 8, 16)),
                    ]),
                    Variant::Boxed(Box::new(Variant::String("payload".to_string()))),
                    Variant::Enumerator(Enumerator {
                        label: "UDP".to_string(),
                        value: Integer::unsigned(17, 8, 10),
                    }),
                ]),
            ),
        );

        let mut engine = ReplayEngine::from_events([event.clone()]);
        let raw = engine.next_event().unwrap().unwrap();
        let assembled = assemble_event(raw.as_ref()).unwrap();

        let frame = assembled
            .field(Scope::EventFields, "frame")
            .unwrap()
            .as_collection()
            .unwrap();
        assert_matches!(&frame[0], Variant::Sequence(bytes) if bytes.len() == 2);
        assert_matches!(&frame[1], Variant::Boxed(_));
        assert_eq!(assembled, event);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn base_strategy() -> impl Strategy<Value = u64> {
            prop_oneof![Just(2u64), Just(8u64), Just(10u64), Just(16u64)]
        }

        fn integer_strategy() -> impl Strategy<Value = Integer> {
            prop_oneof![
                (any::<i64>(), any::<u8>(), base_strategy())
                    .prop_map(|(v, w, b)| Integer::signed(v, w, b)),
                (any::<u64>(), any::<u8>(), base_strategy())
                    .prop_map(|(v, w, b)| Integer::unsigned(v, w, b)),
            ]
        }

        fn variant_strategy() -> impl Strategy<Value = Variant> {
            let leaf = prop_oneof![
                Just(Variant::Empty),
                integer_strategy().prop_map(Variant::Integer),
                // Finite values only; NaN is not equal to itself.
                (-1.0e9f64..1.0e9).prop_map(Variant::Float),
                ("[a-z]{0,8}", integer_strategy()).prop_map(|(label, value)| {
                    Variant::Enumerator(Enumerator { label, value })
                }),
                "[a-z]{0,8}".prop_map(Variant::String),
            ];

            leaf.prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    inner.clone().prop_map(|v| Variant::Boxed(Box::new(v))),
                    prop::collection::vec(inner, 0..4).prop_map(Variant::Sequence),
                ]
            })
        }

        proptest! {
            #[test]
            fn prop_replayed_values_round_trip(value in variant_strategy()) {
                let mut event = Event {
                    name: "prop".to_string(),
                    ..Default::default()
                };
                event.fields.insert(
                    (Scope::EventFields, "v".to_string()),
                    Field::new("v", kind_of(&value), value),
                );

                let mut engine = ReplayEngine::from_events([event.clone()]);
                let raw = engine.next_event().unwrap().unwrap();
                let assembled = assemble_event(raw.as_ref()).unwrap();
                prop_assert_eq!(assembled, event);
            }
        }
    }
}
