//! End-to-end enumeration over a synthetic recording: replay engine in,
//! typed field queries out.

use ctfread::replay::ReplayEngine;
use ctfread::spec::{EnumSpec, IntegerSpec, StringSpec};
use ctfread::types::{Enumerator, Integer};
use ctfread::{
    EnumeratorReply, Event, Field, FieldKind, Outcome, Scope, SpecError, Trace, Variant,
};

fn integer_field(name: &str, value: u64) -> Field {
    Field::new(
        name,
        FieldKind::Integer,
        Variant::Integer(Integer::unsigned(value, 64, 10)),
    )
}

fn malloc_event(size: u64, vpid: i64) -> Event {
    let mut event = Event {
        name: ctfread::events::userspace::libc::MALLOC.to_string(),
        cycles: size * 10,
        timestamp_ns: 1_700_000_000_000 + size as i64,
        ..Default::default()
    };
    event.fields.insert(
        (Scope::EventFields, "size".to_string()),
        integer_field("size", size),
    );
    event.fields.insert(
        (Scope::StreamEventContext, "vpid".to_string()),
        Field::new(
            "vpid",
            FieldKind::Integer,
            Variant::Integer(Integer::signed(vpid, 32, 10)),
        ),
    );
    event
}

#[test]
fn malloc_size_is_queryable_through_a_spec() {
    let mut trace = Trace::new(ReplayEngine::from_events([malloc_event(128, 42)]));

    let size = IntegerSpec::new(Scope::EventFields, "size");
    let vpid = IntegerSpec::new(Scope::StreamEventContext, "vpid");

    let mut seen = 0;
    trace
        .for_each_event(|event| {
            assert_eq!(event.name, "ust_libc:malloc");
            assert_eq!(size.interpret_strict(event).unwrap().as_u64(), Ok(128));
            assert_eq!(vpid.interpret_strict(event).unwrap().as_i64(), Ok(42));
            seen += 1;
            EnumeratorReply::Ok
        })
        .unwrap();
    assert_eq!(seen, 1);
}

#[test]
fn accessor_misuse_does_not_abort_enumeration() {
    let events = vec![malloc_event(16, 1), malloc_event(32, 1), malloc_event(64, 1)];
    let mut trace = Trace::new(ReplayEngine::from_events(events));

    // Wrong kind for an existing field, and a missing field altogether.
    let size_as_string = StringSpec::new(Scope::EventFields, "size");
    let missing = IntegerSpec::new(Scope::EventFields, "alignment");

    let mut mismatches = 0;
    let summary = trace
        .for_each_event(|event| {
            match size_as_string.interpret_strict(event) {
                Err(SpecError::TypeMismatch { .. }) => mismatches += 1,
                other => panic!("unexpected result: {other:?}"),
            }
            assert!(missing.interpret(event).is_none());
            EnumeratorReply::Ok
        })
        .unwrap();

    assert_eq!(summary.outcome, Outcome::Exhausted);
    assert_eq!(summary.dispatched, 3);
    assert_eq!(mismatches, 3);
}

#[test]
fn handler_aggregates_across_a_recording() {
    let sizes = [16u64, 32, 64, 128, 256];
    let mut trace = Trace::new(ReplayEngine::from_events(
        sizes.iter().map(|&s| malloc_event(s, 7)),
    ));

    let size = IntegerSpec::new(Scope::EventFields, "size");
    let mut total = 0u64;
    let mut count = 0u64;

    let summary = trace
        .for_each_event(|event| {
            if size.available_in(event) {
                total += size.interpret(event).unwrap().as_u64().unwrap();
                count += 1;
            }
            EnumeratorReply::Ok
        })
        .unwrap();

    assert_eq!(summary.dispatched, 5);
    assert_eq!(count, 5);
    assert_eq!(total, 496);
}

#[test]
fn mixed_event_recording_filters_by_name() {
    let mut engine = ReplayEngine::new();
    engine.push_event(malloc_event(100, 1));

    let mut free_event = Event {
        name: ctfread::events::userspace::libc::FREE.to_string(),
        ..Default::default()
    };
    free_event.fields.insert(
        (Scope::EventFields, "ptr".to_string()),
        integer_field("ptr", 0xdead_beef),
    );
    engine.push_event(free_event);
    engine.push_event(malloc_event(200, 1));

    let size = IntegerSpec::new(Scope::EventFields, "size");
    let mut malloc_bytes = 0;

    Trace::new(engine)
        .for_each_event(|event| {
            if event.name == ctfread::events::userspace::libc::MALLOC {
                malloc_bytes += size.interpret(event).unwrap().as_u64().unwrap();
            }
            EnumeratorReply::Ok
        })
        .unwrap();

    assert_eq!(malloc_bytes, 300);
}

#[test]
fn enumerator_fields_carry_label_and_value() {
    let mut event = Event {
        name: "sched_switch".to_string(),
        ..Default::default()
    };
    event.fields.insert(
        (Scope::EventFields, "prev_state".to_string()),
        Field::new(
            "prev_state",
            FieldKind::Enumeration,
            Variant::Enumerator(Enumerator {
                label: "TASK_RUNNING".to_string(),
                value: Integer::unsigned(0, 8, 10),
            }),
        ),
    );

    let mut trace = Trace::new(ReplayEngine::from_events([event]));
    let prev_state = EnumSpec::new(Scope::EventFields, "prev_state");

    trace
        .for_each_event(|event| {
            let state = prev_state.interpret_strict(event).unwrap();
            assert_eq!(state.label, "TASK_RUNNING");
            assert_eq!(state.value.as_u64(), Ok(0));
            EnumeratorReply::Stop
        })
        .unwrap();
}
