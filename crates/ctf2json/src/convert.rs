//! Conversion functions from typed trace values to JSON values.

use serde_json::{json, Map, Value};

use ctfread::engine::DecodeEngine;
use ctfread::types::{Enumerator, Integer, IntegerValue};
use ctfread::{DecodeError, EnumeratorReply, Event, Field, Scope, Trace, Variant};

// ============================================================
// Public API
// ============================================================

/// Enumerate a whole trace and produce one JSON document per event.
///
/// A decode failure aborts the conversion; documents for events decoded
/// before the failure are discarded with it.
pub fn convert_trace<E: DecodeEngine>(
    trace: &mut Trace<E>,
) -> Result<Vec<Value>, DecodeError> {
    let mut documents = Vec::new();

    trace.for_each_event(|event| {
        documents.push(event_to_json(event));
        EnumeratorReply::Ok
    })?;

    Ok(documents)
}

/// Convert a single event into a JSON document.
///
/// Scopes appear under `"scopes"` keyed by their canonical names, in the
/// fixed scope order; empty scopes are omitted.
pub fn event_to_json(event: &Event) -> Value {
    let mut scopes = Map::new();

    for scope in Scope::ALL {
        let mut fields = Map::new();
        for ((field_scope, name), field) in &event.fields {
            if *field_scope == scope {
                fields.insert(name.clone(), field_to_json(field));
            }
        }
        if !fields.is_empty() {
            scopes.insert(scope.to_string(), Value::Object(fields));
        }
    }

    json!({
        "name": event.name,
        "cycles": event.cycles,
        "timestamp_ns": event.timestamp_ns,
        "scopes": scopes,
    })
}

// ============================================================
// Value mapping
// ============================================================

fn field_to_json(field: &Field) -> Value {
    json!({
        "kind": field.kind().to_string(),
        "value": variant_to_json(field.value()),
    })
}

fn variant_to_json(value: &Variant) -> Value {
    match value {
        Variant::Empty => Value::Null,
        Variant::Integer(integer) => integer_to_json(integer),
        Variant::Float(float) => json!(float),
        Variant::Enumerator(enumerator) => enumerator_to_json(enumerator),
        Variant::String(string) => json!(string),
        Variant::Boxed(inner) => variant_to_json(inner),
        Variant::Sequence(values) => {
            Value::Array(values.iter().map(variant_to_json).collect())
        }
    }
}

fn integer_to_json(integer: &Integer) -> Value {
    match integer.value() {
        IntegerValue::Empty => Value::Null,
        IntegerValue::Signed(v) => json!(v),
        IntegerValue::Unsigned(v) => json!(v),
    }
}

fn enumerator_to_json(enumerator: &Enumerator) -> Value {
    json!({
        "label": enumerator.label,
        "value": integer_to_json(&enumerator.value),
    })
}
