//! Assembly of typed fields and events from decode-engine cursors.

use std::collections::BTreeMap;

use crate::engine::{FieldCursor, RawEvent};
use crate::types::{DecodeError, Enumerator, Event, Field, FieldKind, Scope, Variant};

/// Decode one schema-described field position into a typed [`Field`].
///
/// The returned field's kind and populated [`Variant`] alternative are
/// consistent; nested kinds decode depth-first in declaration order.
pub fn decode_field(cursor: &dyn FieldCursor) -> Result<Field, DecodeError> {
    let value = decode_value(cursor)?;
    Ok(Field::new(cursor.name(), cursor.kind(), value))
}

fn decode_value(cursor: &dyn FieldCursor) -> Result<Variant, DecodeError> {
    match cursor.kind() {
        FieldKind::Unknown => Ok(Variant::Empty),
        FieldKind::Integer => Ok(Variant::Integer(cursor.integer()?)),
        FieldKind::FloatingPoint => Ok(Variant::Float(cursor.float()?)),
        FieldKind::Enumeration => match cursor.enumerator() {
            Ok(enumerator) => Ok(Variant::Enumerator(enumerator)),
            // The label is advisory. Fall back to the raw integer
            // representation; only fail if that fails too.
            Err(_) => Ok(Variant::Enumerator(Enumerator {
                label: String::new(),
                value: cursor.integer()?,
            })),
        },
        FieldKind::String => Ok(Variant::String(cursor.string()?)),
        FieldKind::UntaggedVariant | FieldKind::Variant => {
            let arm = cursor.selected()?;
            Ok(Variant::Boxed(Box::new(decode_value(arm.as_ref())?)))
        }
        FieldKind::Structure | FieldKind::Array | FieldKind::Sequence => {
            let children = cursor.children()?;
            let mut values = Vec::with_capacity(children.len());
            for child in &children {
                values.push(decode_value(child.as_ref())?);
            }
            Ok(Variant::Sequence(values))
        }
    }
}

/// Assemble a complete [`Event`] from one raw event.
///
/// Walks all scopes in their fixed order and stores one field per
/// (scope, name) key. Any decode failure aborts the whole event and names
/// the field that failed; partial events are never surfaced.
pub fn assemble_event(raw: &dyn RawEvent) -> Result<Event, DecodeError> {
    let mut fields = BTreeMap::new();

    for scope in Scope::ALL {
        for cursor in raw.scope_fields(scope)? {
            let field =
                decode_field(cursor.as_ref()).map_err(|source| DecodeError::Field {
                    scope,
                    name: cursor.name().to_string(),
                    source: Box::new(source),
                })?;
            fields.insert((scope, field.name().to_string()), field);
        }
    }

    Ok(Event {
        name: raw.name().to_string(),
        cycles: raw.cycles(),
        timestamp_ns: raw.timestamp_ns(),
        fields,
    })
}
