use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// === Error types ===

/// Errors that can occur while locating a trace recording on disk.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// No directory at or below the given path contains a CTF `metadata` file.
    #[error("no ctf trace found under {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to probe {} for a ctf trace", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reported by a decode engine, or by event assembly on top of one.
///
/// A decode error is fatal for the enumeration it occurs in: trace
/// recordings are immutable, so retrying cannot succeed, and surfacing a
/// partially decoded event could mislead analysis.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The engine failed to decode a raw value.
    #[error("decode engine error: {0}")]
    Engine(String),

    /// A specific field failed to decode. Names the scope and field so a
    /// failed enumeration reports more than a generic code.
    #[error("failed to decode field {name} in scope {scope}")]
    Field {
        scope: Scope,
        name: String,
        #[source]
        source: Box<DecodeError>,
    },

    /// The engine does not support re-reading a trace after a full
    /// enumeration.
    #[error("decode engine does not support rewinding")]
    RewindUnsupported,
}

/// Errors raised by the typed accessor layer ([`FieldSpec`]) when a query
/// does not match the event it is applied to. Local to a single query;
/// never aborts an enumeration by itself.
///
/// [`FieldSpec`]: crate::spec::FieldSpec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("no field {name} in scope {scope}")]
    KeyNotFound { scope: Scope, name: String },

    #[error("field {name} in scope {scope} is a {actual}, expected {expected}")]
    TypeMismatch {
        scope: Scope,
        name: String,
        expected: FieldKind,
        actual: FieldKind,
    },
}

/// Errors raised when extracting a concrete value from an [`Integer`] whose
/// payload does not match the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("integer carries no value")]
    Empty,

    #[error("integer is unsigned, not signed")]
    NotSigned,

    #[error("integer is signed, not unsigned")]
    NotUnsigned,
}

// === Scope ===

/// Top-level scopes of a CTF event.
///
/// The set is closed and totally ordered; the declaration order below is the
/// order scopes are enumerated and rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    TracePacketHeader,
    StreamPacketContext,
    StreamEventHeader,
    StreamEventContext,
    EventContext,
    EventFields,
}

impl Scope {
    /// All scopes, in enumeration order.
    pub const ALL: [Scope; 6] = [
        Scope::TracePacketHeader,
        Scope::StreamPacketContext,
        Scope::StreamEventHeader,
        Scope::StreamEventContext,
        Scope::EventContext,
        Scope::EventFields,
    ];

    /// The canonical CTF name of this scope.
    pub fn name(self) -> &'static str {
        match self {
            Scope::TracePacketHeader => "trace_packet_header",
            Scope::StreamPacketContext => "stream_packet_context",
            Scope::StreamEventHeader => "stream_event_header",
            Scope::StreamEventContext => "stream_event_context",
            Scope::EventContext => "event_context",
            Scope::EventFields => "event_fields",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace_packet_header" => Ok(Scope::TracePacketHeader),
            "stream_packet_context" => Ok(Scope::StreamPacketContext),
            "stream_event_header" => Ok(Scope::StreamEventHeader),
            "stream_event_context" => Ok(Scope::StreamEventContext),
            "event_context" => Ok(Scope::EventContext),
            "event_fields" => Ok(Scope::EventFields),
            _ => Err(()),
        }
    }
}

// === Integer ===

/// The payload of an [`Integer`]: empty, signed, or unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerValue {
    Empty,
    Signed(i64),
    Unsigned(u64),
}

/// An integer field value together with the width and display base the
/// schema declared for it.
///
/// Width and base are descriptive metadata copied from the schema, not
/// derived from the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integer {
    width: u8,
    base: u64,
    value: IntegerValue,
}

impl Integer {
    /// An integer from a signed 64-bit value.
    pub fn signed(value: i64, width: u8, base: u64) -> Self {
        Integer {
            width,
            base,
            value: IntegerValue::Signed(value),
        }
    }

    /// An integer from an unsigned 64-bit value.
    pub fn unsigned(value: u64, width: u8, base: u64) -> Self {
        Integer {
            width,
            base,
            value: IntegerValue::Unsigned(value),
        }
    }

    /// The width of the integer, in bits.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// The numeric base of the integer (2, 8, 10, 16, ...).
    pub fn base(&self) -> u64 {
        self.base
    }

    /// The contained payload.
    pub fn value(&self) -> IntegerValue {
        self.value
    }

    /// True if the contained value is signed.
    pub fn is_signed(&self) -> bool {
        matches!(self.value, IntegerValue::Signed(_))
    }

    /// True if no value is contained.
    pub fn is_empty(&self) -> bool {
        matches!(self.value, IntegerValue::Empty)
    }

    /// Extract the signed value.
    pub fn as_i64(&self) -> Result<i64, ValueError> {
        match self.value {
            IntegerValue::Signed(v) => Ok(v),
            IntegerValue::Unsigned(_) => Err(ValueError::NotSigned),
            IntegerValue::Empty => Err(ValueError::Empty),
        }
    }

    /// Extract the unsigned value.
    pub fn as_u64(&self) -> Result<u64, ValueError> {
        match self.value {
            IntegerValue::Unsigned(v) => Ok(v),
            IntegerValue::Signed(_) => Err(ValueError::NotUnsigned),
            IntegerValue::Empty => Err(ValueError::Empty),
        }
    }
}

impl Default for Integer {
    /// The empty integer. Extracting a value from it fails.
    fn default() -> Self {
        Integer {
            width: 0,
            base: 0,
            value: IntegerValue::Empty,
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            IntegerValue::Empty => f.write_str("(empty integer)"),
            IntegerValue::Signed(v) => {
                write!(f, "(w: {} b: {} v: ", self.width, self.base)?;
                match self.base {
                    2 => write!(f, "{v:#b}")?,
                    8 => write!(f, "{v:#o}")?,
                    16 => write!(f, "{v:#x}")?,
                    _ => write!(f, "{v}")?,
                }
                f.write_str(")")
            }
            IntegerValue::Unsigned(v) => {
                write!(f, "(w: {} b: {} v: ", self.width, self.base)?;
                match self.base {
                    2 => write!(f, "{v:#b}")?,
                    8 => write!(f, "{v:#o}")?,
                    16 => write!(f, "{v:#x}")?,
                    _ => write!(f, "{v}")?,
                }
                f.write_str(")")
            }
        }
    }
}

// === Enumerator ===

/// A single labeled value of a schema-defined enumeration.
///
/// The label is the schema's symbolic name for the value. It is advisory:
/// engines that cannot map a value back to a label supply an empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enumerator {
    pub label: String,
    pub value: Integer,
}

impl fmt::Display for Enumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.value)
    }
}

// === Variant ===

/// The recursive value representation of a field.
///
/// A variant exclusively owns its nested values; the tree is acyclic by
/// construction since fields are decoded depth-first from a finite schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    /// Designated "not set" value.
    #[default]
    Empty,
    Integer(Integer),
    Float(f64),
    Enumerator(Enumerator),
    String(String),
    /// Exactly one nested value: the selected arm of a variant field.
    Boxed(Box<Variant>),
    /// Ordered values of a structure, array, or sequence field.
    Sequence(Vec<Variant>),
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => Ok(()),
            Variant::Integer(v) => v.fmt(f),
            Variant::Float(v) => v.fmt(f),
            Variant::Enumerator(v) => v.fmt(f),
            Variant::String(v) => f.write_str(v),
            Variant::Boxed(inner) => inner.fmt(f),
            Variant::Sequence(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    value.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

// === Field ===

/// FieldKind enumerates all known types a field can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Unknown,
    Integer,
    FloatingPoint,
    Enumeration,
    String,
    Structure,
    UntaggedVariant,
    Variant,
    Array,
    Sequence,
}

impl FieldKind {
    /// All field kinds.
    pub const ALL: [FieldKind; 10] = [
        FieldKind::Unknown,
        FieldKind::Integer,
        FieldKind::FloatingPoint,
        FieldKind::Enumeration,
        FieldKind::String,
        FieldKind::Structure,
        FieldKind::UntaggedVariant,
        FieldKind::Variant,
        FieldKind::Array,
        FieldKind::Sequence,
    ];

    /// The canonical name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Unknown => "unknown",
            FieldKind::Integer => "integer",
            FieldKind::FloatingPoint => "floating_point",
            FieldKind::Enumeration => "enumeration",
            FieldKind::String => "string",
            FieldKind::Structure => "structure",
            FieldKind::UntaggedVariant => "untagged_variant",
            FieldKind::Variant => "variant",
            FieldKind::Array => "array",
            FieldKind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(FieldKind::Unknown),
            "integer" => Ok(FieldKind::Integer),
            "floating_point" => Ok(FieldKind::FloatingPoint),
            "enumeration" => Ok(FieldKind::Enumeration),
            "string" => Ok(FieldKind::String),
            "structure" => Ok(FieldKind::Structure),
            "untagged_variant" => Ok(FieldKind::UntaggedVariant),
            "variant" => Ok(FieldKind::Variant),
            "array" => Ok(FieldKind::Array),
            "sequence" => Ok(FieldKind::Sequence),
            _ => Err(()),
        }
    }
}

/// A named, typed value inside an event.
///
/// The kind and the populated [`Variant`] alternative are consistent for any
/// field produced by decode assembly: an integer field holds
/// `Variant::Integer`, a structure, array, or sequence field holds
/// `Variant::Sequence` with the member or element values in declaration
/// order, and a (tagged or untagged) variant field holds `Variant::Boxed`
/// wrapping the selected arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    kind: FieldKind,
    value: Variant,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: Variant) -> Self {
        Field {
            name: name.into(),
            kind,
            value,
        }
    }

    /// The name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of the value contained in this field.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// True if the contained value is of the given kind.
    pub fn is_a(&self, kind: FieldKind) -> bool {
        self.kind == kind
    }

    /// The value of the field.
    pub fn value(&self) -> &Variant {
        &self.value
    }

    /// The contained value as an integer, if that is what it is.
    pub fn as_integer(&self) -> Option<&Integer> {
        match &self.value {
            Variant::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// The contained value as a floating-point number.
    pub fn as_float(&self) -> Option<f64> {
        match &self.value {
            Variant::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The contained value as an enumerator.
    pub fn as_enumerator(&self) -> Option<&Enumerator> {
        match &self.value {
            Variant::Enumerator(v) => Some(v),
            _ => None,
        }
    }

    /// The contained value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Variant::String(v) => Some(v),
            _ => None,
        }
    }

    /// The selected arm of a variant field.
    pub fn selected(&self) -> Option<&Variant> {
        match &self.value {
            Variant::Boxed(inner) => Some(inner),
            _ => None,
        }
    }

    /// The member or element values of a structure, array, or sequence
    /// field, in declaration order.
    pub fn as_collection(&self) -> Option<&[Variant]> {
        match &self.value {
            Variant::Sequence(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.name, self.kind, self.value)
    }
}

// === Event ===

/// The key an event stores a field under: the scope it lives in plus its
/// name within that scope.
pub type FieldKey = (Scope, String);

/// One recorded occurrence in a trace.
///
/// Events are assembled by the enumeration loop, handed to the caller's
/// handler, and discarded afterwards. A handler that needs to keep one past
/// its return must clone it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// The name of the event. May be empty if the trace omits it.
    pub name: String,
    /// The timestamp of the event as written in the packet, in cycles.
    pub cycles: u64,
    /// The timestamp of the event, in nanoseconds since the epoch.
    pub timestamp_ns: i64,
    /// The payload of the event, keyed by scope and field name. Iterates in
    /// scope order, then field-name order within each scope.
    pub fields: BTreeMap<FieldKey, Field>,
}

impl Event {
    /// Look up the field stored under the given scope and name.
    pub fn field(&self, scope: Scope, name: &str) -> Option<&Field> {
        self.fields.get(&(scope, name.to_string()))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "  {}", self.name)?;
        writeln!(f, "  {} [cycles]", self.cycles)?;
        writeln!(f, "  {} [ns]", self.timestamp_ns)?;
        for ((scope, _), field) in &self.fields {
            writeln!(f, "    {scope} -> {field}")?;
        }
        f.write_str("}")
    }
}
