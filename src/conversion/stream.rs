use chrono::{DateTime, Local};
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};

/// A single decoded field value, reduced to the four shapes the converter
/// consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A parser-resolved, zone-qualified instant.
    Timestamp(DateTime<Local>),
    Float(f64),
    Integer(i64),
    Text(String),
}

/// What a timestamp-bearing field actually holds: a resolved instant, or a
/// bare seconds counter that still needs an epoch offset applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeValue {
    Absolute(DateTime<Local>),
    Counter(i64),
}

/// One decoded activity message. Read-only once built; the converter never
/// mutates the input stream.
#[derive(Debug, Clone)]
pub struct Message {
    kind: MesgNum,
    fields: Vec<(String, FieldValue)>,
}

impl Message {
    pub fn new(kind: MesgNum, fields: Vec<(String, FieldValue)>) -> Self {
        Self { kind, fields }
    }

    pub fn kind(&self) -> MesgNum {
        self.kind
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }

    /// Numeric reading of a field, accepting both float and integer storage.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.value(name)? {
            FieldValue::Float(value) => Some(*value),
            FieldValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Raw integer reading of a field. Values the parser has already turned
    /// into strings or instants do not qualify.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.value(name)? {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Timestamp reading of a field. An integer here is a bare counter that
    /// the timestamp normalizer must anchor before use.
    pub fn time(&self, name: &str) -> Option<TimeValue> {
        match self.value(name)? {
            FieldValue::Timestamp(instant) => Some(TimeValue::Absolute(*instant)),
            FieldValue::Integer(counter) => Some(TimeValue::Counter(*counter)),
            _ => None,
        }
    }
}

/// Buffered snapshot of every decoded message, in stream order. Buffering is
/// what allows the per-lap record join to re-scan the records.
#[derive(Debug, Clone, Default)]
pub struct MessageStream {
    messages: Vec<Message>,
}

impl MessageStream {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn from_records(records: &[FitDataRecord]) -> Self {
        let messages = records
            .iter()
            .map(|record| {
                let fields = record
                    .fields()
                    .iter()
                    .filter_map(|field| {
                        field_value(field.value())
                            .map(|value| (field.name().to_string(), value))
                    })
                    .collect();
                Message::new(record.kind(), fields)
            })
            .collect();
        Self { messages }
    }

    pub fn of_kind(&self, kind: MesgNum) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |message| message.kind() == kind)
    }

    pub fn first(&self, kind: MesgNum) -> Option<&Message> {
        self.of_kind(kind).next()
    }
}

/// Flatten a `fitparser` value into the converter's field model. Array fields
/// carry their first component; anything unrepresentable is treated as
/// absent.
fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Timestamp(instant) => Some(FieldValue::Timestamp(*instant)),
        Value::String(text) => Some(FieldValue::Text(text.clone())),
        Value::Float32(v) => Some(FieldValue::Float(f64::from(*v))),
        Value::Float64(v) => Some(FieldValue::Float(*v)),
        Value::Byte(v) | Value::Enum(v) | Value::UInt8(v) | Value::UInt8z(v) => {
            Some(FieldValue::Integer(i64::from(*v)))
        }
        Value::SInt8(v) => Some(FieldValue::Integer(i64::from(*v))),
        Value::SInt16(v) => Some(FieldValue::Integer(i64::from(*v))),
        Value::UInt16(v) | Value::UInt16z(v) => Some(FieldValue::Integer(i64::from(*v))),
        Value::SInt32(v) => Some(FieldValue::Integer(i64::from(*v))),
        Value::UInt32(v) | Value::UInt32z(v) => Some(FieldValue::Integer(i64::from(*v))),
        Value::SInt64(v) => Some(FieldValue::Integer(*v)),
        Value::UInt64(v) | Value::UInt64z(v) => i64::try_from(*v).ok().map(FieldValue::Integer),
        Value::Array(values) => values.first().and_then(field_value),
    }
}
