use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be bound as statement arguments.
///
/// The driver never inspects them, but callers written against the generic
/// interface still need a way to pass them through:
/// ```rust
/// use falsedb::prelude::*;
///
/// let args = vec![
///     Value::Int(42),
///     Value::Text("alice".into()),
///     Value::Null,
/// ];
/// # let _ = args;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The payload-free kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Null => ValueKind::Null,
            Value::Json(_) => ValueKind::Json,
            Value::Blob(_) => ValueKind::Blob,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
    Null,
    Json,
    Blob,
}

/// An argument as passed to the context-aware operations.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    /// Parameter name, if the caller bound it by name.
    pub name: Option<String>,
    /// One-based position of the argument.
    pub ordinal: usize,
    pub value: Value,
}

impl NamedValue {
    /// Lift positional values into ordinal-only named values.
    #[must_use]
    pub fn from_positional(values: &[Value]) -> Vec<NamedValue> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| NamedValue {
                name: None,
                ordinal: i + 1,
                value: value.clone(),
            })
            .collect()
    }

    /// Drop names and ordinals, keeping argument order.
    #[must_use]
    pub fn into_positional(values: &[NamedValue]) -> Vec<Value> {
        values.iter().map(|nv| nv.value.clone()).collect()
    }
}

/// Transaction isolation level requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Whatever the backend considers its default.
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    WriteCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
    Linearizable,
}

/// Options for beginning a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

impl TxOptions {
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == TxOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_values_get_one_based_ordinals() {
        let named = NamedValue::from_positional(&[Value::Int(42), Value::Null]);
        assert_eq!(named[0].ordinal, 1);
        assert_eq!(named[1].ordinal, 2);
        assert!(named.iter().all(|nv| nv.name.is_none()));
        assert_eq!(
            NamedValue::into_positional(&named),
            vec![Value::Int(42), Value::Null]
        );
    }

    #[test]
    fn option_none_becomes_null() {
        let v: Value = Option::<i64>::None.into();
        assert!(v.is_null());
        assert_eq!(Value::from(Some("x")).kind(), ValueKind::Text);
    }
}
