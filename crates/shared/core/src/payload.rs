//! Typed accessors over the inbound `payload` mapping
//!
//! Field lookups never panic and default per field class: numbers to
//! zero, strings to empty, timestamps to zero. Handlers that need a
//! field to be present use the `non_empty_*` accessors and map `None`
//! to a validation error.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Borrowed view over a command payload
#[derive(Debug, Clone, Default)]
pub struct Payload {
    map: Map<String, Value>,
}

impl Payload {
    pub fn new(map: Map<String, Value>) -> Self {
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// String field, defaulting to `""`
    pub fn str_field(&self, key: &str) -> &str {
        self.map.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// String field that must be present and non-blank
    pub fn non_empty_str(&self, key: &str) -> Option<&str> {
        let s = self.str_field(key);
        if s.trim().is_empty() { None } else { Some(s) }
    }

    /// Integer field, defaulting to 0. Accepts a JSON number or a
    /// numeric string.
    pub fn i64_field(&self, key: &str) -> i64 {
        match self.map.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Float field, defaulting to 0.0
    pub fn f64_field(&self, key: &str) -> f64 {
        match self.map.get(key) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Decimal field, defaulting to zero. Accepts a JSON number or a
    /// numeric string; prices arrive both ways from older clients.
    pub fn decimal_field(&self, key: &str) -> Decimal {
        match self.map.get(key) {
            Some(Value::Number(n)) => n
                .to_string()
                .parse()
                .unwrap_or(Decimal::ZERO),
            Some(Value::String(s)) => s.parse().unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    /// Decimal field that must parse to a strictly positive value
    pub fn positive_decimal(&self, key: &str) -> Option<Decimal> {
        let d = self.decimal_field(key);
        if d > Decimal::ZERO { Some(d) } else { None }
    }

    /// Boolean field, defaulting to false
    pub fn bool_field(&self, key: &str) -> bool {
        self.map.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// List field as sub-payloads; non-object entries are skipped
    pub fn object_list(&self, key: &str) -> Vec<Payload> {
        match self.map.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(Payload::new(map.clone())),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Raw access for fields that are echoed back verbatim
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }
}
