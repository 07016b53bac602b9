/// Bracket-notation query string encoding
///
/// Strapi expects filters, population and pagination as a flattened query string,
/// e.g. `filters[title][$eq]=x&populate[0]=author`. This module turns a nested
/// JSON-like structure into that form.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters left as-is when encoding a key segment or a value.
///
/// Mirrors `encodeURIComponent`, plus `$` so operators like `$eq` stay readable.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'$');

/// A query parameter tree
///
/// Mappings keep the order their keys were inserted in, and the encoder emits
/// fragments in exactly that order.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// A missing value; never emitted
    Absent,
    /// A leaf value, already rendered as text
    Scalar(String),
    /// An ordered list, encoded with numeric indices
    Sequence(Vec<QueryValue>),
    /// Named children, encoded as `prefix[key]`
    Mapping(Vec<(String, QueryValue)>),
}

impl QueryValue {
    /// An empty mapping, which encodes to the empty string
    pub fn empty() -> Self {
        QueryValue::Mapping(Vec::new())
    }

    /// Add or replace a key on a mapping; other variants are left unchanged
    pub fn insert(&mut self, key: impl Into<String>, value: QueryValue) {
        if let QueryValue::Mapping(entries) = self {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, QueryValue::Mapping(_))
    }
}

impl From<&Value> for QueryValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => QueryValue::Absent,
            Value::Bool(b) => QueryValue::Scalar(b.to_string()),
            Value::Number(n) => QueryValue::Scalar(n.to_string()),
            Value::String(s) => QueryValue::Scalar(s.clone()),
            Value::Array(items) => QueryValue::Sequence(items.iter().map(QueryValue::from).collect()),
            Value::Object(map) => QueryValue::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), QueryValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

/// Serialize a query tree into `key[sub]=value` pairs joined by `&`
///
/// An empty mapping produces an empty string.
pub fn to_query_string(query: &QueryValue) -> String {
    let mut fragments = Vec::new();
    encode_children(query, None, &mut fragments);
    fragments.join("&")
}

/// Append the encoded query to `path`, adding `?` only when there is something to append
pub fn with_query(path: &str, query: &QueryValue) -> String {
    let encoded = to_query_string(query);
    if encoded.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, encoded)
    }
}

fn encode_children(value: &QueryValue, prefix: Option<&str>, out: &mut Vec<String>) {
    match value {
        QueryValue::Mapping(entries) => {
            for (key, child) in entries {
                let segment = encode_component(key);
                let next = match prefix {
                    Some(p) => format!("{}[{}]", p, segment),
                    None => segment,
                };
                encode_value(child, &next, out);
            }
        }
        QueryValue::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                let next = match prefix {
                    Some(p) => format!("{}[{}]", p, index),
                    None => index.to_string(),
                };
                encode_value(item, &next, out);
            }
        }
        // A bare scalar has no key to hang off
        QueryValue::Scalar(_) | QueryValue::Absent => {}
    }
}

fn encode_value(value: &QueryValue, key: &str, out: &mut Vec<String>) {
    match value {
        QueryValue::Absent => {}
        QueryValue::Scalar(text) => out.push(format!("{}={}", key, encode_component(text))),
        QueryValue::Sequence(_) | QueryValue::Mapping(_) => encode_children(value, Some(key), out),
    }
}

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}
