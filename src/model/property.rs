//! Attribute values carried by vertex statements

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute value of a vertex.
///
/// `Text` marks long free-text fields (abstracts); inline renderers escape it
/// differently from short `String` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Text(String),
    Integer(i64),
}

impl PropertyValue {
    /// Get string value if this is a string or text
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Text(s) => Some(s),
            PropertyValue::Integer(_) => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// JSON form used for bound statement parameters
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) | PropertyValue::Text(s) => {
                serde_json::Value::String(s.clone())
            }
            PropertyValue::Integer(i) => serde_json::Value::from(*i),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Text(_) => "Text",
            PropertyValue::Integer(_) => "Integer",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) | PropertyValue::Text(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

/// Ordered attribute map; order matches the tag's declared column order.
pub type PropertyMap = IndexMap<String, PropertyValue>;
