use serde_json::Number;
use std::fmt;

/// Why a link could not be followed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BrokenLink {
    /// The link points at a node id that is not part of the graph.
    Missing(String),
    /// The node exists but carries no usable `class_type`.
    Invalid(String),
}

impl BrokenLink {
    pub fn node_id(&self) -> &str {
        match self {
            BrokenLink::Missing(id) | BrokenLink::Invalid(id) => id,
        }
    }
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenLink::Missing(id) => write!(f, "Error: Missing node {}", id),
            BrokenLink::Invalid(id) => write!(f, "Error: Invalid node {}", id),
        }
    }
}

/// A grounded value produced by link resolution.
///
/// Null never appears here; an unresolved value is `Option::None` at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(Number),
    Bool(bool),
    /// Any other literal (arrays that are not links, objects).
    Json(serde_json::Value),
    /// Inline error marker for a dangling or invalid link. Formats like text.
    Broken(BrokenLink),
}

impl ParamValue {
    /// Converts a JSON literal, mapping `null` to `None`.
    pub fn from_literal(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(ParamValue::Text(s.clone())),
            serde_json::Value::Number(n) => Some(ParamValue::Number(n.clone())),
            serde_json::Value::Bool(b) => Some(ParamValue::Bool(*b)),
            other => Some(ParamValue::Json(other.clone())),
        }
    }

    /// Returns the value as text when it behaves like a string during formatting.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Broken(link) => Some(link.to_string()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            ParamValue::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Json(v) => write!(f, "{}", v),
            ParamValue::Broken(link) => write!(f, "{}", link),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}
