use crate::error::ExtractError;
use serde_json::Value;

/// A node descriptor of the UI graph (the `workflow` metadata entry).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowNode {
    pub node_type: Option<String>,
    pub title: Option<String>,
    pub widgets_values: Vec<Value>,
}

impl WorkflowNode {
    fn from_json(index: usize, value: &Value) -> Result<Self, ExtractError> {
        let object = value
            .as_object()
            .ok_or(ExtractError::MalformedWorkflowNode { index })?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            node_type: text("type"),
            title: text("title"),
            widgets_values: object
                .get("widgets_values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// The first widget value as text, `None` if absent, null or empty.
    ///
    /// Strings are taken as is. Booleans and numbers render in JSON form (`true`, `7.5`),
    /// and arrays and objects as compact JSON.
    pub fn first_widget_text(&self) -> Option<String> {
        let text = match self.widgets_values.first()? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// The authoring graph. Only used to recover text the user typed into primitive nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowGraph {
    /// Raw node entries; decoded lazily so that a malformed entry fails the run, not the parse.
    raw_nodes: Vec<Value>,
    present: bool,
}

impl WorkflowGraph {
    /// Parses the raw `workflow` text. Invalid JSON or a non-object document yields an empty graph.
    pub fn parse(text: &str) -> Self {
        if !text.trim_start().starts_with('{') {
            return Self::default();
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => {
                let raw_nodes = match map.get("nodes") {
                    Some(Value::Array(nodes)) => nodes.clone(),
                    _ => Vec::new(),
                };
                Self {
                    raw_nodes,
                    present: !map.is_empty(),
                }
            }
            _ => Self::default(),
        }
    }

    /// True when no workflow document was supplied (or it was an empty object).
    pub fn is_empty(&self) -> bool {
        !self.present
    }

    pub fn nodes(&self) -> Result<Vec<WorkflowNode>, ExtractError> {
        self.raw_nodes
            .iter()
            .enumerate()
            .map(|(index, value)| WorkflowNode::from_json(index, value))
            .collect()
    }
}
