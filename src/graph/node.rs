use ahash::AHashMap;
use serde_json::{Map, Value};
use std::fmt;

/// A reference from an input to another node's output slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub node_id: String,
    /// Any integer is accepted here; slots outside a rule's mapping simply resolve to nothing.
    pub slot: i64,
}

impl Link {
    pub fn new(node_id: impl Into<String>, slot: i64) -> Self {
        Self {
            node_id: node_id.into(),
            slot,
        }
    }

    /// Recognises the `["<node id>", <integer>]` shape used by the executable graph.
    pub fn from_json(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        if pair.len() != 2 {
            return None;
        }
        let node_id = pair[0].as_str()?;
        let slot = match &pair[1] {
            Value::Number(n) if n.is_i64() => n.as_i64()?,
            // Saturates; no node has that many outputs.
            Value::Number(n) if n.is_u64() => i64::MAX,
            _ => return None,
        };
        Some(Link::new(node_id, slot))
    }

    /// The slot as a rule-table key, `None` when no table can map it.
    pub fn slot_index(&self) -> Option<u32> {
        u32::try_from(self.slot).ok()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.node_id, self.slot)
    }
}

/// The value bound to a node input: either a literal or a link.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Literal(Value),
    Link(Link),
}

impl From<&Value> for InputValue {
    fn from(value: &Value) -> Self {
        match Link::from_json(value) {
            Some(link) => InputValue::Link(link),
            None => InputValue::Literal(value.clone()),
        }
    }
}

/// One step of the executable graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// `None` when the node is not an object or its `class_type` is not a string.
    pub class_type: Option<String>,
    /// `false` when the entry is not an object or has no `class_type` key at all.
    /// Links to such nodes are reported inline as invalid.
    pub declares_type: bool,
    pub inputs: AHashMap<String, InputValue>,
}

impl Node {
    fn from_json(id: &str, value: &Value) -> Self {
        let object = value.as_object();
        let declared = object.and_then(|o| o.get("class_type"));
        let class_type = declared.and_then(Value::as_str).map(str::to_string);
        let inputs = object
            .and_then(|o| o.get("inputs"))
            .and_then(Value::as_object)
            .map(|inputs| {
                inputs
                    .iter()
                    .map(|(name, v)| (name.clone(), InputValue::from(v)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: id.to_string(),
            class_type,
            declares_type: declared.is_some(),
            inputs,
        }
    }

    pub fn input(&self, name: &str) -> Option<&InputValue> {
        self.inputs.get(name)
    }
}

/// The graph that was actually executed (the `prompt` metadata entry).
///
/// Nodes keep their document order so that "later node wins" is well defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutableGraph {
    nodes: Vec<Node>,
    index: AHashMap<String, usize>,
}

impl ExecutableGraph {
    /// Parses the raw `prompt` text. Anything that is not a JSON object yields an empty graph.
    pub fn parse(text: &str) -> Self {
        if !text.trim_start().starts_with('{') {
            return Self::default();
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self::from_map(unwrap_api_envelope(map)),
            _ => Self::default(),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut graph = Self::default();
        for (id, value) in &map {
            graph.insert(Node::from_json(id, value));
        }
        graph
    }

    pub fn insert(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&position) => self.nodes[position] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// API submissions wrap the graph as `{"prompt": {...}, ...}`.
fn unwrap_api_envelope(mut map: Map<String, Value>) -> Map<String, Value> {
    if matches!(map.get("prompt"), Some(Value::Object(_))) {
        if let Some(Value::Object(inner)) = map.remove("prompt") {
            return inner;
        }
    }
    map
}
