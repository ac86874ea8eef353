use crate::diagnostics::DiagnosticSink;
use crate::operation::Operation;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Decides whether a rule applies to a node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeMatcher {
    /// Exact, case-sensitive equality.
    Exact(String),
    /// A test operation (normally `any_of_inputs`) applied to the type name.
    Rule(Operation),
}

impl TypeMatcher {
    pub fn matches(&self, node_type: &str, sink: &dyn DiagnosticSink) -> bool {
        match self {
            TypeMatcher::Exact(name) => name == node_type,
            TypeMatcher::Rule(operation) => operation.test(node_type, sink),
        }
    }
}

/// How one output slot of a node derives its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotMapping {
    /// Pass-through: the slot carries whatever the named input carries.
    Follow(String),
    /// The slot is computed from several inputs.
    Apply(Operation),
}

/// Describes how values travel through a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationRule {
    pub class_type: TypeMatcher,
    pub mapping: AHashMap<u32, SlotMapping>,
}

/// A node type whose inputs become output fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    pub class_type: TypeMatcher,
    pub inputs: Vec<String>,
}

/// An output field: its internal key, alternate templates and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub templates: Vec<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl FieldSpec {
    pub fn new(key: &str, templates: &[&str], display_name: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            templates: templates.iter().map(|t| t.to_string()).collect(),
            display_name: display_name.map(str::to_string),
        }
    }

    /// The configured display name, or the key in title case (`sampler_name` -> `Sampler Name`).
    pub fn display_name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => humanize(&self.key),
        }
    }
}

fn humanize(key: &str) -> String {
    let mut output = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if at_word_start {
                output.extend(c.to_uppercase());
            } else {
                output.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            output.push(c);
            at_word_start = true;
        }
    }
    output
}
