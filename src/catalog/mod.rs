//! The declarative rule tables that drive resolution and output formatting.
//!
//! A [`Catalog`] holds three ordered tables:
//!
//! 1. **Propagation rules**: for a node type, how each output slot derives its value
//!    (follow an input, or format several inputs).
//! 2. **Target rules**: node types whose inputs are reported, and which inputs.
//! 3. **Fields**: output fields, their alternate templates and display names.
//!
//! Lookups scan the tables in declaration order and the first matching rule wins.
//! [`Catalog::builtin`] covers the stock ComfyUI nodes; custom tables can be loaded
//! from JSON in the same shape:
//!
//! ```rust
//! use kaiseki::catalog::Catalog;
//!
//! let catalog = Catalog::from_json(r#"{
//!     "propagation": [
//!         { "class_type": "MyLoader", "mapping": { "0": "model_path" } }
//!     ],
//!     "targets": [
//!         {
//!             "class_type": { "operation_type": "any_of_inputs", "operation_input": ["MySampler"] },
//!             "inputs": ["model", "seed"]
//!         }
//!     ],
//!     "fields": [
//!         { "key": "models", "templates": ["{model}"], "display_name": "Model" }
//!     ]
//! }"#).unwrap();
//! assert_eq!(catalog.propagation.len(), 1);
//! ```
use crate::diagnostics::DiagnosticSink;
use crate::error::CatalogError;
use crate::operation::Operation;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

mod builtin;
pub mod definition;

pub use definition::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub propagation: Vec<PropagationRule>,
    pub targets: Vec<TargetRule>,
    pub fields: Vec<FieldSpec>,
}

impl Catalog {
    /// The rule tables for stock ComfyUI workflows.
    pub fn builtin() -> Self {
        Self {
            propagation: builtin::propagation_rules(),
            targets: builtin::target_rules(),
            fields: builtin::fields(),
        }
    }

    /// Loads a catalog from JSON and checks it before use.
    ///
    /// Every template must parse, both in fields and in `format` slot mappings. Operations
    /// must be known and used where they make sense: membership tests as type matchers,
    /// `format` as slot mappings.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| CatalogError::JsonParseError(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("'{}': {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Appends the rules of `other` after this catalog's own, so existing rules keep precedence.
    pub fn extend(&mut self, other: Catalog) {
        self.propagation.extend(other.propagation);
        self.targets.extend(other.targets);
        self.fields.extend(other.fields);
    }

    pub fn propagation_rule(
        &self,
        class_type: &str,
        sink: &dyn DiagnosticSink,
    ) -> Option<&PropagationRule> {
        self.propagation
            .iter()
            .find(|rule| rule.class_type.matches(class_type, sink))
    }

    pub fn target_rule(&self, class_type: &str, sink: &dyn DiagnosticSink) -> Option<&TargetRule> {
        self.targets
            .iter()
            .find(|rule| rule.class_type.matches(class_type, sink))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (index, rule) in self.propagation.iter().enumerate() {
            let location = format!("propagation[{}]", index);
            check_matcher(&rule.class_type, &location)?;
            for (slot, mapping) in &rule.mapping {
                if let SlotMapping::Apply(operation) = mapping {
                    check_slot_operation(operation, &format!("{}.mapping[{}]", location, slot))?;
                }
            }
        }
        for (index, rule) in self.targets.iter().enumerate() {
            check_matcher(&rule.class_type, &format!("targets[{}]", index))?;
        }
        for field in &self.fields {
            for template in &field.templates {
                Template::parse(template).map_err(|source| CatalogError::InvalidTemplate {
                    field: field.key.clone(),
                    template: template.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

fn invalid_rule(location: &str, reason: impl Into<String>) -> CatalogError {
    CatalogError::InvalidRule {
        location: location.to_string(),
        reason: reason.into(),
    }
}

fn check_matcher(matcher: &TypeMatcher, location: &str) -> Result<(), CatalogError> {
    match matcher {
        TypeMatcher::Exact(_) => Ok(()),
        TypeMatcher::Rule(Operation::Unknown) => {
            Err(invalid_rule(location, "unknown operation_type"))
        }
        TypeMatcher::Rule(Operation::Format { .. }) => {
            Err(invalid_rule(location, "'format' cannot match a node type"))
        }
        TypeMatcher::Rule(_) => Ok(()),
    }
}

fn check_slot_operation(operation: &Operation, location: &str) -> Result<(), CatalogError> {
    match operation {
        Operation::Format { template, .. } => Template::parse(template)
            .map(|_| ())
            .map_err(|e| invalid_rule(location, format!("template '{}': {}", template, e))),
        Operation::Unknown => Err(invalid_rule(location, "unknown operation_type")),
        other => Err(invalid_rule(
            location,
            format!("'{}' cannot compute a slot value", other.name()),
        )),
    }
}
