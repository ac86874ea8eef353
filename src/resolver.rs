//! Follows links through the executable graph until a value is grounded.
use crate::catalog::{Catalog, SlotMapping};
use crate::config::ExtractorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::graph::{BrokenLink, ExecutableGraph, InputValue, Link, Node, ParamValue};
use crate::operation::{Operand, Operation, Outcome};
use ahash::{AHashMap, AHashSet};

/// Resolves input values against one executable graph.
///
/// Resolution is read-only and recomputes shared sub-paths instead of caching them.
/// `None` means propagation stopped: the value is unknown, not an error.
pub struct LinkResolver<'a> {
    graph: &'a ExecutableGraph,
    catalog: &'a Catalog,
    config: &'a ExtractorConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> LinkResolver<'a> {
    pub fn new(
        graph: &'a ExecutableGraph,
        catalog: &'a Catalog,
        config: &'a ExtractorConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            graph,
            catalog,
            config,
            sink,
        }
    }

    pub fn resolve(&self, value: &InputValue) -> Option<ParamValue> {
        let mut path = AHashSet::new();
        self.resolve_recursive(value, &mut path)
    }

    /// `path` holds the ids of the nodes on the current link chain.
    fn resolve_recursive(
        &self,
        value: &InputValue,
        path: &mut AHashSet<String>,
    ) -> Option<ParamValue> {
        match value {
            InputValue::Literal(literal) => ParamValue::from_literal(literal),
            InputValue::Link(link) => {
                let mut entered = Vec::new();
                let result = self.follow_link(link, path, &mut entered);
                for id in &entered {
                    path.remove(id);
                }
                result
            }
        }
    }

    /// Walks pass-through slots iteratively so that long bypass chains cost no stack.
    /// Only formatting rules recurse. Every node visited is recorded in `entered`.
    fn follow_link(
        &self,
        start: &Link,
        path: &mut AHashSet<String>,
        entered: &mut Vec<String>,
    ) -> Option<ParamValue> {
        let mut link = start;
        loop {
            let Some(node) = self.graph.get(&link.node_id) else {
                return Some(ParamValue::Broken(BrokenLink::Missing(
                    link.node_id.clone(),
                )));
            };
            if !node.declares_type {
                return Some(ParamValue::Broken(BrokenLink::Invalid(
                    link.node_id.clone(),
                )));
            }

            if path.contains(&node.id) {
                self.sink.report(&Diagnostic::LinkCycle {
                    node_id: node.id.clone(),
                });
                return None;
            }
            if path.len() >= self.config.max_depth {
                self.sink.report(&Diagnostic::DepthExceeded {
                    node_id: node.id.clone(),
                    limit: self.config.max_depth,
                });
                return None;
            }
            path.insert(node.id.clone());
            entered.push(node.id.clone());

            // A type that is not a string matches no rule.
            let class_type = node.class_type.as_deref()?;
            // Node types without a rule are deliberate dead ends.
            let rule = self.catalog.propagation_rule(class_type, self.sink)?;
            match rule.mapping.get(&link.slot_index()?)? {
                SlotMapping::Follow(input) => match node.input(input)? {
                    InputValue::Literal(literal) => return ParamValue::from_literal(literal),
                    InputValue::Link(next) => link = next,
                },
                SlotMapping::Apply(operation) => {
                    return self.apply(node, class_type, operation, path);
                }
            }
        }
    }

    /// Resolves every key the operation needs, in declaration order, then evaluates it.
    fn apply(
        &self,
        node: &Node,
        class_type: &str,
        operation: &Operation,
        path: &mut AHashSet<String>,
    ) -> Option<ParamValue> {
        let keys = match operation {
            Operation::Format { keys, .. } => keys.as_slice(),
            _ => &[][..],
        };
        if keys.is_empty() {
            self.sink.report(&Diagnostic::EmptyFormatKeys {
                class_type: class_type.to_string(),
            });
            return None;
        }

        let mut resolved = AHashMap::with_capacity(keys.len());
        for key in keys {
            let value = match node.input(key) {
                Some(input) => self.resolve_recursive(input, path),
                None => {
                    self.sink.report(&Diagnostic::MissingFormatKey {
                        node_id: node.id.clone(),
                        key: key.clone(),
                    });
                    None
                }
            };
            match value {
                Some(value) => {
                    resolved.insert(key.clone(), value);
                }
                None if self.config.propagate_none => return None,
                None => {
                    resolved.insert(key.clone(), ParamValue::Text(format!("{{{}}}", key)));
                }
            }
        }

        match operation.evaluate(Operand::Fields(&resolved), self.sink) {
            Some(Outcome::Formatted(text)) => Some(ParamValue::Text(text)),
            _ => None,
        }
    }
}
