//! Best-effort diagnostics emitted while extracting.
//!
//! Nothing reported here aborts an extraction. The sink is injected into the
//! [`Extractor`](crate::extractor::Extractor) so the library performs no I/O of its own;
//! the default [`TracingSink`] forwards everything to `tracing`.
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warning,
}

/// A single event worth telling the caller about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A formatting rule needs an input the linked node does not have.
    MissingFormatKey { node_id: String, key: String },
    /// A formatting rule was matched but declares no keys.
    EmptyFormatKeys { class_type: String },
    /// A template could not be rendered; the raw template is used instead.
    FormatFailed { template: String, reason: String },
    /// A user catalog referenced an operation kind this crate does not know.
    UnknownOperation,
    /// An operation was applied to the wrong kind of operand.
    OperandMismatch {
        operation: &'static str,
        expected: &'static str,
    },
    /// A link path re-entered a node it already passed through.
    LinkCycle { node_id: String },
    /// A link path grew past the configured depth limit.
    DepthExceeded { node_id: String, limit: usize },
    /// The whole extraction failed and produced an empty result.
    ExtractionFailed { reason: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MissingFormatKey { .. } => Severity::Debug,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingFormatKey { node_id, key } => write!(
                f,
                "Key '{}' needed for formatting not found in inputs of node '{}'",
                key, node_id
            ),
            Diagnostic::EmptyFormatKeys { class_type } => write!(
                f,
                "Formatting rule for node type '{}' defines no keys",
                class_type
            ),
            Diagnostic::FormatFailed { template, reason } => {
                write!(f, "Could not format '{}': {}", template, reason)
            }
            Diagnostic::UnknownOperation => write!(f, "Unknown operation type"),
            Diagnostic::OperandMismatch {
                operation,
                expected,
            } => write!(f, "Operation '{}' expects {}", operation, expected),
            Diagnostic::LinkCycle { node_id } => {
                write!(f, "Link cycle detected at node '{}'", node_id)
            }
            Diagnostic::DepthExceeded { node_id, limit } => write!(
                f,
                "Link path through node '{}' exceeded the depth limit of {}",
                node_id, limit
            ),
            Diagnostic::ExtractionFailed { reason } => {
                write!(f, "Unexpected error parsing ComfyUI data: {}", reason)
            }
        }
    }
}

/// Receives diagnostics. Implementations must be cheap and must not panic.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at a level matching their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!(target: "kaiseki", "{}", diagnostic),
            Severity::Debug => tracing::debug!(target: "kaiseki", "{}", diagnostic),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Keeps every diagnostic in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of everything collected so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(diagnostic.clone()),
            Err(poisoned) => poisoned.into_inner().push(diagnostic.clone()),
        }
    }
}
