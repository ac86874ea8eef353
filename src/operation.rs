use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::graph::ParamValue;
use crate::template::Template;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A declarative operation from the rule tables, dispatched on `operation_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation_type", rename_all = "snake_case")]
pub enum Operation {
    /// Case-sensitive membership test.
    #[serde(rename = "any_of_inputs")]
    AnyOf {
        #[serde(rename = "operation_input")]
        candidates: Vec<String>,
    },
    /// Case-insensitive substring test.
    CaselessContains {
        #[serde(rename = "operation_input")]
        needle: String,
    },
    /// Renders `template` from the named `keys`.
    Format {
        #[serde(rename = "keys_to_use", default)]
        keys: Vec<String>,
        #[serde(rename = "operation_input")]
        template: String,
    },
    #[serde(other)]
    Unknown,
}

/// What an operation is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Text(&'a str),
    Fields(&'a AHashMap<String, ParamValue>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched(bool),
    Formatted(String),
}

impl Operation {
    pub fn any_of<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operation::AnyOf {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn format<I, S>(keys: I, template: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operation::Format {
            keys: keys.into_iter().map(Into::into).collect(),
            template: template.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::AnyOf { .. } => "any_of_inputs",
            Operation::CaselessContains { .. } => "caseless_contains",
            Operation::Format { .. } => "format",
            Operation::Unknown => "unknown",
        }
    }

    /// Evaluates the operation. Returns `None` (and reports why) instead of failing.
    pub fn evaluate(&self, operand: Operand<'_>, sink: &dyn DiagnosticSink) -> Option<Outcome> {
        match (self, operand) {
            (Operation::AnyOf { candidates }, Operand::Text(subject)) => {
                Some(Outcome::Matched(candidates.iter().any(|c| c == subject)))
            }
            (Operation::CaselessContains { needle }, Operand::Text(subject)) => Some(
                Outcome::Matched(subject.to_lowercase().contains(&needle.to_lowercase())),
            ),
            (Operation::Format { keys, template }, Operand::Fields(fields)) => {
                Some(Outcome::Formatted(render_or_raw(keys, template, fields, sink)))
            }
            (Operation::Unknown, _) => {
                sink.report(&Diagnostic::UnknownOperation);
                None
            }
            (Operation::Format { .. }, Operand::Text(_)) => {
                sink.report(&Diagnostic::OperandMismatch {
                    operation: self.name(),
                    expected: "a field map",
                });
                None
            }
            (_, Operand::Fields(_)) => {
                sink.report(&Diagnostic::OperandMismatch {
                    operation: self.name(),
                    expected: "a string",
                });
                None
            }
        }
    }

    /// True only when the operation is a test that matches `subject`.
    pub fn test(&self, subject: &str, sink: &dyn DiagnosticSink) -> bool {
        matches!(
            self.evaluate(Operand::Text(subject), sink),
            Some(Outcome::Matched(true))
        )
    }
}

/// Missing keys default to their own placeholder text; any rendering error yields the raw template.
fn render_or_raw(
    keys: &[String],
    template: &str,
    fields: &AHashMap<String, ParamValue>,
    sink: &dyn DiagnosticSink,
) -> String {
    let arguments: AHashMap<String, ParamValue> = keys
        .iter()
        .map(|key| {
            let value = fields
                .get(key)
                .cloned()
                .unwrap_or_else(|| ParamValue::Text(format!("{{{}}}", key)));
            (key.clone(), value)
        })
        .collect();

    match Template::parse(template).and_then(|t| t.render(&arguments)) {
        Ok(rendered) => rendered,
        Err(e) => {
            sink.report(&Diagnostic::FormatFailed {
                template: template.to_string(),
                reason: e.to_string(),
            });
            template.to_string()
        }
    }
}
