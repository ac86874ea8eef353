use crate::catalog::{Catalog, FieldSpec};
use crate::config::ExtractorConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ExtractError;
use crate::graph::{ExecutableGraph, ParamValue, WorkflowGraph};
use crate::resolver::LinkResolver;
use crate::template::Template;
use ahash::AHashMap;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

mod builder;
mod report;

pub use builder::ExtractorBuilder;
pub use report::{DISPLAY_ORDER, ExtractedField, ExtractionReport, ParamMap, display_ordered};

/// Metadata key holding the executable graph.
pub const PROMPT_KEY: &str = "prompt";
/// Metadata key holding the UI graph.
pub const WORKFLOW_KEY: &str = "workflow";

/// UI node type whose widget holds a value typed by the user.
const PRIMITIVE_NODE_TYPE: &str = "PrimitiveNode";

/// Anything that maps metadata keys to text, as produced by an image metadata reader.
pub trait MetadataSource {
    fn text(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> MetadataSource for HashMap<String, String, S> {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl MetadataSource for AHashMap<String, String> {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl MetadataSource for BTreeMap<String, String> {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Non-string entries are ignored.
impl MetadataSource for serde_json::Map<String, serde_json::Value> {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Recovers generation parameters from ComfyUI image metadata.
///
/// An `Extractor` holds no per-call state and can be shared across threads to
/// process many files concurrently.
///
/// ```rust
/// use kaiseki::prelude::*;
/// use std::collections::HashMap;
///
/// let extractor = Extractor::builder().build();
/// let mut metadata = HashMap::new();
/// metadata.insert("prompt".to_string(), r#"{
///     "3": {"class_type": "KSampler", "inputs": {"seed": 42, "model": ["4", 0]}},
///     "4": {"class_type": "CheckpointLoaderSimple", "inputs": {"ckpt_name": "model.safetensors"}}
/// }"#.to_string());
///
/// let params = extractor.extract(&metadata);
/// assert_eq!(params["Seed"], "42");
/// assert_eq!(params["Model"], "model.safetensors");
/// ```
pub struct Extractor {
    catalog: Catalog,
    config: ExtractorConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Extractor {
    fn default() -> Self {
        ExtractorBuilder::new().build()
    }
}

impl Extractor {
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the flat parameter map. Never fails: any error is reported to the
    /// diagnostics sink and yields an empty map.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn extract<M: MetadataSource + ?Sized>(&self, metadata: &M) -> ParamMap {
        match self.try_extract(metadata) {
            Ok(params) => params,
            Err(e) => {
                self.sink.report(&Diagnostic::ExtractionFailed {
                    reason: e.to_string(),
                });
                ParamMap::new()
            }
        }
    }

    pub fn try_extract<M: MetadataSource + ?Sized>(
        &self,
        metadata: &M,
    ) -> Result<ParamMap, ExtractError> {
        self.report(metadata).map(|report| report.flatten())
    }

    /// Runs the extraction and keeps every distinct value per field.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn report<M: MetadataSource + ?Sized>(
        &self,
        metadata: &M,
    ) -> Result<ExtractionReport, ExtractError> {
        let prompt = metadata
            .text(PROMPT_KEY)
            .map(ExecutableGraph::parse)
            .unwrap_or_default();
        let workflow = metadata
            .text(WORKFLOW_KEY)
            .map(WorkflowGraph::parse)
            .unwrap_or_default();

        self.report_graphs(&prompt, &workflow)
    }

    /// Same as [`Extractor::report`], for graphs that were already parsed.
    pub fn report_graphs(
        &self,
        prompt: &ExecutableGraph,
        workflow: &WorkflowGraph,
    ) -> Result<ExtractionReport, ExtractError> {
        if prompt.is_empty() && workflow.is_empty() {
            return Ok(ExtractionReport::default());
        }

        let targets = self.resolve_targets(prompt);
        tracing::debug!(
            nodes = prompt.len(),
            targets = targets.len(),
            "resolved target nodes"
        );

        let fields = self
            .catalog
            .fields
            .iter()
            .filter_map(|field| self.collect_field(field, &targets))
            .collect();
        let overrides = self.primitive_overrides(workflow)?;

        Ok(ExtractionReport { fields, overrides })
    }

    /// Resolved required inputs of every target node, in document order.
    fn resolve_targets(&self, graph: &ExecutableGraph) -> Vec<AHashMap<String, ParamValue>> {
        let resolver = LinkResolver::new(graph, &self.catalog, &self.config, self.sink.as_ref());
        let mut targets = Vec::new();

        for node in graph.nodes() {
            let Some(class_type) = node.class_type.as_deref() else {
                continue;
            };
            let Some(rule) = self.catalog.target_rule(class_type, self.sink.as_ref()) else {
                continue;
            };

            let mut resolved = AHashMap::new();
            for input in &rule.inputs {
                let Some(value) = node.input(input) else {
                    continue;
                };
                if let Some(value) = resolver.resolve(value) {
                    resolved.insert(input.clone(), value);
                }
            }
            targets.push(resolved);
        }
        targets
    }

    /// Applies a field's templates to every target. Templates that do not fit a target are skipped.
    fn collect_field(
        &self,
        field: &FieldSpec,
        targets: &[AHashMap<String, ParamValue>],
    ) -> Option<ExtractedField> {
        let templates: Vec<Template> = field
            .templates
            .iter()
            .filter_map(|source| match Template::parse(source) {
                Ok(template) => Some(template),
                Err(e) => {
                    self.sink.report(&Diagnostic::FormatFailed {
                        template: source.clone(),
                        reason: e.to_string(),
                    });
                    None
                }
            })
            .collect();

        let values: Vec<String> = targets
            .iter()
            .flat_map(|resolved| {
                templates
                    .iter()
                    .filter_map(move |template| template.render(resolved).ok())
            })
            .unique()
            .map(|value| report::truncate(value, self.config.max_value_chars))
            .collect();

        (!values.is_empty()).then(|| ExtractedField {
            key: field.key.clone(),
            display_name: field.display_name(),
            values,
        })
    }

    /// Text typed into `PrimitiveNode`s titled `positive` / `negative` beats anything resolved.
    fn primitive_overrides(
        &self,
        workflow: &WorkflowGraph,
    ) -> Result<Vec<(String, String)>, ExtractError> {
        let mut overrides = Vec::new();
        for node in workflow.nodes()? {
            if node.node_type.as_deref() != Some(PRIMITIVE_NODE_TYPE) {
                continue;
            }
            let Some(value) = node.first_widget_text() else {
                continue;
            };
            let display_name = match node.title.as_deref() {
                Some("positive") => "Prompt",
                Some("negative") => "Negative Prompt",
                _ => continue,
            };
            overrides.push((
                display_name.to_string(),
                report::truncate(value, self.config.max_value_chars),
            ));
        }
        Ok(overrides)
    }
}
