use super::Extractor;
use crate::catalog::Catalog;
use crate::config::ExtractorConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use std::sync::Arc;

/// Configures an [`Extractor`]. Starts from the built-in catalog, the default
/// config and a `tracing` diagnostics sink.
pub struct ExtractorBuilder {
    catalog: Catalog,
    config: ExtractorConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::builtin(),
            config: ExtractorConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the catalog entirely.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Appends rules after the current ones; existing rules still match first.
    pub fn with_extra_rules(mut self, rules: Catalog) -> Self {
        self.catalog.extend(rules);
        self
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn propagate_none(mut self, enabled: bool) -> Self {
        self.config.propagate_none = enabled;
        self
    }

    pub fn with_max_value_chars(mut self, max_value_chars: usize) -> Self {
        self.config.max_value_chars = max_value_chars;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Extractor {
        Extractor {
            catalog: self.catalog,
            config: self.config,
            sink: self.sink,
        }
    }
}
