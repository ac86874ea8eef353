//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kaiseki crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaiseki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let catalog = Catalog::from_file("path/to/catalog.json")?;
//! let extractor = Extractor::builder().with_extra_rules(catalog).build();
//!
//! let metadata: HashMap<String, String> =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/metadata.json")?)?;
//! for (name, value) in extractor.extract(&metadata) {
//!     println!("{name}: {value}");
//! }
//! # Ok(())
//! # }
//! ```

// Extraction
pub use crate::extractor::{
    DISPLAY_ORDER, ExtractedField, ExtractionReport, Extractor, ExtractorBuilder, MetadataSource,
    ParamMap, display_ordered,
};

// Rule tables and configuration
pub use crate::catalog::{Catalog, FieldSpec, PropagationRule, SlotMapping, TargetRule, TypeMatcher};
pub use crate::config::ExtractorConfig;
pub use crate::operation::Operation;

// Diagnostics
pub use crate::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, NullSink, TracingSink};

// Error types
pub use crate::error::{CatalogError, ExtractError, TemplateError};

// Standard library re-exports commonly used with this crate
pub use std::collections::HashMap;
pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
