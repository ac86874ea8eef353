//! # Kaiseki - ComfyUI Metadata Extraction Engine
//!
//! **Kaiseki** recovers human-meaningful generation parameters (model, prompts, size,
//! seed, sampler settings, LoRAs) from the metadata ComfyUI embeds in the images it
//! produces. The metadata carries two JSON documents:
//!
//! - `prompt`: the executable graph, where every node input is either a literal or a
//!   link `["<node id>", <output slot>]` to another node's output.
//! - `workflow`: the UI graph, used only to recover text typed into primitive nodes.
//!
//! ## Core Workflow
//!
//! The engine is table driven. A [`Catalog`](catalog::Catalog) declares which node
//! types are *targets* (samplers, LoRA loaders, ...), how values propagate through
//! intermediate nodes, and how resolved inputs are rendered into output fields.
//!
//! 1.  **Parse**: the `prompt` and `workflow` texts are parsed into an
//!     [`ExecutableGraph`](graph::ExecutableGraph) and a [`WorkflowGraph`](graph::WorkflowGraph).
//! 2.  **Resolve**: every required input of every target node is followed through the
//!     graph by the [`LinkResolver`](resolver::LinkResolver) until it is grounded in a literal.
//! 3.  **Format**: each output field tries its templates against every target's resolved inputs.
//! 4.  **Overlay**: primitive nodes titled `positive` / `negative` in the UI graph override the prompts.
//!
//! ## Quick Start
//!
//! ```rust
//! use kaiseki::prelude::*;
//! use std::collections::HashMap;
//!
//! let mut metadata = HashMap::new();
//! metadata.insert("prompt".to_string(), r#"{
//!     "3": {"class_type": "KSampler", "inputs": {
//!         "seed": 7, "steps": 20, "cfg": 7.0,
//!         "positive": ["6", 0], "latent_image": ["5", 0]
//!     }},
//!     "5": {"class_type": "EmptyLatentImage", "inputs": {"width": 512, "height": 768}},
//!     "6": {"class_type": "CLIPTextEncode", "inputs": {"text": "a lighthouse at dusk"}}
//! }"#.to_string());
//!
//! let extractor = Extractor::builder().build();
//! let params = extractor.extract(&metadata);
//!
//! assert_eq!(params["Prompt"], "a lighthouse at dusk");
//! assert_eq!(params["Size"], "512 x 768");
//! assert_eq!(params["CFG Scale"], "7.0");
//! ```

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod operation;
pub mod prelude;
pub mod resolver;
pub mod template;

#[cfg(feature = "python-bindings")]
mod python;

use extractor::{Extractor, MetadataSource, ParamMap};

/// Extracts parameters with the built-in catalog and default settings.
///
/// Builds a fresh [`Extractor`] on every call; keep one around when processing many files.
pub fn extract<M: MetadataSource + ?Sized>(metadata: &M) -> ParamMap {
    Extractor::default().extract(metadata)
}
