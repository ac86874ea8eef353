//! Common test utilities for building ComfyUI metadata fixtures.
use kaiseki::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

/// The stock text-to-image graph: sampler `3` fed by a checkpoint, a latent and two prompts.
#[allow(dead_code)]
pub fn ksampler_prompt() -> Value {
    json!({
        "3": {
            "class_type": "KSampler",
            "inputs": {
                "seed": 89898989,
                "steps": 20,
                "cfg": 7.0,
                "sampler_name": "dpmpp_2m",
                "scheduler": "karras",
                "denoise": 1.0,
                "model": ["4", 0],
                "positive": ["6", 0],
                "negative": ["7", 0],
                "latent_image": ["5", 0]
            }
        },
        "4": {
            "class_type": "CheckpointLoaderSimple",
            "inputs": { "ckpt_name": "sd_xl_base_1.0.safetensors" }
        },
        "5": {
            "class_type": "EmptyLatentImage",
            "inputs": { "width": 1024, "height": 1024, "batch_size": 1 }
        },
        "6": {
            "class_type": "CLIPTextEncode",
            "inputs": { "text": "beautiful landscape painting, epic composition", "clip": ["4", 1] }
        },
        "7": {
            "class_type": "CLIPTextEncode",
            "inputs": { "text": "ugly, deformed", "clip": ["4", 1] }
        },
        "8": {
            "class_type": "VAEDecode",
            "inputs": { "samples": ["3", 0], "vae": ["4", 2] }
        },
        "9": {
            "class_type": "SaveImage",
            "inputs": { "filename_prefix": "ComfyUI", "images": ["8", 0] }
        }
    })
}

/// A UI graph holding one `PrimitiveNode` per `(title, widget value)` pair.
#[allow(dead_code)]
pub fn primitive_workflow(primitives: &[(&str, Value)]) -> Value {
    let nodes: Vec<Value> = primitives
        .iter()
        .enumerate()
        .map(|(i, (title, widget))| {
            json!({
                "id": i + 10,
                "type": "PrimitiveNode",
                "title": title,
                "widgets_values": [widget]
            })
        })
        .collect();
    json!({ "last_node_id": 20, "nodes": nodes })
}

/// Wraps the graphs into the text chunks an image metadata reader would produce.
#[allow(dead_code)]
pub fn metadata(prompt: Option<&Value>, workflow: Option<&Value>) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    if let Some(prompt) = prompt {
        metadata.insert("prompt".to_string(), prompt.to_string());
    }
    if let Some(workflow) = workflow {
        metadata.insert("workflow".to_string(), workflow.to_string());
    }
    metadata
}

/// An extractor that records its diagnostics, alongside the sink to inspect them.
#[allow(dead_code)]
pub fn collecting_extractor() -> (Extractor, Arc<CollectingSink>) {
    let sink = CollectingSink::new();
    let extractor = Extractor::builder()
        .with_diagnostics(sink.clone())
        .build();
    (extractor, sink)
}

/// Sorted `(name, value)` pairs, for readable map comparisons.
#[allow(dead_code)]
pub fn sorted(params: &ParamMap) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    pairs.sort();
    pairs
}

/// Builds `depth` chained pass-through model patchers ending in a checkpoint loader.
///
/// Node `m0` feeds a sampler; `m{depth}` is the loader holding `ckpt_name`.
#[allow(dead_code)]
pub fn bypass_chain(depth: usize, ckpt_name: &str) -> Value {
    let mut graph = serde_json::Map::new();
    graph.insert(
        "sampler".to_string(),
        json!({
            "class_type": "KSampler",
            "inputs": { "model": ["m0", 0], "seed": 1 }
        }),
    );
    for i in 0..depth {
        graph.insert(
            format!("m{}", i),
            json!({
                "class_type": "ModelSamplingFlux",
                "inputs": { "model": [format!("m{}", i + 1), 0] }
            }),
        );
    }
    graph.insert(
        format!("m{}", depth),
        json!({
            "class_type": "CheckpointLoaderSimple",
            "inputs": { "ckpt_name": ckpt_name }
        }),
    );
    Value::Object(graph)
}
