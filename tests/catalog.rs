//! Tests for the rule catalog: built-in tables, JSON loading and precedence.
mod common;
use common::{ksampler_prompt, metadata, sorted};
use kaiseki::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

const CUSTOM_CATALOG: &str = r##"{
    "propagation": [
        { "class_type": "MyLoader", "mapping": { "0": "model_path" } },
        {
            "class_type": { "operation_type": "any_of_inputs", "operation_input": ["MyResolution"] },
            "mapping": {
                "0": {
                    "operation_type": "format",
                    "keys_to_use": ["w", "h"],
                    "operation_input": "{w}x{h}"
                }
            }
        }
    ],
    "targets": [
        {
            "class_type": { "operation_type": "any_of_inputs", "operation_input": ["MySampler"] },
            "inputs": ["model", "size", "seed", "guidance"]
        }
    ],
    "fields": [
        { "key": "models", "templates": ["{model}"], "display_name": "Model" },
        { "key": "image_size", "templates": ["{size}"] },
        { "key": "seeds", "templates": ["#{seed:d}"], "display_name": "Seed" },
        { "key": "guidance", "templates": ["{guidance:.2f}"] }
    ]
}"##;

fn custom_prompt() -> serde_json::Value {
    json!({
        "1": {
            "class_type": "MySampler",
            "inputs": {
                "model": ["2", 0],
                "size": ["3", 0],
                "seed": 77,
                "guidance": 3.5
            }
        },
        "2": { "class_type": "MyLoader", "inputs": { "model_path": "custom.gguf" } },
        "3": { "class_type": "MyResolution", "inputs": { "w": 896, "h": 1152 } }
    })
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = expected
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn test_builtin_tables() {
    let catalog = Catalog::builtin();
    assert_eq!(catalog.propagation.len(), 16);
    assert_eq!(catalog.targets.len(), 3);

    let keys: Vec<&str> = catalog.fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "models",
            "pos_prompts",
            "neg_prompts",
            "img_gen_sizes",
            "seeds",
            "steps",
            "cfg",
            "sampler_name",
            "scheduler",
            "denoise",
            "loras",
        ]
    );

    assert!(catalog.target_rule("KSampler (WAS)", &NullSink).is_some());
    assert!(catalog.target_rule("VAEDecode", &NullSink).is_none());
    assert!(catalog.propagation_rule("UnetLoaderGGUFAdvanced", &NullSink).is_some());
}

#[test]
fn test_custom_catalog_from_json() {
    let catalog = Catalog::from_json(CUSTOM_CATALOG).unwrap();
    let extractor = Extractor::builder().with_catalog(catalog).build();
    let params = extractor.extract(&metadata(Some(&custom_prompt()), None));

    assert_eq!(
        sorted(&params),
        pairs(&[
            ("Model", "custom.gguf"),
            ("Image Size", "896x1152"),
            ("Seed", "#77"),
            ("Guidance", "3.50"),
        ])
    );
}

#[test]
fn test_custom_catalog_ignores_stock_nodes() {
    let catalog = Catalog::from_json(CUSTOM_CATALOG).unwrap();
    let extractor = Extractor::builder().with_catalog(catalog).build();
    assert!(extractor.extract(&metadata(Some(&ksampler_prompt()), None)).is_empty());
}

#[test]
fn test_extra_rules_extend_the_builtin_catalog() {
    let extra = Catalog::from_json(CUSTOM_CATALOG).unwrap();
    let extractor = Extractor::builder().with_extra_rules(extra).build();

    let mut prompt = ksampler_prompt();
    for (id, node) in custom_prompt().as_object().unwrap() {
        prompt[format!("c{}", id)] = node.clone();
    }
    // Re-point the custom sampler at the renamed nodes.
    prompt["c1"]["inputs"]["model"] = json!(["c2", 0]);
    prompt["c1"]["inputs"]["size"] = json!(["c3", 0]);

    let params = extractor.extract(&metadata(Some(&prompt), None));
    assert_eq!(params["Prompt"], "beautiful landscape painting, epic composition");
    assert_eq!(params["Image Size"], "896x1152");
    assert_eq!(params["Guidance"], "3.50");
    // Both tables define Model / Seed; the later target wins.
    assert_eq!(params["Model"], "custom.gguf");
    assert_eq!(params["Seed"], "#77");
}

#[test]
fn test_earlier_rules_take_precedence() {
    // Tries to re-route CLIPTextEncode's first output to its clip input.
    let override_rules = Catalog::from_json(
        r#"{ "propagation": [ { "class_type": "CLIPTextEncode", "mapping": { "0": "clip" } } ] }"#,
    )
    .unwrap();

    let mut appended = Catalog::builtin();
    appended.extend(override_rules.clone());
    let params = Extractor::builder()
        .with_catalog(appended)
        .build()
        .extract(&metadata(Some(&ksampler_prompt()), None));
    assert_eq!(params["Prompt"], "beautiful landscape painting, epic composition");

    let mut prepended = override_rules;
    prepended.extend(Catalog::builtin());
    let params = Extractor::builder()
        .with_catalog(prepended)
        .build()
        .extract(&metadata(Some(&ksampler_prompt()), None));
    // The clip link points at the loader's CLIP output, which carries no value.
    assert!(!params.contains_key("Prompt"));
}

#[test]
fn test_invalid_catalogs_are_rejected() {
    let err = Catalog::from_json(r#"{ "fields": [ { "key": "x", "templates": ["{x"] } ] }"#)
        .unwrap_err();
    match err {
        CatalogError::InvalidTemplate {
            field,
            template,
            source,
        } => {
            assert_eq!(field, "x");
            assert_eq!(template, "{x");
            assert_eq!(source, TemplateError::UnbalancedBrace { position: 0 });
        }
        other => panic!("unexpected error: {}", other),
    }

    let err = Catalog::from_json(r#"{ "fields": [ { "key": "x", "templates": ["{x:q}"] } ] }"#)
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidTemplate { .. }));

    let err = Catalog::from_json("{ not json").unwrap_err();
    assert!(matches!(err, CatalogError::JsonParseError(_)));

    let err = Catalog::from_json(r#"{ "targets": [ { "class_type": 5, "inputs": [] } ] }"#)
        .unwrap_err();
    assert!(matches!(err, CatalogError::JsonParseError(_)));
}

fn invalid_rule(json: &str) -> (String, String) {
    match Catalog::from_json(json).unwrap_err() {
        CatalogError::InvalidRule { location, reason } => (location, reason),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_operations_are_rejected_at_load() {
    let (location, reason) = invalid_rule(
        r#"{
            "targets": [
                {
                    "class_type": { "operation_type": "regex_match", "operation_input": "^KSampler" },
                    "inputs": ["seed"]
                }
            ]
        }"#,
    );
    assert_eq!(location, "targets[0]");
    assert!(reason.contains("unknown"));

    let (location, _) = invalid_rule(
        r#"{
            "propagation": [
                { "class_type": "A", "mapping": { "0": "x" } },
                { "class_type": "B", "mapping": { "1": { "operation_type": "concat" } } }
            ]
        }"#,
    );
    assert_eq!(location, "propagation[1].mapping[1]");
}

#[test]
fn test_propagation_templates_are_checked_at_load() {
    let (location, reason) = invalid_rule(
        r#"{
            "propagation": [
                {
                    "class_type": "MyResolution",
                    "mapping": {
                        "0": { "operation_type": "format", "keys_to_use": ["w"], "operation_input": "{w" }
                    }
                }
            ]
        }"#,
    );
    assert_eq!(location, "propagation[0].mapping[0]");
    assert!(reason.contains("{w"));
}

#[test]
fn test_misplaced_operations_are_rejected() {
    let (location, _) = invalid_rule(
        r#"{
            "propagation": [
                {
                    "class_type": { "operation_type": "format", "keys_to_use": ["a"], "operation_input": "{a}" },
                    "mapping": { "0": "a" }
                }
            ]
        }"#,
    );
    assert_eq!(location, "propagation[0]");

    let (location, reason) = invalid_rule(
        r#"{
            "propagation": [
                {
                    "class_type": "MyLoader",
                    "mapping": { "0": { "operation_type": "caseless_contains", "operation_input": "x" } }
                }
            ]
        }"#,
    );
    assert_eq!(location, "propagation[0].mapping[0]");
    assert!(reason.contains("caseless_contains"));
}

#[test]
fn test_unknown_operations_in_programmatic_catalogs() {
    // Catalogs built in code skip load checks; unknown operations then never match.
    let catalog = Catalog {
        targets: vec![TargetRule {
            class_type: TypeMatcher::Rule(Operation::Unknown),
            inputs: vec!["seed".to_string()],
        }],
        fields: vec![FieldSpec::new("seeds", &["{seed}"], None)],
        ..Catalog::default()
    };
    let sink = CollectingSink::new();
    let extractor = Extractor::builder()
        .with_catalog(catalog)
        .with_diagnostics(sink.clone())
        .build();

    assert!(extractor.extract(&metadata(Some(&ksampler_prompt()), None)).is_empty());
    assert!(sink.diagnostics().contains(&Diagnostic::UnknownOperation));
}

#[test]
fn test_catalog_from_file() {
    let path = std::env::temp_dir().join(format!("kaiseki-catalog-{}.json", std::process::id()));
    std::fs::write(&path, CUSTOM_CATALOG).unwrap();
    let loaded = Catalog::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.unwrap(), Catalog::from_json(CUSTOM_CATALOG).unwrap());

    let err = Catalog::from_file("/nonexistent/kaiseki/catalog.json").unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
    assert!(err.to_string().contains("catalog.json"));
}

#[test]
fn test_builtin_catalog_survives_serialization() {
    let builtin = Catalog::builtin();
    let json = serde_json::to_string(&builtin).unwrap();
    assert_eq!(Catalog::from_json(&json).unwrap(), builtin);
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: ExtractorConfig = serde_json::from_str(r#"{ "propagate_none": false }"#).unwrap();
    assert_eq!(
        config,
        ExtractorConfig {
            propagate_none: false,
            ..ExtractorConfig::default()
        }
    );
    assert_eq!(config.max_value_chars, 1023);
    assert_eq!(config.max_depth, 1024);
}
