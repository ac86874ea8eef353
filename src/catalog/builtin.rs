use super::definition::{FieldSpec, PropagationRule, SlotMapping, TargetRule, TypeMatcher};
use crate::operation::Operation;

macro_rules! matcher {
    ($name:literal) => {
        TypeMatcher::Exact($name.to_string())
    };
    ([$($name:literal),+ $(,)?]) => {
        TypeMatcher::Rule(Operation::any_of([$($name),+]))
    };
}

macro_rules! propagate {
    ($class:tt => { $($slot:literal => $mapping:expr),+ $(,)? }) => {
        PropagationRule {
            class_type: matcher!($class),
            mapping: [$(($slot, $mapping)),+].into_iter().collect(),
        }
    };
}

macro_rules! target {
    ($class:tt => [$($input:literal),+ $(,)?]) => {
        TargetRule {
            class_type: matcher!($class),
            inputs: vec![$($input.to_string()),+],
        }
    };
}

fn follow(input: &str) -> SlotMapping {
    SlotMapping::Follow(input.to_string())
}

fn format(keys: &[&str], template: &str) -> SlotMapping {
    SlotMapping::Apply(Operation::format(keys.iter().copied(), template))
}

/// Propagation rules for the stock ComfyUI node set. Order is significant: first match wins.
pub(super) fn propagation_rules() -> Vec<PropagationRule> {
    vec![
        propagate!("TagSeparator" => { 0 => follow("pos_prompt"), 1 => follow("neg_prompt") }),
        propagate!([
            "ModelSamplingWaifuDiffusionV",
            "Mahiro",
            "ModelSamplingFlux",
            "IPAdapterUnifiedLoader",
            "IPAdapterAdvanced",
            "IPAdapter",
            "ApplyFluxIPAdapter",
            "ApplyAdvancedFluxIPAdapter",
        ] => { 0 => follow("model") }),
        propagate!(["ModelMergeSimple", "ModelMergeAdd", "ModelMergeSubstract"] => {
            0 => format(&["model1", "model2"], "{model1} [+] {model2}"),
        }),
        propagate!(["CheckpointLoaderSimple", "Checkpoint Loader"] => { 0 => follow("ckpt_name") }),
        propagate!(["UnetLoaderGGUF", "UNETLoader", "UnetLoaderGGUFAdvanced"] => { 0 => follow("unet_name") }),
        propagate!("CLIPTextEncode" => { 0 => follow("text"), 1 => follow("clip") }),
        propagate!("Seed" => { 0 => follow("seed") }),
        propagate!("KSampler" => { 0 => follow("latent_image") }),
        propagate!("VAEEncode" => { 0 => follow("pixels") }),
        propagate!("LatentBlend" => { 0 => follow("samples1") }),
        propagate!("VAEDecode" => { 0 => follow("samples") }),
        propagate!("ImageBlend" => { 0 => follow("image1") }),
        propagate!(["ImageScaleBy", "ImageUpscaleWithModel"] => { 0 => follow("image") }),
        propagate!("EmptyLatentImage" => { 0 => format(&["width", "height"], "{width} x {height}") }),
        // LoRA loaders are transparent for the model, but only when all of their inputs resolve.
        propagate!("LoraLoader" => { 0 => format(&["model", "lora_name", "strength_model"], "{model}") }),
        propagate!("CLIPTextEncodeSDXL" => { 0 => follow("text_g") }),
    ]
}

pub(super) fn target_rules() -> Vec<TargetRule> {
    vec![
        target!(["KSampler", "KSampler (WAS)"] => [
            "model",
            "positive",
            "negative",
            "latent_image",
            "sampler_name",
            "scheduler",
            "cfg",
            "steps",
            "seed",
            "denoise",
        ]),
        target!(["KSamplerAdvanced"] => [
            "model",
            "positive",
            "negative",
            "latent_image",
            "sampler_name",
            "scheduler",
            "cfg",
            "steps",
            "noise_seed",
        ]),
        target!("LoraLoader" => ["lora_name", "strength_model"]),
    ]
}

pub(super) fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("models", &["{model}"], Some("Model")),
        FieldSpec::new("pos_prompts", &["{positive}"], Some("Prompt")),
        FieldSpec::new("neg_prompts", &["{negative}"], Some("Negative Prompt")),
        FieldSpec::new("img_gen_sizes", &["{latent_image}"], Some("Size")),
        FieldSpec::new("seeds", &["{seed}", "{noise_seed}"], Some("Seed")),
        FieldSpec::new("steps", &["{steps}"], Some("Steps")),
        FieldSpec::new("cfg", &["{cfg:.1f}"], Some("CFG Scale")),
        FieldSpec::new("sampler_name", &["{sampler_name}"], Some("Sampler")),
        FieldSpec::new("scheduler", &["{scheduler}"], Some("Scheduler")),
        FieldSpec::new("denoise", &["{denoise:.2f}"], Some("Denoise")),
        FieldSpec::new(
            "loras",
            &["<{lora_name}> (Strength: {strength_model:.2f})"],
            Some("LoRA"),
        ),
    ]
}
