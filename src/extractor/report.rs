use ahash::AHashMap;
use serde::Serialize;

/// The flat result handed to callers: display name -> value.
pub type ParamMap = AHashMap<String, String>;

/// Every distinct value found for one output field, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    pub key: String,
    pub display_name: String,
    pub values: Vec<String>,
}

/// The full outcome of an extraction, before flattening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub fields: Vec<ExtractedField>,
    /// Display name -> text the user typed into a primitive node. Applied last.
    pub overrides: Vec<(String, String)>,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.overrides.is_empty()
    }

    pub fn field(&self, display_name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.display_name == display_name)
    }

    /// Collapses the report into one value per display name.
    ///
    /// When a field has several values, the one discovered last wins; overrides beat both.
    pub fn flatten(&self) -> ParamMap {
        let mut params = ParamMap::new();
        for field in &self.fields {
            for value in &field.values {
                params.insert(field.display_name.clone(), value.clone());
            }
        }
        for (name, value) in &self.overrides {
            params.insert(name.clone(), value.clone());
        }
        params
    }
}

/// Caps `value` at `max_chars` characters, marking the cut with up to three dots.
///
/// The marker counts against the cap, so the result never exceeds `max_chars`.
pub(super) fn truncate(value: String, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value;
    }
    let marker = max_chars.min(3);
    let mut truncated: String = value.chars().take(max_chars - marker).collect();
    truncated.extend(std::iter::repeat_n('.', marker));
    truncated
}

/// Display names in the order they are usually read. Other names follow alphabetically.
pub const DISPLAY_ORDER: [&str; 10] = [
    "Prompt",
    "Negative Prompt",
    "Model",
    "LoRA",
    "Seed",
    "Steps",
    "CFG Scale",
    "Sampler",
    "Scheduler",
    "Denoise",
];

/// The entries of `params` in presentation order.
pub fn display_ordered(params: &ParamMap) -> Vec<(&str, &str)> {
    let rank = |name: &str| {
        DISPLAY_ORDER
            .iter()
            .position(|known| *known == name)
            .unwrap_or(DISPLAY_ORDER.len())
    };
    let mut entries: Vec<(&str, &str)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    entries.sort_by(|a, b| rank(a.0).cmp(&rank(b.0)).then_with(|| a.0.cmp(b.0)));
    entries
}
