use serde::{Deserialize, Serialize};

/// Values longer than this many characters are cut down to it, ending in `...`.
pub const DEFAULT_MAX_VALUE_CHARS: usize = 1023;

/// Upper bound on the number of nodes on one link path from a target input.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Tunables for a single [`Extractor`](crate::extractor::Extractor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// When a formatting rule is missing one of its inputs (or that input resolves to
    /// nothing), drop the whole value instead of leaving a `{key}` placeholder.
    pub propagate_none: bool,
    pub max_value_chars: usize,
    /// Paths longer than this stop with nothing, like a cycle, and report `Diagnostic::DepthExceeded`.
    pub max_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            propagate_none: true,
            max_value_chars: DEFAULT_MAX_VALUE_CHARS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
