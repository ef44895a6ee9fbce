use serde::{Deserialize, Serialize};

/// A base tile layer. Exactly one base layer is shown at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseMap {
    pub name: String,
    /// Tile URL template with `{z}`, `{x}`, `{y}` (and optionally `{s}`) placeholders.
    pub url: String,
    pub attribution: String,
}
