//! Static legends keyed by display name.
//!
//! Legend colors are authored by hand next to the bucket tables; keeping the
//! two in agreement is the author's job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::html::escape;

/// Swatch border when an item does not override it.
pub const DEFAULT_BORDER: &str = "1px solid #999";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub color: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

impl LegendItem {
    pub fn new(color: &str, text: &str) -> Self {
        Self {
            color: color.to_string(),
            text: text.to_string(),
            border: None,
        }
    }

    pub fn with_border(mut self, border: &str) -> Self {
        self.border = Some(border.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendDefinition {
    pub title: String,
    pub items: Vec<LegendItem>,
}

/// One rendered legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub border: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Legends(HashMap<String, LegendDefinition>);

impl Legends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, definition: LegendDefinition) {
        self.0.insert(name.to_string(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&LegendDefinition> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Rows for a layer's legend; empty when the layer has none.
    pub fn render(&self, name: &str) -> Vec<LegendEntry> {
        let Some(definition) = self.get(name) else {
            return Vec::new();
        };
        definition
            .items
            .iter()
            .map(|item| LegendEntry {
                color: item.color.clone(),
                border: item
                    .border
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BORDER.to_string()),
                text: item.text.clone(),
            })
            .collect()
    }
}

/// Swatch-and-label markup for a legend block.
pub fn legend_html(entries: &[LegendEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "<i class=\"legend-swatch\" style=\"background:{}; border: {};\"></i> {}<br style=\"clear: both;\">",
                escape(&entry.color),
                escape(&entry.border),
                escape(&entry.text)
            )
        })
        .collect()
}
