//! Attribute popups: renamed fields, global exclusions, one line per attribute.

use std::collections::HashMap;

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotate::{layer_type, LAYER_TYPE_KEY};
use crate::html::escape;

/// Popup title when a feature carries no layer stamp.
pub const FALLBACK_TITLE: &str = "圖徵資訊";

fn default_excluded() -> Vec<String> {
    ["OBJECTID", "Shape_Leng", "Shape_Area", LAYER_TYPE_KEY, "X_co", "y_co"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Raw attribute key → human label, per display name, plus keys hidden for every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMappings {
    #[serde(default)]
    pub layers: HashMap<String, HashMap<String, String>>,
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
}

impl Default for FieldMappings {
    fn default() -> Self {
        Self {
            layers: HashMap::new(),
            excluded: default_excluded(),
        }
    }
}

/// One `label: value` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupLine {
    pub label: String,
    pub value: String,
}

/// Formatted popup for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<PopupLine>,
}

impl Popup {
    pub fn to_html(&self) -> String {
        let mut html = format!("<h4>{}</h4>", escape(&self.title));
        for line in &self.lines {
            html.push_str(&format!(
                "<b>{}</b>: {}<br>",
                escape(&line.label),
                escape(&line.value)
            ));
        }
        html
    }
}

impl FieldMappings {
    pub fn insert(&mut self, layer: &str, field: &str, label: &str) {
        self.layers
            .entry(layer.to_string())
            .or_default()
            .insert(field.to_string(), label.to_string());
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        self.excluded.iter().any(|k| k == key)
    }

    /// Build the popup for a feature's attributes, in attribute order.
    pub fn format(&self, properties: Option<&JsonObject>) -> Popup {
        let title = layer_type(properties).unwrap_or(FALLBACK_TITLE).to_string();
        let labels = self.layers.get(&title);

        let lines = properties
            .into_iter()
            .flatten()
            .filter(|(key, _)| !self.is_excluded(key))
            .map(|(key, value)| PopupLine {
                label: labels
                    .and_then(|l| l.get(key))
                    .cloned()
                    .unwrap_or_else(|| key.clone()),
                value: display_value(value),
            })
            .collect();

        Popup { title, lines }
    }
}

/// Render a scalar the way a browser stringifies it: strings bare, integral
/// numbers without a fractional part.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
                format!("{f:.0}")
            }
            _ => n.to_string(),
        },
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
