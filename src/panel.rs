//! Control surface: base-layer choice plus one overlay entry per loaded
//! layer, each with its legend and opacity control.
//!
//! Built only after every load has settled. Entries are keyed by display
//! name straight from the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::html::escape;
use crate::legend::{legend_html, LegendEntry, Legends};
use crate::models::{BaseMap, MapView};
use crate::registry::LayerRegistry;

/// Range input driving a layer's opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityControl {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl OpacityControl {
    pub fn new(value: f64) -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            step: 0.05,
            value,
        }
    }
}

impl Default for OpacityControl {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayerEntry {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEntry {
    pub name: String,
    /// `features` or `tiles`.
    pub kind: String,
    /// Attached to the map view.
    pub visible: bool,
    pub feature_count: usize,
    pub legend: Vec<LegendEntry>,
    pub opacity: OpacityControl,
    /// When the layer's document was fetched. Tile layers have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPanel {
    pub collapsed: bool,
    pub position: String,
    pub base_layers: Vec<BaseLayerEntry>,
    pub overlays: Vec<OverlayEntry>,
}

impl ControlPanel {
    /// Build the panel in the declared overlay order, skipping layers that
    /// failed to load.
    pub fn build<S: AsRef<str>>(
        registry: &LayerRegistry,
        view: &MapView,
        order: &[S],
        base_maps: &[BaseMap],
        legends: &Legends,
    ) -> Self {
        let base_layers = base_maps
            .iter()
            .map(|base| BaseLayerEntry {
                name: base.name.clone(),
                active: base.name == view.base_layer,
            })
            .collect();

        let overlays = registry
            .ordered(order)
            .into_iter()
            .map(|(name, layer)| OverlayEntry {
                name: name.to_string(),
                kind: layer.kind().to_string(),
                visible: view.is_attached(name),
                feature_count: layer.feature_count(),
                legend: legends.render(name),
                opacity: OpacityControl::new(layer.opacity()),
                loaded_at: layer.loaded_at(),
            })
            .collect();

        Self {
            collapsed: true,
            position: "topright".to_string(),
            base_layers,
            overlays,
        }
    }

    pub fn overlay(&self, name: &str) -> Option<&OverlayEntry> {
        self.overlays.iter().find(|o| o.name == name)
    }

    /// Panel markup. Every control carries its layer's display name in a
    /// `data-layer` attribute.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<form class=\"layer-panel\">\n<div class=\"base-layers\">\n");
        for base in &self.base_layers {
            html.push_str(&format!(
                "<label><input type=\"radio\" name=\"base-layer\" value=\"{name}\"{checked}> {name}</label>\n",
                name = escape(&base.name),
                checked = if base.active { " checked" } else { "" },
            ));
        }
        html.push_str("</div>\n<div class=\"separator\"></div>\n<div class=\"overlays\">\n");

        for (i, overlay) in self.overlays.iter().enumerate() {
            let name = escape(&overlay.name);
            html.push_str(&format!(
                "<label class=\"overlay\" data-layer=\"{name}\"><span><input type=\"checkbox\" data-layer=\"{name}\"{checked}> {name}</span>\
                 <input type=\"range\" class=\"opacity\" data-layer=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\"></label>\n",
                checked = if overlay.visible { " checked" } else { "" },
                min = overlay.opacity.min,
                max = overlay.opacity.max,
                step = overlay.opacity.step,
                value = overlay.opacity.value,
            ));
            if !overlay.legend.is_empty() {
                html.push_str(&format!(
                    "<div class=\"legend-container\">{}</div>\n",
                    legend_html(&overlay.legend)
                ));
                if i + 1 < self.overlays.len() {
                    html.push_str("<div class=\"separator\"></div>\n");
                }
            }
        }
        html.push_str("</div>\n</form>\n");
        html
    }
}
