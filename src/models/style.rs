use serde::{Deserialize, Serialize};

/// Fill color used for "no data" cells.
pub const TRANSPARENT: &str = "transparent";

/// Path style for one rendered feature.
///
/// Field names serialize to the option names the browser renderer expects
/// (`fillColor`, `fillOpacity`, `color`, `weight`, `opacity`, `pane`,
/// `interactive`). Unset fields are left to the renderer's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    /// Stroke color.
    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Stroke width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Stroke opacity.
    #[serde(rename = "opacity", skip_serializing_if = "Option::is_none")]
    pub stroke_opacity: Option<f64>,
    /// Named map pane the feature is drawn into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pane: Option<String>,
    /// `Some(false)` makes the feature ignore clicks (no popup).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
}

impl Style {
    pub fn is_interactive(&self) -> bool {
        self.interactive.unwrap_or(true)
    }

    /// Overwrite both fill and stroke opacity, as an opacity slider does.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.fill_opacity = Some(opacity);
        self.stroke_opacity = Some(opacity);
    }
}

/// Fixed outline drawn around every polygon of a classified layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            color: "white".to_string(),
            weight: 1.0,
            opacity: None,
        }
    }
}
