use chrono::{DateTime, Utc};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::{Deserialize, Serialize};

use crate::classify::StyleRule;
use crate::popup::Popup;

use super::Style;

/// Where a layer's content comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSource {
    /// A GeoJSON FeatureCollection, relative to the data location or absolute.
    Geojson { path: String },
    /// A raster tile template; nothing is fetched at load time.
    Tiles { url: String, attribution: String },
}

/// Static description of one overlay, created once from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Display name; the key linking the layer to its legend, field labels and popup title.
    pub name: String,
    pub source: LayerSource,
    /// Style function for path geometries. `None` leaves renderer defaults.
    #[serde(default)]
    pub style: Option<StyleRule>,
    /// Attach to the map as soon as the layer is loaded.
    #[serde(default)]
    pub visible: bool,
    /// How point geometries are drawn. `None` means the default marker.
    #[serde(default)]
    pub point: Option<PointStrategy>,
}

impl LayerDescriptor {
    pub fn geojson(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: LayerSource::Geojson { path: path.into() },
            style: None,
            visible: false,
            point: None,
        }
    }

    pub fn with_style(mut self, style: StyleRule) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_point(mut self, point: PointStrategy) -> Self {
        self.point = Some(point);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Image icon for point features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSpec {
    pub icon_url: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

/// Point-rendering strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointStrategy {
    Icon { icon: IconSpec, pane: String },
}

/// How a point feature is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// `None` draws the renderer's standard marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconSpec>,
    pub pane: String,
}

impl Marker {
    pub fn from_strategy(strategy: Option<&PointStrategy>) -> Self {
        match strategy {
            Some(PointStrategy::Icon { icon, pane }) => Self {
                icon: Some(icon.clone()),
                pane: pane.clone(),
            },
            None => Self {
                icon: None,
                pane: super::view::MARKER_PANE.to_string(),
            },
        }
    }
}

/// Visual encoding of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    Path(Style),
    Marker(Marker),
}

/// One styled feature with its popup.
#[derive(Debug, Clone)]
pub struct RenderedFeature {
    pub feature: Feature,
    pub symbol: Symbol,
    /// `None` for non-interactive features.
    pub popup: Option<Popup>,
}

impl RenderedFeature {
    pub fn properties(&self) -> Option<&JsonObject> {
        self.feature.properties.as_ref()
    }
}

/// Styled representation of one GeoJSON source.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub name: String,
    pub features: Vec<RenderedFeature>,
    /// Last value applied by the opacity control.
    pub opacity: f64,
    pub loaded_at: DateTime<Utc>,
}

impl FeatureLayer {
    /// GeoJSON with each feature's symbol and popup markup attached as
    /// foreign members, ready for the browser renderer.
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|rendered| {
                let mut feature = rendered.feature.clone();
                let members = feature.foreign_members.get_or_insert_with(JsonObject::new);
                match &rendered.symbol {
                    Symbol::Path(style) => {
                        members.insert("style".to_string(), serde_json::json!(style));
                    }
                    Symbol::Marker(marker) => {
                        members.insert("marker".to_string(), serde_json::json!(marker));
                    }
                }
                if let Some(popup) = &rendered.popup {
                    members.insert("popup".to_string(), popup.to_html().into());
                }
                feature
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Raster overlay whose opacity is set for the layer as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub opacity: f64,
}

/// The live, map-attachable form of a layer.
#[derive(Debug, Clone)]
pub enum RenderedLayer {
    Features(FeatureLayer),
    Tiles(TileLayer),
}

/// Which opacity mechanism a change went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum OpacityPath {
    /// Style re-applied to every feature that has a path style.
    PerFeature { restyled: usize },
    /// Layer-level opacity setter.
    LayerLevel,
}

impl RenderedLayer {
    pub fn name(&self) -> &str {
        match self {
            Self::Features(layer) => &layer.name,
            Self::Tiles(layer) => &layer.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Features(_) => "features",
            Self::Tiles(_) => "tiles",
        }
    }

    pub fn opacity(&self) -> f64 {
        match self {
            Self::Features(layer) => layer.opacity,
            Self::Tiles(layer) => layer.opacity,
        }
    }

    pub fn feature_count(&self) -> usize {
        match self {
            Self::Features(layer) => layer.features.len(),
            Self::Tiles(_) => 0,
        }
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Features(layer) => Some(layer.loaded_at),
            Self::Tiles(_) => None,
        }
    }

    /// Apply an opacity slider value, clamped to `[0, 1]`.
    ///
    /// Markers have no path style and keep their look.
    pub fn set_opacity(&mut self, opacity: f64) -> OpacityPath {
        let opacity = opacity.clamp(0.0, 1.0);
        match self {
            Self::Features(layer) => {
                layer.opacity = opacity;
                let mut restyled = 0;
                for feature in &mut layer.features {
                    if let Symbol::Path(style) = &mut feature.symbol {
                        style.set_opacity(opacity);
                        restyled += 1;
                    }
                }
                OpacityPath::PerFeature { restyled }
            }
            Self::Tiles(layer) => {
                layer.opacity = opacity;
                OpacityPath::LayerLevel
            }
        }
    }
}
