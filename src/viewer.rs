//! Shared viewer state: the configuration, the layer registry and the map
//! view, behind one lock for the HTTP handlers.

use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ViewerConfig;
use crate::html::render_index;
use crate::legend::LegendEntry;
use crate::loader::{load_all, DataSource, LoadReport};
use crate::models::{BaseMap, InfoDialog, MapView, OpacityPath, RenderedLayer, TileLayer};
use crate::panel::{ControlPanel, OverlayEntry};
use crate::popup::Popup;
use crate::registry::LayerRegistry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("Layer not found: {0}")]
    UnknownLayer(String),

    #[error("Base layer not found: {0}")]
    UnknownBaseLayer(String),

    #[error("Feature {index} not found in layer {layer}")]
    UnknownFeature { layer: String, index: usize },

    #[error("Feature {index} in layer {layer} has no popup")]
    NoPopup { layer: String, index: usize },
}

/// What the browser renderer receives for one overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LayerDocument {
    Features(FeatureCollection),
    Tiles {
        #[serde(rename = "type")]
        kind: &'static str,
        #[serde(flatten)]
        layer: TileLayer,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpacityChange {
    pub name: String,
    pub opacity: f64,
    pub path: OpacityPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityChange {
    pub name: String,
    pub visible: bool,
    /// False when the layer was already in the requested state.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseMaps {
    pub active: String,
    pub base_maps: Vec<BaseMap>,
}

struct ViewerState {
    config: ViewerConfig,
    registry: LayerRegistry,
    view: MapView,
    report: LoadReport,
    assets: Option<PathBuf>,
}

#[derive(Clone)]
pub struct Viewer {
    inner: Arc<RwLock<ViewerState>>,
}

impl Viewer {
    /// Load every configured layer and wait for all loads to settle.
    pub async fn load(config: ViewerConfig, source: &DataSource) -> Self {
        let mut registry = LayerRegistry::new();
        let mut view = MapView::new(&config.view);

        let report = load_all(
            source,
            &config.layers,
            &config.field_mappings,
            &mut registry,
            &mut view,
        )
        .await;

        tracing::info!(
            "{} of {} layers loaded ({} failed)",
            report.registered(),
            report.loads().len(),
            report.failed()
        );

        // The panel is built now that every load has settled.
        view.invalidate_size();
        let viewer = Self::from_parts(config, registry, view, report);
        if let Some(root) = source.asset_root() {
            viewer.write().assets = Some(root.to_path_buf());
        }
        viewer
    }

    pub fn from_parts(
        config: ViewerConfig,
        registry: LayerRegistry,
        view: MapView,
        report: LoadReport,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewerState {
                config,
                registry,
                view,
                report,
                assets: None,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewerState> {
        self.inner.read().expect("viewer lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewerState> {
        self.inner.write().expect("viewer lock poisoned")
    }

    /// Directory of static assets (marker icons) served next to the page.
    pub fn asset_dir(&self) -> Option<PathBuf> {
        self.read().assets.clone()
    }

    pub fn title(&self) -> String {
        self.read().config.title.clone()
    }

    pub fn panel(&self) -> ControlPanel {
        let state = self.read();
        ControlPanel::build(
            &state.registry,
            &state.view,
            &state.config.overlay_order,
            &state.config.base_maps,
            &state.config.legends,
        )
    }

    /// Overlay summaries in display order.
    pub fn layers(&self) -> Vec<OverlayEntry> {
        self.panel().overlays
    }

    pub fn layer_document(&self, name: &str) -> Result<LayerDocument, ViewerError> {
        let state = self.read();
        match state.registry.get(name) {
            Some(RenderedLayer::Features(layer)) => Ok(LayerDocument::Features(layer.to_geojson())),
            Some(RenderedLayer::Tiles(layer)) => Ok(LayerDocument::Tiles {
                kind: "tiles",
                layer: layer.clone(),
            }),
            None => Err(ViewerError::UnknownLayer(name.to_string())),
        }
    }

    pub fn set_opacity(&self, name: &str, opacity: f64) -> Result<OpacityChange, ViewerError> {
        let mut state = self.write();
        let layer = state
            .registry
            .get_mut(name)
            .ok_or_else(|| ViewerError::UnknownLayer(name.to_string()))?;

        let path = layer.set_opacity(opacity);
        tracing::debug!("Layer `{}` opacity -> {} ({:?})", name, layer.opacity(), path);

        Ok(OpacityChange {
            name: name.to_string(),
            opacity: layer.opacity(),
            path,
        })
    }

    pub fn set_visibility(&self, name: &str, visible: bool) -> Result<VisibilityChange, ViewerError> {
        let mut state = self.write();
        if !state.registry.contains(name) {
            return Err(ViewerError::UnknownLayer(name.to_string()));
        }

        let changed = if visible {
            state.view.attach(name)
        } else {
            state.view.detach(name)
        };
        tracing::debug!("Layer `{}` visible -> {} (changed: {})", name, visible, changed);

        Ok(VisibilityChange {
            name: name.to_string(),
            visible,
            changed,
        })
    }

    pub fn popup(&self, name: &str, index: usize) -> Result<Popup, ViewerError> {
        let state = self.read();
        let layer = state
            .registry
            .get(name)
            .ok_or_else(|| ViewerError::UnknownLayer(name.to_string()))?;

        let unknown = || ViewerError::UnknownFeature {
            layer: name.to_string(),
            index,
        };
        let RenderedLayer::Features(layer) = layer else {
            return Err(unknown());
        };
        let feature = layer.features.get(index).ok_or_else(unknown)?;

        feature.popup.clone().ok_or_else(|| ViewerError::NoPopup {
            layer: name.to_string(),
            index,
        })
    }

    /// Legend rows for a layer; empty when it has none.
    pub fn legend(&self, name: &str) -> Vec<LegendEntry> {
        self.read().config.legends.render(name)
    }

    pub fn base_maps(&self) -> BaseMaps {
        let state = self.read();
        BaseMaps {
            active: state.view.base_layer.clone(),
            base_maps: state.config.base_maps.clone(),
        }
    }

    pub fn set_base_layer(&self, name: &str) -> Result<BaseMaps, ViewerError> {
        {
            let mut state = self.write();
            if state.config.base_map(name).is_none() {
                return Err(ViewerError::UnknownBaseLayer(name.to_string()));
            }
            state.view.set_base_layer(name);
        }
        tracing::debug!("Base layer -> {}", name);
        Ok(self.base_maps())
    }

    pub fn view(&self) -> MapView {
        self.read().view.clone()
    }

    pub fn about(&self) -> InfoDialog {
        self.read().config.about.clone()
    }

    pub fn open_about(&self) -> MapView {
        let mut state = self.write();
        let state = &mut *state;
        state.config.about.open(&mut state.view);
        state.view.clone()
    }

    pub fn close_about(&self) -> MapView {
        let mut state = self.write();
        let state = &mut *state;
        state.config.about.close(&mut state.view);
        state.view.clone()
    }

    pub fn report(&self) -> LoadReport {
        self.read().report.clone()
    }

    pub fn index_html(&self) -> String {
        let panel = self.panel();
        let state = self.read();
        render_index(
            &state.config.title,
            &panel,
            &state.view,
            &state.config.base_maps,
            &state.config.about,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::preset::{CITY_MASK, METRO_GRID, METRO_LINES};
    use crate::annotate::annotate;
    use crate::loader::{parse_collection, render_layer, LoadOutcome};

    const GRID: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "id": 12, "Mv_Act": 300, "OBJECTID": 4 },
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] } },
            { "type": "Feature", "properties": { "id": 13, "Mv_Act": 7000 },
              "geometry": { "type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,0]]] } }
        ]
    }"#;

    const MASK: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] } }
        ]
    }"#;

    fn viewer() -> Viewer {
        let config = ViewerConfig::default();
        let mut registry = LayerRegistry::new();
        let mut view = MapView::new(&config.view);

        for (name, body) in [(METRO_GRID, GRID), (CITY_MASK, MASK)] {
            let descriptor = config.descriptor(name).unwrap();
            let mut collection = parse_collection(body).unwrap();
            annotate(&mut collection, name);
            registry.insert(RenderedLayer::Features(render_layer(
                collection,
                descriptor,
                &config.field_mappings,
            )));
            view.attach(name);
        }

        let mut report = LoadReport::pending(&config.layers);
        for load in config.layers.iter() {
            let outcome = if registry.contains(&load.name) {
                LoadOutcome::RegisteredVisible
            } else {
                LoadOutcome::Failed {
                    error: "missing".to_string(),
                }
            };
            report.settle(&load.name, outcome);
        }

        Viewer::from_parts(config, registry, view, report)
    }

    #[test]
    fn summaries_skip_unloaded_layers() {
        let viewer = viewer();
        let names: Vec<_> = viewer.layers().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec![METRO_GRID.to_string(), CITY_MASK.to_string()]);
        assert_eq!(
            viewer.report().outcome(METRO_GRID),
            Some(&LoadOutcome::RegisteredVisible)
        );
    }

    #[test]
    fn opacity_restyles_feature_layers() {
        let viewer = viewer();
        let change = viewer.set_opacity(METRO_GRID, 0.3).unwrap();
        assert_eq!(change.path, OpacityPath::PerFeature { restyled: 2 });
        assert_eq!(viewer.panel().overlay(METRO_GRID).unwrap().opacity.value, 0.3);

        assert_eq!(
            viewer.set_opacity(METRO_LINES, 0.3),
            Err(ViewerError::UnknownLayer(METRO_LINES.to_string()))
        );
    }

    #[test]
    fn visibility_toggles_attachment() {
        let viewer = viewer();
        let change = viewer.set_visibility(METRO_GRID, false).unwrap();
        assert!(change.changed);
        assert!(!viewer.view().is_attached(METRO_GRID));

        let again = viewer.set_visibility(METRO_GRID, false).unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn popups_follow_field_mappings() {
        let viewer = viewer();
        let popup = viewer.popup(METRO_GRID, 0).unwrap();
        assert_eq!(popup.title, METRO_GRID);
        assert!(popup.lines.iter().all(|l| l.label != "OBJECTID"));

        assert!(matches!(
            viewer.popup(METRO_GRID, 9),
            Err(ViewerError::UnknownFeature { index: 9, .. })
        ));
        assert!(matches!(
            viewer.popup(CITY_MASK, 0),
            Err(ViewerError::NoPopup { .. })
        ));
    }

    #[test]
    fn dialog_requests_relayout() {
        let viewer = viewer();
        let before = viewer.view().size_invalidations;
        viewer.open_about();
        let after = viewer.close_about();
        assert_eq!(after.size_invalidations, before + 2);
    }

    #[test]
    fn switches_base_layer() {
        let viewer = viewer();
        let maps = viewer.set_base_layer("OpenStreetMap").unwrap();
        assert_eq!(maps.active, "OpenStreetMap");
        assert!(viewer.set_base_layer("nope").is_err());
    }

    #[test]
    fn index_page_lists_loaded_overlays() {
        let html = viewer().index_html();
        assert!(html.contains(METRO_GRID));
        assert!(!html.contains(&format!("data-layer=\"{}\"", METRO_LINES)));
    }
}
