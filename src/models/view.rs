use serde::{Deserialize, Serialize};

pub const TILE_PANE: &str = "tilePane";
pub const OVERLAY_PANE: &str = "overlayPane";
pub const MARKER_PANE: &str = "markerPane";
pub const MASK_PANE: &str = "maskPane";
pub const POPUP_PANE: &str = "popupPane";

/// A named drawing plane. Higher `z_index` draws on top regardless of
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    pub name: String,
    pub z_index: u32,
}

impl Pane {
    fn new(name: &str, z_index: u32) -> Self {
        Self {
            name: name.to_string(),
            z_index,
        }
    }
}

/// The mask pane sits above markers so the city mask hides stations outside it.
pub fn default_panes() -> Vec<Pane> {
    vec![
        Pane::new(TILE_PANE, 200),
        Pane::new(OVERLAY_PANE, 400),
        Pane::new(MARKER_PANE, 600),
        Pane::new(MASK_PANE, 650),
        Pane::new(POPUP_PANE, 700),
    ]
}

/// Initial camera and base layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub base_layer: String,
    #[serde(default = "default_panes")]
    pub panes: Vec<Pane>,
}

/// The active map view: which base layer is shown and which overlays are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub base_layer: String,
    pub panes: Vec<Pane>,
    /// Attached overlays, in attach order.
    pub attached: Vec<String>,
    /// Number of size recalculations requested so far.
    pub size_invalidations: u64,
}

impl MapView {
    pub fn new(settings: &ViewSettings) -> Self {
        Self {
            center: settings.center,
            zoom: settings.zoom,
            base_layer: settings.base_layer.clone(),
            panes: settings.panes.clone(),
            attached: Vec::new(),
            size_invalidations: 0,
        }
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.attached.iter().any(|n| n == name)
    }

    /// Returns false when the overlay was already attached.
    pub fn attach(&mut self, name: &str) -> bool {
        if self.is_attached(name) {
            return false;
        }
        self.attached.push(name.to_string());
        true
    }

    /// Returns false when the overlay was not attached.
    pub fn detach(&mut self, name: &str) -> bool {
        let before = self.attached.len();
        self.attached.retain(|n| n != name);
        self.attached.len() != before
    }

    pub fn set_base_layer(&mut self, name: &str) {
        self.base_layer = name.to_string();
    }

    pub fn pane(&self, name: &str) -> Option<&Pane> {
        self.panes.iter().find(|p| p.name == name)
    }

    /// Ask the renderer to recompute the map container size.
    pub fn invalidate_size(&mut self) {
        self.size_invalidations += 1;
    }
}
