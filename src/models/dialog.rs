use serde::{Deserialize, Serialize};

use super::MapView;

/// Title + HTML body confirmation dialog with the data attribution text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDialog {
    pub title: String,
    pub body_html: String,
    pub confirm_text: String,
    #[serde(default)]
    pub allow_outside_click: bool,
    #[serde(default = "default_true")]
    pub allow_escape_key: bool,
}

fn default_true() -> bool {
    true
}

impl InfoDialog {
    /// Opening the dialog shifts the page layout, so the map must re-measure.
    pub fn open(&self, view: &mut MapView) {
        tracing::debug!("Opening dialog `{}`", self.title);
        view.invalidate_size();
    }

    pub fn close(&self, view: &mut MapView) {
        tracing::debug!("Closing dialog `{}`", self.title);
        view.invalidate_size();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_panes, ViewSettings};

    #[test]
    fn open_and_close_each_recalculate_map_size() {
        let dialog = InfoDialog {
            title: "About".to_string(),
            body_html: "<p>data</p>".to_string(),
            confirm_text: "Close".to_string(),
            allow_outside_click: false,
            allow_escape_key: true,
        };
        let mut view = MapView::new(&ViewSettings {
            center: [0.0, 0.0],
            zoom: 3,
            base_layer: "osm".to_string(),
            panes: default_panes(),
        });

        dialog.open(&mut view);
        dialog.close(&mut view);

        assert_eq!(view.size_invalidations, 2);
    }
}
