//! Viewer page rendering.

mod page;

use serde::Serialize;

use crate::models::{BaseMap, InfoDialog, MapView};
use crate::panel::ControlPanel;

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Data the page script needs to build the map.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Bootstrap<'a> {
    api: &'a str,
    view: &'a MapView,
    base_maps: &'a [BaseMap],
    overlays: Vec<&'a str>,
    about: &'a InfoDialog,
}

/// Render the viewer page for the current panel and view.
pub fn render_index(
    title: &str,
    panel: &ControlPanel,
    view: &MapView,
    base_maps: &[BaseMap],
    about: &InfoDialog,
) -> String {
    let bootstrap = Bootstrap {
        api: "/api/v1",
        view,
        base_maps,
        overlays: panel.overlays.iter().map(|o| o.name.as_str()).collect(),
        about,
    };
    // `</` must not appear inside the inline script.
    let bootstrap = serde_json::to_string(&bootstrap)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    page::INDEX_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{PANEL}}", &panel.to_html())
        .replace("{{BOOTSTRAP}}", &bootstrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_panes, ViewSettings};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("捷運路線"), "捷運路線");
    }

    #[test]
    fn page_embeds_panel_and_bootstrap() {
        let view = MapView::new(&ViewSettings {
            center: [25.03, 121.55],
            zoom: 13,
            base_layer: "osm".to_string(),
            panes: default_panes(),
        });
        let panel = ControlPanel {
            collapsed: true,
            position: "topright".to_string(),
            base_layers: vec![],
            overlays: vec![],
        };
        let about = InfoDialog {
            title: "About".to_string(),
            body_html: "<p>x</p>".to_string(),
            confirm_text: "Close".to_string(),
            allow_outside_click: false,
            allow_escape_key: true,
        };

        let html = render_index("Ridership <map>", &panel, &view, &[], &about);

        assert!(html.contains("<title>Ridership &lt;map&gt;</title>"));
        assert!(html.contains("class=\"layer-panel\""));
        assert!(html.contains("\"center\":[25.03,121.55]"));
        assert!(html.contains("<p>x<\\/p>"));
        assert!(!html.contains("{{"));
    }
}
