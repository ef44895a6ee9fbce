//! ASCII tree rendering of the control panel and load outcomes.

use crate::loader::{LoadOutcome, LoadReport};
use crate::panel::ControlPanel;

const VISIBLE: char = '●';
const HIDDEN: char = '○';
const FAILED: char = '✗';
const SWATCH: char = '■';

struct Node {
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }
}

fn marked(symbol: char, label: &str) -> String {
    format!("{} {}", symbol, label)
}

/// Render the panel as an ASCII tree.
///
/// Example output:
/// ```text
/// Taipei ridership
/// ├── Base layers
/// │   ├── ● gray
/// │   └── ○ OpenStreetMap
/// ├── Overlays
/// │   ├── ● grid (12 features, opacity 1)
/// │   │   ├── ■ #580954ff ≥ 6,000
/// │   │   └── ■ transparent 0
/// │   └── ○ stations (108 features, opacity 1)
/// └── Failed
///     └── ✗ bus stops: HTTP error! status: 404
/// ```
pub fn render_panel(title: &str, panel: &ControlPanel, report: &LoadReport) -> String {
    let base_layers = panel
        .base_layers
        .iter()
        .map(|base| {
            let symbol = if base.active { VISIBLE } else { HIDDEN };
            Node::leaf(marked(symbol, &base.name))
        })
        .collect();

    let overlays = panel
        .overlays
        .iter()
        .map(|overlay| {
            let symbol = if overlay.visible { VISIBLE } else { HIDDEN };
            let detail = match overlay.kind.as_str() {
                "tiles" => format!("tiles, opacity {}", overlay.opacity.value),
                _ => format!(
                    "{} features, opacity {}",
                    overlay.feature_count, overlay.opacity.value
                ),
            };
            Node {
                label: marked(symbol, &format!("{} ({})", overlay.name, detail)),
                children: overlay
                    .legend
                    .iter()
                    .map(|entry| Node::leaf(marked(SWATCH, &format!("{} {}", entry.color, entry.text))))
                    .collect(),
            }
        })
        .collect();

    let mut sections = vec![
        Node {
            label: "Base layers".to_string(),
            children: base_layers,
        },
        Node {
            label: "Overlays".to_string(),
            children: overlays,
        },
    ];

    let failed: Vec<_> = report
        .loads()
        .iter()
        .filter_map(|load| match &load.outcome {
            LoadOutcome::Failed { error } => {
                Some(Node::leaf(marked(FAILED, &format!("{}: {}", load.name, error))))
            }
            _ => None,
        })
        .collect();
    if !failed.is_empty() {
        sections.push(Node {
            label: "Failed".to_string(),
            children: failed,
        });
    }

    let mut output = String::new();
    output.push_str(title);
    output.push('\n');
    for (i, node) in sections.iter().enumerate() {
        render_node(&mut output, node, "", i == sections.len() - 1);
    }
    output
}

fn render_node(output: &mut String, node: &Node, prefix: &str, is_last: bool) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(prefix);
    output.push_str(branch);
    output.push_str(&node.label);
    output.push('\n');

    let continuation = if is_last { "    " } else { "│   " };
    let child_prefix = format!("{}{}", prefix, continuation);
    for (i, child) in node.children.iter().enumerate() {
        render_node(output, child, &child_prefix, i == node.children.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::LegendEntry;
    use crate::models::LayerDescriptor;
    use crate::panel::{BaseLayerEntry, OpacityControl, OverlayEntry};

    fn panel() -> ControlPanel {
        ControlPanel {
            collapsed: true,
            position: "topright".to_string(),
            base_layers: vec![
                BaseLayerEntry {
                    name: "gray".to_string(),
                    active: true,
                },
                BaseLayerEntry {
                    name: "osm".to_string(),
                    active: false,
                },
            ],
            overlays: vec![
                OverlayEntry {
                    name: "grid".to_string(),
                    kind: "features".to_string(),
                    visible: true,
                    feature_count: 12,
                    legend: vec![LegendEntry {
                        color: "#580954ff".to_string(),
                        border: "1px solid #999".to_string(),
                        text: "≥ 6,000".to_string(),
                    }],
                    opacity: OpacityControl::new(1.0),
                    loaded_at: None,
                },
                OverlayEntry {
                    name: "relief".to_string(),
                    kind: "tiles".to_string(),
                    visible: false,
                    feature_count: 0,
                    legend: vec![],
                    opacity: OpacityControl::new(0.5),
                    loaded_at: None,
                },
            ],
        }
    }

    fn report(loads: Vec<(&str, LoadOutcome)>) -> LoadReport {
        let descriptors: Vec<_> = loads
            .iter()
            .map(|(name, _)| LayerDescriptor::geojson(*name, "layer.geojson"))
            .collect();
        let mut report = LoadReport::pending(&descriptors);
        for (name, outcome) in loads {
            report.settle(name, outcome);
        }
        report
    }

    #[test]
    fn test_panel_without_failures() {
        let output = render_panel(
            "Viewer",
            &panel(),
            &report(vec![
                ("grid", LoadOutcome::RegisteredVisible),
                ("relief", LoadOutcome::RegisteredHidden),
            ]),
        );
        assert_eq!(
            output,
            "Viewer\n\
             ├── Base layers\n\
             │   ├── ● gray\n\
             │   └── ○ osm\n\
             └── Overlays\n    \
                 ├── ● grid (12 features, opacity 1)\n    \
                 │   └── ■ #580954ff ≥ 6,000\n    \
                 └── ○ relief (tiles, opacity 0.5)\n"
        );
    }

    #[test]
    fn test_failures_listed_last() {
        let output = render_panel(
            "Viewer",
            &panel(),
            &report(vec![
                ("grid", LoadOutcome::RegisteredVisible),
                (
                    "stops",
                    LoadOutcome::Failed {
                        error: "HTTP error! status: 404".to_string(),
                    },
                ),
            ]),
        );
        assert!(output.contains("├── Overlays\n"));
        assert!(output.ends_with("└── Failed\n    └── ✗ stops: HTTP error! status: 404\n"));
    }
}
