use geojson::JsonObject;
use ridership_map::annotate::{annotate, layer_type};
use ridership_map::classify::StyleRule;
use ridership_map::config::preset::{BUS_GRID, CITY_MASK, METRO_GRID, METRO_LINES};
use ridership_map::config::ViewerConfig;
use ridership_map::loader::{load_all, parse_collection, DataSource, LoadOutcome};
use ridership_map::models::*;
use ridership_map::registry::LayerRegistry;
use serde_json::{json, Value};
use speculate2::speculate;

fn props(value: Value) -> JsonObject {
    value.as_object().cloned().expect("properties must be an object")
}

fn fill(rule: &StyleRule, value: Value) -> String {
    rule.style_for(Some(&props(value)))
        .fill_color
        .expect("threshold styles always fill")
}

fn tiles(name: &str) -> RenderedLayer {
    RenderedLayer::Tiles(TileLayer {
        name: name.to_string(),
        url: "https://tiles.example/{z}/{x}/{y}.png".to_string(),
        attribution: String::new(),
        opacity: 1.0,
    })
}

const GRID: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "id": 1, "Mv_Act": 0 },
          "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] } },
        { "type": "Feature", "properties": { "id": 2, "Mv_Act": 750 },
          "geometry": { "type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,0]]] } },
        { "type": "Feature", "properties": { "id": 3, "Mv_Act": 7000 },
          "geometry": { "type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,0]]] } }
    ]
}"#;

speculate! {
    before {
        let config = ViewerConfig::default();
        let metro = config
            .descriptor(METRO_GRID)
            .and_then(|d| d.style.clone())
            .expect("metro grid has a style rule");
    }

    describe "classification" {
        it "colors the metro ridership scenario" {
            let colors: Vec<_> = [0, 750, 7000]
                .into_iter()
                .map(|v| fill(&metro, json!({ "Mv_Act": v })))
                .collect();
            assert_eq!(colors, vec!["transparent", "#9cacd2", "#580954ff"]);
        }

        it "puts a boundary value in the upper bucket" {
            assert_eq!(fill(&metro, json!({ "Mv_Act": 500 })), "#9cacd2");
            assert_eq!(fill(&metro, json!({ "Mv_Act": 6000 })), "#580954ff");
        }

        it "treats zero and missing values as no data" {
            assert_eq!(fill(&metro, json!({ "Mv_Act": 0 })), "transparent");
            assert_eq!(fill(&metro, json!({ "id": 4 })), "transparent");
            assert_eq!(fill(&metro, json!({ "Mv_Act": null })), "transparent");
        }

        it "returns the same style for the same input" {
            let first = metro.style_for(Some(&props(json!({ "Mv_Act": 1234 }))));
            let second = metro.style_for(Some(&props(json!({ "Mv_Act": 1234 }))));
            assert_eq!(first, second);
        }

        it "keeps the grid stroke constant across buckets" {
            let low = metro.style_for(Some(&props(json!({ "Mv_Act": 1 }))));
            let high = metro.style_for(Some(&props(json!({ "Mv_Act": 9000 }))));
            assert_eq!(low.stroke_color, Some("white".to_string()));
            assert_eq!(low.weight, high.weight);
            assert_eq!(low.fill_opacity, Some(0.8));
        }

        it "colors metro lines by route code" {
            let lines = config
                .descriptor(METRO_LINES)
                .and_then(|d| d.style.clone())
                .unwrap();
            let style = lines.style_for(Some(&props(json!({ "MRTCODE": "淡水信義線" }))));
            assert_eq!(style.stroke_color, Some("#cc0000".to_string()));

            let unknown = lines.style_for(Some(&props(json!({ "MRTCODE": "未知" }))));
            assert_eq!(unknown.stroke_color, Some("#333333".to_string()));
        }
    }

    describe "annotation" {
        it "tags every feature with the display name" {
            let mut collection = parse_collection(GRID).unwrap();
            let tagged = annotate(&mut collection, BUS_GRID);

            assert_eq!(tagged, collection.features.len());
            for feature in &collection.features {
                assert_eq!(layer_type(feature.properties.as_ref()), Some(BUS_GRID));
            }
        }
    }

    describe "popups" {
        it "formats a metro grid feature with mapped labels" {
            let properties = props(json!({
                "OBJECTID": 7,
                "id": 12,
                "Mv_Act": 300,
                "layer_type": METRO_GRID
            }));
            let popup = config.field_mappings.format(Some(&properties));

            assert_eq!(popup.title, METRO_GRID);
            let ridership: Vec<_> = popup
                .lines
                .iter()
                .filter(|l| l.label == "人流(人次/小時)")
                .collect();
            assert_eq!(ridership.len(), 1);
            assert_eq!(ridership[0].value, "300");
            assert!(popup.lines.iter().all(|l| l.label != "OBJECTID" && l.label != "layer_type"));
            assert!(popup.to_html().starts_with(&format!("<h4>{}</h4>", METRO_GRID)));
        }

        it "falls back to raw keys and a generic title" {
            let popup = config.field_mappings.format(Some(&props(json!({ "foo": "bar" }))));
            assert_eq!(popup.title, "圖徵資訊");
            assert_eq!(popup.lines[0].label, "foo");
        }
    }

    describe "registry" {
        it "reorders by display name and skips unloaded layers" {
            let mut registry = LayerRegistry::new();
            registry.insert(tiles("A"));
            registry.insert(tiles("C"));

            let order = ["C", "B", "A"];
            let names: Vec<_> = registry
                .ordered(&order)
                .into_iter()
                .map(|(name, _)| name)
                .collect();
            assert_eq!(names, vec!["C", "A"]);
        }
    }

    describe "legends" {
        it "renders nothing for a layer without a legend" {
            assert!(config.legends.render(CITY_MASK).is_empty());
        }

        it "lists the no-data swatch with a border" {
            let entries = config.legends.render(METRO_GRID);
            let last = entries.last().unwrap();
            assert_eq!(last.color, "transparent");
            assert_eq!(last.border, "1px solid #999");
        }
    }

    describe "loading" {
        it "loads the preset from a data directory with missing files" {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("data")).unwrap();
            std::fs::write(dir.path().join("data/metro_population_grids.geojson"), GRID).unwrap();

            let mut registry = LayerRegistry::new();
            let mut view = MapView::new(&config.view);
            let report = tokio_test::block_on(load_all(
                &DataSource::dir(dir.path()),
                &config.layers,
                &config.field_mappings,
                &mut registry,
                &mut view,
            ));

            assert!(report.is_settled());
            assert_eq!(report.registered(), 1);
            assert_eq!(report.outcome(METRO_GRID), Some(&LoadOutcome::RegisteredVisible));
            assert_eq!(view.attached, vec![METRO_GRID.to_string()]);
            assert_eq!(registry.get(METRO_GRID).unwrap().feature_count(), 3);
        }
    }
}
