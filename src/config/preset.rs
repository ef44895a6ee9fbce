//! Built-in configuration: Taipei transit ridership viewer.

use crate::classify::{Bucket, BucketTable, Category, CategoryTable, StyleRule};
use crate::legend::{LegendDefinition, LegendItem, Legends};
use crate::models::*;
use crate::popup::FieldMappings;

use super::{DataLocation, ViewerConfig};

pub const METRO_GRID: &str = "捷運活躍時段平均人流";
pub const BUS_GRID: &str = "公車活躍時段平均人流";
pub const BUS_STOPS: &str = "公車站數量";
pub const METRO_STATIONS: &str = "捷運站位置";
pub const METRO_LINES: &str = "捷運路線";
pub const CITY_MASK: &str = "非台北市區域遮罩";

const GRAY_EMAP: &str = "臺灣通用電子地圖(灰階)";

fn threshold(field: &str, buckets: Vec<Bucket>) -> StyleRule {
    StyleRule::Threshold(BucketTable {
        field: field.to_string(),
        buckets,
        no_data: TRANSPARENT.to_string(),
        fill_opacity: 0.8,
        stroke: Stroke::default(),
    })
}

fn metro_grid_style() -> StyleRule {
    threshold(
        "Mv_Act",
        vec![
            Bucket::new(1.0, 500.0, "#bfd6e8"),
            Bucket::new(500.0, 1000.0, "#9cacd2"),
            Bucket::new(1000.0, 3000.0, "#8a7cba"),
            Bucket::new(3000.0, 6000.0, "#87489e"),
            Bucket::at_least(6000.0, "#580954ff"),
        ],
    )
}

fn bus_grid_style() -> StyleRule {
    threshold(
        "Bv_Act",
        vec![
            Bucket::new(1.0, 250.0, "#d5efcf"),
            Bucket::new(250.0, 500.0, "#9ed798"),
            Bucket::new(500.0, 1000.0, "#55b567"),
            Bucket::new(1000.0, 1500.0, "#1d8641"),
            Bucket::at_least(1500.0, "#00441b"),
        ],
    )
}

fn bus_stop_style() -> StyleRule {
    threshold(
        "Bus_numd",
        vec![
            Bucket::new(1.0, 3.0, "#f1eef6"),
            Bucket::new(3.0, 5.0, "#adb8d3ff"),
            Bucket::new(5.0, 8.0, "#4faeceff"),
            Bucket::new(8.0, 10.0, "#26608aff"),
            Bucket::at_least(10.0, "#062455ff"),
        ],
    )
}

fn metro_line_style() -> StyleRule {
    let categories = [
        ("板南線", "#0070b3"),
        ("淡水信義線", "#cc0000"),
        ("松山新店線", "#006a60"),
        ("蘆洲支線", "#ff9e17"),
        ("三鶯線", "#49c9ea"),
        ("小碧潭線", "#a7df72"),
        ("中和新蘆線", "#ff9e17"),
        ("文湖線", "#cc8528"),
        ("新北投線", "#fb9a99"),
        ("機場捷運", "#b887e3"),
        ("貓空纜車", "#a7df72"),
        ("環狀線", "#fff300"),
    ]
    .into_iter()
    .map(|(value, color)| Category {
        value: value.to_string(),
        color: color.to_string(),
    })
    .collect();

    StyleRule::Categorical(CategoryTable {
        field: "MRTCODE".to_string(),
        categories,
        default_color: "#333333".to_string(),
        weight: 1.5,
        opacity: 0.9,
    })
}

fn city_mask_style() -> StyleRule {
    StyleRule::Fixed(Style {
        fill_color: Some("#cccccc".to_string()),
        fill_opacity: Some(0.8),
        weight: Some(0.0),
        pane: Some(MASK_PANE.to_string()),
        interactive: Some(false),
        ..Style::default()
    })
}

fn station_marker() -> PointStrategy {
    PointStrategy::Icon {
        icon: IconSpec {
            icon_url: "images/metro_marker.png".to_string(),
            icon_size: [12, 13],
            icon_anchor: [5, 13],
            popup_anchor: [0, -13],
        },
        pane: MARKER_PANE.to_string(),
    }
}

fn layers() -> Vec<LayerDescriptor> {
    vec![
        LayerDescriptor::geojson(METRO_GRID, "data/metro_population_grids.geojson")
            .with_style(metro_grid_style())
            .visible(true),
        LayerDescriptor::geojson(BUS_GRID, "data/bus_population_grids.geojson")
            .with_style(bus_grid_style()),
        LayerDescriptor::geojson(BUS_STOPS, "data/bus_num_grids.geojson")
            .with_style(bus_stop_style()),
        LayerDescriptor::geojson(METRO_LINES, "data/metro_lines.geojson")
            .with_style(metro_line_style())
            .visible(true),
        LayerDescriptor::geojson(METRO_STATIONS, "data/metro_stations.geojson")
            .with_point(station_marker()),
        LayerDescriptor::geojson(CITY_MASK, "data/taipei_mask.geojson")
            .with_style(city_mask_style())
            .visible(true),
    ]
}

fn no_data_item(text: &str) -> LegendItem {
    LegendItem::new(TRANSPARENT, text).with_border("1px solid #999")
}

fn legends() -> Legends {
    let mut legends = Legends::new();
    legends.insert(
        METRO_GRID,
        LegendDefinition {
            title: METRO_GRID.to_string(),
            items: vec![
                LegendItem::new("#580954ff", "≥ 6,000 人 / 時"),
                LegendItem::new("#87489e", "3,000 – 5,999 人 / 時"),
                LegendItem::new("#8a7cba", "1,000 – 2,999 人 / 時"),
                LegendItem::new("#9cacd2", "500 – 999 人 / 時"),
                LegendItem::new("#bfd6e8", "1 – 499 人 / 時"),
                no_data_item("0 人 / 時 (透明)"),
            ],
        },
    );
    legends.insert(
        BUS_GRID,
        LegendDefinition {
            title: BUS_GRID.to_string(),
            items: vec![
                LegendItem::new("#00441b", "≥ 1,500 人 / 時"),
                LegendItem::new("#1d8641", "1,000 – 1,499 人 / 時"),
                LegendItem::new("#55b567", "500 – 999 人 / 時"),
                LegendItem::new("#9ed798", "250 – 499 人 / 時"),
                LegendItem::new("#d5efcf", "1 – 249 人 / 時"),
                no_data_item("0 人 / 時 (透明)"),
            ],
        },
    );
    legends.insert(
        BUS_STOPS,
        LegendDefinition {
            title: BUS_STOPS.to_string(),
            items: vec![
                LegendItem::new("#062455ff", "≥ 10 站"),
                LegendItem::new("#26608aff", "8 – 9 站"),
                LegendItem::new("#4faeceff", "5 – 7 站"),
                LegendItem::new("#adb8d3ff", "3 – 4 站"),
                LegendItem::new("#f1eef6", "1 – 2 站"),
                no_data_item("0 站 (透明)"),
            ],
        },
    );
    legends
}

fn field_mappings() -> FieldMappings {
    let grid = |value_field: &'static str, value_label: &'static str| {
        [
            ("id", "網格 ID"),
            ("X_co", "X坐標"),
            ("y_co", "Y坐標"),
            (value_field, value_label),
        ]
    };

    let mut mappings = FieldMappings::default();
    let tables: [(&str, Vec<(&str, &str)>); 5] = [
        (METRO_GRID, grid("Mv_Act", "人流(人次/小時)").to_vec()),
        (BUS_GRID, grid("Bv_Act", "人流(人次/小時)").to_vec()),
        (BUS_STOPS, grid("Bus_numd", "站數").to_vec()),
        (
            METRO_STATIONS,
            vec![("FID CODE", "站點代碼"), ("NAME", "捷運站名")],
        ),
        (
            METRO_LINES,
            vec![
                ("MRTID", "捷運代碼"),
                ("MRTSYS", "捷運路線"),
                ("MRTCODE", "路線名稱"),
            ],
        ),
    ];
    for (layer, fields) in tables {
        for (field, label) in fields {
            mappings.insert(layer, field, label);
        }
    }
    mappings
}

fn base_maps() -> Vec<BaseMap> {
    vec![
        BaseMap {
            name: GRAY_EMAP.to_string(),
            url: "https://wmts.nlsc.gov.tw/wmts/EMAP01/default/GoogleMapsCompatible/{z}/{y}/{x}"
                .to_string(),
            attribution: "NLSC EMAP6".to_string(),
        },
        BaseMap {
            name: "臺灣通用電子地圖(標準)".to_string(),
            url: "https://wmts.nlsc.gov.tw/wmts/EMAP/default/GoogleMapsCompatible/{z}/{y}/{x}"
                .to_string(),
            attribution: "NLSC EMAP".to_string(),
        },
        BaseMap {
            name: "OpenStreetMap".to_string(),
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution:
                "&copy; <a href=\"http://osm.org/copyright\">OpenStreetMap</a> contributors"
                    .to_string(),
        },
    ]
}

const ABOUT_HTML: &str = r#"<p>點擊地圖右上角圖示開啟控制選單：</p>
<ul>
  <li>切換/開關圖層</li>
  <li>調整圖層透明度</li>
  <li>切換底圖</li>
</ul>
<div class="about-sources">
  <p>本站台運用下列資料進行加值運算：</p>
  <p>1. 交通部 <a href="https://tdx.transportdata.tw/">TDX 運輸資料流通服務</a></p>
  <ul>
    <li>公共運輸-公車</li>
    <li>臺北市市區公車分時上下車人次資料</li>
    <li>臺北捷運每日各站分時OD資料(D)</li>
  </ul>
  <p>2. 內政部 <a href="https://whgis-nlsc.moi.gov.tw/Opendata/Files.aspx">國土測繪圖資e商城</a></p>
  <ul>
    <li>捷運車站</li>
    <li>捷運路線</li>
  </ul>
</div>
<p>※網站聲明：</p>
<p>本平台資料為個人研究成果交流展示，不提供做為學術/商業/法律上之引用或佐證依據。</p>"#;

fn about() -> InfoDialog {
    InfoDialog {
        title: "資料說明".to_string(),
        body_html: ABOUT_HTML.to_string(),
        confirm_text: "關閉".to_string(),
        allow_outside_click: false,
        allow_escape_key: true,
    }
}

pub(super) fn taipei() -> ViewerConfig {
    ViewerConfig {
        title: "臺北市大眾運輸活躍時段人流".to_string(),
        view: ViewSettings {
            center: [25.03, 121.55],
            zoom: 13,
            base_layer: GRAY_EMAP.to_string(),
            panes: default_panes(),
        },
        base_maps: base_maps(),
        layers: layers(),
        overlay_order: [
            METRO_GRID,
            BUS_GRID,
            BUS_STOPS,
            METRO_STATIONS,
            METRO_LINES,
            CITY_MASK,
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        legends: legends(),
        field_mappings: field_mappings(),
        about: about(),
        data: DataLocation::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_colors(rule: &StyleRule) -> Vec<String> {
        match rule {
            StyleRule::Threshold(table) => {
                let mut colors: Vec<_> = table.buckets.iter().map(|b| b.color.clone()).collect();
                colors.push(table.no_data.clone());
                colors
            }
            _ => Vec::new(),
        }
    }

    #[test]
    fn legend_colors_match_bucket_colors() {
        let config = taipei();
        for name in [METRO_GRID, BUS_GRID, BUS_STOPS] {
            let style = config.descriptor(name).and_then(|d| d.style.as_ref()).unwrap();
            let mut expected = bucket_colors(style);
            let mut legend: Vec<_> = config
                .legends
                .get(name)
                .unwrap()
                .items
                .iter()
                .map(|i| i.color.clone())
                .collect();
            expected.sort();
            legend.sort();
            assert_eq!(legend, expected, "legend for {name} drifted from its buckets");
        }
    }

    /// Whole numbers in a legend label, ignoring thousands separators.
    fn label_numbers(text: &str) -> Vec<f64> {
        text.split(|c: char| !c.is_ascii_digit() && c != ',')
            .map(|part| part.replace(',', ""))
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect()
    }

    #[test]
    fn legend_labels_match_bucket_bounds() {
        let config = taipei();
        for name in [METRO_GRID, BUS_GRID, BUS_STOPS] {
            let Some(StyleRule::Threshold(table)) =
                config.descriptor(name).and_then(|d| d.style.as_ref())
            else {
                panic!("{name} is not a threshold layer");
            };
            let items = &config.legends.get(name).unwrap().items;
            for bucket in &table.buckets {
                let item = items.iter().find(|i| i.color == bucket.color).unwrap();
                match bucket.high {
                    Some(high) => assert_eq!(
                        label_numbers(&item.text),
                        vec![bucket.low, high - 1.0],
                        "label {:?} for {name}",
                        item.text
                    ),
                    None => {
                        assert!(item.text.starts_with('≥'), "label {:?} for {name}", item.text);
                        assert_eq!(label_numbers(&item.text), vec![bucket.low]);
                    }
                }
            }
        }
    }

    #[test]
    fn boundary_values_take_the_color_their_label_names() {
        let config = taipei();
        let cases = [
            (METRO_GRID, "Mv_Act", 6000),
            (BUS_GRID, "Bv_Act", 1500),
            (BUS_STOPS, "Bus_numd", 10),
        ];
        for (name, field, value) in cases {
            let style = config.descriptor(name).and_then(|d| d.style.as_ref()).unwrap();
            let properties = serde_json::json!({ field: value });
            let fill = style
                .style_for(properties.as_object())
                .fill_color
                .unwrap();
            let item = config
                .legends
                .get(name)
                .unwrap()
                .items
                .iter()
                .find(|i| i.color == fill)
                .unwrap();
            assert!(item.text.starts_with('≥'), "{name} at {value} reads {:?}", item.text);
            assert_eq!(label_numbers(&item.text), vec![value as f64]);
        }
    }

    #[test]
    fn every_overlay_is_declared_once() {
        let config = taipei();
        assert_eq!(config.overlay_order.len(), config.layers.len());
        for name in &config.overlay_order {
            assert!(config.descriptor(name).is_some());
        }
    }
}
