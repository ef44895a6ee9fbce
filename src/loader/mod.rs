//! Layer loading: fetch → parse → annotate → style → register.
//!
//! [`load_all`] issues every load at once and waits for all of them to
//! settle. A failed load is logged and leaves its layer out of the registry;
//! it never cancels or delays the others.

mod source;

pub use source::*;

use std::path::PathBuf;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::annotate;
use crate::models::*;
use crate::popup::FieldMappings;
use crate::registry::LayerRegistry;

/// Why a single layer failed to load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} ({url})")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Terminal state of one loader (`Pending` until it settles).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadOutcome {
    Pending,
    RegisteredVisible,
    RegisteredHidden,
    Failed { error: String },
}

impl LoadOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::RegisteredVisible | Self::RegisteredHidden)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerLoad {
    pub name: String,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

/// Per-layer outcomes of a load batch, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadReport {
    loads: Vec<LayerLoad>,
}

impl LoadReport {
    pub fn pending(layers: &[LayerDescriptor]) -> Self {
        Self {
            loads: layers
                .iter()
                .map(|d| LayerLoad {
                    name: d.name.clone(),
                    outcome: LoadOutcome::Pending,
                })
                .collect(),
        }
    }

    pub(crate) fn settle(&mut self, name: &str, outcome: LoadOutcome) {
        if let Some(load) = self.loads.iter_mut().find(|l| l.name == name) {
            load.outcome = outcome;
        }
    }

    pub fn loads(&self) -> &[LayerLoad] {
        &self.loads
    }

    pub fn outcome(&self, name: &str) -> Option<&LoadOutcome> {
        self.loads.iter().find(|l| l.name == name).map(|l| &l.outcome)
    }

    pub fn registered(&self) -> usize {
        self.loads.iter().filter(|l| l.outcome.is_registered()).count()
    }

    pub fn failed(&self) -> usize {
        self.loads
            .iter()
            .filter(|l| matches!(l.outcome, LoadOutcome::Failed { .. }))
            .count()
    }

    pub fn is_settled(&self) -> bool {
        self.loads.iter().all(|l| l.outcome != LoadOutcome::Pending)
    }
}

/// Parse a FeatureCollection document. A document without a `features`
/// member is an empty collection.
pub fn parse_collection(body: &str) -> Result<FeatureCollection, LoadError> {
    let mut value: serde_json::Value = serde_json::from_str(body)?;
    if let Some(object) = value.as_object_mut() {
        object
            .entry("features")
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
    }
    let geojson = GeoJson::from_json_value(value)?;
    Ok(FeatureCollection::try_from(geojson)?)
}

fn is_point(feature: &Feature) -> bool {
    matches!(
        feature.geometry.as_ref().map(|g| &g.value),
        Some(geojson::Value::Point(_)) | Some(geojson::Value::MultiPoint(_))
    )
}

fn render_feature(
    feature: Feature,
    descriptor: &LayerDescriptor,
    mappings: &FieldMappings,
) -> RenderedFeature {
    let symbol = if is_point(&feature) {
        Symbol::Marker(Marker::from_strategy(descriptor.point.as_ref()))
    } else {
        Symbol::Path(
            descriptor
                .style
                .as_ref()
                .map(|rule| rule.style_for(feature.properties.as_ref()))
                .unwrap_or_default(),
        )
    };

    let interactive = match &symbol {
        Symbol::Path(style) => style.is_interactive(),
        Symbol::Marker(_) => true,
    };
    let popup = interactive.then(|| mappings.format(feature.properties.as_ref()));

    RenderedFeature {
        feature,
        symbol,
        popup,
    }
}

/// Style an annotated collection into a feature layer.
pub fn render_layer(
    collection: FeatureCollection,
    descriptor: &LayerDescriptor,
    mappings: &FieldMappings,
) -> FeatureLayer {
    FeatureLayer {
        name: descriptor.name.clone(),
        features: collection
            .features
            .into_iter()
            .map(|f| render_feature(f, descriptor, mappings))
            .collect(),
        opacity: 1.0,
        loaded_at: Utc::now(),
    }
}

/// Point icons are looked up relative to the data location.
fn resolve_icons(descriptor: &LayerDescriptor, source: &DataSource) -> LayerDescriptor {
    let mut descriptor = descriptor.clone();
    if let Some(PointStrategy::Icon { icon, .. }) = &mut descriptor.point {
        icon.icon_url = source.asset_url(&icon.icon_url);
    }
    descriptor
}

/// Load one layer.
pub async fn load_layer(
    source: &DataSource,
    descriptor: &LayerDescriptor,
    mappings: &FieldMappings,
) -> Result<RenderedLayer, LoadError> {
    match &descriptor.source {
        LayerSource::Tiles { url, attribution } => Ok(RenderedLayer::Tiles(TileLayer {
            name: descriptor.name.clone(),
            url: url.clone(),
            attribution: attribution.clone(),
            opacity: 1.0,
        })),
        LayerSource::Geojson { path } => {
            let body = source.fetch(path).await?;
            let mut collection = parse_collection(&body)?;
            annotate(&mut collection, &descriptor.name);
            Ok(RenderedLayer::Features(render_layer(
                collection,
                &resolve_icons(descriptor, source),
                mappings,
            )))
        }
    }
}

/// Load every layer concurrently and register each success as it settles.
///
/// Initially-visible layers are attached to `view`. Returns once every
/// load has either registered or failed.
pub async fn load_all(
    source: &DataSource,
    layers: &[LayerDescriptor],
    mappings: &FieldMappings,
    registry: &mut LayerRegistry,
    view: &mut MapView,
) -> LoadReport {
    let mut report = LoadReport::pending(layers);

    let mut pending: FuturesUnordered<_> = layers
        .iter()
        .map(|descriptor| async move {
            let result = load_layer(source, descriptor, mappings).await;
            (descriptor, result)
        })
        .collect();

    while let Some((descriptor, result)) = pending.next().await {
        let outcome = match result {
            Ok(layer) => {
                tracing::info!(
                    "Loaded layer `{}` ({} features)",
                    descriptor.name,
                    layer.feature_count()
                );
                registry.insert(layer);
                if descriptor.visible {
                    view.attach(&descriptor.name);
                    LoadOutcome::RegisteredVisible
                } else {
                    LoadOutcome::RegisteredHidden
                }
            }
            Err(e) => {
                tracing::error!(
                    "Error loading layer `{}` from {}: {}",
                    descriptor.name,
                    source.describe(),
                    e
                );
                LoadOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        report.settle(&descriptor.name, outcome);
    }

    report
}
