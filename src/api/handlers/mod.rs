use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;

use crate::legend::LegendEntry;
use crate::loader::LoadReport;
use crate::models::{InfoDialog, MapView};
use crate::panel::{ControlPanel, OverlayEntry};
use crate::popup::Popup;
use crate::viewer::{
    BaseMaps, LayerDocument, OpacityChange, Viewer, ViewerError, VisibilityChange,
};

// ============================================================
// Error Handling
// ============================================================

/// Every viewer error names something the client asked for that does not
/// exist, so all of them map to 404.
fn not_found(e: ViewerError) -> (StatusCode, String) {
    tracing::warn!("Not found: {}", e);
    (StatusCode::NOT_FOUND, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Page
// ============================================================

pub async fn index(State(viewer): State<Viewer>) -> Html<String> {
    Html(viewer.index_html())
}

// ============================================================
// Panel
// ============================================================

pub async fn get_panel(State(viewer): State<Viewer>) -> Json<ControlPanel> {
    Json(viewer.panel())
}

// ============================================================
// Layers
// ============================================================

pub async fn list_layers(State(viewer): State<Viewer>) -> Json<Vec<OverlayEntry>> {
    Json(viewer.layers())
}

pub async fn get_layer(
    State(viewer): State<Viewer>,
    Path(name): Path<String>,
) -> Result<Json<LayerDocument>, (StatusCode, String)> {
    viewer.layer_document(&name).map(Json).map_err(not_found)
}

#[derive(Debug, Deserialize)]
pub struct OpacityInput {
    pub opacity: f64,
}

pub async fn set_opacity(
    State(viewer): State<Viewer>,
    Path(name): Path<String>,
    Json(input): Json<OpacityInput>,
) -> Result<Json<OpacityChange>, (StatusCode, String)> {
    if !input.opacity.is_finite() {
        return Err((StatusCode::BAD_REQUEST, "Opacity must be a number".to_string()));
    }
    viewer
        .set_opacity(&name, input.opacity)
        .map(Json)
        .map_err(not_found)
}

#[derive(Debug, Deserialize)]
pub struct VisibilityInput {
    pub visible: bool,
}

pub async fn set_visibility(
    State(viewer): State<Viewer>,
    Path(name): Path<String>,
    Json(input): Json<VisibilityInput>,
) -> Result<Json<VisibilityChange>, (StatusCode, String)> {
    viewer
        .set_visibility(&name, input.visible)
        .map(Json)
        .map_err(not_found)
}

pub async fn get_popup(
    State(viewer): State<Viewer>,
    Path((name, index)): Path<(String, usize)>,
) -> Result<Json<Popup>, (StatusCode, String)> {
    viewer.popup(&name, index).map(Json).map_err(not_found)
}

// ============================================================
// Legends
// ============================================================

pub async fn get_legend(
    State(viewer): State<Viewer>,
    Path(name): Path<String>,
) -> Json<Vec<LegendEntry>> {
    Json(viewer.legend(&name))
}

// ============================================================
// Base Maps
// ============================================================

pub async fn list_base_maps(State(viewer): State<Viewer>) -> Json<BaseMaps> {
    Json(viewer.base_maps())
}

#[derive(Debug, Deserialize)]
pub struct BaseLayerInput {
    pub name: String,
}

pub async fn set_base_layer(
    State(viewer): State<Viewer>,
    Json(input): Json<BaseLayerInput>,
) -> Result<Json<BaseMaps>, (StatusCode, String)> {
    viewer
        .set_base_layer(&input.name)
        .map(Json)
        .map_err(not_found)
}

// ============================================================
// Map View
// ============================================================

pub async fn get_view(State(viewer): State<Viewer>) -> Json<MapView> {
    Json(viewer.view())
}

pub async fn get_load_report(State(viewer): State<Viewer>) -> Json<LoadReport> {
    Json(viewer.report())
}

// ============================================================
// Info Dialog
// ============================================================

pub async fn get_about(State(viewer): State<Viewer>) -> Json<InfoDialog> {
    Json(viewer.about())
}

pub async fn open_about(State(viewer): State<Viewer>) -> Json<MapView> {
    Json(viewer.open_about())
}

pub async fn close_about(State(viewer): State<Viewer>) -> Json<MapView> {
    Json(viewer.close_about())
}
