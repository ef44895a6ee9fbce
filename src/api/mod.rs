mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::viewer::Viewer;

/// Page-relative prefix of the marker icons in the data directory.
pub const IMAGES_PATH: &str = "/images";

pub fn create_router(viewer: Viewer) -> Router {
    let api = Router::new()
        // Panel
        .route("/panel", get(handlers::get_panel))
        // Layers
        .route("/layers", get(handlers::list_layers))
        .route("/layers/{name}", get(handlers::get_layer))
        .route("/layers/{name}/opacity", put(handlers::set_opacity))
        .route("/layers/{name}/visibility", put(handlers::set_visibility))
        .route(
            "/layers/{name}/features/{index}/popup",
            get(handlers::get_popup),
        )
        // Legends
        .route("/legends/{name}", get(handlers::get_legend))
        // Base maps
        .route("/basemaps", get(handlers::list_base_maps))
        .route("/basemaps/active", put(handlers::set_base_layer))
        // Map view
        .route("/view", get(handlers::get_view))
        .route("/loads", get(handlers::get_load_report))
        // Info dialog
        .route("/about", get(handlers::get_about))
        .route("/about/open", post(handlers::open_about))
        .route("/about/close", post(handlers::close_about))
        // Health
        .route("/health", get(handlers::health));

    let mut router = Router::new()
        .route("/", get(handlers::index))
        .nest("/api/v1", api);

    if let Some(root) = viewer.asset_dir() {
        router = router.nest_service(IMAGES_PATH, ServeDir::new(root.join("images")));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(viewer)
}
