pub mod annotate;
pub mod api;
pub mod classify;
pub mod config;
pub mod html;
pub mod legend;
pub mod loader;
pub mod models;
pub mod panel;
pub mod panel_render;
pub mod popup;
pub mod registry;
pub mod viewer;
