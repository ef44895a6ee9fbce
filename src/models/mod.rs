//! Domain models for the ridership map.
//!
//! # Core Concepts
//!
//! ## Configuration-time
//!
//! - [`LayerDescriptor`]: Immutable description of an overlay (source, style rule,
//!   initial visibility, point strategy), keyed by its display name.
//! - [`BaseMap`]: A base tile layer; exactly one is active.
//! - [`InfoDialog`]: Static attribution dialog.
//!
//! ## Load-time
//!
//! - [`RenderedLayer`]: Styled, map-attachable form of one overlay. Either a
//!   [`FeatureLayer`] (per-feature [`Symbol`]s) or a [`TileLayer`] (layer-level opacity).
//! - [`MapView`]: The active view: base layer, attached overlays and z-ordered [`Pane`]s.

mod basemap;
mod dialog;
mod layer;
mod style;
mod view;

pub use basemap::*;
pub use dialog::*;
pub use layer::*;
pub use style::*;
pub use view::*;
