//! Display name → rendered layer.
//!
//! Loaders settle in arbitrary order, so insertion order carries no meaning.
//! The control surface reads the registry through [`LayerRegistry::ordered`].

use std::collections::HashMap;

use crate::models::RenderedLayer;

#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: HashMap<String, RenderedLayer>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the layer previously registered under this name, if any.
    pub fn insert(&mut self, layer: RenderedLayer) -> Option<RenderedLayer> {
        self.layers.insert(layer.name().to_string(), layer)
    }

    pub fn get(&self, name: &str) -> Option<&RenderedLayer> {
        self.layers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RenderedLayer> {
        self.layers.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Registered display names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Layers in the declared display order. Names that never loaded are skipped.
    pub fn ordered<'a, S: AsRef<str>>(&'a self, order: &'a [S]) -> Vec<(&'a str, &'a RenderedLayer)> {
        order
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.layers.get(name).map(|layer| (name, layer))
            })
            .collect()
    }
}
