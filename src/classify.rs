//! Threshold and categorical classification of feature attributes.
//!
//! Every dataset carries its own rule table; a single interpreter evaluates
//! any table. Threshold tables map a numeric attribute onto ordered buckets,
//! categorical tables map a string attribute onto fixed colors.

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{Stroke, Style, TRANSPARENT};

/// Invalid bucket table.
#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("bucket table for `{0}` has no buckets")]
    Empty(String),

    #[error("bucket {index} has a non-finite bound")]
    NonFinite { index: usize },

    #[error("bucket {index} is empty: [{low}, {high})")]
    EmptyRange { index: usize, low: f64, high: f64 },

    #[error("bucket {index} starts at {found} but the previous bucket ends at {expected}")]
    NotContiguous {
        index: usize,
        expected: f64,
        found: f64,
    },

    #[error("bucket {index} is unbounded but is not the last bucket")]
    UnboundedNotLast { index: usize },
}

/// One classification bucket: `[low, high)`, or `[low, ∞)` when `high` is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub low: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    pub color: String,
}

impl Bucket {
    pub fn new(low: f64, high: f64, color: impl Into<String>) -> Self {
        Self {
            low,
            high: Some(high),
            color: color.into(),
        }
    }

    pub fn at_least(low: f64, color: impl Into<String>) -> Self {
        Self {
            low,
            high: None,
            color: color.into(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && self.high.is_none_or(|high| value < high)
    }
}

fn default_fill_opacity() -> f64 {
    0.8
}

fn default_no_data() -> String {
    TRANSPARENT.to_string()
}

/// Ordered bucket table over one numeric attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTable {
    /// Attribute the table classifies.
    pub field: String,
    pub buckets: Vec<Bucket>,
    /// Fill for zero, missing, non-numeric and unmatched values.
    #[serde(default = "default_no_data")]
    pub no_data: String,
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,
    #[serde(default)]
    pub stroke: Stroke,
}

impl BucketTable {
    pub fn new(field: impl Into<String>, buckets: Vec<Bucket>) -> Result<Self, ClassifyError> {
        let table = Self {
            field: field.into(),
            buckets,
            no_data: default_no_data(),
            fill_opacity: default_fill_opacity(),
            stroke: Stroke::default(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Check that the buckets tile the value domain from the first lower
    /// bound upward with no gap and no overlap.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.buckets.is_empty() {
            return Err(ClassifyError::Empty(self.field.clone()));
        }

        let last = self.buckets.len() - 1;
        let mut previous_high: Option<f64> = None;
        for (index, bucket) in self.buckets.iter().enumerate() {
            if !bucket.low.is_finite() || bucket.high.is_some_and(|h| !h.is_finite()) {
                return Err(ClassifyError::NonFinite { index });
            }
            if let Some(high) = bucket.high {
                if high <= bucket.low {
                    return Err(ClassifyError::EmptyRange {
                        index,
                        low: bucket.low,
                        high,
                    });
                }
            } else if index != last {
                return Err(ClassifyError::UnboundedNotLast { index });
            }
            if let Some(expected) = previous_high {
                if bucket.low != expected {
                    return Err(ClassifyError::NotContiguous {
                        index,
                        expected,
                        found: bucket.low,
                    });
                }
            }
            previous_high = bucket.high;
        }
        Ok(())
    }

    /// Fill color for a raw attribute value.
    pub fn color_for(&self, value: Option<f64>) -> &str {
        let Some(value) = value else {
            return &self.no_data;
        };
        if value == 0.0 {
            return &self.no_data;
        }
        self.buckets
            .iter()
            .find(|bucket| bucket.contains(value))
            .map_or(self.no_data.as_str(), |bucket| bucket.color.as_str())
    }

    pub fn classify_value(&self, value: Option<f64>) -> Style {
        Style {
            fill_color: Some(self.color_for(value).to_string()),
            fill_opacity: Some(self.fill_opacity),
            stroke_color: Some(self.stroke.color.clone()),
            weight: Some(self.stroke.weight),
            stroke_opacity: self.stroke.opacity,
            ..Style::default()
        }
    }

    pub fn classify(&self, properties: Option<&JsonObject>) -> Style {
        let value = properties
            .and_then(|props| props.get(&self.field))
            .and_then(Value::as_f64);
        self.classify_value(value)
    }
}

/// One categorical entry: attribute value → stroke color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub value: String,
    pub color: String,
}

/// Categorical table over one string attribute, used for line layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub field: String,
    pub categories: Vec<Category>,
    pub default_color: String,
    pub weight: f64,
    pub opacity: f64,
}

impl CategoryTable {
    pub fn color_for(&self, value: Option<&str>) -> &str {
        value
            .and_then(|v| self.categories.iter().find(|c| c.value == v))
            .map_or(self.default_color.as_str(), |c| c.color.as_str())
    }

    pub fn classify(&self, properties: Option<&JsonObject>) -> Style {
        let value = properties
            .and_then(|props| props.get(&self.field))
            .and_then(Value::as_str);
        Style {
            stroke_color: Some(self.color_for(value).to_string()),
            weight: Some(self.weight),
            stroke_opacity: Some(self.opacity),
            ..Style::default()
        }
    }
}

/// Declarative style function attached to a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleRule {
    Threshold(BucketTable),
    Categorical(CategoryTable),
    Fixed(Style),
}

impl StyleRule {
    pub fn style_for(&self, properties: Option<&JsonObject>) -> Style {
        match self {
            Self::Threshold(table) => table.classify(properties),
            Self::Categorical(table) => table.classify(properties),
            Self::Fixed(style) => style.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        match self {
            Self::Threshold(table) => table.validate(),
            Self::Categorical(_) | Self::Fixed(_) => Ok(()),
        }
    }
}
