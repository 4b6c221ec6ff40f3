//! Story and theme documents, and spot validation.
//!
//! A story is an opaque JSON document listing the spots of a hunt; a
//! theme maps style names to presentation overrides. Validation is
//! per-entry: one malformed spot never fails the story as a whole.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw story document as supplied by the fetch collaborator.
///
/// `spots` is kept loosely typed on purpose: a document whose `spots`
/// field is missing or is not an array still loads, as an empty hunt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStory {
    /// Declared spots, in hunt order. Entries are validated one by one.
    #[serde(default)]
    pub spots: Value,
}

impl RawStory {
    /// Parse a story document from JSON text.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// A raw theme document mapping style names to override objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTheme {
    /// Named style overrides. Only object-valued entries resolve.
    #[serde(default)]
    pub spots: Map<String, Value>,
}

impl RawTheme {
    /// Parse a theme document from JSON text.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// A single story entry before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSpot {
    id: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    style_name: Option<String>,
    custom: Option<Value>,
}

/// Presentation style attached to a spot, after theme overlay.
///
/// Known keys are typed fields; anything else a theme sets is carried
/// verbatim in `extra` for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpotStyle {
    /// Geofence radius in meters. Must stay positive.
    pub radius: f64,

    /// SVG dash pattern for the circle outline.
    pub dash_array: String,

    /// CSS class applied to the circle.
    #[serde(rename = "class")]
    pub class_name: String,

    /// Theme keys with no typed counterpart, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SpotStyle {
    fn default() -> Self {
        Self {
            radius: 2.0,
            dash_array: "4".to_string(),
            class_name: "gp-circle".to_string(),
            extra: Map::new(),
        }
    }
}

impl SpotStyle {
    /// Overlay theme overrides onto this style.
    ///
    /// Every key is a full overwrite, theme wins. A radius override
    /// that is not a positive number is rejected and the current radius
    /// kept, so the geofence invariant holds.
    pub fn apply(&mut self, overrides: &Map<String, Value>) {
        for (key, value) in overrides {
            match key.as_str() {
                "radius" => match value.as_f64() {
                    Some(radius) if radius > 0.0 && radius.is_finite() => {
                        self.radius = radius;
                    }
                    _ => {
                        tracing::warn!(value = %value, "ignoring non-positive radius override");
                    }
                },
                "dashArray" => {
                    if let Some(dash) = value.as_str() {
                        self.dash_array = dash.to_string();
                    }
                }
                "class" => {
                    if let Some(class) = value.as_str() {
                        self.class_name = class.to_string();
                    }
                }
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// A validated spot: semantic identity, geometry, and presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotDefinition {
    /// Unique id within the story. Synthesized when the entry has none.
    pub id: String,

    /// Center of the geofence.
    pub position: Coordinate,

    /// Presentation style, theme overrides already applied.
    pub style: SpotStyle,

    /// Opaque per-spot payload for the presentation layer.
    pub custom: Option<Value>,
}

impl SpotDefinition {
    /// Effective geofence radius in meters.
    pub fn radius_m(&self) -> f64 {
        self.style.radius
    }
}

/// Validate a story against a theme, producing the ordered spot list.
///
/// Malformed entries are skipped, never fatal. An entry is valid only
/// if it is a non-array object with numeric `lat` and `lng` inside
/// coordinate range. Duplicate ids keep the first occurrence.
pub fn load_spots(story: &RawStory, theme: &RawTheme) -> Vec<SpotDefinition> {
    let Some(entries) = story.spots.as_array() else {
        if !story.spots.is_null() {
            tracing::warn!("story spots is not an array, loading no spots");
        }
        return Vec::new();
    };

    let mut spots: Vec<SpotDefinition> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(spot) = validate_entry(index, entry, theme) else {
            continue;
        };
        if spots.iter().any(|s| s.id == spot.id) {
            tracing::warn!(id = %spot.id, index, "skipping spot: duplicate id, keeping first");
            continue;
        }
        spots.push(spot);
    }
    spots
}

fn validate_entry(index: usize, entry: &Value, theme: &RawTheme) -> Option<SpotDefinition> {
    if !entry.is_object() {
        tracing::warn!(index, "skipping spot: entry is not an object");
        return None;
    }

    let raw: RawSpot = match serde_json::from_value(entry.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(index, error = %e, "skipping spot: malformed entry");
            return None;
        }
    };

    let (Some(lat), Some(lng)) = (raw.lat, raw.lng) else {
        tracing::warn!(index, "skipping spot: missing numeric lat/lng");
        return None;
    };

    let position = Coordinate::new(lat, lng);
    if !position.is_valid() {
        tracing::warn!(index, %position, "skipping spot: coordinate out of range");
        return None;
    }

    let id = raw.id.unwrap_or_else(|| format!("spot_{}", index + 1));

    let mut style = SpotStyle::default();
    if let Some(name) = raw.style_name.as_deref() {
        match theme.spots.get(name).and_then(Value::as_object) {
            Some(overrides) => style.apply(overrides),
            None => {
                tracing::debug!(index, style = name, "style not found in theme, using default");
            }
        }
    }

    Some(SpotDefinition {
        id,
        position,
        style,
        custom: raw.custom,
    })
}
