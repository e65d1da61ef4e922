use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One sensor/location record as published by the backend.
///
/// Numeric fields are deserialized leniently: a malformed value (e.g. a string
/// where a number belongs) parses to `None` instead of failing the whole
/// payload. Coordinate validity is checked at render time, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub location_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub aqi: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub traffic_density: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub green_cover_index: Option<f64>,
    #[serde(default)]
    pub simulated: bool,
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_aqi: Option<i64>,
}

impl Point {
    /// Validated geographic position, or `None` when either coordinate is
    /// absent, non-finite, or out of range.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.validated_coordinate().ok()
    }

    /// Like [`Point::coordinate`] but says what is wrong with the point.
    pub fn validated_coordinate(&self) -> Result<Coordinate, crate::error::EngineError> {
        let invalid = |reason: &str| crate::error::EngineError::InvalidPoint {
            location_id: self.location_id.clone(),
            reason: reason.to_string(),
        };
        let latitude = self
            .latitude
            .filter(|v| v.is_finite() && v.abs() <= 90.0)
            .ok_or_else(|| invalid("missing or out-of-range latitude"))?;
        let longitude = self
            .longitude
            .filter(|v| v.is_finite() && v.abs() <= 180.0)
            .ok_or_else(|| invalid("missing or out-of-range longitude"))?;
        Ok(Coordinate {
            latitude,
            longitude,
        })
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Location")
    }
}

fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(value.as_i64())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// The data layer the user is viewing. Exactly one is active at a time;
/// owned by the caller and passed into classification per render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Aqi,
    Traffic,
    GreenCover,
}

/// Visual class handed to the map widget, which maps it to an icon asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderCategory {
    StandardAqi,
    SimulatedAqi,
    NormalTraffic,
    HighTraffic,
    LowGreenCover,
    HighGreenCover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emphasis {
    Normal,
    Strong,
    Strikethrough,
}

/// One popup line. `value` is `None` for note-style lines ("Traffic Data Missing").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub label: String,
    pub value: Option<String>,
    pub emphasis: Emphasis,
}

impl SummaryLine {
    pub fn new(label: &str, value: impl ToString, emphasis: Emphasis) -> Self {
        SummaryLine {
            label: label.to_string(),
            value: Some(value.to_string()),
            emphasis,
        }
    }

    pub fn note(label: &str) -> Self {
        SummaryLine {
            label: label.to_string(),
            value: None,
            emphasis: Emphasis::Strong,
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.label, value),
            None => write!(f, "{}", self.label),
        }
    }
}

/// Classifier output. Recomputed every render pass, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDecision {
    pub category: RenderCategory,
    pub summary: Vec<SummaryLine>,
}

/// What the map widget receives for each valid point.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub location_id: String,
    pub name: String,
    pub position: Coordinate,
    pub category: RenderCategory,
    pub summary: Vec<SummaryLine>,
}
