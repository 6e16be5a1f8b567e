//! Location entity and its GeoJSON position

use serde::{Deserialize, Deserializer, Serialize};

use super::EntityId;
use super::entities::lenient;

/// A sensor placement as served by `/Locations`
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    #[serde(rename = "@iot.id")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// GeoJSON geometry; `None` when absent or not a usable point
    #[serde(default, deserialize_with = "lenient_point")]
    pub location: Option<GeoPoint>,
    #[serde(rename = "Things@iot.navigationLink", default, deserialize_with = "lenient")]
    pub things_link: Option<String>,
}

/// GeoJSON point, `coordinates` in `[longitude, latitude]` order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub coordinates: Vec<f64>,
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Position of the point, if it carries at least a finite longitude and latitude
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self.coordinates.as_slice() {
            [longitude, latitude, ..] if longitude.is_finite() && latitude.is_finite() => {
                Some(Coordinates {
                    latitude: *latitude,
                    longitude: *longitude,
                })
            }
            _ => None,
        }
    }
}

impl Location {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().and_then(GeoPoint::coordinates)
    }
}

impl Coordinates {
    /// Placeholder used when a Location has no usable position
    pub const UNKNOWN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn lenient_point<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let point: Option<GeoPoint> = lenient(deserializer)?;
    Ok(point.filter(|p| p.coordinates().is_some()))
}
