//! Maps datastream names such as `pm25_kal` onto a Dutch category label

use serde::{Deserialize, Serialize};

/// Measured property, derived from the datastream name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyClass {
    Temperature,
    AtmosphericPressure,
    RelativeHumidity,
    Ammonia,
    NitrogenDioxide,
    CalibratedPm25,
    CalibratedPm10,
    Pm25,
    Pm10,
    Unknown,
}

/// Tried in order, first substring hit wins. `pm25_kal` contains `pm25`,
/// so the calibrated rules must come first.
const RULES: [(&str, PropertyClass); 9] = [
    ("temp", PropertyClass::Temperature),
    ("pres", PropertyClass::AtmosphericPressure),
    ("rh", PropertyClass::RelativeHumidity),
    ("nh3", PropertyClass::Ammonia),
    ("no2", PropertyClass::NitrogenDioxide),
    ("pm25_kal", PropertyClass::CalibratedPm25),
    ("pm10_kal", PropertyClass::CalibratedPm10),
    ("pm25", PropertyClass::Pm25),
    ("pm10", PropertyClass::Pm10),
];

impl PropertyClass {
    /// Case-sensitive substring match against the ordered rule table
    #[must_use]
    pub fn of(datastream_name: &str) -> Self {
        RULES
            .iter()
            .find(|(needle, _)| datastream_name.contains(needle))
            .map_or(PropertyClass::Unknown, |(_, class)| *class)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PropertyClass::Temperature => "temperatuur",
            PropertyClass::AtmosphericPressure => "atmosferische druk",
            PropertyClass::RelativeHumidity => "relatieve vochtigheid",
            PropertyClass::Ammonia => "ammoniak",
            PropertyClass::NitrogenDioxide => "stikstofdioxide",
            PropertyClass::CalibratedPm25 => "fijnstof gekalibreerd < 2.5microm",
            PropertyClass::CalibratedPm10 => "fijnstof gekalibreerd < 10microm",
            PropertyClass::Pm25 => "fijnstof < 2.5microm",
            PropertyClass::Pm10 => "fijnstof < 10microm",
            PropertyClass::Unknown => "description not available",
        }
    }
}

/// Label for a datastream name
#[must_use]
pub fn classify(datastream_name: &str) -> &'static str {
    PropertyClass::of(datastream_name).label()
}
