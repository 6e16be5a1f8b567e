//! Output of the traversal: one record per (Location, Datastream) pair

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use super::{Coordinates, EntityId};

/// Placeholder shown when there is no timestamp to format
pub const NO_DATE: &str = "No Date";

/// Result of the latest observation, or why there is none
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    Number(f64),
    Text(String),
    /// The datastream has no observations
    NoData,
    /// Fetching the observation failed
    Error,
}

impl ObservationValue {
    /// Map a raw `result` member onto a displayable value
    #[must_use]
    pub fn from_result(result: &Value) -> Self {
        match result {
            Value::Null => ObservationValue::Text("null".to_string()),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| ObservationValue::Text(n.to_string()), ObservationValue::Number),
            Value::String(s) => ObservationValue::Text(s.clone()),
            other => ObservationValue::Text(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        matches!(self, ObservationValue::NoData | ObservationValue::Error)
    }
}

impl fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationValue::Number(n) => write!(f, "{n}"),
            ObservationValue::Text(s) => f.write_str(s),
            ObservationValue::NoData => f.write_str("No Data"),
            ObservationValue::Error => f.write_str("Error"),
        }
    }
}

impl Serialize for ObservationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ObservationValue::Number(n) => serializer.serialize_f64(*n),
            other => serializer.collect_str(other),
        }
    }
}

/// Most recent reading of a datastream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestObservation {
    pub value: ObservationValue,
    /// Display form of the phenomenon time, or [`NO_DATE`]
    pub observed_at: String,
    pub phenomenon_time: Option<DateTime<Utc>>,
}

impl LatestObservation {
    #[must_use]
    pub fn no_data() -> Self {
        Self {
            value: ObservationValue::NoData,
            observed_at: NO_DATE.to_string(),
            phenomenon_time: None,
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            value: ObservationValue::Error,
            observed_at: NO_DATE.to_string(),
            phenomenon_time: None,
        }
    }
}

/// Everything a presentation sink needs to show one datastream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub location_id: EntityId,
    pub thing_name: String,
    pub datastream_id: EntityId,
    pub datastream_name: String,
    /// Inherited from the Location; `0.0` when it has no position
    pub latitude: f64,
    pub longitude: f64,
    pub has_position: bool,
    pub result: ObservationValue,
    pub observed_at: String,
    pub phenomenon_time: Option<DateTime<Utc>>,
    pub classification: String,
    /// `None` when unit lookup is switched off
    pub unit_symbol: Option<String>,
}

impl MeasurementRecord {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// `"<result> <unit>"`, or just the result when there is no unit to show
    #[must_use]
    pub fn format_reading(&self) -> String {
        match &self.unit_symbol {
            Some(unit) if !self.result.is_sentinel() => format!("{} {}", self.result, unit),
            _ => self.result.to_string(),
        }
    }
}
