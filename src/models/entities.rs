//! Thing, Datastream and Observation payloads of the SensorThings API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// `@iot.id` of an entity. The API serves integers, other servers use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl EntityId {
    /// Key as it appears inside an OData path segment, e.g. `Datastreams(42)`
    #[must_use]
    pub fn path_key(&self) -> String {
        match self {
            EntityId::Number(id) => id.to_string(),
            EntityId::Text(id) => format!("'{}'", id.replace('\'', "''")),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(id) => write!(f, "{id}"),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

/// The physical device placed at a Location
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    #[serde(rename = "@iot.id", default, deserialize_with = "lenient")]
    pub id: Option<EntityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(rename = "Datastreams@iot.navigationLink", default, deserialize_with = "lenient")]
    pub datastreams_link: Option<String>,
}

impl Thing {
    pub const UNNAMED: &'static str = "Unknown Sensor";

    /// Name for display, falling back to a placeholder
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(Self::UNNAMED)
    }
}

/// One measured channel of a Thing
#[derive(Debug, Clone, Deserialize)]
pub struct Datastream {
    #[serde(rename = "@iot.id")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(rename = "unitOfMeasurement", default, deserialize_with = "lenient")]
    pub unit_of_measurement: Option<UnitOfMeasurement>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UnitOfMeasurement {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub definition: Option<String>,
}

/// A single reading on a Datastream
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(rename = "@iot.id", default)]
    pub id: Option<EntityId>,
    /// ISO 8601 instant, or an interval `start/end`
    #[serde(rename = "phenomenonTime", default, deserialize_with = "lenient")]
    pub phenomenon_time: Option<String>,
    #[serde(default)]
    pub result: Value,
}

/// Decode an optional field, treating a value of the wrong shape as absent
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, String>(deserializer)?.unwrap_or_default())
}
