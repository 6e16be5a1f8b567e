//! Paginated collection wrapper shared by every SensorThings collection

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// One page of a collection: `{ "value": [...], "@iot.nextLink": "..." }`
///
/// Members are kept undecoded so one malformed entity does not sink the
/// whole page; see [`Page::into_members`].
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub value: Vec<Value>,
    #[serde(rename = "@iot.nextLink", default)]
    pub next_link: Option<String>,
    #[serde(rename = "@iot.count", default)]
    pub count: Option<u64>,
}

impl Page {
    /// Decode the members as `T`, dropping the ones that do not fit the schema
    pub fn into_members<T: DeserializeOwned>(self) -> Vec<T> {
        let total = self.value.len();
        let members: Vec<T> = self
            .value
            .into_iter()
            .filter_map(|member| match serde_json::from_value(member) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    debug!("Dropping malformed collection member: {}", e);
                    None
                }
            })
            .collect();

        if members.len() < total {
            debug!("Decoded {} of {} members", members.len(), total);
        }
        members
    }

    /// The first member as `T`; `None` if the page is empty or that member is malformed
    pub fn into_first<T: DeserializeOwned>(self) -> Option<T> {
        let first = self.value.into_iter().next()?;
        match serde_json::from_value(first) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("First collection member is malformed: {}", e);
                None
            }
        }
    }

    /// Next-page link, ignoring empty strings
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }
}
