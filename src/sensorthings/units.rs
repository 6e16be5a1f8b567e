use std::sync::Arc;
use tracing::{debug, warn};

use super::fetch::{Fetch, fetch_json};
use crate::models::{Datastream, EntityId};

pub const UNIT_NOT_AVAILABLE: &str = "unit not available";

/// Looks up the unit-of-measurement symbol of a datastream
#[derive(Clone)]
pub struct UnitReader {
    fetch: Arc<dyn Fetch>,
    base_url: String,
}

impl UnitReader {
    pub fn new(fetch: Arc<dyn Fetch>, base_url: &str) -> Self {
        Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn datastream_url(&self, datastream_id: &EntityId) -> String {
        format!("{}/Datastreams({})", self.base_url, datastream_id.path_key())
    }

    /// Unit symbol, or `"unit not available"` when missing or on failure
    pub async fn unit_symbol(&self, datastream_id: &EntityId) -> String {
        let url = self.datastream_url(datastream_id);
        match fetch_json::<Datastream>(self.fetch.as_ref(), &url).await {
            Ok(datastream) => datastream
                .unit_of_measurement
                .and_then(|unit| unit.symbol)
                .filter(|symbol| !symbol.is_empty())
                .unwrap_or_else(|| {
                    debug!("Datastream {} has no unit symbol", datastream_id);
                    UNIT_NOT_AVAILABLE.to_string()
                }),
            Err(e) => {
                warn!("Error fetching unit for datastream {}: {}", datastream_id, e);
                UNIT_NOT_AVAILABLE.to_string()
            }
        }
    }
}
