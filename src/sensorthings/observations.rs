use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::fetch::{Fetch, fetch_json};
use crate::models::{EntityId, LatestObservation, Observation, ObservationValue, Page};

/// Dutch locale rendering, e.g. `16-10-2026, 14:03:00`
const DUTCH_DATETIME: &str = "%-d-%-m-%Y, %H:%M:%S";

/// Reads the most recent observation of a datastream
#[derive(Clone)]
pub struct ObservationReader {
    fetch: Arc<dyn Fetch>,
    base_url: String,
    timezone: Tz,
}

impl ObservationReader {
    pub fn new(fetch: Arc<dyn Fetch>, base_url: &str, timezone: Tz) -> Self {
        Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            timezone,
        }
    }

    /// URL of the newest observation; the API guarantees no default ordering
    #[must_use]
    pub fn latest_url(&self, datastream_id: &EntityId) -> String {
        format!(
            "{}/Datastreams({})/Observations?$top=1&$orderby={}",
            self.base_url,
            datastream_id.path_key(),
            urlencoding::encode("phenomenonTime desc")
        )
    }

    /// Latest value and formatted timestamp; `No Data`/`Error` sentinels instead of failures
    #[instrument(level = "debug", skip(self), fields(datastream = %datastream_id))]
    pub async fn latest(&self, datastream_id: &EntityId) -> LatestObservation {
        let url = self.latest_url(datastream_id);
        match fetch_json::<Page>(self.fetch.as_ref(), &url).await {
            Ok(page) => match page.into_first::<Observation>() {
                Some(observation) => self.to_latest(observation),
                None => {
                    debug!("No observations yet");
                    LatestObservation::no_data()
                }
            },
            Err(e) => {
                warn!("Error fetching observation for datastream {}: {}", datastream_id, e);
                LatestObservation::error()
            }
        }
    }

    fn to_latest(&self, observation: Observation) -> LatestObservation {
        let value = ObservationValue::from_result(&observation.result);
        match observation.phenomenon_time {
            Some(raw) => {
                let parsed = parse_phenomenon_time(&raw);
                let observed_at = parsed.map_or(raw, |time| self.format_time(time));
                LatestObservation {
                    value,
                    observed_at,
                    phenomenon_time: parsed,
                }
            }
            None => LatestObservation {
                value,
                ..LatestObservation::no_data()
            },
        }
    }

    #[must_use]
    pub fn format_time(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.timezone)
            .format(DUTCH_DATETIME)
            .to_string()
    }
}

/// Start of an instant or `start/end` interval
fn parse_phenomenon_time(raw: &str) -> Option<DateTime<Utc>> {
    let start = raw.split('/').next().unwrap_or(raw).trim();
    DateTime::parse_from_rfc3339(start)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensorthings::fetch::fake::FakeApi;
    use serde_json::json;

    const BASE: &str = "https://example.org/v1.0";
    const LATEST: &str =
        "https://example.org/v1.0/Datastreams(42)/Observations?$top=1&$orderby=phenomenonTime%20desc";

    fn reader(api: FakeApi) -> ObservationReader {
        ObservationReader::new(Arc::new(api), BASE, chrono_tz::Europe::Amsterdam)
    }

    #[test]
    fn test_latest_url_orders_by_phenomenon_time() {
        let reader = reader(FakeApi::new());
        assert_eq!(reader.latest_url(&EntityId::Number(42)), LATEST);
        assert_eq!(
            reader.latest_url(&EntityId::Text("a".to_string())),
            "https://example.org/v1.0/Datastreams('a')/Observations?$top=1&$orderby=phenomenonTime%20desc"
        );
    }

    #[tokio::test]
    async fn test_latest_formats_single_member() {
        let reader = reader(FakeApi::new().with(
            LATEST,
            json!({ "value": [{ "@iot.id": 1, "phenomenonTime": "2024-01-15T12:30:00.000Z", "result": 17.4 }] }),
        ));

        let latest = reader.latest(&EntityId::Number(42)).await;

        assert_eq!(latest.value, ObservationValue::Number(17.4));
        // CET is UTC+1 in January
        assert_eq!(latest.observed_at, "15-1-2024, 13:30:00");
        assert!(latest.phenomenon_time.is_some());
    }

    #[tokio::test]
    async fn test_latest_empty_is_no_data() {
        let reader = reader(FakeApi::new().with(LATEST, json!({ "value": [] })));
        let latest = reader.latest(&EntityId::Number(42)).await;
        assert_eq!(latest.value.to_string(), "No Data");
        assert_eq!(latest.observed_at, "No Date");
    }

    #[tokio::test]
    async fn test_null_result_is_not_mistaken_for_empty_datastream() {
        let reader = reader(FakeApi::new().with(
            LATEST,
            json!({ "value": [{ "phenomenonTime": "2024-01-15T12:30:00Z", "result": null }] }),
        ));

        let latest = reader.latest(&EntityId::Number(42)).await;

        assert_eq!(latest.value.to_string(), "null");
        assert!(!latest.value.is_sentinel());
        assert_eq!(latest.observed_at, "15-1-2024, 13:30:00");
    }

    #[tokio::test]
    async fn test_latest_failure_is_error() {
        let reader = reader(FakeApi::new().failing(LATEST, 500));
        let latest = reader.latest(&EntityId::Number(42)).await;
        assert_eq!(latest.value.to_string(), "Error");
        assert_eq!(latest.observed_at, "No Date");
    }

    #[test]
    fn test_interval_and_garbage_timestamps() {
        assert!(parse_phenomenon_time("2024-07-01T10:00:00Z/2024-07-01T11:00:00Z").is_some());
        assert!(parse_phenomenon_time("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_unparsable_timestamp_is_shown_raw() {
        let reader = reader(FakeApi::new().with(
            LATEST,
            json!({ "value": [{ "phenomenonTime": "yesterday", "result": "ok" }] }),
        ));
        let latest = reader.latest(&EntityId::Number(42)).await;
        assert_eq!(latest.observed_at, "yesterday");
        assert!(latest.phenomenon_time.is_none());
    }
}
