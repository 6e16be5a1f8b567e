//! Canned SensorThings responses for driving the pipeline without a network

use async_trait::async_trait;
use samenmeten::{Fetch, SamenMetenError, SensorThingsClient};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE: &str = "https://api.example.org/v1.0";

#[derive(Default)]
pub struct FakeApi {
    responses: HashMap<String, Value>,
    failures: HashMap<String, u16>,
    requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: Value) -> Self {
        self.responses.insert(url.into(), body);
        self
    }

    pub fn failing(mut self, url: impl Into<String>, status: u16) -> Self {
        self.failures.insert(url.into(), status);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for FakeApi {
    async fn get_json(&self, url: &str) -> samenmeten::Result<Value> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(status) = self.failures.get(url) {
            return Err(SamenMetenError::status(*status, url));
        }
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| SamenMetenError::network(format!("connection refused: {url}")))
    }
}

pub fn client(api: Arc<FakeApi>) -> SensorThingsClient {
    SensorThingsClient::new(api, BASE, 100, chrono_tz::Europe::Amsterdam)
}

pub fn latest_url(datastream_id: u64) -> String {
    format!("{BASE}/Datastreams({datastream_id})/Observations?$top=1&$orderby=phenomenonTime%20desc")
}

pub fn datastream_url(datastream_id: u64) -> String {
    format!("{BASE}/Datastreams({datastream_id})")
}
