//! SensorThings API access
//!
//! This module wraps the read-only endpoints the traversal needs:
//! - Paginated collections (`@iot.nextLink`)
//! - Association links embedded in entities
//! - The newest observation and the unit of a datastream

pub mod fetch;
pub mod links;
pub mod observations;
pub mod pages;
pub mod units;

use chrono_tz::Tz;
use std::sync::Arc;

pub use fetch::{Fetch, HttpFetcher, fetch_json};
pub use links::LinkResolver;
pub use observations::ObservationReader;
pub use pages::PageFetcher;
pub use units::{UNIT_NOT_AVAILABLE, UnitReader};

use crate::Result;
use crate::config::SamenMetenConfig;

/// All readers of one API, sharing a single transport
#[derive(Clone)]
pub struct SensorThingsClient {
    base_url: String,
    pages: PageFetcher,
    links: LinkResolver,
    observations: ObservationReader,
    units: UnitReader,
}

impl SensorThingsClient {
    pub fn new(fetch: Arc<dyn Fetch>, base_url: &str, max_pages: usize, timezone: Tz) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let pages = PageFetcher::new(fetch.clone(), max_pages);
        Self {
            links: LinkResolver::new(fetch.clone(), pages.clone()),
            observations: ObservationReader::new(fetch.clone(), &base_url, timezone),
            units: UnitReader::new(fetch, &base_url),
            pages,
            base_url,
        }
    }

    /// Client talking HTTP to the configured API
    pub fn from_config(config: &SamenMetenConfig) -> anyhow::Result<Self> {
        let fetch: Arc<dyn Fetch> = Arc::new(Self::http(config)?);
        Ok(Self::new(
            fetch,
            &config.api.base_url,
            config.api.max_pages as usize,
            config.display.tz()?,
        ))
    }

    fn http(config: &SamenMetenConfig) -> Result<HttpFetcher> {
        HttpFetcher::new(&config.api)
    }

    #[must_use]
    pub fn locations_url(&self) -> String {
        format!("{}/Locations", self.base_url)
    }

    pub fn pages(&self) -> &PageFetcher {
        &self.pages
    }

    pub fn links(&self) -> &LinkResolver {
        &self.links
    }

    pub fn observations(&self) -> &ObservationReader {
        &self.observations
    }

    pub fn units(&self) -> &UnitReader {
        &self.units
    }
}
