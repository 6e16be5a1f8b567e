use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::fetch::{Fetch, fetch_json};
use super::pages::PageFetcher;
use crate::models::Page;

/// Follows association links (`Things@iot.navigationLink`, ...) embedded in entities
#[derive(Clone)]
pub struct LinkResolver {
    fetch: Arc<dyn Fetch>,
    pages: PageFetcher,
}

impl LinkResolver {
    pub fn new(fetch: Arc<dyn Fetch>, pages: PageFetcher) -> Self {
        Self { fetch, pages }
    }

    /// First related entity behind `link`; `None` if the collection is empty or the GET fails
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve_first<T: DeserializeOwned>(&self, link: &str) -> Option<T> {
        match fetch_json::<Page>(self.fetch.as_ref(), link).await {
            Ok(page) => {
                let first = page.into_first();
                if first.is_none() {
                    debug!("No related entity behind {}", link);
                }
                first
            }
            Err(e) => {
                warn!("Error resolving {}: {}", link, e);
                None
            }
        }
    }

    /// Members of the first page behind `link`
    pub async fn resolve_page<T: DeserializeOwned>(&self, link: &str) -> Vec<T> {
        self.pages.fetch_first_page(link).await
    }

    /// Every member behind `link`, following next-page links
    pub async fn resolve_all<T: DeserializeOwned>(&self, link: &str) -> Vec<T> {
        self.pages.fetch_all_pages(link).await
    }
}
