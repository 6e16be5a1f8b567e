use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::fetch::{Fetch, fetch_json};
use crate::models::Page;
use crate::{Result, SamenMetenError};

/// Follows `@iot.nextLink` until a collection is exhausted
#[derive(Clone)]
pub struct PageFetcher {
    fetch: Arc<dyn Fetch>,
    max_pages: usize,
}

impl PageFetcher {
    pub fn new(fetch: Arc<dyn Fetch>, max_pages: usize) -> Self {
        Self {
            fetch,
            max_pages: max_pages.max(1),
        }
    }

    /// Every member of the collection at `collection_url`, in page order.
    ///
    /// All or nothing: if any page fails, the members gathered so far are
    /// discarded and the result is empty.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_all_pages<T: DeserializeOwned>(&self, collection_url: &str) -> Vec<T> {
        match self.try_fetch_all_pages(collection_url).await {
            Ok(members) => members,
            Err(e) => {
                warn!("Error fetching collection {}: {}", collection_url, e);
                Vec::new()
            }
        }
    }

    /// First page of the collection only; empty on failure
    pub async fn fetch_first_page<T: DeserializeOwned>(&self, collection_url: &str) -> Vec<T> {
        match fetch_json::<Page>(self.fetch.as_ref(), collection_url).await {
            Ok(page) => page.into_members(),
            Err(e) => {
                warn!("Error fetching collection {}: {}", collection_url, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_all_pages<T: DeserializeOwned>(&self, collection_url: &str) -> Result<Vec<T>> {
        let mut members = Vec::new();
        let mut next_link = Some(collection_url.to_string());
        let mut pages = 0usize;

        while let Some(url) = next_link.take() {
            if pages == self.max_pages {
                return Err(SamenMetenError::decode(format!(
                    "Gave up after {} pages of {}",
                    self.max_pages, collection_url
                )));
            }

            let page: Page = fetch_json(self.fetch.as_ref(), &url).await?;
            pages += 1;

            next_link = page.next().map(str::to_string);
            let batch: Vec<T> = page.into_members();
            debug!("Fetched page {} with {} members", pages, batch.len());
            members.extend(batch);
        }

        Ok(members)
    }
}
