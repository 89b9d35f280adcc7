//! Adapter between the client and an e-book store host.
//!
//! The host shows one line per book with a single download format, so each
//! result is flattened to a [`StoreListing`] built from its first mirror.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::client::{LibgenClient, SearchOptions};
use crate::data_models::BookResult;
use crate::error::Result;

pub const STORE_NAME: &str = "Libgen Fiction";
pub const PLUGIN_AUTHORS: &str = "libgen-fiction contributors";
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// DRM states the store host knows about. Every catalog entry is DRM-free,
/// so listings built here are always `Unlocked`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drm {
    Locked,
    Unlocked,
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreListing {
    pub store_name: String,
    pub cover_url: String,
    pub title: String,
    pub author: String,
    pub price: String,
    /// md5 of the book; handed back to [`LibgenStore::get_details`].
    pub detail_item: String,
    pub drm: Drm,
    pub formats: String,
    pub plugin_author: String,
    /// Direct links keyed by format, filled by [`LibgenStore::get_details`].
    pub downloads: BTreeMap<String, String>,
}

impl StoreListing {
    /// Builds a listing from the first mirror of `result`.
    pub fn from_result(result: &BookResult) -> Option<StoreListing> {
        let mirror = result.mirrors.first()?;
        Some(StoreListing {
            store_name: STORE_NAME.to_string(),
            cover_url: result.image_url.clone(),
            title: format!(
                "{} ({}, {}{})",
                result.title,
                result.language,
                format_size(mirror.size),
                mirror.unit
            ),
            author: result.authors.clone(),
            price: "0.00".to_string(),
            detail_item: result.md5.clone(),
            drm: Drm::Unlocked,
            formats: mirror.format.clone(),
            plugin_author: PLUGIN_AUTHORS.to_string(),
            downloads: BTreeMap::new(),
        })
    }
}

// 348.0 prints as "348", 1.5 stays "1.5".
fn format_size(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as u64)
    } else {
        format!("{size}")
    }
}

pub struct LibgenStore {
    client: LibgenClient,
}

impl LibgenStore {
    pub fn new(client: LibgenClient) -> Self {
        LibgenStore { client }
    }

    pub fn from_config() -> Result<Self> {
        Ok(Self::new(LibgenClient::from_config()?))
    }

    pub fn client(&self) -> &LibgenClient {
        &self.client
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<StoreListing>> {
        log::debug!("store search: query = {query:?}, max_results = {max_results}");
        let options = SearchOptions::default()
            .limit(max_results)
            .timeout(timeout);
        let response = self.client.search(query, &options).await?;

        let listings: Vec<StoreListing> = response
            .results
            .iter()
            .take(max_results)
            .filter_map(|result| {
                let listing = StoreListing::from_result(result);
                if listing.is_none() {
                    log::debug!("skipping {} ({}), no mirrors", result.title, result.md5);
                }
                listing
            })
            .collect();
        Ok(listings)
    }

    /// URL to open for `detail_item`, or the site itself when none is given.
    pub fn open_url(&self, detail_item: Option<&str>) -> Result<String> {
        match detail_item.map(str::trim).filter(|item| !item.is_empty()) {
            Some(md5) => Ok(self.client.catalog_url(md5)?.to_string()),
            None => Ok(self.client.base_url().to_string()),
        }
    }

    /// Resolves the listing's download link and records it under its format.
    pub async fn get_details(&self, listing: &mut StoreListing) -> Result<()> {
        let url = self.client.download_url(&listing.detail_item).await?;
        listing.downloads.insert(listing.formats.clone(), url);
        Ok(())
    }
}
