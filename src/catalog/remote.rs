//! Remote gallery listing fetch.
//!
//! One GET against the site's `/gallery-data` endpoint, which answers
//! `{ "success": bool, "images": [{ "path": "...", "alt": "..." }] }`.
//! A declined listing (`success: false`) is an explicit error, never an
//! empty-but-valid catalog.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::{MediaItem, MediaKind};

use super::{Catalog, CatalogError};

/// Path of the listing endpoint, relative to the site base URL.
const LISTING_PATH: &str = "/gallery-data";

/// Transport timeout for the single listing request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Caption used when the listing omits alt text.
const DEFAULT_CAPTION: &str = "Park photograph";

/// Wire shape of the listing endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryListing {
    pub success: bool,
    #[serde(default)]
    pub images: Vec<ListedImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListedImage {
    pub path: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Fetches the gallery listing from `{base_url}/gallery-data` and builds a
/// catalog from it.
pub async fn fetch_remote(base_url: &str) -> Result<Catalog, CatalogError> {
    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let url = format!("{}{}", base_url.trim_end_matches('/'), LISTING_PATH);
    debug!("fetching gallery listing from {url}");

    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let listing: GalleryListing = serde_json::from_str(&body)?;

    if !listing.success {
        warn!("gallery listing declined by {url}");
        return Err(CatalogError::Rejected);
    }

    let items: Vec<MediaItem> = listing.images.into_iter().map(listed_to_item).collect();
    info!("fetched gallery listing: {} items", items.len());
    Ok(Catalog::new(items))
}

fn listed_to_item(listed: ListedImage) -> MediaItem {
    // The endpoint only serves the photo grid today; unknown extensions are
    // treated as images so one odd path cannot hide the rest of the grid.
    let kind = listed
        .path
        .rsplit('.')
        .next()
        .and_then(MediaKind::from_extension)
        .unwrap_or(MediaKind::Image);
    let caption = listed
        .alt
        .filter(|alt| !alt.is_empty())
        .unwrap_or_else(|| DEFAULT_CAPTION.to_string());
    MediaItem {
        source: listed.path,
        kind,
        caption,
        poster: None,
    }
}
