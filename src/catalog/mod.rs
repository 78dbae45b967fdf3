//! Media catalog: the ordered, read-only list of displayable items.
//!
//! A catalog is built exactly once, from either a directory scan or a single
//! HTTP fetch of the gallery listing, then shared by reference between every
//! gallery and the popup navigator. Load failures are reported as a typed
//! `CatalogError` so callers can tell "no media" apart from "load error".

mod remote;
mod scan;

pub use remote::{fetch_remote, GalleryListing, ListedImage};
pub use scan::scan_directory;

use thiserror::Error;

use crate::models::MediaItem;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The listing endpoint answered but declined (`success: false`).
    #[error("gallery listing rejected by server")]
    Rejected,

    /// Transport-level failure reaching the listing endpoint.
    #[error("gallery listing request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The listing body was not the expected JSON shape.
    #[error("gallery listing body malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The scan root was missing or unreadable.
    #[error("catalog scan failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered collection of media items, immutable after load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<MediaItem>,
}

impl Catalog {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self { items }
    }

    /// Catalog with no items, used when loading failed and the page keeps
    /// running without a gallery grid.
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Indices of every item, in catalog order. Convenient for building a
    /// gallery over the whole catalog.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.items.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
        assert_eq!(catalog.get(0), None);
        assert!(catalog.all_indices().is_empty());
    }

    #[test]
    fn test_indexing_and_order() {
        let catalog = Catalog::new(vec![
            MediaItem::image("images/a.jpg", "a"),
            MediaItem::video("videos/v.mp4", "v", None),
            MediaItem::image("images/b.jpg", "b"),
        ]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(0).unwrap().caption, "a");
        assert!(catalog.get(1).unwrap().is_video());
        assert_eq!(catalog.get(3), None);
        assert_eq!(catalog.all_indices(), vec![0, 1, 2]);
    }
}
